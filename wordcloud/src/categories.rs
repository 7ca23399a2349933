use verdict_core::{CategoryConfig, ConfigError};

/// Routes input file names to their category by prefix.
#[derive(Debug, Clone)]
pub struct CategoryRules {
    categories: Vec<CategoryConfig>,
    fallback: usize,
}

impl CategoryRules {
    pub fn new(categories: &[CategoryConfig]) -> Result<Self, ConfigError> {
        let mut fallbacks = categories
            .iter()
            .enumerate()
            .filter(|(_, c)| c.prefix.is_none())
            .map(|(i, _)| i);

        let fallback = match (fallbacks.next(), fallbacks.next()) {
            (Some(index), None) => index,
            _ => {
                return Err(ConfigError::ValidationFailed {
                    reason: "exactly one word-cloud category must be the fallback (no prefix)"
                        .to_string(),
                })
            }
        };

        Ok(Self {
            categories: categories.to_vec(),
            fallback,
        })
    }

    /// First category whose prefix starts `file_name`, otherwise the fallback.
    pub fn classify(&self, file_name: &str) -> &CategoryConfig {
        self.categories
            .iter()
            .find(|c| {
                c.prefix
                    .as_deref()
                    .is_some_and(|prefix| file_name.starts_with(prefix))
            })
            .unwrap_or(&self.categories[self.fallback])
    }

    pub fn categories(&self) -> &[CategoryConfig] {
        &self.categories
    }
}
