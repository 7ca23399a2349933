//! Per-run filtered text, one buffer per category.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;
use verdict_core::{CategoryConfig, ConfigError, CoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccumulateMode {
    /// Start empty; every category's accumulator file is rewritten, so
    /// categories without input this run end up empty.
    #[default]
    Reset,
    /// Seed each category from its existing accumulator file; only the
    /// categories that receive input are rewritten.
    Continue,
}

impl FromStr for AccumulateMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reset" => Ok(AccumulateMode::Reset),
            "continue" => Ok(AccumulateMode::Continue),
            other => Err(ConfigError::InvalidValue {
                field: "wordcloud.mode".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CorpusAccumulator {
    mode: AccumulateMode,
    texts: BTreeMap<String, String>,
    touched: BTreeSet<String>,
}

impl CorpusAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the accumulator for a run over `dir`.
    pub fn open(
        dir: &Path,
        categories: &[CategoryConfig],
        mode: AccumulateMode,
    ) -> Result<Self, CoreError> {
        let mut accumulator = Self {
            mode,
            ..Self::new()
        };
        if mode == AccumulateMode::Reset {
            return Ok(accumulator);
        }

        for category in categories {
            let path = dir.join(&category.accumulator_file);
            if !path.exists() {
                continue;
            }
            let existing = std::fs::read_to_string(&path)?;
            let words: Vec<&str> = existing.split_whitespace().collect();
            debug!("Seeded '{}' with {} words from {}", category.name, words.len(), path.display());
            accumulator
                .texts
                .entry(category.name.clone())
                .or_default()
                .push_str(&words.join(" "));
        }
        Ok(accumulator)
    }

    /// Appends `words` to `category`, single-space separated.
    pub fn append(&mut self, category: &str, words: &[&str]) {
        self.touched.insert(category.to_string());
        let text = self.texts.entry(category.to_string()).or_default();
        for word in words {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(word);
        }
    }

    pub fn text(&self, category: &str) -> &str {
        self.texts.get(category).map(String::as_str).unwrap_or("")
    }

    pub fn is_touched(&self, category: &str) -> bool {
        self.touched.contains(category)
    }

    pub fn mode(&self) -> AccumulateMode {
        self.mode
    }

    /// Writes the accumulator files: every category's after a reset, only
    /// the touched ones when continuing.
    pub fn persist(&self, dir: &Path, categories: &[CategoryConfig]) -> Result<(), CoreError> {
        for category in categories {
            let touched = self.is_touched(&category.name);
            if !touched && self.mode == AccumulateMode::Continue {
                continue;
            }
            let path = dir.join(&category.accumulator_file);
            std::fs::write(&path, self.text(&category.name))?;
            if touched {
                debug!("Wrote {}", path.display());
            } else {
                debug!("Cleared {}", path.display());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_core::WordCloudConfig;

    #[test]
    fn test_append_joins_with_single_spaces() {
        let mut acc = CorpusAccumulator::new();
        acc.append("nta", &["dog", "cat"]);
        acc.append("nta", &[]);
        acc.append("nta", &["cat"]);
        assert_eq!(acc.text("nta"), "dog cat cat");
        assert!(acc.is_touched("nta"));
        assert!(!acc.is_touched("yta"));
        assert_eq!(acc.text("yta"), "");
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("reset".parse::<AccumulateMode>().unwrap(), AccumulateMode::Reset);
        assert_eq!("Continue".parse::<AccumulateMode>().unwrap(), AccumulateMode::Continue);
        assert!("append".parse::<AccumulateMode>().is_err());
    }

    #[test]
    fn test_continue_seeds_from_disk() {
        let dir = std::env::temp_dir().join(format!("wordcloud-acc-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("filteredtext_nta.txt"), " bird  bird").unwrap();
        let categories = WordCloudConfig::default().categories;

        let reset = CorpusAccumulator::open(&dir, &categories, AccumulateMode::Reset).unwrap();
        assert_eq!(reset.text("nta"), "");

        let mut cont = CorpusAccumulator::open(&dir, &categories, AccumulateMode::Continue).unwrap();
        assert_eq!(cont.text("nta"), "bird bird");
        // seeding alone does not mark a category for output
        assert!(!cont.is_touched("nta"));

        cont.append("nta", &["dog"]);
        cont.persist(&dir, &categories).unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.join("filteredtext_nta.txt")).unwrap(),
            "bird bird dog"
        );
        // continuing leaves untouched categories alone
        assert!(!dir.join("filteredtext_yta.txt").exists());

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_reset_clears_untouched_categories() {
        let dir = std::env::temp_dir().join(format!("wordcloud-acc-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("filteredtext_yta.txt"), "stale words from last run").unwrap();
        let categories = WordCloudConfig::default().categories;

        let mut acc = CorpusAccumulator::open(&dir, &categories, AccumulateMode::Reset).unwrap();
        assert_eq!(acc.mode(), AccumulateMode::Reset);
        acc.append("nta", &["dog"]);
        acc.persist(&dir, &categories).unwrap();

        assert_eq!(std::fs::read_to_string(dir.join("filteredtext_nta.txt")).unwrap(), "dog");
        assert_eq!(std::fs::read_to_string(dir.join("filteredtext_yta.txt")).unwrap(), "");
        assert!(!acc.is_touched("yta"));

        std::fs::remove_dir_all(dir).unwrap();
    }
}
