//! Runtime configuration.
//!
//! Every knob has a compiled-in default. A TOML file may override any
//! section; Reddit credentials only ever come from the environment.

use crate::error::ConfigError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ENV_CLIENT_ID: &str = "REDDIT_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "REDDIT_CLIENT_SECRET";
pub const ENV_USER_AGENT: &str = "REDDIT_USER_AGENT";
pub const ENV_PUSHSHIFT_TOKEN: &str = "PUSHSHIFT_TOKEN";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scraper: ScraperConfig,
    pub trainer: TrainerConfig,
    pub wordcloud: WordCloudConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub subreddit: String,
    /// Only posts created strictly before this instant (UTC) are fetched.
    pub before: NaiveDateTime,
    pub limit: usize,
    /// Page size requested from the search API.
    pub page_size: u32,
    pub pushshift_url: String,
    pub output_path: PathBuf,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            subreddit: "AmITheAsshole".to_string(),
            before: NaiveDate::from_ymd_opt(2022, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap_or_default(),
            limit: 100_000,
            page_size: 100,
            pushshift_url: "https://api.pushshift.io/reddit/search/submission".to_string(),
            output_path: PathBuf::from("reddit_posts.csv"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub dataset_path: PathBuf,
    pub model_path: PathBuf,
    pub test_size: f64,
    pub folds: usize,
    pub seed: u64,
    pub criteria: Vec<String>,
    pub min_samples_split: Vec<usize>,
    /// Vocabulary cap: only the most frequent terms become features.
    pub max_features: Option<usize>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("reddit_posts.csv"),
            model_path: PathBuf::from("model.bin"),
            test_size: 0.2,
            folds: 5,
            seed: 42,
            criteria: vec!["gini".to_string(), "entropy".to_string()],
            min_samples_split: vec![10, 20],
            max_features: Some(1000),
        }
    }
}

/// Maps a filename prefix to an output category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    /// `None` marks the fallback category.
    pub prefix: Option<String>,
    pub accumulator_file: String,
    pub image_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WordCloudConfig {
    pub input_dir: PathBuf,
    pub input_extension: String,
    pub reserved_prefix: String,
    pub categories: Vec<CategoryConfig>,
    pub extra_stop_words: Vec<String>,
    pub width: u32,
    pub height: u32,
    pub seed: u64,
    pub max_words: usize,
    pub prefer_horizontal: f64,
    pub relative_scaling: f64,
    /// TrueType font used to draw the words.
    pub font_path: Option<PathBuf>,
}

impl Default for WordCloudConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            input_extension: "txt".to_string(),
            reserved_prefix: "filtered".to_string(),
            categories: vec![
                CategoryConfig {
                    name: "nta".to_string(),
                    prefix: Some("nta".to_string()),
                    accumulator_file: "filteredtext_nta.txt".to_string(),
                    image_file: "nta.png".to_string(),
                },
                CategoryConfig {
                    name: "yta".to_string(),
                    prefix: None,
                    accumulator_file: "filteredtext_yta.txt".to_string(),
                    image_file: "yta.png".to_string(),
                },
            ],
            extra_stop_words: [
                "just", "said", "told", "like", "t", "s", "get", "time", "year", "got", "one",
                "know",
            ]
            .iter()
            .map(|w| w.to_string())
            .collect(),
            width: 3000,
            height: 2000,
            seed: 1,
            max_words: 200,
            prefer_horizontal: 0.9,
            relative_scaling: 0.5,
            font_path: None,
        }
    }
}

/// Reddit application credentials.
#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub pushshift_token: Option<String>,
}

impl RedditCredentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds credentials from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvironmentVariable {
                    var_name: key.to_string(),
                })
        };

        Ok(Self {
            client_id: required(ENV_CLIENT_ID)?,
            client_secret: required(ENV_CLIENT_SECRET)?,
            user_agent: required(ENV_USER_AGENT)?,
            pushshift_token: lookup(ENV_PUSHSHIFT_TOKEN).filter(|v| !v.trim().is_empty()),
        })
    }
}

impl AppConfig {
    /// Loads defaults, then overlays the TOML file at `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    });
                }
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    ConfigError::ValidationFailed {
                        reason: format!("cannot read {}: {}", path.display(), e),
                    }
                })?;
                debug!("Loaded configuration from {}", path.display());
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let scraper = &self.scraper;
        if scraper.subreddit.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "scraper.subreddit".to_string(),
            });
        }
        if scraper.page_size == 0 || scraper.page_size > 1000 {
            return Err(invalid("scraper.page_size", scraper.page_size));
        }
        url::Url::parse(&scraper.pushshift_url)
            .map_err(|_| invalid("scraper.pushshift_url", &scraper.pushshift_url))?;

        let trainer = &self.trainer;
        if !(trainer.test_size > 0.0 && trainer.test_size < 1.0) {
            return Err(invalid("trainer.test_size", trainer.test_size));
        }
        if trainer.folds < 2 {
            return Err(invalid("trainer.folds", trainer.folds));
        }
        if trainer.criteria.is_empty() || trainer.min_samples_split.is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "hyperparameter grid must not be empty".to_string(),
            });
        }
        for criterion in &trainer.criteria {
            if criterion != "gini" && criterion != "entropy" {
                return Err(invalid("trainer.criteria", criterion));
            }
        }
        if let Some(split) = trainer.min_samples_split.iter().find(|s| **s < 2) {
            return Err(invalid("trainer.min_samples_split", split));
        }
        if trainer.max_features == Some(0) {
            return Err(invalid("trainer.max_features", 0));
        }

        let cloud = &self.wordcloud;
        if cloud.width == 0 || cloud.height == 0 {
            return Err(invalid(
                "wordcloud.size",
                format!("{}x{}", cloud.width, cloud.height),
            ));
        }
        if !(0.0..=1.0).contains(&cloud.prefer_horizontal) {
            return Err(invalid("wordcloud.prefer_horizontal", cloud.prefer_horizontal));
        }
        if !(0.0..=1.0).contains(&cloud.relative_scaling) {
            return Err(invalid("wordcloud.relative_scaling", cloud.relative_scaling));
        }
        if cloud.categories.iter().filter(|c| c.prefix.is_none()).count() != 1 {
            return Err(ConfigError::ValidationFailed {
                reason: "exactly one word-cloud category must be the fallback (no prefix)"
                    .to_string(),
            });
        }

        Ok(())
    }
}

fn invalid(field: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}
