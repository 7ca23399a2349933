//! One word-cloud run over an input directory.

use crate::accumulator::{AccumulateMode, CorpusAccumulator};
use crate::categories::CategoryRules;
use crate::frequencies::word_frequencies;
use crate::layout::{layout, LayoutOptions};
use crate::render::{CloudRenderer, PngRenderer};
use crate::stopwords::StopWords;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use verdict_core::{CoreError, DataError, WordCloudConfig};

#[derive(Debug, Clone, PartialEq)]
pub struct CloudOutcome {
    pub category: String,
    pub files: usize,
    pub accumulator_path: PathBuf,
    /// `None` when the category had no words left to draw.
    pub image_path: Option<PathBuf>,
    pub words_placed: usize,
}

pub struct WordCloudBuilder<R: CloudRenderer> {
    config: WordCloudConfig,
    stop_words: StopWords,
    rules: CategoryRules,
    renderer: R,
}

impl<R: CloudRenderer> WordCloudBuilder<R> {
    pub fn new(config: &WordCloudConfig, renderer: R) -> Result<Self, CoreError> {
        Ok(Self {
            stop_words: StopWords::english_with(&config.extra_stop_words),
            rules: CategoryRules::new(&config.categories)?,
            config: config.clone(),
            renderer,
        })
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Input files in name order, reserved-prefix files excluded.
    pub fn input_files(&self) -> Result<Vec<PathBuf>, CoreError> {
        let dir = &self.config.input_dir;
        if !dir.is_dir() {
            return Err(DataError::SourceMissing {
                path: dir.display().to_string(),
            }
            .into());
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let has_extension = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == self.config.input_extension);
            let reserved = file_name(&path).starts_with(&self.config.reserved_prefix);
            if has_extension && !reserved {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Filters every input file into its category, writes the accumulators,
    /// then renders one image per touched category.
    pub fn build(&mut self, mode: AccumulateMode) -> Result<Vec<CloudOutcome>, CoreError> {
        let dir = self.config.input_dir.clone();
        let mut accumulator = CorpusAccumulator::open(&dir, self.rules.categories(), mode)?;
        let mut file_counts = std::collections::HashMap::new();

        let files = self.input_files()?;
        info!("Processing {} text files in {}", files.len(), dir.display());
        for path in &files {
            let text = std::fs::read_to_string(path)?;
            let category = self.rules.classify(file_name(path));
            let words = self.stop_words.filter(&text);
            debug!("{} -> '{}' ({} words kept)", path.display(), category.name, words.len());
            accumulator.append(&category.name, &words);
            *file_counts.entry(category.name.clone()).or_insert(0usize) += 1;
        }

        accumulator.persist(&dir, self.rules.categories())?;

        let options = LayoutOptions::from(&self.config);
        let mut outcomes = Vec::new();
        for category in self.rules.categories() {
            if !accumulator.is_touched(&category.name) {
                continue;
            }
            let frequencies =
                word_frequencies(accumulator.text(&category.name), &self.stop_words, self.config.max_words);

            let (image_path, words_placed) = if frequencies.is_empty() {
                warn!("No words to draw for '{}', skipping image", category.name);
                (None, 0)
            } else {
                let cloud = layout(&frequencies, &options);
                let image_path = dir.join(&category.image_file);
                self.renderer.render(&cloud, &image_path)?;
                (Some(image_path), cloud.words.len())
            };

            outcomes.push(CloudOutcome {
                category: category.name.clone(),
                files: file_counts.get(&category.name).copied().unwrap_or(0),
                accumulator_path: dir.join(&category.accumulator_file),
                image_path,
                words_placed,
            });
        }
        Ok(outcomes)
    }
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

/// Runs the word-cloud command with the PNG renderer.
pub fn run(config: &WordCloudConfig, mode: AccumulateMode) -> Result<Vec<CloudOutcome>, CoreError> {
    let renderer = PngRenderer::new(config.font_path.as_deref())?;
    let outcomes = WordCloudBuilder::new(config, renderer)?.build(mode)?;
    for outcome in &outcomes {
        info!(
            "Category '{}': {} files, {} words drawn",
            outcome.category, outcome.files, outcome.words_placed
        );
    }
    Ok(outcomes)
}
