//! Cross-validated grid search over decision-tree hyperparameters.

use crate::dataset::Dataset;
use crate::evaluation::accuracy;
use crate::pipeline::TextPipeline;
use crate::split::{stratified_k_fold, Fold};
use crate::tree::{Criterion, TreeParams};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use verdict_core::{ConfigError, CoreError, ModelError, TrainerConfig};

#[derive(Debug, Clone, PartialEq)]
pub struct ParamGrid {
    pub criteria: Vec<Criterion>,
    pub min_samples_split: Vec<usize>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            criteria: vec![Criterion::Gini, Criterion::Entropy],
            min_samples_split: vec![10, 20],
        }
    }
}

impl ParamGrid {
    pub fn from_config(config: &TrainerConfig) -> Result<Self, ConfigError> {
        let criteria = config
            .criteria
            .iter()
            .map(|c| c.parse())
            .collect::<Result<Vec<Criterion>, _>>()?;

        Ok(Self {
            criteria,
            min_samples_split: config.min_samples_split.clone(),
        })
    }

    /// Candidates with the criterion varying slowest.
    pub fn candidates(&self) -> Vec<TreeParams> {
        self.criteria
            .iter()
            .flat_map(|&criterion| {
                self.min_samples_split
                    .iter()
                    .map(move |&min_samples_split| TreeParams {
                        criterion,
                        min_samples_split,
                    })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub params: TreeParams,
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
    pub std_score: f64,
}

impl CandidateScore {
    fn from_scores(params: TreeParams, fold_scores: Vec<f64>) -> Self {
        let n = fold_scores.len().max(1) as f64;
        let mean_score = fold_scores.iter().sum::<f64>() / n;
        let variance = fold_scores
            .iter()
            .map(|s| (s - mean_score).powi(2))
            .sum::<f64>()
            / n;

        Self {
            params,
            fold_scores,
            mean_score,
            std_score: variance.sqrt(),
        }
    }
}

#[derive(Debug)]
pub struct GridSearchResult {
    pub best_params: TreeParams,
    pub best_score: f64,
    pub candidates: Vec<CandidateScore>,
    /// Winning configuration refit on the whole training split.
    pub best_pipeline: TextPipeline,
}

#[derive(Debug, Clone)]
pub struct GridSearch {
    grid: ParamGrid,
    folds: usize,
    max_features: Option<usize>,
}

fn score_fold(
    dataset: &Dataset,
    params: TreeParams,
    max_features: Option<usize>,
    fold: &Fold,
) -> Result<f64, ModelError> {
    let select = |idx: &[usize], source: &[String]| -> Vec<String> {
        idx.iter().map(|&i| source[i].clone()).collect()
    };

    let mut pipeline = TextPipeline::new(params).with_max_features(max_features);
    pipeline.fit(
        &select(&fold.train, &dataset.bodies),
        &select(&fold.train, &dataset.verdicts),
    )?;
    let predicted = pipeline.predict(&select(&fold.test, &dataset.bodies))?;
    Ok(accuracy(&select(&fold.test, &dataset.verdicts), &predicted))
}

impl GridSearch {
    pub fn new(grid: ParamGrid, folds: usize) -> Self {
        Self {
            grid,
            folds,
            max_features: None,
        }
    }

    /// Vocabulary cap applied to every fold fit and the final refit.
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn fit(&self, train: &Dataset) -> Result<GridSearchResult, CoreError> {
        let candidates = self.grid.candidates();
        if candidates.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "trainer.grid".to_string(),
                value: "empty".to_string(),
            }
            .into());
        }
        let folds = stratified_k_fold(&train.verdicts, self.folds)?;

        info!(
            "Fitting {} folds for each of {} candidates, totalling {} fits",
            folds.len(),
            candidates.len(),
            folds.len() * candidates.len()
        );

        let jobs: Vec<(usize, usize)> = (0..candidates.len())
            .flat_map(|c| (0..folds.len()).map(move |f| (c, f)))
            .collect();
        let scores: Vec<f64> = jobs
            .par_iter()
            .map(|&(c, f)| -> Result<f64, ModelError> {
                let score = score_fold(train, candidates[c], self.max_features, &folds[f])?;
                debug!("[CV {}/{}] {}; score={:.3}", f + 1, folds.len(), candidates[c], score);
                Ok(score)
            })
            .collect::<Result<Vec<f64>, _>>()?;

        let results: Vec<CandidateScore> = candidates
            .iter()
            .zip(scores.chunks(folds.len()))
            .map(|(&params, fold_scores)| CandidateScore::from_scores(params, fold_scores.to_vec()))
            .collect();

        let mut best = 0;
        for (index, candidate) in results.iter().enumerate() {
            info!(
                "{}: mean accuracy {:.3} (+/- {:.3})",
                candidate.params, candidate.mean_score, candidate.std_score
            );
            if candidate.mean_score > results[best].mean_score {
                best = index;
            }
        }
        let best_params = results[best].params;
        let best_score = results[best].mean_score;

        let mut best_pipeline = TextPipeline::new(best_params).with_max_features(self.max_features);
        best_pipeline.fit(&train.bodies, &train.verdicts)?;
        info!("Best parameters: {} (accuracy {:.3})", best_params, best_score);

        Ok(GridSearchResult {
            best_params,
            best_score,
            candidates: results,
            best_pipeline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable(n: usize) -> Dataset {
        Dataset {
            bodies: (0..n)
                .map(|i| {
                    if i % 2 == 0 {
                        format!("neighbour borrowed ladder case {}", i)
                    } else {
                        format!("shouted waiter restaurant case {}", i)
                    }
                })
                .collect(),
            verdicts: (0..n)
                .map(|i| if i % 2 == 0 { "NTA" } else { "YTA" }.to_string())
                .collect(),
        }
    }

    #[test]
    fn test_default_grid_order() {
        let candidates = ParamGrid::default().candidates();
        let expected = [
            (Criterion::Gini, 10),
            (Criterion::Gini, 20),
            (Criterion::Entropy, 10),
            (Criterion::Entropy, 20),
        ];
        assert_eq!(candidates.len(), 4);
        for (candidate, (criterion, split)) in candidates.iter().zip(expected) {
            assert_eq!(candidate.criterion, criterion);
            assert_eq!(candidate.min_samples_split, split);
        }
    }

    #[test]
    fn test_grid_from_config() {
        let grid = ParamGrid::from_config(&TrainerConfig::default()).unwrap();
        assert_eq!(grid, ParamGrid::default());

        let bad = TrainerConfig {
            criteria: vec!["gini".to_string(), "mse".to_string()],
            ..TrainerConfig::default()
        };
        assert!(ParamGrid::from_config(&bad).is_err());
    }

    #[test]
    fn test_candidate_statistics() {
        let score = CandidateScore::from_scores(TreeParams::default(), vec![1.0, 0.5, 1.0, 0.5]);
        assert!((score.mean_score - 0.75).abs() < 1e-12);
        assert!((score.std_score - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_too_few_samples_for_folds() {
        let search = GridSearch::new(ParamGrid::default(), 5);
        match search.fit(&separable(3)) {
            Err(CoreError::Config(ConfigError::InsufficientSamples { samples, folds })) => {
                assert_eq!(samples, 3);
                assert_eq!(folds, 5);
            }
            other => panic!("expected InsufficientSamples, got {:?}", other.map(|r| r.best_score)),
        }
    }

    #[test]
    fn test_empty_grid_rejected() {
        let grid = ParamGrid {
            criteria: vec![],
            min_samples_split: vec![10],
        };
        let result = GridSearch::new(grid, 5).fit(&separable(20));
        assert!(matches!(
            result,
            Err(CoreError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_max_features_reaches_refit() {
        let search = GridSearch::new(ParamGrid::default(), 5).with_max_features(Some(3));
        let result = search.fit(&separable(20)).unwrap();
        assert_eq!(result.best_pipeline.vectorizer().n_features(), 3);
        assert_eq!(result.best_pipeline.vectorizer().max_features(), Some(3));
    }

    #[test]
    fn test_ties_go_to_first_candidate() {
        let search = GridSearch::new(ParamGrid::default(), 5);
        let result = search.fit(&separable(40)).unwrap();

        assert_eq!(result.candidates.len(), 4);
        assert!(result.candidates.iter().all(|c| c.fold_scores.len() == 5));
        // every candidate separates the data perfectly
        assert!(result.candidates.iter().all(|c| c.mean_score == 1.0));
        assert_eq!(
            result.best_params,
            TreeParams {
                criterion: Criterion::Gini,
                min_samples_split: 10
            }
        );
        assert_eq!(result.best_score, 1.0);
        assert_eq!(
            result.best_pipeline.predict(&separable(4).bodies).unwrap(),
            separable(4).verdicts
        );
    }
}
