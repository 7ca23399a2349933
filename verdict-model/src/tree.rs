//! Decision tree over TF-IDF rows, backed by smartcore's CART.

use crate::vectorizer::SparseRow;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters, SplitCriterion,
};
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use verdict_core::{ConfigError, ModelError};

type Cart = DecisionTreeClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Criterion {
    Gini,
    Entropy,
}

impl Criterion {
    fn split_criterion(self) -> SplitCriterion {
        match self {
            Criterion::Gini => SplitCriterion::Gini,
            Criterion::Entropy => SplitCriterion::Entropy,
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::Gini => write!(f, "gini"),
            Criterion::Entropy => write!(f, "entropy"),
        }
    }
}

impl FromStr for Criterion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gini" => Ok(Criterion::Gini),
            "entropy" => Ok(Criterion::Entropy),
            other => Err(ConfigError::InvalidValue {
                field: "criterion".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeParams {
    pub criterion: Criterion,
    pub min_samples_split: usize,
}

impl TreeParams {
    fn parameters(self) -> DecisionTreeClassifierParameters {
        DecisionTreeClassifierParameters::default()
            .with_criterion(self.criterion.split_criterion())
            .with_min_samples_split(self.min_samples_split.max(2))
    }
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            criterion: Criterion::Gini,
            min_samples_split: 2,
        }
    }
}

impl fmt::Display for TreeParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "criterion={}, min_samples_split={}",
            self.criterion, self.min_samples_split
        )
    }
}

/// Expands sparse rows to the dense matrix smartcore trains on.
fn dense(rows: &[SparseRow], n_features: usize) -> DenseMatrix<f64> {
    let values: Vec<Vec<f64>> = rows
        .iter()
        .map(|row| {
            let mut values = vec![0.0; n_features];
            for &(index, value) in row {
                if index < n_features {
                    values[index] = value;
                }
            }
            values
        })
        .collect();
    DenseMatrix::from_2d_vec(&values)
}

/// String labels on top of smartcore's integer-class tree.
#[derive(Serialize, Deserialize)]
pub struct TreeClassifier {
    params: TreeParams,
    classes: Vec<String>,
    n_features: usize,
    model: Option<Cart>,
}

impl fmt::Debug for TreeClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeClassifier")
            .field("params", &self.params)
            .field("classes", &self.classes)
            .field("n_features", &self.n_features)
            .field("fitted", &self.model.is_some())
            .finish()
    }
}

impl TreeClassifier {
    pub fn new(params: TreeParams) -> Self {
        Self {
            params,
            classes: Vec::new(),
            n_features: 0,
            model: None,
        }
    }

    pub fn params(&self) -> TreeParams {
        self.params
    }

    /// Sorted distinct labels seen during fit.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    pub fn fit(
        &mut self,
        rows: &[SparseRow],
        labels: &[String],
        n_features: usize,
    ) -> Result<(), ModelError> {
        if rows.len() != labels.len() {
            return Err(ModelError::LengthMismatch {
                features: rows.len(),
                labels: labels.len(),
            });
        }
        if rows.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if n_features == 0 {
            return Err(ModelError::EmptyVocabulary);
        }

        let mut classes: Vec<String> = labels.to_vec();
        classes.sort();
        classes.dedup();
        let y: Vec<u32> = labels
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or(0) as u32)
            .collect();

        let x = dense(rows, n_features);
        let model = Cart::fit(&x, &y, self.params.parameters()).map_err(|e| {
            ModelError::TrainingFailed {
                reason: e.to_string(),
            }
        })?;
        debug!(
            "Fitted tree ({}) over {} samples x {} features",
            self.params,
            rows.len(),
            n_features
        );

        self.classes = classes;
        self.n_features = n_features;
        self.model = Some(model);
        Ok(())
    }

    pub fn predict(&self, rows: &[SparseRow]) -> Result<Vec<String>, ModelError> {
        let model = self.model.as_ref().ok_or_else(|| ModelError::NotFitted {
            component: "TreeClassifier".to_string(),
        })?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let predicted = model
            .predict(&dense(rows, self.n_features))
            .map_err(|e| ModelError::PredictionFailed {
                reason: e.to_string(),
            })?;
        predicted
            .into_iter()
            .map(|class| {
                self.classes
                    .get(class as usize)
                    .cloned()
                    .ok_or_else(|| ModelError::PredictionFailed {
                        reason: format!("unknown class index {}", class),
                    })
            })
            .collect()
    }
}
