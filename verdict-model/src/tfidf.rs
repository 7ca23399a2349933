use crate::vectorizer::SparseRow;
use serde::{Deserialize, Serialize};
use verdict_core::ModelError;

/// Smooth-IDF weighting with L2 row normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TfidfTransformer {
    idf: Option<Vec<f64>>,
}

impl TfidfTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// `idf(t) = ln((1 + n) / (1 + df(t))) + 1`
    pub fn fit(&mut self, rows: &[SparseRow], n_features: usize) -> &mut Self {
        let n = rows.len() as f64;
        let mut document_frequency = vec![0usize; n_features];
        for row in rows {
            for &(index, value) in row {
                if value != 0.0 && index < n_features {
                    document_frequency[index] += 1;
                }
            }
        }

        self.idf = Some(
            document_frequency
                .into_iter()
                .map(|df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
                .collect(),
        );
        self
    }

    pub fn transform(&self, rows: &[SparseRow]) -> Result<Vec<SparseRow>, ModelError> {
        let idf = self.idf.as_ref().ok_or_else(|| ModelError::NotFitted {
            component: "TfidfTransformer".to_string(),
        })?;

        Ok(rows
            .iter()
            .map(|row| {
                let weighted: SparseRow = row
                    .iter()
                    .filter_map(|&(index, tf)| idf.get(index).map(|w| (index, tf * w)))
                    .collect();
                let norm = weighted.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
                if norm > 0.0 {
                    weighted.into_iter().map(|(i, v)| (i, v / norm)).collect()
                } else {
                    weighted
                }
            })
            .collect())
    }

    pub fn fit_transform(
        &mut self,
        rows: &[SparseRow],
        n_features: usize,
    ) -> Result<Vec<SparseRow>, ModelError> {
        self.fit(rows, n_features);
        self.transform(rows)
    }

    pub fn idf(&self) -> Option<&[f64]> {
        self.idf.as_deref()
    }
}
