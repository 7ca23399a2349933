use crate::normalizer::normalize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use verdict_core::ModelError;

/// `(feature index, value)` pairs, ascending by index, zeros omitted.
pub type SparseRow = Vec<(usize, f64)>;

/// Bag-of-words counter over normalized tokens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountVectorizer {
    max_features: Option<usize>,
    vocabulary: Option<BTreeMap<String, usize>>,
}

impl CountVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps only the `max_features` terms with the highest total count.
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn max_features(&self) -> Option<usize> {
        self.max_features
    }

    /// Learns the vocabulary from `documents`. Indices follow alphabetical
    /// order; when capped, equal counts are broken alphabetically.
    pub fn fit(&mut self, documents: &[String]) -> Result<&mut Self, ModelError> {
        let mut totals: BTreeMap<String, usize> = BTreeMap::new();
        for document in documents {
            for token in normalize(document)? {
                *totals.entry(token).or_insert(0) += 1;
            }
        }
        if totals.is_empty() {
            return Err(ModelError::EmptyVocabulary);
        }

        let seen = totals.len();
        let mut terms: Vec<(String, usize)> = totals.into_iter().collect();
        if let Some(max) = self.max_features.filter(|&max| max < terms.len()) {
            // stable sort keeps the alphabetical order among equal counts
            terms.sort_by(|a, b| b.1.cmp(&a.1));
            terms.truncate(max);
            terms.sort_by(|a, b| a.0.cmp(&b.0));
        }

        let vocabulary: BTreeMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(index, (term, _))| (term, index))
            .collect();
        debug!("Learned vocabulary of {} terms ({} seen)", vocabulary.len(), seen);

        self.vocabulary = Some(vocabulary);
        Ok(self)
    }

    /// Counts vocabulary terms per document; unknown terms are ignored.
    pub fn transform(&self, documents: &[String]) -> Result<Vec<SparseRow>, ModelError> {
        let vocabulary = self.vocabulary.as_ref().ok_or_else(|| ModelError::NotFitted {
            component: "CountVectorizer".to_string(),
        })?;

        documents
            .iter()
            .map(|document| -> Result<SparseRow, ModelError> {
                let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
                for token in normalize(document)? {
                    if let Some(&index) = vocabulary.get(&token) {
                        *counts.entry(index).or_insert(0.0) += 1.0;
                    }
                }
                Ok(counts.into_iter().collect())
            })
            .collect()
    }

    pub fn fit_transform(&mut self, documents: &[String]) -> Result<Vec<SparseRow>, ModelError> {
        self.fit(documents)?;
        self.transform(documents)
    }

    pub fn vocabulary(&self) -> Option<&BTreeMap<String, usize>> {
        self.vocabulary.as_ref()
    }

    pub fn n_features(&self) -> usize {
        self.vocabulary.as_ref().map_or(0, |v| v.len())
    }
}
