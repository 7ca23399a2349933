use crate::tfidf::TfidfTransformer;
use crate::tree::{TreeClassifier, TreeParams};
use crate::vectorizer::CountVectorizer;
use serde::{Deserialize, Serialize};
use verdict_core::ModelError;

/// Counts, IDF weighting and a decision tree, fitted and applied together.
#[derive(Debug, Serialize, Deserialize)]
pub struct TextPipeline {
    vectorizer: CountVectorizer,
    tfidf: TfidfTransformer,
    classifier: TreeClassifier,
}

impl TextPipeline {
    pub fn new(params: TreeParams) -> Self {
        Self {
            vectorizer: CountVectorizer::new(),
            tfidf: TfidfTransformer::new(),
            classifier: TreeClassifier::new(params),
        }
    }

    /// Caps the vocabulary; `None` keeps every term.
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        if let Some(max) = max_features {
            self.vectorizer = self.vectorizer.with_max_features(max);
        }
        self
    }

    pub fn fit(&mut self, documents: &[String], labels: &[String]) -> Result<(), ModelError> {
        if documents.len() != labels.len() {
            return Err(ModelError::LengthMismatch {
                features: documents.len(),
                labels: labels.len(),
            });
        }
        if documents.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }

        let counts = self.vectorizer.fit_transform(documents)?;
        let n_features = self.vectorizer.n_features();
        let weighted = self.tfidf.fit_transform(&counts, n_features)?;
        self.classifier.fit(&weighted, labels, n_features)
    }

    pub fn predict(&self, documents: &[String]) -> Result<Vec<String>, ModelError> {
        let counts = self.vectorizer.transform(documents)?;
        let weighted = self.tfidf.transform(&counts)?;
        self.classifier.predict(&weighted)
    }

    pub fn params(&self) -> TreeParams {
        self.classifier.params()
    }

    pub fn classes(&self) -> &[String] {
        self.classifier.classes()
    }

    pub fn vectorizer(&self) -> &CountVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &TreeClassifier {
        &self.classifier
    }
}
