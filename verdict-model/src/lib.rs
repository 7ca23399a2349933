//! Verdict classifier: tokenization, TF-IDF features, decision tree,
//! cross-validated model selection, evaluation and persistence.

pub mod dataset;
pub mod evaluation;
pub mod lemmatizer;
pub mod normalizer;
pub mod persistence;
pub mod pipeline;
pub mod selection;
pub mod split;
pub mod stopwords;
pub mod tfidf;
pub mod trainer;
pub mod tree;
pub mod vectorizer;

pub use dataset::{load_dataset, Dataset};
pub use evaluation::ClassificationReport;
pub use normalizer::normalize;
pub use persistence::{save_model, ModelArtifact};
pub use pipeline::TextPipeline;
pub use selection::{GridSearch, GridSearchResult, ParamGrid};
pub use trainer::{train, TrainingSummary};
pub use tree::{Criterion, TreeClassifier, TreeParams};
