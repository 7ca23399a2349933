use crate::pipeline::TextPipeline;
use crate::selection::{CandidateScore, GridSearchResult};
use crate::tree::TreeParams;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use verdict_core::{CoreError, ModelError};

/// Everything written to the model file.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub pipeline: TextPipeline,
    pub best_params: TreeParams,
    pub best_score: f64,
    pub cv_results: Vec<CandidateScore>,
}

impl From<GridSearchResult> for ModelArtifact {
    fn from(result: GridSearchResult) -> Self {
        Self {
            pipeline: result.best_pipeline,
            best_params: result.best_params,
            best_score: result.best_score,
            cv_results: result.candidates,
        }
    }
}

/// Serializes `artifact` with bincode to `path`, replacing any previous file.
pub fn save_model(artifact: &ModelArtifact, path: &Path) -> Result<usize, CoreError> {
    let bytes = bincode::serde::encode_to_vec(artifact, bincode::config::standard()).map_err(
        |e| ModelError::EncodingFailed {
            reason: e.to_string(),
        },
    )?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &bytes)?;

    info!("Saved model ({} bytes) to {}", bytes.len(), path.display());
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(docs: &[&str], labels: &[&str]) -> ModelArtifact {
        let docs: Vec<String> = docs.iter().map(|d| d.to_string()).collect();
        let labels: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        let mut pipeline = TextPipeline::new(TreeParams::default());
        pipeline.fit(&docs, &labels).unwrap();

        ModelArtifact {
            pipeline,
            best_params: TreeParams::default(),
            best_score: 1.0,
            cv_results: Vec::new(),
        }
    }

    #[test]
    fn test_save_creates_dirs_and_overwrites() {
        let dir = std::env::temp_dir().join(format!("verdict-model-{}", uuid::Uuid::new_v4()));
        let path = dir.join("out").join("model.bin");

        let first = artifact(&["rude neighbour", "yelled waiter"], &["NTA", "YTA"]);
        let written = save_model(&first, &path).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len() as usize, written);

        let second = artifact(&["a much longer body of text here", "short"], &["YTA", "NTA"]);
        let rewritten = save_model(&second, &path).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len() as usize, rewritten);

        let bytes = std::fs::read(&path).unwrap();
        let (decoded, _): (ModelArtifact, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard()).unwrap();
        let sample = vec!["a much longer body".to_string()];
        assert_eq!(
            decoded.pipeline.predict(&sample).unwrap(),
            second.pipeline.predict(&sample).unwrap()
        );
        assert_eq!(decoded.pipeline.classes(), second.pipeline.classes());

        std::fs::remove_dir_all(dir).unwrap();
    }
}
