use crate::dataset::{load_dataset, Dataset};
use crate::evaluation::ClassificationReport;
use crate::persistence::{save_model, ModelArtifact};
use crate::pipeline::TextPipeline;
use crate::selection::{GridSearch, ParamGrid};
use crate::split::train_test_split;
use crate::tree::TreeParams;
use std::path::PathBuf;
use tracing::info;
use verdict_core::{CoreError, TrainerConfig};

#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub train_size: usize,
    pub test_size: usize,
    pub best_params: TreeParams,
    pub best_cv_score: f64,
    pub report: ClassificationReport,
    pub model_path: PathBuf,
}

/// Predicts the held-out split and builds the report.
pub fn evaluate(pipeline: &TextPipeline, test: &Dataset) -> Result<ClassificationReport, CoreError> {
    let predicted = pipeline.predict(&test.bodies)?;
    let report = ClassificationReport::new(&test.verdicts, &predicted)?;

    info!(
        "Held-out accuracy {:.3}, macro F1 {:.3}, weighted F1 {:.3} over {} posts",
        report.accuracy,
        report.macro_avg.f1,
        report.weighted_avg.f1,
        report.total_support()
    );
    Ok(report)
}

/// Load, split, grid search, evaluate, save.
pub fn train(config: &TrainerConfig) -> Result<TrainingSummary, CoreError> {
    info!("Loading data from {}", config.dataset_path.display());
    let dataset = load_dataset(&config.dataset_path)?;
    let (train, test) = train_test_split(&dataset, config.test_size, config.seed)?;

    info!("Training on {} posts, holding out {}", train.len(), test.len());
    let grid = ParamGrid::from_config(config)?;
    let result = GridSearch::new(grid, config.folds)
        .with_max_features(config.max_features)
        .fit(&train)?;

    info!("Evaluating model");
    let report = evaluate(&result.best_pipeline, &test)?;

    let best_params = result.best_params;
    let best_cv_score = result.best_score;
    let artifact = ModelArtifact::from(result);
    save_model(&artifact, &config.model_path)?;

    Ok(TrainingSummary {
        train_size: train.len(),
        test_size: test.len(),
        best_params,
        best_cv_score,
        report,
        model_path: config.model_path.clone(),
    })
}
