//! Trainer pipeline: dataset CSV in, model artifact out.

use std::path::PathBuf;

use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::artifact::{ArtifactError, ModelArtifact, TrainingSummary};
use crate::config::AppSettings;
use crate::dataset::{DatasetLoadError, LabeledDataset, load_dataset};
use crate::ml::forest::{RandomForestModel, TrainDataset, TrainOptions, train_random_forest};
use crate::ml::metrics::{ConfusionMatrix, PerClassStats, accuracy, precision_recall_by_class};
use crate::ml::split::train_test_split;

#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    Dataset(#[from] DatasetLoadError),
    #[error("Failed to split dataset: {0}")]
    Split(String),
    #[error("Failed to fit model: {0}")]
    Fit(String),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Inputs for one training run.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub dataset_path: PathBuf,
    pub model_out: PathBuf,
    pub target_column: String,
    pub test_fraction: f32,
    pub compression_level: u32,
    pub forest: TrainOptions,
}

impl From<&AppSettings> for TrainingConfig {
    fn from(settings: &AppSettings) -> Self {
        let training = &settings.training;
        Self {
            dataset_path: settings.dataset_path.clone(),
            model_out: settings.model_path.clone(),
            target_column: settings.target_column.clone(),
            test_fraction: training.test_fraction,
            compression_level: training.compression_level,
            forest: TrainOptions {
                n_trees: training.trees,
                max_depth: training.max_depth,
                seed: training.seed,
                ..TrainOptions::default()
            },
        }
    }
}

/// Results of a training run, for printing.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub model_path: PathBuf,
    pub classes: Vec<String>,
    pub train_rows: usize,
    pub test_rows: usize,
    pub test_accuracy: f32,
    pub confusion: ConfusionMatrix,
    pub per_class: Vec<PerClassStats>,
}

/// Load the dataset, fit a forest on the training split, evaluate it on the
/// held-out split and save the artifact.
pub fn train_from_csv(config: &TrainingConfig) -> Result<TrainingReport, TrainError> {
    let dataset = load_dataset(&config.dataset_path, &config.target_column)?;
    let [negatives, positives] = dataset.class_counts();
    tracing::info!(
        "Loaded {} rows from {} ({} ckd, {} notckd)",
        dataset.len(),
        config.dataset_path.display(),
        positives,
        negatives
    );

    let split = train_test_split(dataset.len(), config.test_fraction, config.forest.seed)
        .map_err(TrainError::Split)?;
    let train = dataset.subset(&split.train);
    let test = dataset.subset(&split.test);

    tracing::info!(
        "Fitting {} trees on {} rows (seed {})",
        config.forest.n_trees,
        train.x.len(),
        config.forest.seed
    );
    let forest = train_random_forest(&train, &config.forest).map_err(TrainError::Fit)?;

    let confusion = evaluate(&forest, &test);
    let test_accuracy = accuracy(&confusion);
    tracing::info!("Held-out accuracy {:.4} on {} rows", test_accuracy, test.x.len());

    let summary = TrainingSummary {
        dataset: dataset_label(config),
        train_rows: train.x.len(),
        test_rows: test.x.len(),
        test_accuracy,
        seed: config.forest.seed,
        trained_at: now_rfc3339(),
    };
    let classes = forest.classes.clone();
    let artifact = ModelArtifact::new(forest, &config.target_column, summary);
    artifact.save(&config.model_out, config.compression_level)?;

    Ok(TrainingReport {
        model_path: config.model_out.clone(),
        classes,
        train_rows: train.x.len(),
        test_rows: test.x.len(),
        test_accuracy,
        per_class: precision_recall_by_class(&confusion),
        confusion,
    })
}

/// Confusion matrix of `forest` over an encoded dataset.
pub fn evaluate(forest: &RandomForestModel, dataset: &TrainDataset) -> ConfusionMatrix {
    let mut cm = ConfusionMatrix::new(forest.classes.len());
    for (row, &truth) in dataset.x.iter().zip(dataset.y.iter()) {
        cm.add(truth, forest.predict_class_index(row));
    }
    cm
}

/// Re-split `dataset` exactly as a training run with `config` would and return
/// the held-out rows.
pub fn held_out_rows(
    dataset: &LabeledDataset,
    config: &TrainingConfig,
) -> Result<TrainDataset, TrainError> {
    let split = train_test_split(dataset.len(), config.test_fraction, config.forest.seed)
        .map_err(TrainError::Split)?;
    Ok(dataset.subset(&split.test))
}

fn dataset_label(config: &TrainingConfig) -> String {
    config
        .dataset_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| config.dataset_path.display().to_string())
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_settings_uses_training_section() {
        let mut settings = AppSettings::default();
        settings.training.trees = 12;
        settings.training.max_depth = Some(4);
        settings.training.seed = 7;
        let config = TrainingConfig::from(&settings);
        assert_eq!(config.forest.n_trees, 12);
        assert_eq!(config.forest.max_depth, Some(4));
        assert_eq!(config.forest.seed, 7);
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.model_out, PathBuf::from("best_model.json.gz"));
        assert_eq!(config.target_column, "class");
    }

    #[test]
    fn missing_dataset_fails_before_training() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = AppSettings::default();
        settings.dataset_path = dir.path().join("absent.csv");
        settings.model_path = dir.path().join("model.json.gz");
        let err = train_from_csv(&TrainingConfig::from(&settings)).unwrap_err();
        assert!(matches!(err, TrainError::Dataset(DatasetLoadError::Open { .. })));
        assert!(!settings.model_path.exists());
    }
}
