//! Library exports for the predictor UI, the CLIs, benchmarks and tests.
/// Application directory resolution.
pub mod app_dirs;
/// Model artifact persistence.
pub mod artifact;
/// Persisted application settings.
pub mod config;
/// CSV dataset loading.
pub mod dataset;
/// Shared egui UI modules.
pub mod egui_app;
/// Feature schema and patient records.
pub mod features;
/// Logging setup.
pub mod logging;
/// Classifier training and evaluation.
pub mod ml;
/// Inference over patient records.
pub mod predictor;
/// Trainer pipeline.
pub mod training;
