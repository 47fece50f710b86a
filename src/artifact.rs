//! Model artifact: a fitted forest plus the schema it was trained against.
//!
//! The file is gzip-compressed JSON. Loading checks the format version, the
//! feature schema and the forest structure before a model is handed out.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::FeatureSchema;
use crate::ml::forest::RandomForestModel;

/// Current artifact file format.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to read model artifact {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write model artifact {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Model artifact {path} is not valid: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to encode model artifact: {0}")]
    Encode(serde_json::Error),
    #[error("Model artifact {path} has format version {found}, expected {expected}")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
    #[error("Model artifact {path} was trained on a different feature schema: {reason}")]
    SchemaMismatch { path: PathBuf, reason: String },
    #[error("Model artifact {path} contains an invalid model: {reason}")]
    InvalidModel { path: PathBuf, reason: String },
}

/// Facts about the training run, kept for display and auditing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    /// Dataset file name the model was fitted from.
    pub dataset: String,
    pub train_rows: usize,
    pub test_rows: usize,
    pub test_accuracy: f32,
    pub seed: u64,
    /// RFC 3339 timestamp of the training run.
    pub trained_at: String,
}

/// Everything the predictor needs, persisted as one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub schema: FeatureSchema,
    pub target_column: String,
    pub forest: RandomForestModel,
    pub training: TrainingSummary,
}

impl ModelArtifact {
    pub fn new(forest: RandomForestModel, target_column: &str, training: TrainingSummary) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            schema: FeatureSchema::current(),
            target_column: target_column.to_string(),
            forest,
            training,
        }
    }

    /// Write the artifact to `path`, replacing any existing file.
    ///
    /// Data goes to a sibling temp file first and is renamed into place, so a
    /// failed write leaves the previous artifact intact.
    pub fn save(&self, path: &Path, compression_level: u32) -> Result<(), ArtifactError> {
        let write_error = |source| ArtifactError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        let json = serde_json::to_vec(self).map_err(ArtifactError::Encode)?;

        let tmp_path = temp_path_for(path);
        let file = File::create(&tmp_path).map_err(write_error)?;
        let mut encoder = GzEncoder::new(
            BufWriter::new(file),
            Compression::new(compression_level.min(9)),
        );
        let written = encoder
            .write_all(&json)
            .and_then(|()| encoder.finish())
            .and_then(|mut writer| writer.flush());
        if let Err(source) = written {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(write_error(source));
        }
        std::fs::rename(&tmp_path, path).map_err(write_error)?;
        tracing::info!(
            "Saved model artifact to {} ({} trees)",
            path.display(),
            self.forest.trees.len()
        );
        Ok(())
    }

    /// Read and validate an artifact.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let file = File::open(path).map_err(|source| ArtifactError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let decoder = GzDecoder::new(BufReader::new(file));
        let artifact: Self =
            serde_json::from_reader(decoder).map_err(|source| ArtifactError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        artifact.validate(path)?;
        tracing::info!(
            "Loaded model artifact {} ({} trees, trained {})",
            path.display(),
            artifact.forest.trees.len(),
            artifact.training.trained_at
        );
        Ok(artifact)
    }

    fn validate(&self, path: &Path) -> Result<(), ArtifactError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                path: path.to_path_buf(),
                found: self.format_version,
                expected: ARTIFACT_FORMAT_VERSION,
            });
        }
        self.schema
            .check(&FeatureSchema::current())
            .map_err(|reason| ArtifactError::SchemaMismatch {
                path: path.to_path_buf(),
                reason,
            })?;
        let invalid = |reason| ArtifactError::InvalidModel {
            path: path.to_path_buf(),
            reason,
        };
        self.forest.validate().map_err(invalid)?;
        if self.forest.feature_len != self.schema.columns.len() {
            return Err(invalid(format!(
                "forest expects {} features but the schema has {}",
                self.forest.feature_len,
                self.schema.columns.len()
            )));
        }
        if self.forest.classes.len() != 2 {
            return Err(invalid(format!(
                "expected a binary classifier, found {} classes",
                self.forest.classes.len()
            )));
        }
        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
