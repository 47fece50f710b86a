//! CSV dataset loader for the trainer.

use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::features::{CellError, FEATURE_COUNT, Feature, FeatureRow};
use crate::ml::forest::TrainDataset;

/// Target column name used when none is configured.
pub const DEFAULT_TARGET_COLUMN: &str = "class";

/// Class names by class index. Index 1 is the disease-present class.
pub const CLASS_LABELS: [&str; 2] = ["notckd", "ckd"];

#[derive(Debug, Error)]
pub enum DatasetLoadError {
    #[error("Failed to open dataset {path}: {source}")]
    Open { path: PathBuf, source: csv::Error },
    #[error("Failed to read dataset {path}: {source}")]
    Read { path: PathBuf, source: csv::Error },
    #[error("Dataset {path} is missing feature column `{column}`")]
    MissingFeatureColumn { path: PathBuf, column: &'static str },
    #[error("Dataset {path} is missing target column `{column}`")]
    MissingTargetColumn { path: PathBuf, column: String },
    #[error("Dataset {path}, line {line}, column `{column}`: {source}")]
    BadCell {
        path: PathBuf,
        line: u64,
        column: &'static str,
        source: CellError,
    },
    #[error("Dataset {path}, line {line}: target `{value}` is not one of 0, 1, notckd, ckd")]
    BadTarget {
        path: PathBuf,
        line: u64,
        value: String,
    },
    #[error("Dataset {path} contains no rows")]
    Empty { path: PathBuf },
}

/// Patient records with their class indices, in file order.
#[derive(Debug, Clone)]
pub struct LabeledDataset {
    pub records: Vec<FeatureRow>,
    pub labels: Vec<usize>,
}

impl LabeledDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of rows per class index.
    pub fn class_counts(&self) -> [usize; 2] {
        let mut counts = [0usize; 2];
        for &label in &self.labels {
            counts[label] += 1;
        }
        counts
    }

    /// Encoded training view restricted to `indices`.
    pub fn subset(&self, indices: &[usize]) -> TrainDataset {
        TrainDataset {
            feature_len: FEATURE_COUNT,
            classes: CLASS_LABELS.iter().map(|name| name.to_string()).collect(),
            x: indices
                .iter()
                .map(|&idx| self.records[idx].encode().to_vec())
                .collect(),
            y: indices.iter().map(|&idx| self.labels[idx]).collect(),
        }
    }
}

/// Load and encode a dataset CSV.
///
/// Columns are matched by header name, so file column order does not matter and
/// extra columns are ignored.
pub fn load_dataset(path: &Path, target_column: &str) -> Result<LabeledDataset, DatasetLoadError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| DatasetLoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    read_dataset(reader, path, target_column)
}

/// Parse a dataset from an already opened CSV reader; `path` is used in errors.
pub fn read_dataset<R: Read>(
    mut reader: csv::Reader<R>,
    path: &Path,
    target_column: &str,
) -> Result<LabeledDataset, DatasetLoadError> {
    let read_error = |source| DatasetLoadError::Read {
        path: path.to_path_buf(),
        source,
    };
    let headers = reader.headers().map_err(read_error)?.clone();
    let column_of = |name: &str| headers.iter().position(|header| header.trim() == name);

    let mut feature_columns = [0usize; FEATURE_COUNT];
    for feature in Feature::ALL {
        feature_columns[feature.index()] =
            column_of(feature.column_name()).ok_or_else(|| {
                DatasetLoadError::MissingFeatureColumn {
                    path: path.to_path_buf(),
                    column: feature.column_name(),
                }
            })?;
    }
    let target_idx =
        column_of(target_column).ok_or_else(|| DatasetLoadError::MissingTargetColumn {
            path: path.to_path_buf(),
            column: target_column.to_string(),
        })?;

    let mut records = Vec::new();
    let mut labels = Vec::new();
    for result in reader.records() {
        let record = result.map_err(read_error)?;
        let line = record.position().map(|pos| pos.line()).unwrap_or(0);
        let mut row = FeatureRow::default();
        for feature in Feature::ALL {
            let raw = record.get(feature_columns[feature.index()]).unwrap_or("");
            row.set_from_str(feature, raw)
                .map_err(|source| DatasetLoadError::BadCell {
                    path: path.to_path_buf(),
                    line,
                    column: feature.column_name(),
                    source,
                })?;
        }
        let raw_target = record.get(target_idx).unwrap_or("");
        let label = parse_target(raw_target).ok_or_else(|| DatasetLoadError::BadTarget {
            path: path.to_path_buf(),
            line,
            value: raw_target.to_string(),
        })?;
        records.push(row);
        labels.push(label);
    }

    if records.is_empty() {
        return Err(DatasetLoadError::Empty {
            path: path.to_path_buf(),
        });
    }
    tracing::debug!(rows = records.len(), path = %path.display(), "Dataset parsed");
    Ok(LabeledDataset { records, labels })
}

fn parse_target(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    match raw {
        "0" => return Some(0),
        "1" => return Some(1),
        _ => {}
    }
    CLASS_LABELS
        .iter()
        .position(|label| label.eq_ignore_ascii_case(raw))
}
