//! TOML settings shared by the trainer and the predictor.
//!
//! Config keys: `model_path`, `dataset_path`, `target_column`, and under
//! `[training]`: `trees`, `max_depth`, `test_fraction`, `seed`,
//! `compression_level`. Relative paths resolve against the working directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs::{self, AppDirError};
use crate::dataset::DEFAULT_TARGET_COLUMN;

/// Name of the settings file inside the app directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors that may occur while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The app directory could not be resolved or created.
    #[error(transparent)]
    AppDir(#[from] AppDirError),
    /// Failed to read a config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse TOML config.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Model artifact written by the trainer and read by the predictor.
    pub model_path: PathBuf,
    /// Dataset CSV used by the trainer.
    pub dataset_path: PathBuf,
    /// Name of the binary label column in the dataset.
    pub target_column: String,
    pub training: TrainingSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("best_model.json.gz"),
            dataset_path: PathBuf::from("ckd_dataset.csv"),
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            training: TrainingSettings::default(),
        }
    }
}

impl AppSettings {
    pub(crate) fn normalized(mut self) -> Self {
        self.training = self.training.normalized();
        if self.target_column.trim().is_empty() {
            self.target_column = DEFAULT_TARGET_COLUMN.to_string();
        }
        self
    }
}

/// Trainer hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSettings {
    pub trees: usize,
    /// Depth limit per tree; absent means unlimited.
    pub max_depth: Option<usize>,
    /// Share of rows held out for evaluation.
    pub test_fraction: f32,
    pub seed: u64,
    /// Gzip level for the artifact, `0..=9`.
    pub compression_level: u32,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            trees: 100,
            max_depth: None,
            test_fraction: 0.2,
            seed: 42,
            compression_level: 3,
        }
    }
}

impl TrainingSettings {
    fn normalized(mut self) -> Self {
        let defaults = Self::default();
        self.trees = self.trees.max(1);
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            tracing::warn!(
                "Ignoring test_fraction {}; using {}",
                self.test_fraction,
                defaults.test_fraction
            );
            self.test_fraction = defaults.test_fraction;
        }
        self.compression_level = self.compression_level.min(9);
        self
    }
}

/// Resolve the settings file path inside the app directory.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(app_dirs::app_root_dir()?.join(CONFIG_FILE_NAME))
}

/// Load settings from the app directory, returning defaults if the file is missing.
pub fn load_or_default() -> Result<AppSettings, ConfigError> {
    let path = config_path()?;
    load_settings_from(&path)
}

/// Load settings from `path`, returning defaults if the file is missing.
pub fn load_settings_from(path: &Path) -> Result<AppSettings, ConfigError> {
    if !path.exists() {
        tracing::debug!("No config at {}; using defaults", path.display());
        return Ok(AppSettings::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: AppSettings = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(settings.normalized())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_dirs::test_support::OverrideGuard;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let settings = load_settings_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.training.trees, 100);
        assert_eq!(settings.training.seed, 42);
        assert_eq!(settings.target_column, "class");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "model_path = \"models/ckd.json.gz\"\n\n[training]\ntrees = 25\nmax_depth = 8\n",
        )
        .unwrap();
        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.model_path, PathBuf::from("models/ckd.json.gz"));
        assert_eq!(settings.training.trees, 25);
        assert_eq!(settings.training.max_depth, Some(8));
        assert_eq!(settings.training.test_fraction, 0.2);
        assert_eq!(settings.dataset_path, PathBuf::from("ckd_dataset.csv"));
    }

    #[test]
    fn out_of_range_values_are_normalized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "target_column = \" \"\n[training]\ntrees = 0\ntest_fraction = 1.5\ncompression_level = 12\n",
        )
        .unwrap();
        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.training.trees, 1);
        assert_eq!(settings.training.test_fraction, 0.2);
        assert_eq!(settings.training.compression_level, 9);
        assert_eq!(settings.target_column, "class");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[training\ntrees = ").unwrap();
        assert!(matches!(
            load_settings_from(&path),
            Err(ConfigError::ParseToml { .. })
        ));
    }

    #[test]
    fn load_or_default_reads_from_app_dir() {
        let base = tempdir().unwrap();
        let _guard = OverrideGuard::set(base.path().to_path_buf());
        let path = config_path().unwrap();
        assert_eq!(path, base.path().join(app_dirs::APP_DIR_NAME).join(CONFIG_FILE_NAME));
        std::fs::write(&path, "target_column = \"diagnosis\"\n").unwrap();
        let settings = load_or_default().unwrap();
        assert_eq!(settings.target_column, "diagnosis");
    }
}
