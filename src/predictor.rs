//! Encode-and-predict core used by the form UI and the headless CLI.
//!
//! Holds no UI state: callers pass a [`FeatureRow`] and get a [`Prediction`].

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::artifact::{ArtifactError, ModelArtifact};
use crate::features::FeatureRow;
use crate::ml::forest::most_probable_class;

/// Model class index meaning chronic kidney disease is present.
pub const CKD_PRESENT_CLASS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Diagnosis {
    CkdPresent,
    CkdAbsent,
}

impl Diagnosis {
    /// Model class index for this outcome.
    pub fn class_index(self) -> usize {
        match self {
            Diagnosis::CkdPresent => CKD_PRESENT_CLASS,
            Diagnosis::CkdAbsent => 1 - CKD_PRESENT_CLASS,
        }
    }
}

/// Outcome of one inference call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub diagnosis: Diagnosis,
    /// `[P(class 0), P(class 1)]`.
    pub probabilities: [f32; 2],
}

impl Prediction {
    /// Headline sentence for the outcome.
    pub fn headline(&self) -> &'static str {
        match self.diagnosis {
            Diagnosis::CkdPresent => "The patient is predicted to HAVE CKD.",
            Diagnosis::CkdAbsent => "The patient is predicted NOT to have CKD.",
        }
    }

    /// The raw `[p0, p1]` pair at full precision.
    pub fn probability_line(&self) -> String {
        format!("Prediction probability: {:?}", self.probabilities)
    }

    /// Headline plus the raw probability pair.
    pub fn message(&self) -> String {
        format!("{}\n{}", self.headline(), self.probability_line())
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Loaded model, read-only for the life of the process.
#[derive(Debug, Clone)]
pub struct Predictor {
    artifact: ModelArtifact,
}

impl Predictor {
    /// Wrap an already validated artifact.
    pub fn new(artifact: ModelArtifact) -> Self {
        Self { artifact }
    }

    /// Load and validate the artifact at `path`.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        ModelArtifact::load(path).map(Self::new)
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Predict a diagnosis for one patient.
    pub fn predict(&self, row: &FeatureRow) -> Prediction {
        let features = row.encode();
        let forest = &self.artifact.forest;
        let proba = forest.predict_proba(&features);
        let class = most_probable_class(&proba);
        let diagnosis = if class == CKD_PRESENT_CLASS {
            Diagnosis::CkdPresent
        } else {
            Diagnosis::CkdAbsent
        };
        let prediction = Prediction {
            diagnosis,
            probabilities: [
                proba.first().copied().unwrap_or_default(),
                proba.get(1).copied().unwrap_or_default(),
            ],
        };
        tracing::debug!(
            diagnosis = ?prediction.diagnosis,
            p_ckd = prediction.probabilities[1],
            "Prediction computed"
        );
        prediction
    }
}
