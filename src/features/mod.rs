//! Clinical feature columns and the single encoding shared by training and inference.
//!
//! - [`Feature`] enumerates the 24 model columns in the order the forest sees them.
//! - [`levels`] defines each nominal column's closed level set and integer codes.
//! - [`FeatureRow`] is one patient record; [`FeatureRow::encode`] is the only
//!   path from a record to model input, used by both the dataset loader and the
//!   predictor.
//! - [`FeatureSchema`] is the versioned column layout stored alongside a model.

pub mod levels;
mod row;
mod schema;

pub use levels::{Appetite, Gender, NominalColumn, NominalLevel, Presence, PusCell, YesNo};
pub use row::{CellError, FeatureRow, NominalMut};
pub use schema::{
    ColumnDomain, ColumnSchema, FEATURE_COUNT, Feature, FeatureKind, FeatureSchema, LevelCode,
    NumericRange, SCHEMA_VERSION,
};
