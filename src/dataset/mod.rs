//! Training dataset input.

pub mod loader;

pub use loader::{
    CLASS_LABELS, DEFAULT_TARGET_COLUMN, DatasetLoadError, LabeledDataset, load_dataset,
    read_dataset,
};
