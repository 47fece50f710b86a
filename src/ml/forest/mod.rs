//! Random forest classifier.
//!
//! Trees are plain CART classifiers grown on bootstrap samples with a random
//! feature subset per split; the forest averages their leaf class frequencies.
//! Training is deterministic for a given seed and the fitted model serializes
//! with serde.

mod model;
mod train;

pub(crate) use model::most_probable_class;
pub use model::{DecisionTree, FOREST_MODEL_VERSION, RandomForestModel, TreeNode};
pub use train::{MaxFeatures, TrainDataset, TrainOptions, train_random_forest};
