//! Machine learning building blocks for the trainer and the predictor.

pub mod forest;
pub mod metrics;
pub mod split;
