//! Desktop form for single-patient predictions.

pub mod controller;
mod form;
mod style;
pub mod ui;

pub use controller::FormController;
pub use ui::{EguiApp, MIN_VIEWPORT_SIZE};
