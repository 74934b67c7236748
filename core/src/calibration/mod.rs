pub mod model;
pub mod run;

pub use model::{CalibrationModel, CalibrationParams};
pub use run::{CalibrationProgress, CalibrationRun};
