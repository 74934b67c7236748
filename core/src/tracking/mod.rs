pub mod history;
pub mod status;

pub use history::{DetectionHistory, DetectionPoint, HISTORY_CAPACITY};
pub use status::DetectionStatus;
