use crate::protocol::DeviceCommand;
use crate::session::DisplayUpdate;

/// Common error type for the radar core.
#[derive(thiserror::Error, Debug)]
pub enum RadarError {
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("write rejected: {0}")]
    WriteRejected(String),
    #[error("average measured height is zero, calibration unchanged")]
    CalibrationDivideByZero,
    #[error("a calibration run is already in progress")]
    CalibrationInProgress,
    #[error("calibration rejected: {0}")]
    CalibrationRejected(String),
    #[error("known height {0} cm is outside (0, 1000]")]
    InvalidKnownHeight(f32),
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
}

pub type RadarResult<T> = Result<T, RadarError>;

/// Outbound half of the device connection.
pub trait CommandSink {
    fn write_command(&mut self, command: &DeviceCommand) -> RadarResult<()>;
    fn close(&mut self);
}

/// Rendering collaborator driven by the session. Never read back.
pub trait DisplaySink {
    fn apply(&mut self, update: DisplayUpdate);
}
