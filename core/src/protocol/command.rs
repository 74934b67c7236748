use std::fmt;

/// Commands understood by the sensor firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    /// Move the servo to an absolute angle in degrees.
    Angle(i32),
    Auto,
    Manual,
    LaserOn,
    LaserOff,
}

impl DeviceCommand {
    /// Builds an angle command, clamping to the servo range.
    pub fn angle(degrees: i32) -> Self {
        DeviceCommand::Angle(degrees.clamp(0, 180))
    }

    /// Newline-terminated ASCII frame.
    pub fn encode(&self) -> Vec<u8> {
        format!("{}\n", self).into_bytes()
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeviceCommand::Angle(degrees) => write!(f, "{}", degrees),
            DeviceCommand::Auto => write!(f, "AUTO"),
            DeviceCommand::Manual => write!(f, "MANUAL"),
            DeviceCommand::LaserOn => write!(f, "LASER_ON"),
            DeviceCommand::LaserOff => write!(f, "LASER_OFF"),
        }
    }
}
