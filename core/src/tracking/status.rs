use crate::config::RadarConfig;

/// Distance band reported on the status readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionStatus {
    /// Inside the laser activation band.
    LaserRange,
    /// Beyond the laser band but within detection range.
    Detected,
    NoObject,
}

impl DetectionStatus {
    pub fn classify(distance: f32, config: &RadarConfig) -> Self {
        if config.in_laser_band(distance) {
            DetectionStatus::LaserRange
        } else if distance > config.ranges.laser_activation_max
            && distance <= config.ranges.max_detection
        {
            DetectionStatus::Detected
        } else {
            DetectionStatus::NoObject
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DetectionStatus::LaserRange => "Object Detected (Laser Range)",
            DetectionStatus::Detected => "Object Detected",
            DetectionStatus::NoObject => "No Object",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            DetectionStatus::LaserRange => "red",
            DetectionStatus::Detected => "orange",
            DetectionStatus::NoObject => "green",
        }
    }
}
