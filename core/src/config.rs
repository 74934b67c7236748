use serde::{Deserialize, Serialize};

/// Distance thresholds in centimetres.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    pub laser_activation_min: f32,
    pub laser_activation_max: f32,
    pub max_detection: f32,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            laser_activation_min: 10.0,
            laser_activation_max: 20.0,
            max_detection: 50.0,
        }
    }
}

/// Scope geometry in screen pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    pub radius: f32,
    pub origin_x: f32,
    pub origin_y: f32,
    /// Needle half-width in radians.
    pub needle_half_width: f32,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            radius: 445.0,
            origin_x: 505.0,
            origin_y: 495.0,
            needle_half_width: 0.05,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub sweep_interval_ms: u64,
    pub laser_hold_ms: u64,
    pub calibration_interval_ms: u64,
    pub calibration_samples: usize,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            sweep_interval_ms: 50,
            laser_hold_ms: 2000,
            calibration_interval_ms: 100,
            calibration_samples: 10,
        }
    }
}

/// Shared configuration for the radar session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    pub ranges: RangeConfig,
    pub scope: ScopeConfig,
    pub timing: TimingConfig,
    pub sweep_step: i32,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            ranges: RangeConfig::default(),
            scope: ScopeConfig::default(),
            timing: TimingConfig::default(),
            sweep_step: 2,
        }
    }
}

impl RadarConfig {
    pub fn in_laser_band(&self, distance: f32) -> bool {
        distance >= self.ranges.laser_activation_min && distance <= self.ranges.laser_activation_max
    }

    pub fn in_detection_range(&self, distance: f32) -> bool {
        distance > 0.0 && distance <= self.ranges.max_detection
    }
}
