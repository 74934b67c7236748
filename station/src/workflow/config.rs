use crate::generator::sensor::SensorProfile;
use anyhow::Context;
use radarcore::RadarConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

pub const ARDUINO_UNO_VENDOR_ID: u16 = 0x2341;
pub const ARDUINO_UNO_PRODUCT_ID: u16 = 0x0043;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    /// Explicit serial port; skips USB discovery when set.
    pub port: Option<String>,
    pub baud_rate: u32,
    pub vendor_id: u16,
    pub product_id: u16,
    /// Replace the serial device with the synthetic sensor.
    pub simulate: bool,
    /// Obstacles and noise for the synthetic sensor.
    pub sensor: SensorProfile,
    /// Address of the HTTP display bridge; `None` disables it.
    pub bridge_address: Option<SocketAddr>,
    pub radar: RadarConfig,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: 115_200,
            vendor_id: ARDUINO_UNO_VENDOR_ID,
            product_id: ARDUINO_UNO_PRODUCT_ID,
            simulate: false,
            sensor: SensorProfile::default(),
            bridge_address: Some(SocketAddr::from(([127, 0, 0, 1], 9000))),
            radar: RadarConfig::default(),
        }
    }
}

impl StationConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading station config {}", path_ref.display()))?;
        let config: StationConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing station config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn sweep_summary(&self) -> String {
        format!(
            "laser band {:.0}-{:.0} cm, detection range {:.0} cm, sweep step {} every {} ms",
            self.radar.ranges.laser_activation_min,
            self.radar.ranges.laser_activation_max,
            self.radar.ranges.max_detection,
            self.radar.sweep_step,
            self.radar.timing.sweep_interval_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_target_arduino_uno() {
        let cfg = StationConfig::default();
        assert_eq!(cfg.baud_rate, 115_200);
        assert_eq!(cfg.vendor_id, 0x2341);
        assert_eq!(cfg.product_id, 0x0043);
        assert!(cfg.port.is_none());
        assert_eq!(cfg.sensor.obstacles.len(), 2);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"port: /dev/ttyACM0\nsimulate: true\nsensor:\n  seed: 7\n  obstacles:\n    - {angle: 90.0, spread: 3.0, distance: 18.0, height: 5.0}\nradar:\n  ranges:\n    max_detection: 80.0\n  timing:\n    laser_hold_ms: 1500\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = StationConfig::load(&path).unwrap();
        assert_eq!(cfg.port.as_deref(), Some("/dev/ttyACM0"));
        assert!(cfg.simulate);
        assert_eq!(cfg.sensor.seed, 7);
        assert_eq!(cfg.sensor.obstacles.len(), 1);
        assert_eq!(cfg.sensor.background_distance, 120.0);
        assert_eq!(cfg.radar.ranges.max_detection, 80.0);
        assert_eq!(cfg.radar.ranges.laser_activation_min, 10.0);
        assert_eq!(cfg.radar.timing.laser_hold_ms, 1500);
        assert_eq!(cfg.baud_rate, 115_200);
    }

    #[test]
    fn config_load_reports_bad_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"baud_rate: fast\n").unwrap();
        let path = temp.into_temp_path();
        let err = StationConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing station config"));
    }
}
