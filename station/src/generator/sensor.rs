use radarcore::protocol::parser::{LASER_ACTIVATED, LASER_DEACTIVATED};
use radarcore::protocol::DeviceCommand;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Object placed in front of the synthetic sensor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Obstacle {
    pub angle: f32,
    /// Angular half-width in degrees.
    pub spread: f32,
    pub distance: f32,
    pub height: f32,
}

/// Configuration for the synthetic sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorProfile {
    pub seed: u64,
    pub obstacles: Vec<Obstacle>,
    /// Reported distance when nothing is in the beam.
    pub background_distance: f32,
    pub noise: f32,
}

impl Default for SensorProfile {
    fn default() -> Self {
        Self {
            seed: 0,
            obstacles: vec![
                Obstacle {
                    angle: 40.0,
                    spread: 6.0,
                    distance: 35.0,
                    height: 12.0,
                },
                Obstacle {
                    angle: 120.0,
                    spread: 4.0,
                    distance: 15.0,
                    height: 8.0,
                },
            ],
            background_distance: 120.0,
            noise: 0.4,
        }
    }
}

/// Stand-in for the Arduino firmware: follows servo commands and reports
/// readings in the device's line format.
pub struct SyntheticSensor {
    profile: SensorProfile,
    rng: StdRng,
    angle: i32,
    laser_on: bool,
    pending: Vec<String>,
}

impl SyntheticSensor {
    pub fn new(profile: SensorProfile) -> Self {
        let rng = StdRng::seed_from_u64(profile.seed);
        Self {
            profile,
            rng,
            angle: 0,
            laser_on: false,
            pending: Vec::new(),
        }
    }

    pub fn angle(&self) -> i32 {
        self.angle
    }

    pub fn laser_on(&self) -> bool {
        self.laser_on
    }

    pub fn accept(&mut self, command: &DeviceCommand) {
        match command {
            DeviceCommand::Angle(angle) => self.angle = (*angle).clamp(0, 180),
            // The host drives the sweep; mode changes need no echo.
            DeviceCommand::Auto | DeviceCommand::Manual => {}
            DeviceCommand::LaserOn => {
                if !self.laser_on {
                    self.laser_on = true;
                    self.pending.push(LASER_ACTIVATED.to_string());
                }
            }
            DeviceCommand::LaserOff => {
                if self.laser_on {
                    self.laser_on = false;
                    self.pending.push(LASER_DEACTIVATED.to_string());
                }
            }
        }
    }

    /// Queued status lines followed by one reading at the current angle.
    pub fn emit(&mut self) -> String {
        let mut out = String::new();
        for line in self.pending.drain(..) {
            out.push_str(&line);
            out.push('\n');
        }
        let (distance, height) = self.measure();
        out.push_str(&format!("{},{:.1},{:.1}\n", self.angle, distance, height));
        out
    }

    fn measure(&mut self) -> (f32, f32) {
        let angle = self.angle as f32;
        let hit = self
            .profile
            .obstacles
            .iter()
            .filter(|obstacle| (obstacle.angle - angle).abs() <= obstacle.spread)
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
            .copied();

        let noise = self.profile.noise.abs();
        let jitter = if noise > 0.0 {
            self.rng.gen_range(-noise..noise)
        } else {
            0.0
        };
        match hit {
            Some(obstacle) => ((obstacle.distance + jitter).max(0.0), obstacle.height + jitter),
            None => (self.profile.background_distance + jitter, 0.0),
        }
    }
}
