use crate::config::RadarConfig;
use crate::tracking::DetectionPoint;
use serde::{Deserialize, Serialize};

/// Scope needle: tip at `angle + half_width`, apex at the origin, tip at
/// `angle - half_width`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeedlePolygon {
    pub vertices: [DetectionPoint; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Scope position of the echo.
    pub point: DetectionPoint,
    pub needle: NeedlePolygon,
    /// Sensor-frame position in cm (x across, y forward, z up) for the 3D view.
    pub spatial: [f32; 3],
}

/// Maps polar sensor readings onto the half-disc scope.
#[derive(Debug, Clone)]
pub struct PolarProjector {
    radius: f32,
    origin: DetectionPoint,
    half_width: f32,
    max_range: f32,
}

impl PolarProjector {
    pub fn new(config: &RadarConfig) -> Self {
        Self {
            radius: config.scope.radius,
            origin: DetectionPoint {
                x: config.scope.origin_x,
                y: config.scope.origin_y,
            },
            half_width: config.scope.needle_half_width,
            max_range: config.ranges.max_detection,
        }
    }

    pub fn project(&self, angle_deg: f32, distance_cm: f32, height_cm: f32) -> Projection {
        let theta = angle_deg.to_radians();
        Projection {
            point: self.point(angle_deg, distance_cm),
            needle: self.needle(angle_deg),
            spatial: [
                distance_cm * theta.cos(),
                distance_cm * theta.sin(),
                height_cm,
            ],
        }
    }

    /// Scales `distance_cm` against the detection range; screen Y grows downward.
    pub fn point(&self, angle_deg: f32, distance_cm: f32) -> DetectionPoint {
        let scaled = distance_cm / self.max_range * self.radius;
        self.polar(angle_deg.to_radians(), scaled)
    }

    pub fn needle(&self, angle_deg: f32) -> NeedlePolygon {
        let theta = angle_deg.to_radians();
        NeedlePolygon {
            vertices: [
                self.polar(theta + self.half_width, self.radius),
                self.origin,
                self.polar(theta - self.half_width, self.radius),
            ],
        }
    }

    fn polar(&self, theta: f32, length: f32) -> DetectionPoint {
        DetectionPoint {
            x: self.origin.x + length * theta.cos(),
            y: self.origin.y - length * theta.sin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn max_range_at_ninety_degrees_is_straight_up() {
        let cfg = RadarConfig::default();
        let projector = PolarProjector::new(&cfg);
        let projection = projector.project(90.0, cfg.ranges.max_detection, 0.0);
        assert!(close(projection.point.x, cfg.scope.origin_x));
        assert!(close(projection.point.y, cfg.scope.origin_y - cfg.scope.radius));
    }

    #[test]
    fn zero_degrees_points_right() {
        let cfg = RadarConfig::default();
        let projector = PolarProjector::new(&cfg);
        let point = projector.point(0.0, cfg.ranges.max_detection / 2.0);
        assert!(close(point.x, cfg.scope.origin_x + cfg.scope.radius / 2.0));
        assert!(close(point.y, cfg.scope.origin_y));
    }

    #[test]
    fn needle_is_isoceles_around_angle() {
        let cfg = RadarConfig::default();
        let projector = PolarProjector::new(&cfg);
        let needle = projector.needle(45.0);
        let [upper, apex, lower] = needle.vertices;
        assert_eq!(apex, DetectionPoint { x: 505.0, y: 495.0 });

        let len = |p: DetectionPoint| ((p.x - apex.x).powi(2) + (p.y - apex.y).powi(2)).sqrt();
        assert!(close(len(upper), cfg.scope.radius));
        assert!(close(len(lower), cfg.scope.radius));
        // Upper tip sits at the larger angle, i.e. higher on screen.
        assert!(upper.y < lower.y);
    }

    #[test]
    fn spatial_point_carries_height() {
        let projector = PolarProjector::new(&RadarConfig::default());
        let projection = projector.project(0.0, 30.0, 12.0);
        assert!(close(projection.spatial[0], 30.0));
        assert!(close(projection.spatial[1], 0.0));
        assert_eq!(projection.spatial[2], 12.0);
    }
}
