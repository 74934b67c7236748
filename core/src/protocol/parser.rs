pub const LASER_ACTIVATED: &str = "LASER_ACTIVATED";
pub const LASER_DEACTIVATED: &str = "LASER_DEACTIVATED";

/// One telemetry reading reported by the sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Servo angle in degrees, 0..=180.
    pub angle: f32,
    /// Range to the nearest echo in cm.
    pub distance: f32,
    /// Uncalibrated height in cm.
    pub raw_height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaserEvent {
    Activated,
    Deactivated,
}

/// Outcome of decoding a single record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedRecord {
    Sample(Sample),
    Laser(LaserEvent),
    /// Wrong shape or unknown token; dropped without touching any state.
    Ignored,
}

/// Decodes one trimmed record.
///
/// A record with exactly three comma-separated fields is a sample. Fields that
/// do not parse as floats read as `0.0` instead of rejecting the record.
pub fn parse_record(line: &str) -> ParsedRecord {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() == 3 {
        return ParsedRecord::Sample(Sample {
            angle: lenient_float(fields[0]),
            distance: lenient_float(fields[1]),
            raw_height: lenient_float(fields[2]),
        });
    }

    match line {
        LASER_ACTIVATED => ParsedRecord::Laser(LaserEvent::Activated),
        LASER_DEACTIVATED => ParsedRecord::Laser(LaserEvent::Deactivated),
        _ => ParsedRecord::Ignored,
    }
}

fn lenient_float(field: &str) -> f32 {
    field.trim().parse::<f32>().unwrap_or(0.0)
}
