use crate::calibration::model::CalibrationParams;
use crate::math::stats::StatsHelper;
use crate::prelude::{RadarError, RadarResult};

pub const MAX_KNOWN_HEIGHT: f32 = 1000.0;

/// Guided averaging run that derives a new height factor.
///
/// The run only accumulates readings; it never touches the active params.
#[derive(Debug, Clone)]
pub struct CalibrationRun {
    known_height: f32,
    target_samples: usize,
    readings: Vec<f32>,
}

#[derive(Debug)]
pub enum CalibrationProgress {
    Collecting { collected: usize, target: usize },
    Finished(RadarResult<CalibrationParams>),
}

impl CalibrationRun {
    pub fn new(known_height: f32, target_samples: usize) -> RadarResult<Self> {
        if !(known_height > 0.0 && known_height <= MAX_KNOWN_HEIGHT) {
            return Err(RadarError::InvalidKnownHeight(known_height));
        }
        let target_samples = target_samples.max(1);
        Ok(Self {
            known_height,
            target_samples,
            readings: Vec::with_capacity(target_samples),
        })
    }

    pub fn record(&mut self, reading: f32) -> CalibrationProgress {
        self.readings.push(reading);
        if self.readings.len() < self.target_samples {
            return CalibrationProgress::Collecting {
                collected: self.readings.len(),
                target: self.target_samples,
            };
        }
        CalibrationProgress::Finished(self.solve())
    }

    fn solve(&self) -> RadarResult<CalibrationParams> {
        let average = StatsHelper::mean(&self.readings);
        if average == 0.0 {
            return Err(RadarError::CalibrationDivideByZero);
        }

        let factor = self.known_height / average;
        if !factor.is_finite() || factor <= 0.0 {
            return Err(RadarError::CalibrationRejected(format!(
                "factor {} from average height {:.2} cm is not positive",
                factor, average
            )));
        }

        // Only the factor is solved; the offset stays at zero.
        Ok(CalibrationParams {
            factor,
            offset: 0.0,
        })
    }
}
