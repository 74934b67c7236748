use crate::calibration::run::{CalibrationProgress, CalibrationRun};
use crate::prelude::{RadarError, RadarResult};
use crate::telemetry::log::LogManager;

/// Affine correction applied to raw height readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationParams {
    pub factor: f32,
    pub offset: f32,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            factor: 1.0,
            offset: 0.0,
        }
    }
}

/// Holds the active params and at most one calibration run.
pub struct CalibrationModel {
    params: CalibrationParams,
    run: Option<CalibrationRun>,
    logger: LogManager,
}

impl CalibrationModel {
    pub fn new() -> Self {
        Self::with_params(CalibrationParams::default())
    }

    pub fn with_params(params: CalibrationParams) -> Self {
        Self {
            params,
            run: None,
            logger: LogManager::scoped("calibration"),
        }
    }

    pub fn apply(&self, raw_height: f32) -> f32 {
        raw_height * self.params.factor + self.params.offset
    }

    pub fn params(&self) -> CalibrationParams {
        self.params
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Starts a run. Fails if one is already collecting.
    pub fn begin(&mut self, known_height: f32, samples: usize) -> RadarResult<()> {
        if self.run.is_some() {
            return Err(RadarError::CalibrationInProgress);
        }
        self.run = Some(CalibrationRun::new(known_height, samples)?);
        self.logger.record(&format!(
            "calibration started against {:.2} cm over {} samples",
            known_height, samples
        ));
        Ok(())
    }

    /// Feeds one reading into the active run.
    ///
    /// Returns `None` while collecting or when no run is active. On completion
    /// the new params are committed in one step; on failure they are untouched.
    pub fn record(&mut self, reading: f32) -> Option<RadarResult<CalibrationParams>> {
        let run = self.run.as_mut()?;
        match run.record(reading) {
            CalibrationProgress::Collecting { collected, target } => {
                self.logger
                    .debug(&format!("calibration sample {}/{}: {:.2}", collected, target, reading));
                None
            }
            CalibrationProgress::Finished(result) => {
                self.run = None;
                match &result {
                    Ok(params) => {
                        self.params = *params;
                        self.logger.record(&format!(
                            "calibration committed: factor {:.4}, offset {:.2}",
                            params.factor, params.offset
                        ));
                    }
                    Err(err) => self.logger.warn(&format!("calibration failed: {}", err)),
                }
                Some(result)
            }
        }
    }

    pub fn cancel(&mut self) -> bool {
        self.run.take().is_some()
    }
}

impl Default for CalibrationModel {
    fn default() -> Self {
        Self::new()
    }
}
