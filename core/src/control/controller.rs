use crate::config::RadarConfig;
use crate::control::state::{step_sweep, LaserState, Mode, SweepState};
use crate::control::timers::{TimerCommand, TimerId};
use crate::protocol::DeviceCommand;
use crate::session::DisplayUpdate;
use crate::telemetry::log::LogManager;
use std::time::Duration;

/// Inputs to the sweep / laser-interlock state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    UserSetAngle(i32),
    UserToggleAuto,
    DeviceLaserActivated,
    DeviceLaserDeactivated,
    /// A sample landed inside the laser activation band.
    ProximityDetected,
    SweepTick,
    LaserHoldExpired,
    ResumeTick,
}

/// Side effects requested by a transition, executed in order by the session.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEffect {
    Send(DeviceCommand),
    Timer(TimerCommand),
    Display(DisplayUpdate),
    /// Handle this event right after the current one, before any other input.
    Defer(ControlEvent),
}

pub struct SweepController {
    state: SweepState,
    cadence_running: bool,
    sweep_step: i32,
    sweep_interval: Duration,
    laser_hold: Duration,
    logger: LogManager,
}

impl SweepController {
    pub fn new(config: &RadarConfig) -> Self {
        Self {
            state: SweepState::default(),
            cadence_running: false,
            sweep_step: config.sweep_step.max(1),
            sweep_interval: Duration::from_millis(config.timing.sweep_interval_ms.max(1)),
            laser_hold: Duration::from_millis(config.timing.laser_hold_ms),
            logger: LogManager::scoped("sweep"),
        }
    }

    pub fn state(&self) -> &SweepState {
        &self.state
    }

    pub fn handle(&mut self, event: ControlEvent) -> Vec<ControlEffect> {
        let mut effects = Vec::new();
        match event {
            ControlEvent::UserToggleAuto => self.toggle_mode(&mut effects),
            ControlEvent::UserSetAngle(angle) => self.set_manual_angle(angle, &mut effects),
            ControlEvent::DeviceLaserActivated => self.activate_laser(&mut effects),
            ControlEvent::ProximityDetected => {
                if self.state.laser == LaserState::Inactive {
                    self.logger.record("object inside laser band, activating laser");
                    self.activate_laser(&mut effects);
                    effects.push(ControlEffect::Send(DeviceCommand::LaserOn));
                }
            }
            ControlEvent::LaserHoldExpired => self.expire_hold(&mut effects),
            ControlEvent::DeviceLaserDeactivated => {
                self.state.laser = LaserState::Inactive;
                effects.push(ControlEffect::Display(DisplayUpdate::LaserStatus(
                    LaserState::Inactive,
                )));
                effects.push(ControlEffect::Timer(TimerCommand::Cancel(TimerId::LaserHold)));
            }
            ControlEvent::ResumeTick => {
                self.state.pending_resume = false;
                let command = match self.state.mode {
                    Mode::Auto => DeviceCommand::Auto,
                    Mode::Manual => DeviceCommand::Manual,
                };
                effects.push(ControlEffect::Send(command));
            }
            ControlEvent::SweepTick => self.advance_sweep(&mut effects),
        }
        self.reconcile_cadence(&mut effects);
        effects
    }

    fn toggle_mode(&mut self, effects: &mut Vec<ControlEffect>) {
        self.state.mode = match self.state.mode {
            Mode::Manual => Mode::Auto,
            Mode::Auto => Mode::Manual,
        };
        let auto = self.state.mode == Mode::Auto;
        self.logger
            .record(&format!("mode switched to {:?}", self.state.mode));

        effects.push(ControlEffect::Display(DisplayUpdate::ModeButton(
            self.state.mode,
        )));
        effects.push(ControlEffect::Display(DisplayUpdate::ManualControls(!auto)));
        effects.push(ControlEffect::Send(if auto {
            DeviceCommand::Auto
        } else {
            DeviceCommand::Manual
        }));
    }

    fn set_manual_angle(&mut self, angle: i32, effects: &mut Vec<ControlEffect>) {
        if !self.state.accepts_manual_angle() {
            self.logger.debug(&format!(
                "angle {} ignored in {:?} / {:?}",
                angle, self.state.mode, self.state.laser
            ));
            return;
        }
        let command = DeviceCommand::angle(angle);
        if let DeviceCommand::Angle(clamped) = command {
            effects.push(ControlEffect::Send(command));
            effects.push(ControlEffect::Display(DisplayUpdate::SliderValue(clamped)));
        }
    }

    fn activate_laser(&mut self, effects: &mut Vec<ControlEffect>) {
        self.state.laser = LaserState::Active;
        effects.push(ControlEffect::Display(DisplayUpdate::LaserStatus(
            LaserState::Active,
        )));
        effects.push(ControlEffect::Timer(TimerCommand::Start {
            id: TimerId::LaserHold,
            delay: self.laser_hold,
            periodic: false,
        }));
    }

    fn expire_hold(&mut self, effects: &mut Vec<ControlEffect>) {
        if self.state.laser == LaserState::Inactive {
            return;
        }
        self.state.laser = LaserState::Inactive;
        self.state.pending_resume = true;
        effects.push(ControlEffect::Display(DisplayUpdate::LaserStatus(
            LaserState::Inactive,
        )));
        effects.push(ControlEffect::Send(DeviceCommand::LaserOff));
        effects.push(ControlEffect::Defer(ControlEvent::ResumeTick));
    }

    fn advance_sweep(&mut self, effects: &mut Vec<ControlEffect>) {
        if !self.state.sweeping() {
            return;
        }
        let (angle, direction) = step_sweep(
            self.state.sweep_angle,
            self.state.sweep_direction,
            self.sweep_step,
        );
        self.state.sweep_angle = angle;
        self.state.sweep_direction = direction;
        effects.push(ControlEffect::Send(DeviceCommand::Angle(angle)));
        effects.push(ControlEffect::Display(DisplayUpdate::SliderValue(angle)));
    }

    /// Keeps the cadence timer armed exactly while `Auto` and the laser is off.
    fn reconcile_cadence(&mut self, effects: &mut Vec<ControlEffect>) {
        let wanted = self.state.sweeping();
        if wanted == self.cadence_running {
            return;
        }
        self.cadence_running = wanted;
        effects.push(ControlEffect::Timer(if wanted {
            TimerCommand::Start {
                id: TimerId::Sweep,
                delay: self.sweep_interval,
                periodic: true,
            }
        } else {
            TimerCommand::Cancel(TimerId::Sweep)
        }));
    }
}
