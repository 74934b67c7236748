pub mod controller;
pub mod state;
pub mod timers;

pub use controller::{ControlEffect, ControlEvent, SweepController};
pub use state::{step_sweep, LaserState, Mode, SweepDirection, SweepState};
pub use timers::{TimerCommand, TimerId, TimerSchedule};
