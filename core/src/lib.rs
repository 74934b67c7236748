//! Core of the Arduino radar station.
//!
//! The modules cover the serial telemetry protocol, height calibration, the
//! bounded detection history, scope geometry and the sweep / laser-interlock
//! controller, all tied together by a single-threaded [`session::RadarSession`].

pub mod calibration;
pub mod config;
pub mod control;
pub mod geometry;
pub mod math;
pub mod prelude;
pub mod protocol;
pub mod session;
pub mod telemetry;
pub mod tracking;

pub use config::RadarConfig;
pub use prelude::{CommandSink, DisplaySink, RadarError, RadarResult};
pub use session::{DisplayUpdate, RadarSession, SessionEvent, UiIntent};
