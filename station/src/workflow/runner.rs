use crate::generator::sensor::SyntheticSensor;
use crate::gui_bridge::bridge::GuiBridge;
use crate::link::{
    serial, DeviceLink, LinkEvent, LinkEventSender, ReaderThread, SerialLink, SimulatedLink,
};
use crate::workflow::config::StationConfig;
use crate::workflow::console::{parse_command, ConsoleCommand, HELP};
use log::{info, warn};
use radarcore::session::{Notice, NoticeLevel};
use radarcore::telemetry::MetricsRecorder;
use radarcore::{RadarResult, RadarSession, SessionEvent};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;

pub type StationSession = RadarSession<DeviceLink, GuiBridge>;

/// Wires the device link, display bridge and operator console around one session.
pub struct Runner {
    config: StationConfig,
}

impl Runner {
    pub fn new(config: StationConfig) -> Self {
        Self { config }
    }

    /// Opens the configured device. A missing device is reported, not fatal.
    pub fn open_link(
        &self,
        events: LinkEventSender,
    ) -> (DeviceLink, Option<ReaderThread>, Option<Notice>) {
        match self.try_open_link(events) {
            Ok((link, reader)) => (link, Some(reader), None),
            Err(err) => (
                DeviceLink::Disconnected,
                None,
                Some(Notice::new(
                    NoticeLevel::Warning,
                    "Serial",
                    format!("Couldn't find Arduino: {}", err),
                )),
            ),
        }
    }

    fn try_open_link(&self, events: LinkEventSender) -> RadarResult<(DeviceLink, ReaderThread)> {
        if self.config.simulate {
            let sensor = SyntheticSensor::new(self.config.sensor.clone());
            let period = Duration::from_millis(self.config.radar.timing.sweep_interval_ms);
            let (link, reader) = SimulatedLink::start(sensor, period, events)?;
            return Ok((DeviceLink::Simulated(link), reader));
        }

        let port_name = match &self.config.port {
            Some(name) => name.clone(),
            None => serial::discover(self.config.vendor_id, self.config.product_id)?,
        };
        let port = serial::open(&port_name, self.config.baud_rate)?;
        let (link, reader) = SerialLink::start(port, events)?;
        Ok((DeviceLink::Serial(link), reader))
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let (link, reader, link_failure) = self.open_link(events_tx);

        let gui = GuiBridge::new();
        let metrics = Arc::new(MetricsRecorder::new());
        if let Some(address) = self.config.bridge_address {
            gui.serve(address, metrics.clone())?;
        }

        let mut session =
            RadarSession::with_metrics(self.config.radar.clone(), link, gui, metrics);
        if let Some(notice) = link_failure {
            session.notify(notice);
        }
        info!("station ready: {}", self.config.sweep_summary());
        println!("{}", HELP);

        let mut console = BufReader::new(tokio::io::stdin()).lines();
        let mut link_open = true;
        let mut console_open = true;
        let interrupt = signal::ctrl_c();
        tokio::pin!(interrupt);

        loop {
            let deadline = session.next_deadline();
            let timer = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                result = &mut interrupt => {
                    if let Err(err) = result {
                        warn!("waiting for Ctrl+C failed: {}", err);
                    }
                    info!("interrupted, shutting down");
                    break;
                }
                event = events_rx.recv(), if link_open => match event {
                    Some(LinkEvent::Bytes(bytes)) => {
                        session.handle(SessionEvent::DeviceBytes(bytes), Instant::now());
                    }
                    Some(LinkEvent::Lost(reason)) => session.notify(Notice::new(
                        NoticeLevel::Error,
                        "Serial",
                        format!("device link lost: {}", reason),
                    )),
                    None => link_open = false,
                },
                line = console.next_line(), if console_open => match line {
                    Ok(Some(line)) => {
                        if !apply_console_line(&line, &mut session) {
                            break;
                        }
                    }
                    Ok(None) => console_open = false,
                    Err(err) => {
                        warn!("console read failed: {}", err);
                        console_open = false;
                    }
                },
                _ = timer => {
                    session.fire_due(Instant::now());
                }
            }
        }

        session.shutdown();
        drop(reader);
        Ok(())
    }
}

/// Applies one console line; returns `false` when the operator asked to quit.
pub fn apply_console_line(line: &str, session: &mut StationSession) -> bool {
    if line.trim().is_empty() {
        return true;
    }
    match parse_command(line) {
        Ok(ConsoleCommand::Intent(intent)) => {
            session.handle(SessionEvent::Ui(intent), Instant::now())
        }
        Ok(ConsoleCommand::Status) => println!("{}", status_line(session)),
        Ok(ConsoleCommand::Help) => println!("{}", HELP),
        Ok(ConsoleCommand::Quit) => return false,
        Err(message) => println!("{} (try 'help')", message),
    }
    true
}

pub fn status_line(session: &StationSession) -> String {
    let state = session.sweep_state();
    let params = session.calibration().params();
    let metrics = session.metrics().snapshot();
    format!(
        "mode={:?} {} angle={:.1} commanded={} height={:.1} cm calibration={}x{:+.2}{} points={} samples={} ignored={} commands={} rejected={}",
        state.mode,
        state.laser.label(),
        session.displayed_angle(),
        session
            .commanded_angle()
            .map_or_else(|| "-".to_string(), |angle| angle.to_string()),
        session.displayed_height(),
        params.factor,
        params.offset,
        if session.calibration().is_running() {
            " (running)"
        } else {
            ""
        },
        session.history().len(),
        metrics.samples,
        metrics.ignored_records,
        metrics.commands_sent,
        metrics.writes_rejected,
    )
}
