pub mod serial;
pub mod simulated;

use crossbeam_channel::{bounded, Receiver, Sender};
use log::debug;
use radarcore::protocol::DeviceCommand;
use radarcore::{CommandSink, RadarResult};
use std::thread::JoinHandle;
use tokio::sync::mpsc::UnboundedSender;

pub use serial::SerialLink;
pub use simulated::SimulatedLink;

/// What the device side pushes into the control loop.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    Bytes(Vec<u8>),
    /// The reader stopped; no more bytes will arrive.
    Lost(String),
}

pub type LinkEventSender = UnboundedSender<LinkEvent>;

/// Outbound half of whichever device the station talks to.
pub enum DeviceLink {
    Serial(SerialLink),
    Simulated(SimulatedLink),
    /// No device found; commands are dropped silently.
    Disconnected,
}

impl CommandSink for DeviceLink {
    fn write_command(&mut self, command: &DeviceCommand) -> RadarResult<()> {
        match self {
            DeviceLink::Serial(link) => link.write_command(command),
            DeviceLink::Simulated(link) => link.write_command(command),
            DeviceLink::Disconnected => {
                debug!("no device, dropping {}", command);
                Ok(())
            }
        }
    }

    fn close(&mut self) {
        match self {
            DeviceLink::Serial(link) => link.close(),
            DeviceLink::Simulated(link) => link.close(),
            DeviceLink::Disconnected => {}
        }
    }
}

/// Background thread feeding the control loop; stopped and joined on drop.
pub struct ReaderThread {
    terminator_tx: Sender<bool>,
    thread: Option<JoinHandle<()>>,
}

impl ReaderThread {
    pub fn spawn<F>(name: &str, body: F) -> std::io::Result<Self>
    where
        F: FnOnce(Receiver<bool>) + Send + 'static,
    {
        let (terminator_tx, terminator_rx) = bounded(1);
        let thread = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || body(terminator_rx))?;
        Ok(Self {
            terminator_tx,
            thread: Some(thread),
        })
    }
}

pub(crate) fn do_terminate(terminator_rx: &Receiver<bool>) -> bool {
    terminator_rx.try_recv().unwrap_or(false)
}

impl Drop for ReaderThread {
    fn drop(&mut self) {
        let _ = self.terminator_tx.try_send(true);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::warn!("device reader thread panicked");
            }
        }
    }
}
