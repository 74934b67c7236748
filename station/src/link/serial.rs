use crate::link::{do_terminate, LinkEvent, LinkEventSender, ReaderThread};
use log::{info, warn};
use radarcore::protocol::DeviceCommand;
use radarcore::{RadarError, RadarResult};
use serialport::{
    DataBits, FlowControl, Parity, SerialPort, SerialPortInfo, SerialPortType, StopBits,
};
use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

const READ_TIMEOUT_MS: u64 = 10;
const READ_CHUNK: usize = 256;

/// Picks the first USB port with the given vendor / product id.
pub fn find_device(ports: &[SerialPortInfo], vendor_id: u16, product_id: u16) -> Option<String> {
    ports.iter().find_map(|port| match &port.port_type {
        SerialPortType::UsbPort(usb) if usb.vid == vendor_id && usb.pid == product_id => {
            Some(port.port_name.clone())
        }
        _ => None,
    })
}

pub fn discover(vendor_id: u16, product_id: u16) -> RadarResult<String> {
    let ports = serialport::available_ports()
        .map_err(|e| RadarError::DeviceUnavailable(format!("port enumeration failed: {}", e)))?;
    find_device(&ports, vendor_id, product_id).ok_or_else(|| {
        RadarError::DeviceUnavailable(format!(
            "no USB device {:04x}:{:04x} among {} port(s)",
            vendor_id,
            product_id,
            ports.len()
        ))
    })
}

/// Opens `port_name` at 8N1 without flow control.
pub fn open(port_name: &str, baud_rate: u32) -> RadarResult<Box<dyn SerialPort>> {
    serialport::new(port_name, baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(Duration::from_millis(READ_TIMEOUT_MS))
        .open()
        .map_err(|e| RadarError::DeviceUnavailable(format!("opening {}: {}", port_name, e)))
}

/// Writing half of an open serial port.
pub struct SerialLink {
    port: Option<Box<dyn SerialPort>>,
    name: String,
}

impl SerialLink {
    /// Splits `port` into a writer and a reader thread forwarding bytes to `events`.
    pub fn start(
        port: Box<dyn SerialPort>,
        events: LinkEventSender,
    ) -> RadarResult<(Self, ReaderThread)> {
        let name = port.name().unwrap_or_else(|| "serial".to_string());
        let mut reader_port = port.try_clone().map_err(|e| {
            RadarError::DeviceUnavailable(format!("cloning {} for reading: {}", name, e))
        })?;
        let reader = ReaderThread::spawn("serial-reader", move |terminator| {
            read_device_signal(&mut reader_port, events, terminator)
        })?;
        info!("serial link open on {}", name);
        Ok((
            Self {
                port: Some(port),
                name,
            },
            reader,
        ))
    }

    pub fn write_command(&mut self, command: &DeviceCommand) -> RadarResult<()> {
        let port = self
            .port
            .as_mut()
            .ok_or_else(|| RadarError::WriteRejected(format!("{} is closed", self.name)))?;
        // Bytes still queued mean the device is not keeping up; drop the frame whole.
        if let Ok(queued) = port.bytes_to_write() {
            if queued > 0 {
                return Err(RadarError::WriteRejected(format!(
                    "{}: {} bytes still queued",
                    self.name, queued
                )));
            }
        }
        write_frame(port.as_mut(), &command.encode())
            .map_err(|e| RadarError::WriteRejected(format!("{}: {}", self.name, e)))
    }

    pub fn close(&mut self) {
        if self.port.take().is_some() {
            info!("serial link {} closed", self.name);
        }
    }
}

/// Writes one newline-terminated frame. If the port stalls part-way, a bare
/// `\n` terminates the fragment so the firmware discards it as a bad line
/// instead of gluing it onto the next command.
fn write_frame<W: Write + ?Sized>(port: &mut W, frame: &[u8]) -> std::io::Result<()> {
    let mut written = 0;
    let result = loop {
        if written == frame.len() {
            break Ok(());
        }
        match port.write(&frame[written..]) {
            Ok(0) => {
                break Err(std::io::Error::new(
                    ErrorKind::WriteZero,
                    "port accepted no bytes",
                ))
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => break Err(e),
        }
    };
    if result.is_err() && written > 0 {
        let _ = port.write(b"\n");
    }
    result
}

fn read_device_signal(
    port: &mut Box<dyn SerialPort>,
    events: LinkEventSender,
    terminator_rx: crossbeam_channel::Receiver<bool>,
) {
    let mut buffer = [0u8; READ_CHUNK];
    while !do_terminate(&terminator_rx) {
        match port.read(&mut buffer) {
            Ok(0) => continue,
            Ok(n) => {
                if events.send(LinkEvent::Bytes(buffer[..n].to_vec())).is_err() {
                    return;
                }
            }
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                ) =>
            {
                continue
            }
            Err(e) => {
                warn!("serial read failed: {}", e);
                let _ = events.send(LinkEvent::Lost(e.to_string()));
                return;
            }
        }
    }
}
