use crate::generator::sensor::SyntheticSensor;
use crate::link::{do_terminate, LinkEvent, LinkEventSender, ReaderThread};
use log::debug;
use radarcore::protocol::DeviceCommand;
use radarcore::{RadarError, RadarResult};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Device link backed by [`SyntheticSensor`] instead of a serial port.
pub struct SimulatedLink {
    sensor: Option<Arc<Mutex<SyntheticSensor>>>,
}

impl SimulatedLink {
    /// Starts a thread that reports one reading every `period`.
    pub fn start(
        sensor: SyntheticSensor,
        period: Duration,
        events: LinkEventSender,
    ) -> RadarResult<(Self, ReaderThread)> {
        let sensor = Arc::new(Mutex::new(sensor));
        let emitter = sensor.clone();
        let reader = ReaderThread::spawn("simulated-sensor", move |terminator| {
            while !do_terminate(&terminator) {
                let text = match emitter.lock() {
                    Ok(mut sensor) => sensor.emit(),
                    Err(_) => {
                        let _ = events.send(LinkEvent::Lost("sensor state poisoned".into()));
                        return;
                    }
                };
                if events.send(LinkEvent::Bytes(text.into_bytes())).is_err() {
                    return;
                }
                std::thread::sleep(period);
            }
        })?;
        debug!("simulated sensor emitting every {:?}", period);
        Ok((
            Self {
                sensor: Some(sensor),
            },
            reader,
        ))
    }

    pub fn write_command(&mut self, command: &DeviceCommand) -> RadarResult<()> {
        let sensor = self
            .sensor
            .as_ref()
            .ok_or_else(|| RadarError::WriteRejected("simulated link is closed".into()))?;
        let mut sensor = sensor
            .lock()
            .map_err(|_| RadarError::WriteRejected("sensor state poisoned".into()))?;
        sensor.accept(command);
        Ok(())
    }

    pub fn close(&mut self) {
        self.sensor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::sensor::SensorProfile;

    #[test]
    fn commands_reach_sensor_and_readings_flow_back() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let profile = SensorProfile {
            noise: 0.0,
            ..Default::default()
        };
        let (mut link, reader) =
            SimulatedLink::start(SyntheticSensor::new(profile), Duration::from_millis(5), tx)
                .unwrap();
        link.write_command(&DeviceCommand::angle(40)).unwrap();

        let mut text = String::new();
        for _ in 0..200 {
            while let Ok(LinkEvent::Bytes(bytes)) = rx.try_recv() {
                text.push_str(&String::from_utf8_lossy(&bytes));
            }
            if text.contains("40,35.0,12.0\n") {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(text.contains("40,35.0,12.0\n"), "got {:?}", text);

        link.close();
        assert!(matches!(
            link.write_command(&DeviceCommand::Auto),
            Err(RadarError::WriteRejected(_))
        ));
        drop(reader);
    }
}
