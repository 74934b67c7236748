use crate::calibration::CalibrationModel;
use crate::config::RadarConfig;
use crate::control::{
    ControlEffect, ControlEvent, LaserState, Mode, SweepController, SweepState, TimerId,
    TimerSchedule,
};
use crate::geometry::{NeedlePolygon, PolarProjector};
use crate::prelude::{CommandSink, DisplaySink};
use crate::protocol::{parse_record, DeviceCommand, LaserEvent, LineFramer, ParsedRecord, Sample};
use crate::telemetry::{LogManager, MetricsRecorder};
use crate::tracking::{DetectionHistory, DetectionPoint, DetectionStatus};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Operator actions coming from the user interface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiIntent {
    SetAngle(i32),
    ToggleAuto,
    Calibrate { known_height: f32 },
    CancelCalibration,
    /// Drops all detection markers from the scope.
    ClearHistory,
}

/// Everything the control loop reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    DeviceBytes(Vec<u8>),
    Ui(UiIntent),
    TimerFired(TimerId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Operator-facing message (dialog or status line, depending on the front end).
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, title: &str, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.to_string(),
            message: message.into(),
        }
    }
}

/// Updates pushed to the rendering collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayUpdate {
    /// Angle / range / height labels.
    Readout {
        angle: f32,
        distance: f32,
        height: f32,
    },
    DetectionStatus(DetectionStatus),
    /// Needle pose plus the retained detection markers, oldest first.
    Scope {
        needle: NeedlePolygon,
        points: Vec<DetectionPoint>,
    },
    /// Point for the 3D view, sensor frame in cm.
    Point3d {
        angle: f32,
        distance: f32,
        height: f32,
        position: [f32; 3],
    },
    /// Next value for the height time series.
    HeightSample(f32),
    LaserStatus(LaserState),
    SliderValue(i32),
    ManualControls(bool),
    ModeButton(Mode),
    Notice(Notice),
}

/// Session context: owns all mutable radar state and is driven by one loop.
pub struct RadarSession<L: CommandSink, D: DisplaySink> {
    config: RadarConfig,
    framer: LineFramer,
    calibration: CalibrationModel,
    history: DetectionHistory,
    projector: PolarProjector,
    controller: SweepController,
    timers: TimerSchedule,
    link: L,
    display: D,
    displayed_height: f32,
    needle_angle: f32,
    commanded_angle: Option<i32>,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
}

impl<L: CommandSink, D: DisplaySink> RadarSession<L, D> {
    pub fn new(config: RadarConfig, link: L, display: D) -> Self {
        Self::with_metrics(config, link, display, Arc::new(MetricsRecorder::new()))
    }

    pub fn with_metrics(
        config: RadarConfig,
        link: L,
        display: D,
        metrics: Arc<MetricsRecorder>,
    ) -> Self {
        Self {
            projector: PolarProjector::new(&config),
            controller: SweepController::new(&config),
            config,
            framer: LineFramer::new(),
            calibration: CalibrationModel::new(),
            history: DetectionHistory::new(),
            timers: TimerSchedule::new(),
            link,
            display,
            displayed_height: 0.0,
            needle_angle: 0.0,
            commanded_angle: None,
            metrics,
            logger: LogManager::scoped("session"),
        }
    }

    pub fn handle(&mut self, event: SessionEvent, now: Instant) {
        match event {
            SessionEvent::DeviceBytes(bytes) => {
                let lines: Vec<String> = self.framer.feed(&bytes).collect();
                for line in lines {
                    self.ingest_line(&line, now);
                }
            }
            SessionEvent::Ui(intent) => self.handle_intent(intent, now),
            SessionEvent::TimerFired(id) => self.handle_timer(id, now),
        }
    }

    /// Fires every timer due at `now`; returns how many fired.
    pub fn fire_due(&mut self, now: Instant) -> usize {
        let due = self.timers.pop_due(now);
        let fired = due.len();
        for id in due {
            self.handle_timer(id, now);
        }
        fired
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Stops all timers and closes the device link.
    pub fn shutdown(&mut self) {
        self.timers.cancel_all();
        if self.calibration.cancel() {
            self.logger.record("calibration abandoned at shutdown");
        }
        self.link.close();
        self.logger.record("session closed");
    }

    /// Surfaces a message on the display and in the log.
    pub fn notify(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => self.logger.record(&notice.message),
            NoticeLevel::Warning | NoticeLevel::Error => self.logger.warn(&notice.message),
        }
        self.display.apply(DisplayUpdate::Notice(notice));
    }

    pub fn sweep_state(&self) -> &SweepState {
        self.controller.state()
    }

    pub fn calibration(&self) -> &CalibrationModel {
        &self.calibration
    }

    pub fn history(&self) -> &DetectionHistory {
        &self.history
    }

    pub fn displayed_height(&self) -> f32 {
        self.displayed_height
    }

    /// Angle of the last reported sample.
    pub fn displayed_angle(&self) -> f32 {
        self.needle_angle
    }

    /// Last servo angle written to the device, manual or sweep.
    pub fn commanded_angle(&self) -> Option<i32> {
        self.commanded_angle
    }

    pub fn metrics(&self) -> Arc<MetricsRecorder> {
        self.metrics.clone()
    }

    pub fn timers(&self) -> &TimerSchedule {
        &self.timers
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    fn ingest_line(&mut self, line: &str, now: Instant) {
        match parse_record(line) {
            ParsedRecord::Sample(sample) => self.ingest_sample(sample, now),
            ParsedRecord::Laser(event) => {
                self.metrics.record_laser_event();
                self.logger.record(&format!("device reported laser {:?}", event));
                let event = match event {
                    LaserEvent::Activated => ControlEvent::DeviceLaserActivated,
                    LaserEvent::Deactivated => ControlEvent::DeviceLaserDeactivated,
                };
                self.dispatch(event, now);
            }
            ParsedRecord::Ignored => {
                if !line.is_empty() {
                    self.metrics.record_ignored();
                    self.logger.debug(&format!("ignored record {:?}", line));
                }
            }
        }
    }

    fn ingest_sample(&mut self, sample: Sample, now: Instant) {
        self.metrics.record_sample();
        let height = self.calibration.apply(sample.raw_height);
        self.displayed_height = height;
        self.needle_angle = sample.angle;

        let projection = self
            .projector
            .project(sample.angle, sample.distance, height);
        if self.config.in_detection_range(sample.distance) {
            self.history.insert(projection.point);
        }

        self.display.apply(DisplayUpdate::Scope {
            needle: projection.needle,
            points: self.history.to_vec(),
        });
        self.display.apply(DisplayUpdate::Point3d {
            angle: sample.angle,
            distance: sample.distance,
            height,
            position: projection.spatial,
        });
        self.display.apply(DisplayUpdate::HeightSample(height));
        self.display.apply(DisplayUpdate::Readout {
            angle: sample.angle,
            distance: sample.distance,
            height,
        });

        let status = DetectionStatus::classify(sample.distance, &self.config);
        self.display.apply(DisplayUpdate::DetectionStatus(status));
        if status == DetectionStatus::LaserRange {
            self.dispatch(ControlEvent::ProximityDetected, now);
        }
    }

    fn handle_intent(&mut self, intent: UiIntent, now: Instant) {
        match intent {
            UiIntent::SetAngle(angle) => self.dispatch(ControlEvent::UserSetAngle(angle), now),
            UiIntent::ToggleAuto => self.dispatch(ControlEvent::UserToggleAuto, now),
            UiIntent::Calibrate { known_height } => self.start_calibration(known_height, now),
            UiIntent::CancelCalibration => {
                if self.calibration.cancel() {
                    self.timers.cancel(TimerId::Calibration);
                    self.notify(Notice::new(
                        NoticeLevel::Info,
                        "Calibration",
                        "Calibration cancelled, previous factor kept.",
                    ));
                }
            }
            UiIntent::ClearHistory => {
                self.history.clear();
                self.display.apply(DisplayUpdate::Scope {
                    needle: self.projector.needle(self.needle_angle),
                    points: Vec::new(),
                });
            }
        }
    }

    fn handle_timer(&mut self, id: TimerId, now: Instant) {
        match id {
            TimerId::Sweep => self.dispatch(ControlEvent::SweepTick, now),
            TimerId::LaserHold => self.dispatch(ControlEvent::LaserHoldExpired, now),
            TimerId::Calibration => self.sample_calibration(),
        }
    }

    fn start_calibration(&mut self, known_height: f32, now: Instant) {
        let samples = self.config.timing.calibration_samples;
        match self.calibration.begin(known_height, samples) {
            Ok(()) => {
                let interval =
                    Duration::from_millis(self.config.timing.calibration_interval_ms.max(1));
                self.timers
                    .start(TimerId::Calibration, now, interval, true);
                self.notify(Notice::new(
                    NoticeLevel::Info,
                    "Calibration",
                    format!(
                        "Measuring {} samples against {:.2} cm; keep the object in place.",
                        samples, known_height
                    ),
                ));
            }
            Err(err) => self.notify(Notice::new(NoticeLevel::Error, "Calibration", err.to_string())),
        }
    }

    // Samples the height currently on display, i.e. with the previous factor applied.
    fn sample_calibration(&mut self) {
        if !self.calibration.is_running() {
            self.timers.cancel(TimerId::Calibration);
            return;
        }
        let Some(result) = self.calibration.record(self.displayed_height) else {
            return;
        };
        self.timers.cancel(TimerId::Calibration);
        match result {
            Ok(params) => self.notify(Notice::new(
                NoticeLevel::Info,
                "Calibration Complete",
                format!(
                    "Calibration factor: {}\nCalibration offset: {}",
                    params.factor, params.offset
                ),
            )),
            Err(err) => self.notify(Notice::new(
                NoticeLevel::Error,
                "Calibration Failed",
                err.to_string(),
            )),
        }
    }

    /// Runs `event` and any deferred follow-ups through the controller.
    fn dispatch(&mut self, event: ControlEvent, now: Instant) {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            for effect in self.controller.handle(event) {
                match effect {
                    ControlEffect::Send(command) => self.send(command),
                    ControlEffect::Timer(command) => self.timers.apply(command, now),
                    ControlEffect::Display(update) => self.display.apply(update),
                    ControlEffect::Defer(next) => queue.push_back(next),
                }
            }
        }
    }

    fn send(&mut self, command: DeviceCommand) {
        match self.link.write_command(&command) {
            Ok(()) => {
                if let DeviceCommand::Angle(angle) = command {
                    self.commanded_angle = Some(angle);
                }
                self.metrics.record_command();
                self.logger.debug(&format!("sent {}", command));
            }
            Err(err) => {
                self.metrics.record_rejected_write();
                self.notify(Notice::new(
                    NoticeLevel::Warning,
                    "Serial",
                    format!("Couldn't write {} to serial: {}", command, err),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CalibrationParams;
    use crate::prelude::{RadarError, RadarResult};
    use crate::tracking::HISTORY_CAPACITY;

    #[derive(Default)]
    struct RecordingLink {
        sent: Vec<DeviceCommand>,
        writable: bool,
        closed: bool,
    }

    impl RecordingLink {
        fn writable() -> Self {
            Self {
                writable: true,
                ..Default::default()
            }
        }
    }

    impl CommandSink for RecordingLink {
        fn write_command(&mut self, command: &DeviceCommand) -> RadarResult<()> {
            if !self.writable {
                return Err(RadarError::WriteRejected("port not writable".into()));
            }
            self.sent.push(*command);
            Ok(())
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }

    #[derive(Default)]
    struct RecordingDisplay {
        updates: Vec<DisplayUpdate>,
    }

    impl RecordingDisplay {
        fn notices(&self) -> Vec<&Notice> {
            self.updates
                .iter()
                .filter_map(|update| match update {
                    DisplayUpdate::Notice(notice) => Some(notice),
                    _ => None,
                })
                .collect()
        }
    }

    impl DisplaySink for RecordingDisplay {
        fn apply(&mut self, update: DisplayUpdate) {
            self.updates.push(update);
        }
    }

    type TestSession = RadarSession<RecordingLink, RecordingDisplay>;

    fn session() -> TestSession {
        RadarSession::new(
            RadarConfig::default(),
            RecordingLink::writable(),
            RecordingDisplay::default(),
        )
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn feed(session: &mut TestSession, text: &str, now: Instant) {
        session.handle(SessionEvent::DeviceBytes(text.as_bytes().to_vec()), now);
    }

    #[test]
    fn sample_updates_display_and_history() {
        let mut s = session();
        let t0 = Instant::now();
        feed(&mut s, "90,40,12.5\n", t0);

        assert_eq!(s.history().len(), 1);
        assert_eq!(s.displayed_height(), 12.5);
        let updates = &s.display().updates;
        assert!(updates.contains(&DisplayUpdate::HeightSample(12.5)));
        assert!(updates.contains(&DisplayUpdate::DetectionStatus(DetectionStatus::Detected)));
        assert!(updates.contains(&DisplayUpdate::Readout {
            angle: 90.0,
            distance: 40.0,
            height: 12.5,
        }));
        assert_eq!(s.metrics().snapshot().samples, 1);
    }

    #[test]
    fn out_of_range_sample_moves_needle_only() {
        let mut s = session();
        feed(&mut s, "45,0,1\n45,80,1\n", Instant::now());
        assert!(s.history().is_empty());
        let scopes = s
            .display()
            .updates
            .iter()
            .filter(|update| matches!(update, DisplayUpdate::Scope { .. }))
            .count();
        assert_eq!(scopes, 2);
    }

    #[test]
    fn clearing_history_keeps_needle() {
        let mut s = session();
        feed(&mut s, "60,30,2\n", Instant::now());
        s.handle(SessionEvent::Ui(UiIntent::ClearHistory), Instant::now());
        assert!(s.history().is_empty());
        match s.display().updates.last() {
            Some(DisplayUpdate::Scope { needle, points }) => {
                assert!(points.is_empty());
                assert_eq!(*needle, s.projector.needle(60.0));
            }
            other => panic!("expected scope update, got {:?}", other),
        }
    }

    #[test]
    fn malformed_records_leave_state_untouched() {
        let mut s = session();
        feed(&mut s, "garbage\n1,2\n\n", Instant::now());
        assert!(s.display().updates.is_empty());
        assert!(s.history().is_empty());
        assert_eq!(s.metrics().snapshot().ignored_records, 2);
    }

    #[test]
    fn history_is_capped_across_stream() {
        let mut s = session();
        let t0 = Instant::now();
        for i in 0..60 {
            feed(&mut s, &format!("{},40,1\n", i), t0);
        }
        assert_eq!(s.history().len(), HISTORY_CAPACITY);
    }

    #[test]
    fn auto_sweep_laser_interlock_and_resume() {
        let mut s = session();
        let t0 = Instant::now();
        s.handle(SessionEvent::Ui(UiIntent::ToggleAuto), t0);
        assert_eq!(s.sweep_state().mode, Mode::Auto);
        assert!(s.timers().is_armed(TimerId::Sweep));

        assert_eq!(s.fire_due(t0 + ms(50)), 1);
        assert_eq!(s.link().sent, vec![DeviceCommand::Auto, DeviceCommand::Angle(2)]);

        feed(&mut s, "2,15,3\n", t0 + ms(60));
        assert_eq!(s.sweep_state().laser, LaserState::Active);
        assert!(!s.timers().is_armed(TimerId::Sweep));
        assert_eq!(s.link().sent.last(), Some(&DeviceCommand::LaserOn));

        // Nothing but the hold timer is pending; the sweep stays put.
        assert_eq!(s.fire_due(t0 + ms(1000)), 0);
        assert_eq!(s.next_deadline(), Some(t0 + ms(2060)));

        assert_eq!(s.fire_due(t0 + ms(2060)), 1);
        assert_eq!(s.sweep_state().laser, LaserState::Inactive);
        assert!(!s.sweep_state().pending_resume);
        let tail = &s.link().sent[s.link().sent.len() - 2..];
        assert_eq!(tail, &[DeviceCommand::LaserOff, DeviceCommand::Auto]);
        assert!(s.timers().is_armed(TimerId::Sweep));

        s.fire_due(t0 + ms(2110));
        assert_eq!(s.link().sent.last(), Some(&DeviceCommand::Angle(4)));
    }

    #[test]
    fn device_laser_reports_drive_interlock() {
        let mut s = session();
        let t0 = Instant::now();
        s.handle(SessionEvent::Ui(UiIntent::ToggleAuto), t0);
        feed(&mut s, "LASER_ACTIVATED\n", t0);
        assert_eq!(s.sweep_state().laser, LaserState::Active);
        assert!(s.timers().is_armed(TimerId::LaserHold));
        assert!(!s.timers().is_armed(TimerId::Sweep));

        feed(&mut s, "LASER_DEACTIVATED\n", t0 + ms(500));
        assert_eq!(s.sweep_state().laser, LaserState::Inactive);
        assert!(!s.timers().is_armed(TimerId::LaserHold));
        assert!(s.timers().is_armed(TimerId::Sweep));
        assert_eq!(s.link().sent, vec![DeviceCommand::Auto]);
        assert_eq!(s.metrics().snapshot().laser_events, 2);
    }

    #[test]
    fn manual_angle_is_sent_and_mirrored() {
        let mut s = session();
        s.handle(SessionEvent::Ui(UiIntent::SetAngle(135)), Instant::now());
        assert_eq!(s.link().sent, vec![DeviceCommand::Angle(135)]);
        assert_eq!(s.commanded_angle(), Some(135));
        assert!(s
            .display()
            .updates
            .contains(&DisplayUpdate::SliderValue(135)));
    }

    #[test]
    fn rejected_write_is_reported_not_retried() {
        let mut s = RadarSession::new(
            RadarConfig::default(),
            RecordingLink::default(),
            RecordingDisplay::default(),
        );
        s.handle(SessionEvent::Ui(UiIntent::SetAngle(90)), Instant::now());
        assert!(s.link().sent.is_empty());
        assert_eq!(s.metrics().snapshot().writes_rejected, 1);
        let notices = s.display().notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Warning);
    }

    #[test]
    fn calibration_uses_displayed_height_and_commits_at_end() {
        let mut s = session();
        let t0 = Instant::now();
        feed(&mut s, "90,40,5\n", t0);
        s.handle(
            SessionEvent::Ui(UiIntent::Calibrate { known_height: 10.0 }),
            t0,
        );
        assert!(s.calibration().is_running());

        s.handle(
            SessionEvent::Ui(UiIntent::Calibrate { known_height: 20.0 }),
            t0,
        );
        assert_eq!(s.display().notices().last().unwrap().level, NoticeLevel::Error);

        for i in 1..10 {
            s.fire_due(t0 + ms(100 * i));
            // Ingestion keeps running between calibration samples.
            feed(&mut s, "90,40,5\n", t0 + ms(100 * i + 10));
            assert_eq!(s.calibration().params(), CalibrationParams::default());
        }
        s.fire_due(t0 + ms(1000));
        assert!(!s.calibration().is_running());
        assert!(!s.timers().is_armed(TimerId::Calibration));
        assert!((s.calibration().params().factor - 2.0).abs() < 1e-6);

        feed(&mut s, "90,40,5\n", t0 + ms(1100));
        assert!((s.displayed_height() - 10.0).abs() < 1e-5);
        assert_eq!(
            s.display().notices().last().unwrap().title,
            "Calibration Complete"
        );
    }

    #[test]
    fn zero_calibration_interval_still_completes() {
        let mut config = RadarConfig::default();
        config.timing.calibration_interval_ms = 0;
        let mut s = RadarSession::new(
            config,
            RecordingLink::writable(),
            RecordingDisplay::default(),
        );
        let t0 = Instant::now();
        feed(&mut s, "90,40,5\n", t0);
        s.handle(
            SessionEvent::Ui(UiIntent::Calibrate { known_height: 10.0 }),
            t0,
        );
        for i in 1..=50 {
            s.fire_due(t0 + ms(10 * i));
        }
        assert!(!s.calibration().is_running());
        assert!(s.next_deadline().is_none());
        assert!((s.calibration().params().factor - 2.0).abs() < 1e-6);
    }

    #[test]
    fn calibration_without_height_reading_fails_cleanly() {
        let mut s = session();
        let t0 = Instant::now();
        s.handle(
            SessionEvent::Ui(UiIntent::Calibrate { known_height: 10.0 }),
            t0,
        );
        for i in 1..=10 {
            s.fire_due(t0 + ms(100 * i));
        }
        assert!(!s.calibration().is_running());
        assert_eq!(s.calibration().params(), CalibrationParams::default());
        let last = s.display().notices().last().copied().unwrap().clone();
        assert_eq!(last.level, NoticeLevel::Error);
        assert_eq!(last.message, RadarError::CalibrationDivideByZero.to_string());
    }

    #[test]
    fn cancelled_calibration_stops_sampling() {
        let mut s = session();
        let t0 = Instant::now();
        s.handle(
            SessionEvent::Ui(UiIntent::Calibrate { known_height: 10.0 }),
            t0,
        );
        s.handle(SessionEvent::Ui(UiIntent::CancelCalibration), t0);
        assert!(!s.calibration().is_running());
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn shutdown_closes_link_and_timers() {
        let mut s = session();
        let t0 = Instant::now();
        s.handle(SessionEvent::Ui(UiIntent::ToggleAuto), t0);
        s.shutdown();
        assert!(s.link().closed);
        assert_eq!(s.next_deadline(), None);
    }
}
