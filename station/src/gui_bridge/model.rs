use radarcore::geometry::NeedlePolygon;
use radarcore::session::{Notice, NoticeLevel};
use radarcore::tracking::DetectionPoint;
use radarcore::DisplayUpdate;
use serde::{Deserialize, Serialize};

pub const HEIGHT_SERIES_LEN: usize = 200;
pub const NOTICE_BACKLOG: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoticeView {
    pub level: String,
    pub title: String,
    pub message: String,
}

impl From<&Notice> for NoticeView {
    fn from(notice: &Notice) -> Self {
        let level = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        Self {
            level: level.to_string(),
            title: notice.title.clone(),
            message: notice.message.clone(),
        }
    }
}

/// Snapshot of everything a front end needs to draw the station.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayModel {
    pub angle_label: String,
    pub range_label: String,
    pub height_label: String,
    pub detection_status: String,
    pub detection_color: String,
    pub laser_status: String,
    pub slider_value: i32,
    pub manual_controls_enabled: bool,
    pub mode_button: String,
    pub needle: Option<NeedlePolygon>,
    pub detection_points: Vec<DetectionPoint>,
    pub height_series: Vec<f32>,
    pub last_point_3d: Option<[f32; 3]>,
    pub notices: Vec<NoticeView>,
}

impl Default for DisplayModel {
    fn default() -> Self {
        Self {
            angle_label: "-".into(),
            range_label: "-".into(),
            height_label: "-".into(),
            detection_status: "No Object".into(),
            detection_color: "green".into(),
            laser_status: "Laser: Off".into(),
            slider_value: 0,
            manual_controls_enabled: true,
            mode_button: "Start Auto".into(),
            needle: None,
            detection_points: Vec::new(),
            height_series: Vec::new(),
            last_point_3d: None,
            notices: Vec::new(),
        }
    }
}

impl DisplayModel {
    pub fn apply(&mut self, update: DisplayUpdate) {
        match update {
            DisplayUpdate::Readout {
                angle,
                distance,
                height,
            } => {
                self.angle_label = format!("{:.1}°", angle);
                self.range_label = format!("{:.1} cm", distance);
                self.height_label = format!("{:.1} cm", height);
            }
            DisplayUpdate::DetectionStatus(status) => {
                self.detection_status = status.label().to_string();
                self.detection_color = status.color().to_string();
            }
            DisplayUpdate::Scope { needle, points } => {
                self.needle = Some(needle);
                self.detection_points = points;
            }
            DisplayUpdate::Point3d { position, .. } => self.last_point_3d = Some(position),
            DisplayUpdate::HeightSample(height) => {
                self.height_series.push(height);
                if self.height_series.len() > HEIGHT_SERIES_LEN {
                    let excess = self.height_series.len() - HEIGHT_SERIES_LEN;
                    self.height_series.drain(..excess);
                }
            }
            DisplayUpdate::LaserStatus(laser) => self.laser_status = laser.label().to_string(),
            DisplayUpdate::SliderValue(value) => self.slider_value = value,
            DisplayUpdate::ManualControls(enabled) => self.manual_controls_enabled = enabled,
            DisplayUpdate::ModeButton(mode) => self.mode_button = mode.toggle_label().to_string(),
            DisplayUpdate::Notice(notice) => {
                self.notices.push(NoticeView::from(&notice));
                if self.notices.len() > NOTICE_BACKLOG {
                    self.notices.remove(0);
                }
            }
        }
    }
}
