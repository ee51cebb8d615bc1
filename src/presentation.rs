//! Per-record presentation data derived from magnitude and place.

use serde::Serialize;

use crate::record::QuakeRecord;
use crate::series::SeriesPoint;
use crate::stats::Summary;

/// Magnitude at or above which a record raises the major-earthquake alert.
pub const ALERT_MAGNITUDE: f64 = 7.0;

const MARKER_FILL_OPACITY: f64 = 0.6;
const MARKER_WEIGHT: u32 = 1;
const RADIUS_PER_MAGNITUDE: f64 = 3.0;

/// Five-tier palette, highest threshold first.
///
/// | Magnitude | Color     |
/// |-----------|-----------|
/// | >= 7      | `#4B0000` |
/// | >= 6      | `#8B0000` |
/// | >= 5      | `#FF4500` |
/// | >= 4.5    | `#FFA500` |
/// | < 4.5     | `#FFD700` |
pub fn color_for(magnitude: f64) -> &'static str {
    match magnitude {
        m if m >= 7.0 => "#4B0000",
        m if m >= 6.0 => "#8B0000",
        m if m >= 5.0 => "#FF4500",
        m if m >= 4.5 => "#FFA500",
        _ => "#FFD700",
    }
}

/// Everything needed to draw one included record as a marker and a list entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentationRecord {
    pub magnitude: Option<f64>,
    pub place: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    pub color: &'static str,
    pub fill_opacity: f64,
    pub weight: u32,
    pub popup: String,
    pub list_entry: String,
    pub alert: bool,
}

impl PresentationRecord {
    pub fn from_record(record: &QuakeRecord) -> Self {
        let mag = record.magnitude_value();
        let label = record.magnitude_label();
        let time = record.local_time_label();

        PresentationRecord {
            magnitude: record.magnitude,
            place: record.place.clone(),
            latitude: record.latitude,
            longitude: record.longitude,
            radius: mag * RADIUS_PER_MAGNITUDE,
            color: color_for(mag),
            fill_opacity: MARKER_FILL_OPACITY,
            weight: MARKER_WEIGHT,
            popup: format!(
                "Location: {}\nMagnitude: {}\nTime: {}",
                record.place, label, time
            ),
            list_entry: format!("Mag: {} Place: {}\n{}", label, record.place, time),
            alert: mag >= ALERT_MAGNITUDE,
        }
    }

    pub fn alert_message(&self) -> String {
        let label = self
            .magnitude
            .map_or_else(|| "null".to_string(), |m| m.to_string());
        format!(
            "⚠️ Major Earthquake Detected!\nMagnitude {} at {}",
            label, self.place
        )
    }
}

/// Full presentation state produced by one refresh. Replaces the previous one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub summary: Summary,
    pub markers: Vec<PresentationRecord>,
    pub series: Vec<SeriesPoint>,
}

impl Snapshot {
    pub fn alerts(&self) -> impl Iterator<Item = &PresentationRecord> {
        self.markers.iter().filter(|m| m.alert)
    }
}
