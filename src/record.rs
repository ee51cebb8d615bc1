//! Earthquake records as read from the feed.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;

/// One earthquake event. Immutable once read from the feed.
///
/// `magnitude` and `time_ms` are kept as the feed reports them, null included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuakeRecord {
    pub magnitude: Option<f64>,
    pub place: String,
    /// Epoch milliseconds.
    pub time_ms: Option<i64>,
    pub longitude: f64,
    pub latitude: f64,
}

impl QuakeRecord {
    /// Magnitude used for thresholds, bucketing and sizing. A null magnitude
    /// compares as zero.
    pub fn magnitude_value(&self) -> f64 {
        self.magnitude.unwrap_or(0.0)
    }

    /// Magnitude as shown to the user; `null` when the feed had none.
    pub fn magnitude_label(&self) -> String {
        match self.magnitude {
            Some(m) => m.to_string(),
            None => "null".to_string(),
        }
    }

    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.time_ms?).single()
    }

    /// Event time rendered in the local timezone, e.g. `2024-05-01 13:45:10`.
    pub fn local_time_label(&self) -> String {
        match self.occurred_at() {
            Some(t) => t
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            None => "Invalid Date".to_string(),
        }
    }
}
