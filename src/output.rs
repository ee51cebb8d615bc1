//! Output formatting and persistence for refresh summaries.
//!
//! Supports pretty-printing, JSON serialization, and CSV append.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::filter::FilterSelection;
use crate::stats::Summary;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// One CSV row per successful refresh.
#[derive(Debug, Default, Serialize)]
pub struct HistoryRow {
    pub timestamp: DateTime<Utc>,
    pub min_magnitude: f64,
    pub region: String,
    pub total: usize,
    pub strong: usize,
    pub under_4_5: usize,
    pub mag_4_5_to_5: usize,
    pub mag_5_to_6: usize,
    pub mag_6_to_7: usize,
    pub mag_7_plus: usize,
    pub skipped: usize,
}

impl HistoryRow {
    pub fn new(summary: &Summary, filter: &FilterSelection, skipped: usize) -> Self {
        let [under_4_5, mag_4_5_to_5, mag_5_to_6, mag_6_to_7, mag_7_plus] = summary.histogram.0;
        HistoryRow {
            timestamp: summary.timestamp,
            min_magnitude: filter.min_magnitude,
            region: filter.region.to_string(),
            total: summary.total,
            strong: summary.strong,
            under_4_5,
            mag_4_5_to_5,
            mag_5_to_6,
            mag_6_to_7,
            mag_7_plus,
            skipped,
        }
    }
}

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl std::fmt::Debug) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Appends a [`HistoryRow`] to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &Path, row: &HistoryRow) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV record");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(row)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Histogram;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    fn summary() -> Summary {
        Summary {
            timestamp: Utc::now(),
            total: 6,
            strong: 4,
            histogram: Histogram([2, 1, 1, 1, 1]),
        }
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&summary());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&summary()).unwrap();
    }

    #[test]
    fn test_history_row_flattens_histogram() {
        let row = HistoryRow::new(&summary(), &FilterSelection::default(), 3);

        assert_eq!(row.region, "all");
        assert_eq!(row.under_4_5, 2);
        assert_eq!(row.mag_7_plus, 1);
        assert_eq!(row.skipped, 3);
    }

    #[test]
    fn test_append_record_writes_header_once() {
        let path = temp_path("quake_watch_test_header.csv");
        let _ = fs::remove_file(&path); // clean up any prior run

        let row = HistoryRow::new(&summary(), &FilterSelection::default(), 0);
        append_record(&path, &row).unwrap();
        append_record(&path, &row).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("timestamp,min_magnitude,region,total,strong"));
        assert_eq!(lines.iter().filter(|l| l.contains("timestamp")).count(), 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_record_creates_parent_dir() {
        let dir = temp_path("quake_watch_test_history_dir");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("history.csv");

        append_record(&path, &HistoryRow::default()).unwrap();
        assert!(path.exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
