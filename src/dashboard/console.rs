use anyhow::Result;
use std::io::Write;

use super::Dashboard;
use crate::presentation::{PresentationRecord, Snapshot};
use crate::stats::MagnitudeBucket;

const BAR_WIDTH: usize = 40;
const BELL: &str = "\x07";

/// Text dashboard: counters, histogram bars, the rolling series and the event list.
pub struct ConsoleDashboard<W> {
    out: W,
    bell: bool,
}

impl<W: Write> ConsoleDashboard<W> {
    pub fn new(out: W) -> Self {
        Self { out, bell: true }
    }

    /// Disables the terminal bell on alerts.
    pub fn quiet(mut self) -> Self {
        self.bell = false;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_counters(&mut self, snapshot: &Snapshot) -> Result<()> {
        let s = &snapshot.summary;
        writeln!(
            self.out,
            "Total: {}  Strong (M4.5+): {} ({:.1}%)",
            s.total,
            s.strong,
            s.strong_pct()
        )?;
        Ok(())
    }

    fn write_histogram(&mut self, snapshot: &Snapshot) -> Result<()> {
        let histogram = &snapshot.summary.histogram;
        let max = histogram.max();

        writeln!(self.out, "\nMagnitude distribution")?;
        for bucket in MagnitudeBucket::ALL {
            let count = histogram.count(bucket);
            let width = if max == 0 { 0 } else { count * BAR_WIDTH / max };
            writeln!(
                self.out,
                "{:>6} | {:<width$} {}",
                bucket.label(),
                "#".repeat(width),
                count,
                width = BAR_WIDTH
            )?;
        }
        Ok(())
    }

    fn write_series(&mut self, snapshot: &Snapshot) -> Result<()> {
        writeln!(self.out, "\nEarthquakes per fetch")?;
        for point in &snapshot.series {
            writeln!(self.out, "{:>10}  {}", point.label, point.count)?;
        }
        Ok(())
    }

    fn write_list(&mut self, snapshot: &Snapshot) -> Result<()> {
        writeln!(self.out, "\nRecent events")?;
        for marker in &snapshot.markers {
            writeln!(self.out, "{}", marker.list_entry)?;
        }
        Ok(())
    }
}

impl<W: Write> Dashboard for ConsoleDashboard<W> {
    fn render(&mut self, snapshot: &Snapshot) -> Result<()> {
        let stamp = snapshot.summary.timestamp.format("%Y-%m-%d %H:%M:%S UTC");
        writeln!(self.out, "\n==== {stamp} ====")?;
        self.write_counters(snapshot)?;
        self.write_histogram(snapshot)?;
        self.write_series(snapshot)?;
        self.write_list(snapshot)?;
        self.out.flush()?;
        Ok(())
    }

    fn alert(&mut self, record: &PresentationRecord) -> Result<()> {
        if self.bell {
            write!(self.out, "{BELL}")?;
        }
        writeln!(self.out, "{}", record.alert_message())?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::QuakeRecord;
    use crate::series::SeriesPoint;
    use crate::stats::Summary;

    fn snapshot() -> Snapshot {
        let records = vec![
            QuakeRecord {
                magnitude: Some(4.0),
                place: "Northern California".to_string(),
                time_ms: Some(1_700_000_000_000),
                longitude: -122.0,
                latitude: 38.0,
            },
            QuakeRecord {
                magnitude: Some(6.5),
                place: "Southern California".to_string(),
                time_ms: Some(1_700_000_060_000),
                longitude: -116.0,
                latitude: 33.0,
            },
        ];
        Snapshot {
            summary: Summary::from_records(&records),
            markers: records
                .iter()
                .map(PresentationRecord::from_record)
                .collect(),
            series: vec![SeriesPoint {
                label: "12:00:00".to_string(),
                count: 2,
            }],
        }
    }

    fn rendered(dashboard: ConsoleDashboard<Vec<u8>>) -> String {
        String::from_utf8(dashboard.into_inner()).unwrap()
    }

    #[test]
    fn test_render_contains_every_section() {
        let mut dashboard = ConsoleDashboard::new(Vec::new());
        dashboard.render(&snapshot()).unwrap();
        let text = rendered(dashboard);

        assert!(text.contains("Total: 2  Strong (M4.5+): 1 (50.0%)"));
        assert!(text.contains("  <4.5 | "));
        assert!(text.contains("  12:00:00  2"));
        assert!(text.contains("Mag: 4 Place: Northern California"));
        assert!(text.contains("Mag: 6.5 Place: Southern California"));
    }

    #[test]
    fn test_histogram_bar_scaled_to_largest_bucket() {
        let mut dashboard = ConsoleDashboard::new(Vec::new());
        dashboard.render(&snapshot()).unwrap();
        let text = rendered(dashboard);

        let line = text.lines().find(|l| l.trim_start().starts_with("6-7")).unwrap();
        assert!(line.contains(&"#".repeat(BAR_WIDTH)));
        let empty = text.lines().find(|l| l.trim_start().starts_with("7+")).unwrap();
        assert!(!empty.contains('#'));
    }

    #[test]
    fn test_alert_rings_bell_unless_quiet() {
        let record = PresentationRecord::from_record(&QuakeRecord {
            magnitude: Some(7.2),
            place: "Kermadec Islands".to_string(),
            time_ms: Some(0),
            longitude: 0.0,
            latitude: 0.0,
        });

        let mut loud = ConsoleDashboard::new(Vec::new());
        loud.alert(&record).unwrap();
        assert!(rendered(loud).starts_with(BELL));

        let mut quiet = ConsoleDashboard::new(Vec::new()).quiet();
        quiet.alert(&record).unwrap();
        let text = rendered(quiet);
        assert!(!text.contains(BELL));
        assert!(text.contains("Magnitude 7.2 at Kermadec Islands"));
    }
}
