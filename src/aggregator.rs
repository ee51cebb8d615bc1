//! The refresh cycle: fetch, filter, summarize, present.

use anyhow::Result;
use chrono::Local;
use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::controls::Control;
use crate::dashboard::Dashboard;
use crate::fetch::{HttpClient, fetch_bytes};
use crate::filter::FilterSelection;
use crate::output::{HistoryRow, append_record};
use crate::parser::parse_feed;
use crate::presentation::{PresentationRecord, Snapshot};
use crate::record::QuakeRecord;
use crate::series::RollingSeries;
use crate::stats::Summary;

const SLOW_FETCH_SECS: u64 = 15;
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// What the watch loop does after taking one event.
enum Step {
    Timer,
    Refresh,
    Idle,
    Quit,
}

/// Builds the presentation state for one refresh and appends its total to
/// `series`. Records that fail `filter` are excluded from every count and
/// from the markers.
pub fn build_snapshot(
    records: &[QuakeRecord],
    filter: &FilterSelection,
    series: &mut RollingSeries,
) -> Snapshot {
    let included: Vec<&QuakeRecord> = records.iter().filter(|r| filter.matches(r)).collect();

    let summary = Summary::from_records(included.iter().copied());
    let markers = included
        .into_iter()
        .map(PresentationRecord::from_record)
        .collect();

    series.push(Local::now().format("%H:%M:%S").to_string(), summary.total);

    Snapshot {
        summary,
        markers,
        series: series.to_vec(),
    }
}

/// Application context: everything a refresh reads or mutates.
pub struct QuakeWatch<C, D> {
    client: C,
    feed_url: String,
    dashboard: D,
    series: RollingSeries,
    history_path: Option<PathBuf>,
    current: Option<Snapshot>,
    last_skipped: usize,
}

impl<C: HttpClient, D: Dashboard> QuakeWatch<C, D> {
    pub fn new(client: C, feed_url: impl Into<String>, dashboard: D) -> Self {
        Self {
            client,
            feed_url: feed_url.into(),
            dashboard,
            series: RollingSeries::default(),
            history_path: None,
            current: None,
            last_skipped: 0,
        }
    }

    /// Appends a CSV row per successful refresh to `path`.
    pub fn with_history(mut self, path: impl Into<PathBuf>) -> Self {
        self.history_path = Some(path.into());
        self
    }

    /// The snapshot last handed to the dashboard, if any refresh succeeded.
    pub fn current(&self) -> Option<&Snapshot> {
        self.current.as_ref()
    }

    pub fn series(&self) -> &RollingSeries {
        &self.series
    }

    pub fn dashboard(&self) -> &D {
        &self.dashboard
    }

    /// Fetches the feed and computes a new snapshot.
    ///
    /// The rolling series only advances when fetch and parse both succeed.
    #[tracing::instrument(skip(self), fields(url = %self.feed_url))]
    pub async fn refresh(&mut self, filter: &FilterSelection) -> Result<Snapshot> {
        let fetch_start = Instant::now();
        let bytes = fetch_bytes(&self.client, &self.feed_url).await?;
        let elapsed = fetch_start.elapsed();
        if elapsed.as_secs() > SLOW_FETCH_SECS {
            warn!(elapsed_secs = elapsed.as_secs(), "Feed fetch was slow");
        }
        debug!(bytes = bytes.len(), "Feed bytes received, parsing");

        let parsed = parse_feed(&bytes)?;
        if parsed.skipped > 0 {
            debug!(skipped = parsed.skipped, "Features skipped");
        }
        self.last_skipped = parsed.skipped;

        Ok(build_snapshot(&parsed.records, filter, &mut self.series))
    }

    /// Runs one refresh cycle.
    ///
    /// A failed fetch or parse is logged and dropped; the dashboard keeps
    /// showing the previous snapshot. On success every record at or above
    /// the alert magnitude raises one alert, then the dashboard is redrawn.
    pub async fn tick(&mut self, filter: &FilterSelection) {
        let snapshot = match self.refresh(filter).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(error = %format!("{e:#}"), "Error fetching earthquake data");
                return;
            }
        };

        for record in snapshot.alerts() {
            warn!(
                magnitude = ?record.magnitude,
                place = %record.place,
                "Major earthquake detected"
            );
            if let Err(e) = self.dashboard.alert(record) {
                error!(error = %e, "Failed to raise alert");
            }
        }

        if let Err(e) = self.dashboard.render(&snapshot) {
            error!(error = %e, "Failed to render dashboard");
        }

        if let Some(path) = &self.history_path {
            let row = HistoryRow::new(&snapshot.summary, filter, self.last_skipped);
            if let Err(e) = append_record(path, &row) {
                error!(path = %path.display(), error = %e, "Failed to write history row");
            }
        }

        info!(
            total = snapshot.summary.total,
            strong = snapshot.summary.strong,
            min_magnitude = filter.min_magnitude,
            region = %filter.region,
            "Refresh complete"
        );

        self.current = Some(snapshot);
    }

    /// Refreshes immediately, then once per `interval` and after every filter
    /// change or `refresh` line from `controls`, until `cycles` timer refreshes
    /// have run (0 = no limit), a `quit` line arrives, or `shutdown` resolves.
    ///
    /// Each refresh is awaited before the next event is taken, so refreshes
    /// never overlap; a tick that comes due mid-refresh is delayed. `shutdown`
    /// is also raced against the refresh in flight, which is dropped without
    /// touching the current snapshot. Returns the number of timer refreshes.
    pub async fn run<F>(
        &mut self,
        mut filter: FilterSelection,
        interval: Duration,
        cycles: usize,
        mut controls: mpsc::Receiver<String>,
        shutdown: F,
    ) -> usize
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut ticker = tokio::time::interval(interval.max(MIN_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut controls_open = true;
        let mut completed = 0;

        loop {
            // Check if we've reached the cycle limit (0 = infinite)
            if cycles > 0 && completed >= cycles {
                break;
            }

            let step = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Interrupted");
                    break;
                }
                _ = ticker.tick() => Step::Timer,
                line = controls.recv(), if controls_open => match line {
                    Some(line) => handle_line(&line, &mut filter),
                    None => {
                        debug!("Controls closed");
                        controls_open = false;
                        Step::Idle
                    }
                },
            };

            match step {
                Step::Quit => break,
                Step::Idle => continue,
                Step::Timer | Step::Refresh => {}
            }

            let interrupted = tokio::select! {
                biased;
                _ = &mut shutdown => true,
                _ = self.tick(&filter) => false,
            };
            if interrupted {
                info!("Interrupted during refresh");
                break;
            }

            if let Step::Timer = step {
                completed += 1;
            }
        }

        info!(completed, "Stopped watching");
        completed
    }
}

fn handle_line(line: &str, filter: &mut FilterSelection) -> Step {
    match Control::parse(line) {
        Ok(Some(Control::Quit)) => Step::Quit,
        Ok(Some(Control::Refresh)) => Step::Refresh,
        Ok(Some(control)) => {
            if control.apply(filter) {
                info!(
                    min_magnitude = filter.min_magnitude,
                    region = %filter.region,
                    "Filter changed"
                );
                Step::Refresh
            } else {
                Step::Idle
            }
        }
        Ok(None) => Step::Idle,
        Err(e) => {
            warn!(error = %e, "Ignoring command");
            Step::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Region;
    use crate::stats::Histogram;

    fn record(magnitude: f64, place: &str) -> QuakeRecord {
        QuakeRecord {
            magnitude: Some(magnitude),
            place: place.to_string(),
            time_ms: Some(1_700_000_000_000),
            longitude: -120.0,
            latitude: 36.0,
        }
    }

    fn california() -> Vec<QuakeRecord> {
        vec![record(4.0, "California"), record(6.5, "California")]
    }

    #[test]
    fn test_no_filter() {
        let mut series = RollingSeries::default();
        let snap = build_snapshot(&california(), &FilterSelection::default(), &mut series);

        assert_eq!(snap.summary.total, 2);
        assert_eq!(snap.summary.strong, 1);
        assert_eq!(snap.summary.histogram, Histogram([1, 0, 0, 1, 0]));
        assert_eq!(snap.markers.len(), 2);
    }

    #[test]
    fn test_min_magnitude_excludes_entirely() {
        let mut series = RollingSeries::default();
        let filter = FilterSelection::new(5.0, Region::All);
        let snap = build_snapshot(&california(), &filter, &mut series);

        assert_eq!(snap.summary.total, 1);
        assert_eq!(snap.summary.strong, 1);
        assert_eq!(snap.summary.histogram, Histogram([0, 0, 0, 1, 0]));
        assert_eq!(snap.markers.len(), 1);
        assert_eq!(snap.markers[0].magnitude, Some(6.5));
    }

    #[test]
    fn test_region_without_match() {
        let mut series = RollingSeries::default();
        let filter = FilterSelection::new(0.0, Region::from_token("Japan"));
        let snap = build_snapshot(&california(), &filter, &mut series);

        assert_eq!(snap.summary.total, 0);
        assert_eq!(snap.summary.strong, 0);
        assert_eq!(snap.summary.histogram, Histogram([0; 5]));
        assert!(snap.markers.is_empty());
        assert_eq!(snap.series.last().unwrap().count, 0);
    }

    #[test]
    fn test_series_records_each_build() {
        let mut series = RollingSeries::with_capacity(2);
        let filter = FilterSelection::default();
        build_snapshot(&california(), &filter, &mut series);
        build_snapshot(&california()[..1], &filter, &mut series);
        let snap = build_snapshot(&[], &filter, &mut series);

        let counts: Vec<_> = snap.series.iter().map(|p| p.count).collect();
        assert_eq!(counts, [1, 0]);
    }

    #[test]
    fn test_alerts_only_for_major_records() {
        let mut series = RollingSeries::default();
        let records = vec![record(7.2, "Tonga"), record(6.9, "Fiji"), record(7.0, "Samoa")];
        let snap = build_snapshot(&records, &FilterSelection::default(), &mut series);

        let places: Vec<_> = snap.alerts().map(|r| r.place.as_str()).collect();
        assert_eq!(places, ["Tonga", "Samoa"]);
    }
}
