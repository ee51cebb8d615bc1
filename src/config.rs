use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::filter::FilterSelection;

/// USGS summary feed covering the past 30 days.
pub const DEFAULT_FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_month.geojson";

pub const DEFAULT_REFRESH_SECS: u64 = 60;

/// Settings for the `watch` command.
///
/// Stored as JSON; every field is optional:
/// ```json
/// {
///   "feed_url": "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_day.geojson",
///   "refresh_secs": 120,
///   "filter": { "min_magnitude": 2.5, "region": "Alaska" },
///   "history": "data/history.csv"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub feed_url: String,
    pub refresh_secs: u64,
    pub filter: FilterSelection,
    pub history: Option<PathBuf>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            refresh_secs: DEFAULT_REFRESH_SECS,
            filter: FilterSelection::default(),
            history: None,
        }
    }
}

impl WatchConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Region;

    #[test]
    fn test_defaults() {
        let config = WatchConfig::default();
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.refresh_secs, 60);
        assert_eq!(config.filter, FilterSelection::default());
        assert!(config.history.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: WatchConfig =
            serde_json::from_str(r#"{"filter":{"min_magnitude":2.5,"region":"Alaska"}}"#).unwrap();

        assert_eq!(config.refresh_secs, DEFAULT_REFRESH_SECS);
        assert_eq!(config.filter.min_magnitude, 2.5);
        assert_eq!(config.filter.region, Region::from_token("Alaska"));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("quake_watch_test_config.json");
        std::fs::write(&path, r#"{"refresh_secs":5,"history":"h.csv"}"#).unwrap();

        let config = WatchConfig::load(&path).unwrap();
        assert_eq!(config.refresh_secs, 5);
        assert_eq!(config.history, Some(PathBuf::from("h.csv")));
        assert_eq!(config.filter.region, Region::All);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        assert!(WatchConfig::load(Path::new("/nonexistent/quake_watch.json")).is_err());
    }
}
