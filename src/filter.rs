//! User-selected record filters.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fmt;

use crate::record::QuakeRecord;

/// Token that disables region filtering.
pub const ALL_REGIONS: &str = "all";

/// Region selection, matched as a case-sensitive substring of the place text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum Region {
    #[default]
    All,
    Substring(String),
}

impl Region {
    pub fn from_token(token: &str) -> Self {
        if token == ALL_REGIONS {
            Region::All
        } else {
            Region::Substring(token.to_string())
        }
    }

    pub fn matches(&self, place: &str) -> bool {
        match self {
            Region::All => true,
            Region::Substring(token) => place.contains(token.as_str()),
        }
    }
}

impl From<String> for Region {
    fn from(token: String) -> Self {
        Region::from_token(&token)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::All => f.write_str(ALL_REGIONS),
            Region::Substring(token) => f.write_str(token),
        }
    }
}

/// Filter applied to every record on each refresh.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterSelection {
    pub min_magnitude: f64,
    pub region: Region,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            min_magnitude: 0.0,
            region: Region::All,
        }
    }
}

impl FilterSelection {
    pub fn new(min_magnitude: f64, region: Region) -> Self {
        Self {
            min_magnitude,
            region,
        }
    }

    /// A record is included iff it meets the magnitude threshold and its
    /// place matches the region. A null magnitude only passes a threshold
    /// of zero or below.
    pub fn matches(&self, record: &QuakeRecord) -> bool {
        record.magnitude_value() >= self.min_magnitude && self.region.matches(&record.place)
    }
}

/// Parses a user-entered minimum magnitude.
///
/// Rejects non-numeric and non-finite input rather than letting it disable
/// the threshold.
pub fn parse_min_magnitude(input: &str) -> Result<f64> {
    let value: f64 = input
        .trim()
        .parse()
        .with_context(|| format!("invalid minimum magnitude: {input:?}"))?;
    if !value.is_finite() {
        bail!("minimum magnitude must be finite, got {input:?}");
    }
    Ok(value)
}
