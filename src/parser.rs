//! GeoJSON parser for the earthquake summary feed.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::record::QuakeRecord;

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<String>,
    properties: Properties,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
struct Properties {
    #[serde(default)]
    mag: Option<f64>,
    #[serde(default)]
    place: Option<String>,
    #[serde(default)]
    time: Option<i64>,
}

#[derive(Deserialize)]
struct Geometry {
    coordinates: Vec<f64>,
}

/// Records decoded from one feed document.
#[derive(Debug, Default)]
pub struct ParsedFeed {
    pub records: Vec<QuakeRecord>,
    /// Features dropped for lacking a coordinate pair.
    pub skipped: usize,
}

/// Decodes a GeoJSON `FeatureCollection` into [`QuakeRecord`]s.
///
/// # Errors
///
/// Returns an error if the bytes are not JSON or lack a `features` array.
/// Features without a location are skipped, not reported. A null magnitude
/// or time is carried through as `None`.
pub fn parse_feed(bytes: &[u8]) -> Result<ParsedFeed> {
    let collection: FeatureCollection = serde_json::from_slice(bytes)
        .context("feed is not a GeoJSON feature collection")?;

    let mut parsed = ParsedFeed::default();

    for feature in collection.features {
        match into_record(feature.properties, feature.geometry) {
            Some(record) => parsed.records.push(record),
            None => {
                debug!(id = ?feature.id, "Skipping feature with missing fields");
                parsed.skipped += 1;
            }
        }
    }

    Ok(parsed)
}

fn into_record(properties: Properties, geometry: Option<Geometry>) -> Option<QuakeRecord> {
    let coordinates = geometry?.coordinates;
    let (&longitude, &latitude) = (coordinates.first()?, coordinates.get(1)?);

    Some(QuakeRecord {
        magnitude: properties.mag,
        place: properties.place.unwrap_or_default(),
        time_ms: properties.time,
        longitude,
        latitude,
    })
}
