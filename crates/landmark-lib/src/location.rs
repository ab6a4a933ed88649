//! Landmark records and dataset loading
//!
//! Landmark datasets are JSON arrays written by the scraper that feeds the store.
//! Its records use the keys `名稱` / `地址` / `經度` / `緯度` / `類型`; the English
//! names are accepted too so hand-written fixtures stay readable.

use crate::{Coordinate, Result, StoreError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A stored point of interest
#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    pub name: String,
    pub address: String,
    pub position: Coordinate,
    /// Category tags in source order
    pub tags: Vec<String>,
}

impl Location {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        position: Coordinate,
        tags: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            position,
            tags,
        }
    }

    /// Flatten into the record shape handed to the presentation layer
    pub fn to_record(&self) -> LocationRecord {
        LocationRecord {
            name: self.name.clone(),
            address: self.address.clone(),
            longitude: self.position.lng,
            latitude: self.position.lat,
            category_tags: self.tags.clone(),
        }
    }
}

/// Presentation record: the same field selection for filtered and unfiltered listings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub name: String,
    pub address: String,
    pub longitude: f64,
    pub latitude: f64,
    pub category_tags: Vec<String>,
}

/// Degrees are sometimes exported as strings, and sometimes as junk
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Degrees {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

impl Degrees {
    fn value(&self) -> Option<f64> {
        match self {
            Degrees::Number(v) => Some(*v),
            Degrees::Text(s) => s.trim().parse().ok(),
            Degrees::Other(_) => None,
        }
    }
}

/// One element of the scraper's JSON output
#[derive(Debug, Deserialize)]
struct RawLandmark {
    #[serde(rename = "名稱", alias = "name")]
    name: String,
    #[serde(rename = "地址", alias = "address", default)]
    address: Option<String>,
    #[serde(rename = "經度", alias = "longitude", default)]
    longitude: Option<Degrees>,
    #[serde(rename = "緯度", alias = "latitude", default)]
    latitude: Option<Degrees>,
    #[serde(rename = "類型", alias = "types", default)]
    types: Vec<String>,
}

impl RawLandmark {
    fn into_location(self) -> Result<Location> {
        let lat = self.latitude.as_ref().and_then(Degrees::value);
        let lng = self.longitude.as_ref().and_then(Degrees::value);
        let (Some(lat), Some(lng)) = (lat, lng) else {
            return Err(StoreError::InvalidRecord(format!(
                "unparsable coordinates for {:?}",
                self.name
            )));
        };

        let position = Coordinate::new(lat, lng);
        if !position.is_valid() {
            return Err(StoreError::InvalidRecord(format!(
                "coordinates out of range for {:?}: ({lat}, {lng})",
                self.name
            )));
        }

        Ok(Location {
            name: self.name,
            address: self.address.unwrap_or_default(),
            position,
            tags: self.types,
        })
    }
}

/// Parse a JSON array of landmarks.
///
/// Records whose coordinates cannot be used are skipped with a warning; a document
/// that is not an array of landmark objects is an error.
pub fn parse_locations(json: &str) -> Result<Vec<Location>> {
    #[cfg(feature = "profiling")]
    profiling::scope!("location::parse_locations");

    let raw: Vec<RawLandmark> = serde_json::from_str(json)?;
    let total = raw.len();

    let locations: Vec<Location> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, landmark)| match landmark.into_location() {
            Ok(location) => Some(location),
            Err(e) => {
                tracing::warn!(index, "Skipping landmark: {}", e);
                None
            }
        })
        .collect();

    tracing::debug!(total, kept = locations.len(), "Parsed landmark records");
    Ok(locations)
}

/// Read and parse a landmark JSON file
pub fn load_locations<P: AsRef<Path>>(path: P) -> Result<Vec<Location>> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let locations = parse_locations(&text)?;
    tracing::info!(
        "Loaded {} landmarks from {}",
        locations.len(),
        path.as_ref().display()
    );
    Ok(locations)
}
