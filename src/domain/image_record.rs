//! Satellite scene records returned by the search backend.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Water level joined to a scene from the nearest station.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterLevelInfo {
    /// Reading in cm relative to DVR90; `None` when unavailable.
    #[serde(default)]
    pub value: Option<f64>,
    /// Observation timestamp of the reading.
    #[serde(default)]
    pub observed: Option<String>,
    /// Station identifier.
    #[serde(default)]
    pub station_id: Option<String>,
    /// Station display name.
    #[serde(default)]
    pub station_name: Option<String>,
    /// Distance from scene center to the station, in degrees.
    #[serde(default)]
    pub station_distance: Option<f64>,
    /// Measured parameter (e.g. `sealev_dvr`).
    #[serde(default)]
    pub parameter_id: Option<String>,
    /// Explanation when no value is available.
    #[serde(default)]
    pub message: Option<String>,
}

/// Platform metadata attached to a scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Satellite platform.
    #[serde(default)]
    pub platform: Option<String>,
    /// Instrument name.
    #[serde(default)]
    pub instrument: Option<String>,
    /// Product type (e.g. `L2A`).
    #[serde(default, rename = "productType")]
    pub product_type: Option<String>,
    /// EPSG code of the footprint.
    #[serde(default)]
    pub epsg: Option<u32>,
    /// Orbit direction.
    #[serde(default)]
    pub orbit: Option<String>,
    /// Tile identifier.
    #[serde(default)]
    pub tile_id: Option<String>,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Scene identifier (without the `.SAFE` suffix).
    pub id: String,
    /// Acquisition time as ISO-8601 text.
    #[serde(default)]
    pub date: Option<String>,
    /// Cloud cover in percent.
    #[serde(default, rename = "cloudCoverage")]
    pub cloud_coverage: f64,
    /// Quick-look image URL.
    #[serde(default)]
    pub preview_url: Option<String>,
    /// Available spectral bands.
    #[serde(default)]
    pub bands: Vec<String>,
    /// Sun elevation in degrees.
    #[serde(default)]
    pub sun_elevation: Option<f64>,
    /// Sun azimuth in degrees.
    #[serde(default)]
    pub sun_azimuth: Option<f64>,
    /// Joined water level.
    #[serde(default, rename = "waterLevel")]
    pub water_level: Option<WaterLevelInfo>,
    /// Platform metadata.
    #[serde(default)]
    pub metadata: Option<ImageMetadata>,
}

impl ImageRecord {
    /// Parsed acquisition time, `None` when missing or malformed.
    #[must_use]
    pub fn acquired_at(&self) -> Option<DateTime<Utc>> {
        self.date.as_deref().and_then(parse_timestamp)
    }
}

/// Parses RFC 3339 text, or a naive ISO-8601 timestamp taken as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Single asset of a STAC-like item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Download URL.
    pub href: String,
    /// Human-readable title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Media type.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

/// Full STAC-like item from `GET /api/image_details/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDetails {
    /// Item identifier.
    pub id: String,
    /// Free-form properties.
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
    /// Assets keyed by name.
    #[serde(default)]
    pub assets: BTreeMap<String, Asset>,
    /// Footprint, kept as raw GeoJSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<serde_json::Value>,
    /// Footprint bounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
}

impl ImageDetails {
    /// Water level joined by the backend under `properties.waterLevel`.
    #[must_use]
    pub fn water_level(&self) -> Option<WaterLevelInfo> {
        self.properties
            .get("waterLevel")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}
