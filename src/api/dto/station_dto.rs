//! Water-level station DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::{Station, StationLevelReading};

/// Response body for `GET /api/water_level_stations`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationsResponse {
    /// All stations reporting DVR90 sea level.
    #[serde(default)]
    pub stations: Vec<Station>,
}

/// Response body for `GET /api/water_level_at_time`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationLevelsResponse {
    /// One entry per station; the level is `null` without a reading.
    #[serde(default)]
    pub station_levels: Vec<StationLevelReading>,
}
