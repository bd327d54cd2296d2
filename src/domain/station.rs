//! Water-level stations, readings and map markers.

use serde::{Deserialize, Serialize};

/// A fixed sensor location reporting water levels against DVR90.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    /// Station identifier.
    pub station_id: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// GeoJSON `[lon, lat]` point.
    #[serde(default)]
    pub coordinates: Option<Vec<f64>>,
    /// Latitude, when provided as a separate field.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude, when provided as a separate field.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Parameters the station measures.
    #[serde(default, rename = "parameterId")]
    pub parameter_ids: Vec<String>,
}

impl Station {
    /// Resolves `(lat, lon)`, preferring the explicit fields over the
    /// GeoJSON coordinates. `None` when neither is usable.
    #[must_use]
    pub fn position(&self) -> Option<(f64, f64)> {
        let explicit = self.latitude.zip(self.longitude);
        let from_point = self.coordinates.as_deref().and_then(|c| match c {
            [lon, lat, ..] => Some((*lat, *lon)),
            _ => None,
        });
        explicit
            .filter(|&(lat, lon)| valid_lat_lon(lat, lon))
            .or_else(|| from_point.filter(|&(lat, lon)| valid_lat_lon(lat, lon)))
    }

    /// Name for display, falling back to a placeholder.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed Station")
    }
}

fn valid_lat_lon(lat: f64, lon: f64) -> bool {
    lat.is_finite() && lon.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

/// Water level of one station at the selected time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationLevelReading {
    /// Station identifier; joins to [`Station::station_id`].
    pub station_id: String,
    /// Level in cm, `None` when the station had no reading.
    #[serde(default)]
    pub water_level: Option<f64>,
    /// Observation timestamp.
    #[serde(default, rename = "observed")]
    pub observed_at: Option<String>,
}

/// Hex color of a marker fill (e.g. `#ff0000`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerColor(String);

impl MarkerColor {
    /// Wraps a CSS color string.
    #[must_use]
    pub fn new(css: impl Into<String>) -> Self {
        Self(css.into())
    }

    /// The CSS color string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Red.
pub const RED: &str = "#ff0000";
/// Orange.
pub const ORANGE: &str = "#ffa500";
/// Blue.
pub const BLUE: &str = "#3388ff";
/// Green.
pub const GREEN: &str = "#2e8b57";
/// Purple.
pub const PURPLE: &str = "#800080";
/// Gray, used for stations without data.
pub const GRAY: &str = "#808080";

/// Step function from water level to marker color.
///
/// Thresholds are checked in descending order; the first one strictly below
/// the level wins. Levels at or below every threshold get `floor`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    steps: Vec<(f64, MarkerColor)>,
    floor: MarkerColor,
    no_data: MarkerColor,
}

impl Default for ColorScale {
    fn default() -> Self {
        Self::new(
            vec![
                (30.0, MarkerColor::new(RED)),
                (15.0, MarkerColor::new(ORANGE)),
                (0.0, MarkerColor::new(BLUE)),
                (-15.0, MarkerColor::new(GREEN)),
            ],
            MarkerColor::new(PURPLE),
            MarkerColor::new(GRAY),
        )
    }
}

impl ColorScale {
    /// Builds a scale; steps are sorted by descending threshold.
    #[must_use]
    pub fn new(mut steps: Vec<(f64, MarkerColor)>, floor: MarkerColor, no_data: MarkerColor) -> Self {
        steps.sort_by(|a, b| b.0.total_cmp(&a.0));
        Self {
            steps,
            floor,
            no_data,
        }
    }

    /// Color for a level, or the no-data color.
    #[must_use]
    pub fn resolve(&self, level: Option<f64>) -> &MarkerColor {
        let Some(level) = level.filter(|l| l.is_finite()) else {
            return &self.no_data;
        };
        self.steps
            .iter()
            .find(|(threshold, _)| level > *threshold)
            .map_or(&self.floor, |(_, color)| color)
    }
}

/// Text shown under a marker without a reading.
pub const NO_DATA_LABEL: &str = "No data";

/// A station placed on the map with its current reading.
#[derive(Debug, Clone, PartialEq)]
pub struct StationMarker {
    /// Station identifier.
    pub station_id: String,
    /// Display name.
    pub name: String,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
    /// Fill color.
    pub color: MarkerColor,
    /// Label text (`"12.34 cm"` or `"No data"`).
    pub label: String,
    /// Whether a reading was available.
    pub has_data: bool,
}

impl StationMarker {
    /// Marker for a station, with or without a level.
    #[must_use]
    pub fn new(station: &Station, lat: f64, lon: f64, level: Option<f64>, scale: &ColorScale) -> Self {
        let level = level.filter(|l| l.is_finite());
        Self {
            station_id: station.station_id.clone(),
            name: station.display_name().to_string(),
            lat,
            lon,
            color: scale.resolve(level).clone(),
            label: level.map_or_else(|| NO_DATA_LABEL.to_string(), |l| format!("{l:.2} cm")),
            has_data: level.is_some(),
        }
    }
}
