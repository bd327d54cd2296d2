//! Water-level station overlay.
//!
//! The station list is fetched once per session and cached in
//! [`StationOverlay`]; levels are refetched for every time change while the
//! overlay is shown.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::api::SearchBackend;
use crate::domain::{ColorScale, Station, StationLevelReading, StationMarker};
use crate::error::Result;

/// Load phase of the overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlayPhase {
    /// Stations never fetched, or the last fetch failed.
    #[default]
    Unloaded,
    /// Station list in flight.
    Loading,
    /// Station list cached.
    Loaded {
        /// A level fetch is in flight.
        updating: bool,
    },
}

/// Overlay state: cached stations plus the markers currently drawn.
#[derive(Debug, Clone, Default)]
pub struct StationOverlay {
    phase: OverlayPhase,
    visible: bool,
    stations: Vec<Station>,
    markers: Vec<StationMarker>,
    time: Option<DateTime<Utc>>,
}

impl StationOverlay {
    /// Creates an unloaded, hidden overlay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current load phase.
    #[must_use]
    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    /// Whether the overlay is switched on.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Cached stations that could be placed on the map.
    #[must_use]
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Markers for the last applied readings. Empty while hidden.
    #[must_use]
    pub fn markers(&self) -> &[StationMarker] {
        &self.markers
    }

    /// Time of the last applied readings.
    #[must_use]
    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.time
    }

    fn cache_stations(&mut self, stations: Vec<Station>) {
        let total = stations.len();
        self.stations = stations
            .into_iter()
            .filter(|station| {
                let placeable = station.position().is_some();
                if !placeable {
                    tracing::warn!(station_id = %station.station_id, "station has no usable position, skipping");
                }
                placeable
            })
            .collect();
        tracing::info!(total, placed = self.stations.len(), "stations cached");
        self.phase = OverlayPhase::Loaded { updating: false };
    }

    fn apply_readings(
        &mut self,
        time: DateTime<Utc>,
        readings: &[StationLevelReading],
        scale: &ColorScale,
    ) {
        let levels: HashMap<&str, Option<f64>> = readings
            .iter()
            .map(|r| (r.station_id.as_str(), r.water_level))
            .collect();
        self.markers = self
            .stations
            .iter()
            .filter_map(|station| {
                let (lat, lon) = station.position()?;
                let level = levels.get(station.station_id.as_str()).copied().flatten();
                Some(StationMarker::new(station, lat, lon, level, scale))
            })
            .collect();
        self.time = Some(time);
        self.phase = OverlayPhase::Loaded { updating: false };
        tracing::debug!(
            %time,
            readings = readings.len(),
            markers = self.markers.len(),
            "station readings applied"
        );
    }

    fn hide(&mut self) {
        self.visible = false;
        self.markers.clear();
    }
}

/// Fetches stations and readings into a [`StationOverlay`].
#[derive(Debug)]
pub struct StationService<B> {
    backend: Arc<B>,
    scale: ColorScale,
}

impl<B> Clone for StationService<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            scale: self.scale.clone(),
        }
    }
}

impl<B: SearchBackend> StationService<B> {
    /// Creates a new `StationService` coloring markers with `scale`.
    #[must_use]
    pub fn new(backend: Arc<B>, scale: ColorScale) -> Self {
        Self { backend, scale }
    }

    /// Shows the overlay, loading stations on first use, then readings
    /// for `time`.
    ///
    /// # Errors
    ///
    /// Propagates the backend error. A failed station fetch leaves the
    /// overlay unloaded so the next call retries.
    pub async fn enable(&self, overlay: &mut StationOverlay, time: DateTime<Utc>) -> Result<()> {
        overlay.visible = true;
        if overlay.phase == OverlayPhase::Unloaded {
            overlay.phase = OverlayPhase::Loading;
            match self.backend.water_level_stations().await {
                Ok(stations) => overlay.cache_stations(stations),
                Err(e) => {
                    overlay.phase = OverlayPhase::Unloaded;
                    overlay.visible = false;
                    return Err(e);
                }
            }
        }
        self.refresh(overlay, time).await
    }

    /// Refetches readings for a new time. Returns `false` without calling
    /// the backend when the overlay is hidden or not loaded.
    ///
    /// # Errors
    ///
    /// Propagates the backend error; the previous markers stay.
    pub async fn set_time(&self, overlay: &mut StationOverlay, time: DateTime<Utc>) -> Result<bool> {
        if !overlay.visible || !matches!(overlay.phase, OverlayPhase::Loaded { .. }) {
            tracing::debug!(%time, "overlay inactive, time change not fetched");
            return Ok(false);
        }
        self.refresh(overlay, time).await?;
        Ok(true)
    }

    /// Hides the overlay; the station cache is kept.
    pub fn disable(&self, overlay: &mut StationOverlay) {
        overlay.hide();
        tracing::debug!("station overlay hidden");
    }

    async fn refresh(&self, overlay: &mut StationOverlay, time: DateTime<Utc>) -> Result<()> {
        overlay.phase = OverlayPhase::Loaded { updating: true };
        let readings = match self.backend.water_level_at_time(time).await {
            Ok(readings) => readings,
            Err(e) => {
                overlay.phase = OverlayPhase::Loaded { updating: false };
                return Err(e);
            }
        };
        overlay.apply_readings(time, &readings, &self.scale);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::domain::station::{GRAY, RED};
    use crate::test_support::{FakeBackend, station};

    fn backend() -> Arc<FakeBackend> {
        let unplaceable = Station {
            station_id: "99999".to_string(),
            name: Some("Nowhere".to_string()),
            coordinates: None,
            latitude: None,
            longitude: None,
            parameter_ids: Vec::new(),
        };
        Arc::new(FakeBackend {
            stations: vec![station("30336", 56.15, 10.22), station("20101", 55.40, 10.39), unplaceable],
            readings: vec![
                StationLevelReading {
                    station_id: "30336".to_string(),
                    water_level: Some(45.0),
                    observed_at: None,
                },
                StationLevelReading {
                    station_id: "unknown".to_string(),
                    water_level: Some(3.0),
                    observed_at: None,
                },
            ],
            ..FakeBackend::default()
        })
    }

    #[tokio::test]
    async fn enable_places_only_positioned_stations() {
        let backend = backend();
        let service = StationService::new(Arc::clone(&backend), ColorScale::default());
        let mut overlay = StationOverlay::new();

        let Ok(()) = service.enable(&mut overlay, Utc::now()).await else {
            panic!("overlay enabled");
        };

        assert_eq!(overlay.phase(), OverlayPhase::Loaded { updating: false });
        assert_eq!(overlay.stations().len(), 2);
        let markers = overlay.markers();
        assert_eq!(markers.len(), 2);
        let Some(aarhus) = markers.iter().find(|m| m.station_id == "30336") else {
            panic!("marker present");
        };
        assert_eq!(aarhus.color.as_str(), RED);
        let Some(silent) = markers.iter().find(|m| m.station_id == "20101") else {
            panic!("marker present");
        };
        assert_eq!(silent.color.as_str(), GRAY);
        assert!(!silent.has_data);
    }

    #[tokio::test]
    async fn stations_are_fetched_once_per_session() {
        let backend = backend();
        let service = StationService::new(Arc::clone(&backend), ColorScale::default());
        let mut overlay = StationOverlay::new();

        let Ok(()) = service.enable(&mut overlay, Utc::now()).await else {
            panic!("first enable");
        };
        service.disable(&mut overlay);
        assert!(overlay.markers().is_empty());
        assert!(!overlay.stations().is_empty());
        let Ok(()) = service.enable(&mut overlay, Utc::now()).await else {
            panic!("second enable");
        };

        assert_eq!(backend.station_fetches.load(Ordering::SeqCst), 1);
        assert_eq!(backend.level_fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn time_change_fetches_only_while_visible() {
        let backend = backend();
        let service = StationService::new(Arc::clone(&backend), ColorScale::default());
        let mut overlay = StationOverlay::new();

        let Ok(false) = service.set_time(&mut overlay, Utc::now()).await else {
            panic!("unloaded overlay ignores time changes");
        };
        let Ok(()) = service.enable(&mut overlay, Utc::now()).await else {
            panic!("enabled");
        };
        let Ok(true) = service.set_time(&mut overlay, Utc::now()).await else {
            panic!("visible overlay refetches");
        };
        service.disable(&mut overlay);
        let Ok(false) = service.set_time(&mut overlay, Utc::now()).await else {
            panic!("hidden overlay ignores time changes");
        };

        assert_eq!(backend.level_fetches.load(Ordering::SeqCst), 2);
    }
}
