//! The seam between the explorer logic and the search backend.

use std::collections::BTreeMap;
use std::future::Future;

use chrono::{DateTime, Utc};

use super::dto::ProcessGeometryResponse;
use crate::domain::{ImageDetails, ImportSource, SearchPage, SearchQuery, Station, StationLevelReading};
use crate::error::Result;

/// Every backend call the explorer makes.
///
/// Implemented over HTTP by [`super::HttpBackend`]; tests substitute an
/// in-memory implementation.
pub trait SearchBackend: Send + Sync {
    /// `POST /api/search_images`.
    ///
    /// # Errors
    ///
    /// Network, status and decode errors, or
    /// [`crate::error::ExplorerError::AuthenticationRequired`].
    fn search_images(&self, query: &SearchQuery) -> impl Future<Output = Result<SearchPage>> + Send;

    /// `GET /api/download_links/{id}`: band name to URL.
    ///
    /// # Errors
    ///
    /// Network, status and decode errors.
    fn download_links(
        &self,
        image_id: &str,
    ) -> impl Future<Output = Result<BTreeMap<String, String>>> + Send;

    /// `GET /api/image_details/{id}`.
    ///
    /// # Errors
    ///
    /// Network, status and decode errors.
    fn image_details(&self, image_id: &str) -> impl Future<Output = Result<ImageDetails>> + Send;

    /// `GET /api/water_level_stations`.
    ///
    /// # Errors
    ///
    /// Network, status and decode errors.
    fn water_level_stations(&self) -> impl Future<Output = Result<Vec<Station>>> + Send;

    /// `GET /api/water_level_at_time?time=…`.
    ///
    /// # Errors
    ///
    /// Network, status and decode errors.
    fn water_level_at_time(
        &self,
        time: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<StationLevelReading>>> + Send;

    /// Legacy `POST /process_geometry`.
    ///
    /// # Errors
    ///
    /// Network, status and decode errors.
    fn process_geometry(
        &self,
        source: &ImportSource,
    ) -> impl Future<Output = Result<ProcessGeometryResponse>> + Send;
}
