//! In-memory backend and recording view shared by unit tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::StatusCode;

use crate::api::SearchBackend;
use crate::api::dto::ProcessGeometryResponse;
use crate::domain::{
    AoiMode, Geometry, ImageDetails, ImageRecord, ImportFile, ImportSource, PaginationState,
    SearchPage, SearchQuery, Station, StationLevelReading, StationMarker, WaterLevelInfo,
};
use crate::error::{ExplorerError, Result};
use crate::view::ViewBinding;

/// Serves `total` generated records page by page and records every query.
#[derive(Debug, Default)]
pub(crate) struct FakeBackend {
    pub total: usize,
    pub fail_on_page: Option<u32>,
    pub fail_lookups: bool,
    pub no_links: bool,
    pub auth_url: Option<String>,
    pub stations: Vec<Station>,
    pub readings: Vec<StationLevelReading>,
    pub queries: Mutex<Vec<SearchQuery>>,
    pub station_fetches: AtomicUsize,
    pub level_fetches: AtomicUsize,
}

impl FakeBackend {
    pub fn with_records(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn search_calls(&self) -> usize {
        self.queries.lock().map(|q| q.len()).unwrap_or_default()
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.queries
            .lock()
            .map(|q| q.iter().map(|query| query.page).collect())
            .unwrap_or_default()
    }
}

pub(crate) fn bad_gateway(path: &str) -> ExplorerError {
    ExplorerError::HttpStatus {
        status: StatusCode::BAD_GATEWAY,
        url: format!("http://localhost:5000/api/{path}"),
    }
}

pub(crate) fn record(index: usize) -> ImageRecord {
    ImageRecord {
        id: format!("S2A_MSIL2A_{index:04}"),
        date: Some(format!("2024-06-{:02}T10:30:31Z", 1 + index % 28)),
        cloud_coverage: 5.0,
        preview_url: Some(format!("https://example.org/{index}.png")),
        bands: vec!["B04".to_string(), "B03".to_string(), "B02".to_string()],
        sun_elevation: Some(45.5),
        sun_azimuth: Some(160.25),
        water_level: (index % 2 == 0).then(|| WaterLevelInfo {
            value: Some(12.5),
            station_id: Some("30336".to_string()),
            station_name: Some("Aarhus, Havn".to_string()),
            ..WaterLevelInfo::default()
        }),
        metadata: None,
    }
}

pub(crate) fn station(id: &str, lat: f64, lon: f64) -> Station {
    Station {
        station_id: id.to_string(),
        name: Some(format!("Station {id}")),
        coordinates: Some(vec![lon, lat]),
        latitude: None,
        longitude: None,
        parameter_ids: vec!["sealev_dvr".to_string()],
    }
}

impl SearchBackend for FakeBackend {
    async fn search_images(&self, query: &SearchQuery) -> Result<SearchPage> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }
        if let Some(auth_url) = &self.auth_url {
            return Err(ExplorerError::AuthenticationRequired {
                auth_url: auth_url.clone(),
            });
        }
        if self.fail_on_page == Some(query.page) {
            return Err(bad_gateway("search_images"));
        }
        let limit = query.limit as usize;
        let start = (query.page as usize - 1) * limit;
        let end = (start + limit).min(self.total);
        let records: Vec<ImageRecord> = (start..end).map(record).collect();
        let pagination = PaginationState::from_response(
            query.page,
            query.limit,
            u32::try_from(self.total).unwrap_or(u32::MAX),
            end < self.total,
            query.page > 1,
            records.len(),
        );
        Ok(SearchPage {
            records,
            pagination,
        })
    }

    async fn download_links(&self, image_id: &str) -> Result<BTreeMap<String, String>> {
        if self.fail_lookups {
            return Err(bad_gateway("download_links"));
        }
        if self.no_links {
            return Ok(BTreeMap::new());
        }
        Ok(["B02", "B03"]
            .iter()
            .map(|band| {
                (
                    (*band).to_string(),
                    format!("https://example.org/{image_id}/{band}.tif"),
                )
            })
            .collect())
    }

    async fn image_details(&self, image_id: &str) -> Result<ImageDetails> {
        if self.fail_lookups {
            return Err(bad_gateway("image_details"));
        }
        let mut properties = serde_json::Map::new();
        properties.insert("datetime".to_string(), "2024-06-01T10:30:31Z".into());
        properties.insert("eo:cloud_cover".to_string(), 5.0.into());
        Ok(ImageDetails {
            id: image_id.to_string(),
            properties,
            assets: BTreeMap::new(),
            geometry: None,
            bbox: None,
        })
    }

    async fn water_level_stations(&self) -> Result<Vec<Station>> {
        self.station_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookups {
            return Err(bad_gateway("water_level_stations"));
        }
        Ok(self.stations.clone())
    }

    async fn water_level_at_time(&self, _time: DateTime<Utc>) -> Result<Vec<StationLevelReading>> {
        self.level_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.readings.clone())
    }

    async fn process_geometry(&self, _source: &ImportSource) -> Result<ProcessGeometryResponse> {
        Ok(ProcessGeometryResponse {
            geometry: Geometry::rectangle(10.0, 55.0, 11.0, 56.0),
            sentinel_images: (0..3).map(record).collect(),
        })
    }
}

/// Records every view call; form accessors return the public fields.
#[derive(Debug, Default)]
pub(crate) struct RecordingView {
    pub mode: AoiMode,
    pub wkt: String,
    pub file: Option<ImportFile>,
    pub dates: (Option<NaiveDate>, Option<NaiveDate>),
    pub cloud: Option<u8>,
    pub time: Option<DateTime<Utc>>,
    pub confirm_answer: bool,
    pub busy: Vec<bool>,
    pub results: Vec<String>,
    pub pagination: Vec<String>,
    pub alerts: Vec<String>,
    pub confirms: Vec<String>,
    pub statuses: Vec<(String, bool)>,
    pub modals: Vec<String>,
    pub modal_hides: usize,
    pub redirects: Vec<String>,
    pub files: Vec<(String, String, Vec<u8>)>,
    pub markers: Vec<StationMarker>,
}

impl ViewBinding for RecordingView {
    fn aoi_mode(&self) -> AoiMode {
        self.mode
    }

    fn wkt_text(&self) -> String {
        self.wkt.clone()
    }

    fn import_file(&self) -> Option<ImportFile> {
        self.file.clone()
    }

    fn date_range(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        self.dates
    }

    fn max_cloud_coverage(&self) -> Option<u8> {
        self.cloud
    }

    fn selected_time(&self) -> Option<DateTime<Utc>> {
        self.time
    }

    fn set_search_busy(&mut self, busy: bool) {
        self.busy.push(busy);
    }

    fn show_results(&mut self, html: &str) {
        self.results.push(html.to_string());
    }

    fn show_pagination(&mut self, html: &str) {
        self.pagination.push(html.to_string());
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.confirms.push(message.to_string());
        self.confirm_answer
    }

    fn status(&mut self, message: &str, is_error: bool) {
        self.statuses.push((message.to_string(), is_error));
    }

    fn show_modal(&mut self, html: &str) {
        self.modals.push(html.to_string());
    }

    fn hide_modal(&mut self) {
        self.modal_hides += 1;
    }

    fn redirect(&mut self, url: &str) {
        self.redirects.push(url.to_string());
    }

    fn deliver_file(&mut self, name: &str, content_type: &str, bytes: &[u8]) {
        self.files
            .push((name.to_string(), content_type.to_string(), bytes.to_vec()));
    }

    fn show_station_markers(&mut self, markers: &[StationMarker], _labels_html: &[String]) {
        self.markers = markers.to_vec();
    }

    fn clear_station_markers(&mut self) {
        self.markers.clear();
    }
}
