//! Mock SHORE backend on an ephemeral port plus a recording view.

#![allow(dead_code, clippy::panic)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Value, json};

use shore_explorer::config::ExplorerConfig;
use shore_explorer::domain::{AoiMode, ImportFile, StationMarker};
use shore_explorer::view::ViewBinding;

/// Behaviour knobs and request log of the mock backend.
#[derive(Debug, Default)]
pub struct MockState {
    /// Number of scenes the search endpoint pretends to have.
    pub total: usize,
    /// Answer every search with the auth-required signal.
    pub require_auth: bool,
    /// Fail this search page with a 500.
    pub fail_page: Option<u64>,
    /// Bodies of every search request, in arrival order.
    pub search_bodies: Mutex<Vec<Value>>,
    /// `time` parameter of every level request.
    pub level_times: Mutex<Vec<String>>,
    /// `bands` parameter of every download-links request.
    pub link_bands: Mutex<Vec<String>>,
}

impl MockState {
    /// State serving `total` scenes.
    pub fn with_total(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Pages requested so far.
    pub fn pages(&self) -> Vec<u64> {
        self.search_bodies
            .lock()
            .map(|bodies| bodies.iter().filter_map(|b| b["page"].as_u64()).collect())
            .unwrap_or_default()
    }
}

type Shared = Arc<MockState>;

fn scene(index: usize) -> Value {
    json!({
        "id": format!("S2B_MSIL2A_2024060{}T103629_N0510_R008_T32VNH_{index:04}", 1 + index % 9),
        "date": format!("2024-06-0{}T10:36:29.024000+00:00", 1 + index % 9),
        "cloudCoverage": 3.25,
        "preview_url": format!("https://example.org/ql/{index}.jpg"),
        "bands": ["B02", "B03", "B04"],
        "sun_elevation": 54.1,
        "sun_azimuth": 161.7,
        "waterLevel": {"value": 12.0, "stationId": "30336", "stationName": "Aarhus, Havn"}
    })
}

async fn search_images(State(state): State<Shared>, Json(body): Json<Value>) -> impl IntoResponse {
    if let Ok(mut bodies) = state.search_bodies.lock() {
        bodies.push(body.clone());
    }
    if state.require_auth {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Not authenticated with OpenEO", "auth_url": "/openeo/login"})),
        );
    }
    let page = body["page"].as_u64().unwrap_or(1);
    if state.fail_page == Some(page) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "STAC search failed"})),
        );
    }
    let limit = body["limit"].as_u64().unwrap_or(20);
    let start = usize::try_from(page.saturating_sub(1) * limit).unwrap_or(usize::MAX);
    let end = start.saturating_add(usize::try_from(limit).unwrap_or(0)).min(state.total);
    let images: Vec<Value> = (start.min(end)..end).map(scene).collect();
    (
        StatusCode::OK,
        Json(json!({
            "images": images,
            "pagination": {
                "page": page,
                "limit": limit,
                "total": state.total,
                "next": end < state.total,
                "prev": page > 1
            }
        })),
    )
}

async fn download_links(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let bands = params.get("bands").cloned().unwrap_or_default();
    if let Ok(mut seen) = state.link_bands.lock() {
        seen.push(bands.clone());
    }
    let links: serde_json::Map<String, Value> = bands
        .split(',')
        .filter(|b| !b.is_empty())
        .map(|band| (band.to_string(), json!(format!("https://example.org/{id}/{band}.tif"))))
        .collect();
    Json(json!({ "links": links }))
}

async fn image_details(Path(id): Path<String>) -> Json<Value> {
    Json(json!({
        "id": id,
        "properties": {
            "datetime": "2024-06-01T10:36:29Z",
            "eo:cloud_cover": 3.25,
            "platform": "sentinel-2b",
            "waterLevel": {"value": 45.0, "stationId": "30336", "stationName": "Aarhus, Havn"}
        },
        "assets": {
            "B04": {"href": "https://example.org/B04.tif", "title": "Red", "type": "image/tiff"}
        },
        "bbox": [10.0, 55.0, 11.0, 56.0]
    }))
}

async fn water_level_stations() -> Json<Value> {
    Json(json!({
        "stations": [
            {"stationId": "30336", "name": "Aarhus, Havn", "coordinates": [10.2167, 56.15]},
            {"stationId": "20101", "name": "Fredericia", "latitude": 55.56, "longitude": 9.76},
            {"stationId": "99999", "name": "Nowhere"}
        ]
    }))
}

async fn water_level_at_time(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    if let (Ok(mut times), Some(time)) = (state.level_times.lock(), params.get("time")) {
        times.push(time.clone());
    }
    Json(json!({
        "stationLevels": [
            {"stationId": "30336", "waterLevel": 45.0, "observed": "2024-06-01T12:00:00Z"},
            {"stationId": "20101", "waterLevel": null},
            {"stationId": "11111", "waterLevel": 3.0}
        ]
    }))
}

async fn process_geometry(Json(body): Json<Value>) -> impl IntoResponse {
    if body["type"] != "wkt" && body["type"] != "file" {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "Invalid request type"})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[10.0, 55.0], [11.0, 55.0], [11.0, 56.0], [10.0, 56.0], [10.0, 55.0]]]
            },
            "sentinel_images": [scene(0), scene(1)]
        })),
    )
}

/// Running mock backend.
#[derive(Debug)]
pub struct MockBackend {
    /// Root URL, e.g. `http://127.0.0.1:41234`.
    pub base_url: String,
    /// Shared state of the handlers.
    pub state: Shared,
}

impl MockBackend {
    /// Explorer configuration pointing at this backend.
    pub fn config(&self) -> ExplorerConfig {
        let Ok(config) = ExplorerConfig::with_base_url(&self.base_url) else {
            panic!("mock url is valid");
        };
        config
    }
}

/// Serves the mock backend on `127.0.0.1:0`.
pub async fn spawn(state: MockState) -> MockBackend {
    let state = Arc::new(state);
    let app = Router::new()
        .route("/api/search_images", post(search_images))
        .route("/api/download_links/{id}", get(download_links))
        .route("/api/image_details/{id}", get(image_details))
        .route("/api/water_level_stations", get(water_level_stations))
        .route("/api/water_level_at_time", get(water_level_at_time))
        .route("/process_geometry", post(process_geometry))
        .with_state(Arc::clone(&state));

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind ephemeral port");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("local address");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    MockBackend {
        base_url: format!("http://{addr}"),
        state,
    }
}

/// View recording every sink call.
#[derive(Debug, Default)]
pub struct RecordingView {
    /// Geometry source.
    pub mode: AoiMode,
    /// Pasted WKT.
    pub wkt: String,
    /// Picked file.
    pub file: Option<ImportFile>,
    /// Date pickers.
    pub dates: (Option<NaiveDate>, Option<NaiveDate>),
    /// Station time picker.
    pub time: Option<DateTime<Utc>>,
    /// Answer given to confirmations.
    pub confirm_answer: bool,
    /// Busy toggles.
    pub busy: Vec<bool>,
    /// Rendered result tables.
    pub results: Vec<String>,
    /// Rendered page controls.
    pub pagination: Vec<String>,
    /// Alerts.
    pub alerts: Vec<String>,
    /// Confirmation questions.
    pub confirms: Vec<String>,
    /// Rendered modals.
    pub modals: Vec<String>,
    /// Redirect targets.
    pub redirects: Vec<String>,
    /// Delivered files as `(name, content type, bytes)`.
    pub files: Vec<(String, String, Vec<u8>)>,
    /// Drawn markers with their label HTML.
    pub markers: Vec<(StationMarker, String)>,
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
        None
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

    fn status(&mut self, _message: &str, _is_error: bool) {}

    fn show_modal(&mut self, html: &str) {
        self.modals.push(html.to_string());
    }

    fn hide_modal(&mut self) {}

    fn redirect(&mut self, url: &str) {
        self.redirects.push(url.to_string());
    }

    fn deliver_file(&mut self, name: &str, content_type: &str, bytes: &[u8]) {
        self.files
            .push((name.to_string(), content_type.to_string(), bytes.to_vec()));
    }

    fn show_station_markers(&mut self, markers: &[StationMarker], labels_html: &[String]) {
        self.markers = markers.iter().cloned().zip(labels_html.iter().cloned()).collect();
    }

    fn clear_station_markers(&mut self) {
        self.markers.clear();
    }
}
