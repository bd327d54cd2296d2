//! The explorer controller: every user-triggered operation.
//!
//! Each operation reads the form through the [`ViewBinding`], talks to the
//! backend through the services, updates [`AppState`] and re-renders.
//! Errors are surfaced to the view by [`ErrorKind`] before being returned,
//! and the search button is always restored.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::api::SearchBackend;
use crate::app_state::AppState;
use crate::config::ExplorerConfig;
use crate::domain::aoi::NO_IMPORT_MESSAGE;
use crate::domain::search_query::MAX_PAGE_SIZE;
use crate::domain::{
    AoiMode, Geometry, ImportParser, ImportSource, PaginationState, SearchQuery, SortBy,
    SortDirection,
};
use crate::error::{ErrorKind, ExplorerError, Result};
use crate::service::{
    CSV_CONTENT_TYPE, DetailService, SearchService, StationService, csv_for, drain_all_pages,
};
use crate::view::render::{pagination_controls, results_table, station_label_html};
use crate::view::{ModalContent, RenderOptions, ViewBinding};

/// Alert shown for any failed search request.
pub const SEARCH_FAILED_MESSAGE: &str = "An error occurred while searching for images.";

/// Alert shown for a failed download-links request.
pub const LINKS_FAILED_MESSAGE: &str = "An error occurred while loading the download links.";

/// Alert shown for a failed details request.
pub const DETAILS_FAILED_MESSAGE: &str = "An error occurred while loading the image details.";

/// Alert shown when the export drain fails.
pub const EXPORT_FAILED_MESSAGE: &str = "An error occurred while exporting the results.";

/// Alert shown when the station list cannot be loaded.
pub const STATIONS_FAILED_MESSAGE: &str = "Failed to load water level stations.";

/// Alert shown when readings for a new time cannot be loaded.
pub const LEVELS_FAILED_MESSAGE: &str = "Failed to load water level data.";

/// Alert shown when the backend cannot process an import.
pub const IMPORT_FAILED_MESSAGE: &str = "An error occurred while processing the imported geometry.";

/// Body of the modal shown for a scene without download links.
pub const NO_LINKS_MESSAGE: &str = "No download links are available for this image.";

/// Alert shown when there is nothing to export.
pub const NOTHING_TO_EXPORT_MESSAGE: &str = "No results to export. Run a search first.";

/// Operation an error came from; picks the alert for backend failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Search,
    Links,
    Details,
    Export,
    Stations,
    Levels,
    Import,
}

impl Action {
    const fn failed_message(self) -> &'static str {
        match self {
            Self::Search => SEARCH_FAILED_MESSAGE,
            Self::Links => LINKS_FAILED_MESSAGE,
            Self::Details => DETAILS_FAILED_MESSAGE,
            Self::Export => EXPORT_FAILED_MESSAGE,
            Self::Stations => STATIONS_FAILED_MESSAGE,
            Self::Levels => LEVELS_FAILED_MESSAGE,
            Self::Import => IMPORT_FAILED_MESSAGE,
        }
    }
}

/// Orchestrates state, backend and view.
#[derive(Debug)]
pub struct Controller<B, V> {
    config: ExplorerConfig,
    state: AppState,
    view: V,
    backend: Arc<B>,
    search: SearchService<B>,
    details: DetailService<B>,
    stations: StationService<B>,
    parser: ImportParser,
    render: RenderOptions,
}

impl<B: SearchBackend, V: ViewBinding> Controller<B, V> {
    /// Creates a controller with fresh state.
    #[must_use]
    pub fn new(config: ExplorerConfig, backend: Arc<B>, view: V) -> Self {
        let render = RenderOptions::from_config(&config);
        Self {
            state: AppState::new(&config),
            search: SearchService::new(Arc::clone(&backend)),
            details: DetailService::new(Arc::clone(&backend)),
            stations: StationService::new(Arc::clone(&backend), config.color_scale.clone()),
            parser: ImportParser,
            render,
            config,
            view,
            backend,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The bound view.
    #[must_use]
    pub fn view(&self) -> &V {
        &self.view
    }

    /// The bound view, mutably.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Manual search: reads the form, resolves the area of interest and
    /// fetches page 1.
    ///
    /// # Errors
    ///
    /// Validation, geometry and backend errors, after surfacing them.
    pub async fn search(&mut self) -> Result<()> {
        let query = match self.query_from_form() {
            Ok(query) => query,
            Err(e) => {
                self.surface(&e, Action::Search);
                return Err(e);
            }
        };
        self.run_query(query).await
    }

    /// Loads `page` of the last search.
    ///
    /// Does nothing before the first search.
    ///
    /// # Errors
    ///
    /// [`ExplorerError::Validation`] for a page outside `1..=total_pages`
    /// (no request is sent), otherwise backend errors. Both are surfaced.
    pub async fn go_to_page(&mut self, page: u32) -> Result<()> {
        let Some(last) = self.state.results.query().cloned() else {
            tracing::debug!(page, "no search yet, page change ignored");
            return Ok(());
        };
        let total_pages = self.state.pagination.total_pages().max(1);
        if !(1..=total_pages).contains(&page) {
            let e = ExplorerError::validation(format!(
                "Page {page} is out of range (1–{total_pages})."
            ));
            self.surface(&e, Action::Search);
            return Err(e);
        }
        self.state.form.page = page;
        self.run_query(last.with_page(page, last.limit)).await
    }

    /// Loads the following page, if any.
    ///
    /// # Errors
    ///
    /// Backend errors, after surfacing them.
    pub async fn next_page(&mut self) -> Result<()> {
        if !self.state.pagination.has_next_page {
            return Ok(());
        }
        self.go_to_page(self.state.pagination.current_page.saturating_add(1))
            .await
    }

    /// Loads the preceding page, if any.
    ///
    /// # Errors
    ///
    /// Backend errors, after surfacing them.
    pub async fn prev_page(&mut self) -> Result<()> {
        let current = self.state.pagination.current_page;
        if current <= 1 {
            return Ok(());
        }
        self.go_to_page(current - 1).await
    }

    /// Changes the sort and reloads page 1 of the last search.
    ///
    /// # Errors
    ///
    /// Backend errors, after surfacing them.
    pub async fn set_sort(&mut self, sort_by: SortBy, direction: SortDirection) -> Result<()> {
        self.state.form.sort_by = sort_by;
        self.state.form.sort_direction = direction;
        self.state.form.page = 1;
        let Some(last) = self.state.results.query().cloned() else {
            return Ok(());
        };
        let query = SearchQuery {
            sort_by,
            sort_direction: direction,
            ..last.with_page(1, last.limit)
        };
        self.run_query(query).await
    }

    /// Changes the page size and reloads page 1 of the last search.
    ///
    /// # Errors
    ///
    /// Backend errors, after surfacing them.
    pub async fn set_page_size(&mut self, limit: u32) -> Result<()> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        self.state.form.limit = limit;
        self.state.form.page = 1;
        let Some(last) = self.state.results.query().cloned() else {
            return Ok(());
        };
        self.run_query(last.with_page(1, limit)).await
    }

    /// Stores a freshly drawn shape, replacing the previous one.
    ///
    /// # Errors
    ///
    /// [`ExplorerError::GeometryParse`] for an invalid shape, after
    /// surfacing it.
    pub fn draw_shape(&mut self, shape: Geometry) -> Result<()> {
        if let Err(e) = self.state.aoi.set_drawn(shape) {
            self.surface(&e, Action::Search);
            return Err(e);
        }
        tracing::debug!("shape drawn");
        Ok(())
    }

    /// Removes the drawn shape.
    pub fn delete_shape(&mut self) {
        self.state.aoi.clear_drawn();
        tracing::debug!("shape deleted");
    }

    /// Opens the modal with the download links of `image_id`.
    ///
    /// # Errors
    ///
    /// Backend errors, after surfacing them.
    pub async fn show_download_links(&mut self, image_id: &str) -> Result<()> {
        match self.details.fetch_download_links(image_id).await {
            Ok(links) if links.is_empty() => {
                self.open_modal(ModalContent::Message {
                    title: format!("Download links for {}", image_id.trim()),
                    body: NO_LINKS_MESSAGE.to_string(),
                });
                Ok(())
            }
            Ok(links) => {
                self.open_modal(ModalContent::DownloadLinks {
                    image_id: image_id.trim().to_string(),
                    links,
                });
                Ok(())
            }
            Err(e) => {
                self.surface(&e, Action::Links);
                Err(e)
            }
        }
    }

    /// Opens the modal with the full details of `image_id`.
    ///
    /// # Errors
    ///
    /// Backend errors, after surfacing them.
    pub async fn show_details(&mut self, image_id: &str) -> Result<()> {
        match self.details.fetch_details(image_id).await {
            Ok(details) => {
                self.open_modal(ModalContent::Details(Box::new(details)));
                Ok(())
            }
            Err(e) => {
                self.surface(&e, Action::Details);
                Err(e)
            }
        }
    }

    /// Hides the modal.
    pub fn close_modal(&mut self) {
        if self.state.modal.close() {
            self.view.hide_modal();
        }
    }

    /// Exports results as CSV.
    ///
    /// When the backend holds more results than are loaded, the user is
    /// asked before every page is fetched; declining cancels the export.
    ///
    /// # Errors
    ///
    /// [`ExplorerError::Validation`] with nothing to export,
    /// [`ExplorerError::ExportCancelled`], drain and CSV errors, after
    /// surfacing them.
    pub async fn export_csv(&mut self) -> Result<()> {
        let result = self.build_export().await;
        match result {
            Ok((count, bytes)) => {
                self.view
                    .deliver_file(&self.config.csv_file_name, CSV_CONTENT_TYPE, &bytes);
                self.view
                    .status(&format!("Exported {count} results."), false);
                tracing::info!(count, file = %self.config.csv_file_name, "csv delivered");
                Ok(())
            }
            Err(ExplorerError::ExportCancelled) => {
                self.view.status("Export cancelled.", false);
                Err(ExplorerError::ExportCancelled)
            }
            Err(e) => {
                self.surface(&e, Action::Export);
                Err(e)
            }
        }
    }

    async fn build_export(&mut self) -> Result<(usize, Vec<u8>)> {
        let loaded = self.state.results.len();
        let Some(query) = self.state.results.query().cloned().filter(|_| loaded > 0) else {
            return Err(ExplorerError::validation(NOTHING_TO_EXPORT_MESSAGE));
        };
        let total = self.state.pagination.total_results as usize;
        if total <= loaded {
            let records = self.state.results.records();
            return Ok((records.len(), csv_for(records)?));
        }
        let question = format!(
            "{loaded} of {total} results are loaded. Fetch all pages and export every result?"
        );
        if !self.view.confirm(&question) {
            return Err(ExplorerError::ExportCancelled);
        }
        self.view.status(&format!("Fetching {total} results…"), false);
        let records = drain_all_pages(
            self.backend.as_ref(),
            &query,
            self.config.export_page_size,
            self.config.export_max_pages,
        )
        .await?;
        Ok((records.len(), csv_for(&records)?))
    }

    /// Shows or hides the water-level station overlay.
    ///
    /// # Errors
    ///
    /// Backend errors, after surfacing them.
    pub async fn set_stations_visible(&mut self, visible: bool) -> Result<()> {
        if !visible {
            self.stations.disable(&mut self.state.overlay);
            self.view.clear_station_markers();
            return Ok(());
        }
        let time = self.view.selected_time().unwrap_or_else(Utc::now);
        match self.stations.enable(&mut self.state.overlay, time).await {
            Ok(()) => {
                self.draw_markers();
                Ok(())
            }
            Err(e) => {
                self.surface(&e, Action::Stations);
                Err(e)
            }
        }
    }

    /// Reloads station readings for `time` while the overlay is shown.
    ///
    /// # Errors
    ///
    /// Backend errors, after surfacing them.
    pub async fn set_station_time(&mut self, time: DateTime<Utc>) -> Result<()> {
        match self.stations.set_time(&mut self.state.overlay, time).await {
            Ok(true) => {
                self.draw_markers();
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(e) => {
                self.surface(&e, Action::Levels);
                Err(e)
            }
        }
    }

    /// Sends the import through the backend's geometry endpoint and shows
    /// the scenes it returns.
    ///
    /// Handles formats the local parsers don't read, such as KML.
    ///
    /// # Errors
    ///
    /// Validation and backend errors, after surfacing them.
    pub async fn process_import(&mut self) -> Result<()> {
        let Some(source) = ImportSource::from_inputs(&self.view.wkt_text(), self.view.import_file())
        else {
            let e = ExplorerError::validation(NO_IMPORT_MESSAGE);
            self.surface(&e, Action::Import);
            return Err(e);
        };
        self.view.set_search_busy(true);
        let result = self.backend.process_geometry(&source).await;
        self.view.set_search_busy(false);
        match result {
            Ok(response) => {
                let shown = response.sentinel_images.len();
                let limit = u32::try_from(shown).unwrap_or(MAX_PAGE_SIZE);
                self.state.aoi.set_imported(response.geometry);
                self.state.pagination =
                    PaginationState::from_response(1, limit, 0, false, false, shown);
                self.state.results.replace(None, response.sentinel_images);
                self.render_results();
                Ok(())
            }
            Err(e) => {
                self.surface(&e, Action::Import);
                Err(e)
            }
        }
    }

    fn query_from_form(&mut self) -> Result<SearchQuery> {
        let (start, end) = self.view.date_range();
        self.state.form.start_date = start;
        self.state.form.end_date = end;
        if let Some(cloud) = self.view.max_cloud_coverage() {
            self.state.form.max_cloud_coverage = cloud;
        }
        self.state.form.page = 1;

        let mode = self.view.aoi_mode();
        let source = match mode {
            AoiMode::Draw => None,
            AoiMode::Import => {
                ImportSource::from_inputs(&self.view.wkt_text(), self.view.import_file())
            }
        };
        let geometry = self
            .state
            .aoi
            .resolve(mode, source.as_ref(), &self.parser)?;
        self.state.form.build(geometry, Utc::now().date_naive())
    }

    async fn run_query(&mut self, query: SearchQuery) -> Result<()> {
        self.view.set_search_busy(true);
        let result = self
            .search
            .execute(query, &mut self.state.results, &mut self.state.pagination)
            .await;
        self.view.set_search_busy(false);
        match result {
            Ok(()) => {
                self.state.form.page = self.state.pagination.current_page;
                self.render_results();
                Ok(())
            }
            Err(e) => {
                self.surface(&e, Action::Search);
                Err(e)
            }
        }
    }

    fn render_results(&mut self) {
        let table = results_table(self.state.results.records(), &self.render);
        self.view.show_results(&table);
        let controls = pagination_controls(&self.state.pagination, self.state.results.len());
        self.view.show_pagination(&controls);

        let undated = self
            .state
            .results
            .records()
            .iter()
            .filter(|r| r.acquired_at().is_none())
            .count();
        if undated > 0 {
            let e = ExplorerError::PartialData {
                item: format!("{undated} of {} results", self.state.results.len()),
                reason: "no valid acquisition date".to_string(),
            };
            self.surface(&e, Action::Search);
        }
    }

    fn open_modal(&mut self, content: ModalContent) {
        self.state.modal.open(content);
        if let Some(html) = self.state.modal.render(&self.render) {
            self.view.show_modal(&html);
        }
    }

    fn draw_markers(&mut self) {
        if !self.state.overlay.is_visible() {
            return;
        }
        let markers = self.state.overlay.markers();
        let labels: Vec<String> = markers.iter().map(station_label_html).collect();
        self.view.show_station_markers(markers, &labels);

        let with_data = markers.iter().filter(|m| m.has_data).count();
        let at = self
            .state
            .overlay
            .time()
            .map_or_else(String::new, |t| t.format(" at %Y-%m-%d %H:%M UTC").to_string());
        if with_data == 0 {
            self.view
                .status(&format!("No water level data available{at}."), true);
        } else {
            self.view
                .status(&format!("Updated water levels for {with_data} stations{at}."), false);
        }
    }

    fn surface(&mut self, error: &ExplorerError, action: Action) {
        match error.kind() {
            ErrorKind::Validation => {
                tracing::debug!(code = error.error_code(), %error, "rejected input");
                self.view.alert(&error.to_string());
            }
            ErrorKind::Network => {
                tracing::error!(code = error.error_code(), %error, "backend request failed");
                self.view.alert(action.failed_message());
                self.view.status(&error.to_string(), true);
            }
            ErrorKind::PartialData => {
                tracing::warn!(code = error.error_code(), %error, "partial data");
                self.view.status(&error.to_string(), true);
            }
            ErrorKind::Authentication => {
                if let ExplorerError::AuthenticationRequired { auth_url } = error {
                    if self.config.follow_auth_redirect {
                        tracing::info!(auth_url, "redirecting to authentication");
                        self.view.redirect(auth_url);
                    } else {
                        self.view
                            .alert(&format!("Authentication required. Sign in at {auth_url}"));
                    }
                }
            }
            ErrorKind::Internal => {
                tracing::error!(code = error.error_code(), %error, "internal error");
                self.view.alert(&error.to_string());
            }
        }
    }
}
