//! Command-line front end: the `shore` binary drives the same
//! [`Controller`] as a browser would, through a [`TerminalView`].

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use reqwest::Url;

use crate::api::HttpBackend;
use crate::app_state::AppState;
use crate::config::ExplorerConfig;
use crate::controller::Controller;
use crate::domain::image_record::parse_timestamp;
use crate::domain::{AoiMode, FileFormat, Geometry, ImportFile, SortBy, SortDirection, StationMarker};
use crate::error::ExplorerError;
use crate::view::render::results_page;
use crate::view::{ModalContent, ViewBinding};

/// SHORE explorer command line.
#[derive(Debug, Parser)]
#[command(
    name = "shore",
    version,
    about = "Search Sentinel-2 scenes and water-level stations through the SHORE backend"
)]
pub struct Cli {
    /// Backend root URL, overriding `SHORE_API_BASE_URL`.
    #[arg(long, global = true)]
    pub api_url: Option<Url>,

    /// Log as JSON lines.
    #[arg(long, global = true)]
    pub json: bool,

    /// Answer yes to every confirmation.
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Directory exported files are written to.
    #[arg(long, global = true, default_value = ".")]
    pub out_dir: PathBuf,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of `shore`.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search scenes over an area of interest.
    Search(SearchArgs),

    /// Print the full details of a scene.
    Details {
        /// Scene identifier.
        id: String,
    },

    /// Print the band download links of a scene.
    Links {
        /// Scene identifier.
        id: String,
    },

    /// Print water-level stations with their readings.
    Stations {
        /// Reading time (RFC 3339); defaults to now.
        #[arg(long, value_parser = parse_time)]
        time: Option<DateTime<Utc>>,
    },
}

/// Arguments of `shore search`.
#[derive(Debug, Args)]
#[command(group(ArgGroup::new("area").required(true).args(["wkt", "geojson", "kml", "bbox"])))]
pub struct SearchArgs {
    /// Area as WKT text (POLYGON or MULTIPOLYGON).
    #[arg(long)]
    pub wkt: Option<String>,

    /// GeoJSON file holding the area.
    #[arg(long)]
    pub geojson: Option<PathBuf>,

    /// KML file, converted by the backend's geometry endpoint.
    #[arg(long)]
    pub kml: Option<PathBuf>,

    /// Rectangle as `min_lon,min_lat,max_lon,max_lat`.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub bbox: Option<Vec<f64>>,

    /// First acquisition date (`YYYY-MM-DD`).
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last acquisition date (`YYYY-MM-DD`).
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Maximum cloud coverage in percent.
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub cloud: Option<u8>,

    /// Page to show.
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Results per page.
    #[arg(long)]
    pub limit: Option<u32>,

    /// Sort key.
    #[arg(long, value_enum)]
    pub sort_by: Option<SortArg>,

    /// Sort direction.
    #[arg(long, value_enum)]
    pub direction: Option<DirectionArg>,

    /// Export every result to CSV in `--out-dir`.
    #[arg(long)]
    pub export: bool,

    /// Write the rendered results page to this file.
    #[arg(long)]
    pub html: Option<PathBuf>,
}

/// `--sort-by` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    /// Acquisition time.
    Datetime,
    /// Cloud coverage.
    #[value(name = "cloud_cover")]
    CloudCover,
}

impl From<SortArg> for SortBy {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Datetime => Self::AcquisitionTime,
            SortArg::CloudCover => Self::CloudCoverage,
        }
    }
}

/// `--direction` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl From<DirectionArg> for SortDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Asc => Self::Asc,
            DirectionArg::Desc => Self::Desc,
        }
    }
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(raw).ok_or_else(|| format!("not an ISO-8601 timestamp: {raw}"))
}

/// [`ViewBinding`] over stdin, stderr and the file system.
///
/// Form values are set up front from command-line arguments; rendered HTML
/// is kept for `--html`, and the command prints plain tables from the
/// controller state.
#[derive(Debug)]
pub struct TerminalView {
    base_url: Url,
    out_dir: PathBuf,
    assume_yes: bool,
    mode: AoiMode,
    wkt: String,
    file: Option<ImportFile>,
    dates: (Option<NaiveDate>, Option<NaiveDate>),
    cloud: Option<u8>,
    time: Option<DateTime<Utc>>,
    results_html: String,
    pagination_html: String,
    delivered: Vec<PathBuf>,
    markers: Vec<StationMarker>,
}

impl TerminalView {
    /// Creates a view writing files into `out_dir`.
    #[must_use]
    pub fn new(base_url: Url, out_dir: PathBuf, assume_yes: bool) -> Self {
        Self {
            base_url,
            out_dir,
            assume_yes,
            mode: AoiMode::Draw,
            wkt: String::new(),
            file: None,
            dates: (None, None),
            cloud: None,
            time: None,
            results_html: String::new(),
            pagination_html: String::new(),
            delivered: Vec::new(),
            markers: Vec::new(),
        }
    }

    /// Switches to import mode with pasted WKT.
    #[must_use]
    pub fn with_wkt(mut self, wkt: impl Into<String>) -> Self {
        self.mode = AoiMode::Import;
        self.wkt = wkt.into();
        self
    }

    /// Switches to import mode with a file.
    #[must_use]
    pub fn with_file(mut self, file: ImportFile) -> Self {
        self.mode = AoiMode::Import;
        self.file = Some(file);
        self
    }

    /// Sets the date pickers.
    #[must_use]
    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.dates = (start, end);
        self
    }

    /// Sets the cloud slider.
    #[must_use]
    pub fn with_cloud(mut self, cloud: Option<u8>) -> Self {
        self.cloud = cloud;
        self
    }

    /// Sets the station time picker.
    #[must_use]
    pub fn with_time(mut self, time: Option<DateTime<Utc>>) -> Self {
        self.time = time;
        self
    }

    /// Last rendered results table.
    #[must_use]
    pub fn results_html(&self) -> &str {
        &self.results_html
    }

    /// Last rendered page controls.
    #[must_use]
    pub fn pagination_html(&self) -> &str {
        &self.pagination_html
    }

    /// Files written so far.
    #[must_use]
    pub fn delivered(&self) -> &[PathBuf] {
        &self.delivered
    }

    /// Station markers last drawn.
    #[must_use]
    pub fn markers(&self) -> &[StationMarker] {
        &self.markers
    }
}

impl ViewBinding for TerminalView {
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
        if busy {
            eprintln!("Searching…");
        }
    }

    fn show_results(&mut self, html: &str) {
        html.clone_into(&mut self.results_html);
    }

    fn show_pagination(&mut self, html: &str) {
        html.clone_into(&mut self.pagination_html);
    }

    fn alert(&mut self, message: &str) {
        eprintln!("error: {message}");
    }

    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            eprintln!("{message} yes");
            return true;
        }
        eprint!("{message} [y/N] ");
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }

    fn status(&mut self, message: &str, is_error: bool) {
        if is_error {
            eprintln!("warning: {message}");
        } else {
            eprintln!("{message}");
        }
    }

    fn show_modal(&mut self, _html: &str) {}

    fn hide_modal(&mut self) {}

    fn redirect(&mut self, url: &str) {
        let target = self
            .base_url
            .join(url)
            .map_or_else(|_| url.to_string(), |u| u.to_string());
        eprintln!("Authentication required. Open {target} in a browser, then retry.");
    }

    fn deliver_file(&mut self, name: &str, _content_type: &str, bytes: &[u8]) {
        let path = self.out_dir.join(name);
        let written = std::fs::create_dir_all(&self.out_dir).and_then(|()| std::fs::write(&path, bytes));
        match written {
            Ok(()) => {
                tracing::info!(path = %path.display(), bytes = bytes.len(), "file written");
                eprintln!("Wrote {}", path.display());
                self.delivered.push(path);
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "could not write file");
                eprintln!("error: could not write {}: {e}", path.display());
            }
        }
    }

    fn show_station_markers(&mut self, markers: &[StationMarker], _labels_html: &[String]) {
        self.markers = markers.to_vec();
    }

    fn clear_station_markers(&mut self) {
        self.markers.clear();
    }
}

/// Runs one command.
///
/// Failures the controller already reported to the user become
/// [`ExitCode::FAILURE`]; setup failures are returned as errors.
///
/// # Errors
///
/// Configuration, HTTP client and file-reading failures.
pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = ExplorerConfig::from_env().context("loading configuration")?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    let backend = Arc::new(HttpBackend::from_config(&config).context("building HTTP client")?);
    let view = TerminalView::new(config.api_base_url.clone(), cli.out_dir, cli.yes);
    tracing::debug!(base_url = %config.api_base_url, "backend configured");

    match cli.command {
        Command::Search(args) => run_search(config, backend, view, args).await,
        Command::Details { id } => {
            let mut controller = Controller::new(config, backend, view);
            if controller.show_details(&id).await.is_err() {
                return Ok(ExitCode::FAILURE);
            }
            if let Some(ModalContent::Details(details)) = controller.state().modal.content() {
                println!("{}", serde_json::to_string_pretty(details)?);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Links { id } => {
            let mut controller = Controller::new(config, backend, view);
            if controller.show_download_links(&id).await.is_err() {
                return Ok(ExitCode::FAILURE);
            }
            if let Some(ModalContent::DownloadLinks { links, .. }) = controller.state().modal.content() {
                if links.is_empty() {
                    println!("No download links available for this image.");
                }
                for (band, url) in links {
                    println!("{band}\t{url}");
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Stations { time } => {
            let mut controller = Controller::new(config, backend, view.with_time(time));
            if controller.set_stations_visible(true).await.is_err() {
                return Ok(ExitCode::FAILURE);
            }
            print_markers(controller.view().markers());
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_search(
    config: ExplorerConfig,
    backend: Arc<HttpBackend>,
    view: TerminalView,
    args: SearchArgs,
) -> anyhow::Result<ExitCode> {
    let mut view = view.with_dates(args.start, args.end).with_cloud(args.cloud);
    let legacy = args.kml.is_some();
    if let Some(wkt) = args.wkt {
        view = view.with_wkt(wkt);
    }
    if let Some(path) = &args.geojson {
        view = view.with_file(read_import(path, FileFormat::GeoJson)?);
    }
    if let Some(path) = &args.kml {
        view = view.with_file(read_import(path, FileFormat::Kml)?);
    }

    let mut controller = Controller::new(config, backend, view);
    if let Some(bbox) = &args.bbox {
        let [min_lon, min_lat, max_lon, max_lat] = bbox.as_slice() else {
            anyhow::bail!("--bbox takes exactly four numbers, got {}", bbox.len());
        };
        let shape = Geometry::rectangle(*min_lon, *min_lat, *max_lon, *max_lat);
        if controller.draw_shape(shape).is_err() {
            return Ok(ExitCode::FAILURE);
        }
    }

    if legacy {
        if controller.process_import().await.is_err() {
            return Ok(ExitCode::FAILURE);
        }
    } else {
        if let Some(limit) = args.limit {
            controller.set_page_size(limit).await?;
        }
        if args.sort_by.is_some() || args.direction.is_some() {
            let form = &controller.state().form;
            let sort_by = args.sort_by.map_or(form.sort_by, SortBy::from);
            let direction = args.direction.map_or(form.sort_direction, SortDirection::from);
            controller.set_sort(sort_by, direction).await?;
        }
        if controller.search().await.is_err() {
            return Ok(ExitCode::FAILURE);
        }
        if args.page > 1 && controller.go_to_page(args.page).await.is_err() {
            return Ok(ExitCode::FAILURE);
        }
    }

    print_results(controller.state());

    if let Some(path) = &args.html {
        let page = results_page(controller.view().results_html(), controller.view().pagination_html());
        std::fs::write(path, page).with_context(|| format!("writing {}", path.display()))?;
        eprintln!("Wrote {}", path.display());
    }

    if args.export {
        match controller.export_csv().await {
            Ok(()) | Err(ExplorerError::ExportCancelled) => {}
            Err(_) => return Ok(ExitCode::FAILURE),
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn read_import(path: &Path, format: FileFormat) -> anyhow::Result<ImportFile> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    Ok(ImportFile {
        format,
        name,
        contents,
    })
}

fn print_results(state: &AppState) {
    let records = state.results.records();
    if records.is_empty() {
        println!("{}", crate::view::render::EMPTY_RESULTS_MESSAGE);
        return;
    }
    println!(
        "{:<62} {:<25} {:>7} {:>12}",
        "ID", "Date", "Cloud%", "Water (cm)"
    );
    for record in records {
        let water = record
            .water_level
            .as_ref()
            .and_then(|w| w.value)
            .map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"));
        println!(
            "{:<62} {:<25} {:>7.1} {:>12}",
            record.id,
            record.date.as_deref().unwrap_or("-"),
            record.cloud_coverage,
            water
        );
    }
    let p = &state.pagination;
    println!(
        "Page {} of {} ({} results)",
        p.current_page,
        p.total_pages().max(1),
        p.total_results
    );
}

fn print_markers(markers: &[StationMarker]) {
    if markers.is_empty() {
        println!("No stations available.");
        return;
    }
    println!("{:<10} {:<32} {:>9} {:>9} {:>10}", "Station", "Name", "Lat", "Lon", "Level");
    for marker in markers {
        println!(
            "{:<10} {:<32} {:>9.4} {:>9.4} {:>10}",
            marker.station_id, marker.name, marker.lat, marker.lon, marker.label
        );
    }
}
