//! Explorer configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Every key is prefixed with `SHORE_`.

use std::time::Duration;

use reqwest::Url;

use crate::domain::ColorScale;
use crate::error::ExplorerError;

/// Name of the CSV artifact produced by an export.
pub const DEFAULT_CSV_FILE_NAME: &str = "sentinel_search_results.csv";

/// Top-level explorer configuration.
///
/// Loaded once at startup via [`ExplorerConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// Root URL of the image-search backend (e.g. `http://127.0.0.1:5000`).
    pub api_base_url: Url,

    /// Per-request HTTP timeout.
    pub request_timeout: Duration,

    /// Width of the default search window, counted back from today.
    pub default_window_days: i64,

    /// Initial value of the cloud-cover slider (percent).
    pub default_cloud_coverage: u8,

    /// Initial results-per-page value.
    pub default_page_size: u32,

    /// Page size used while draining every page for an export.
    pub export_page_size: u32,

    /// Upper bound on pages fetched by a single export.
    pub export_max_pages: u32,

    /// Whether the backend returns results already sorted.
    pub server_sorted: bool,

    /// Locale name used for date and time formatting (e.g. `da_DK`).
    pub date_locale: String,

    /// Bands requested from the download-links endpoint.
    pub download_bands: Vec<String>,

    /// File name of the exported CSV.
    pub csv_file_name: String,

    /// Follow the backend's authentication redirect signal.
    pub follow_auth_redirect: bool,

    /// Water-level marker color thresholds.
    pub color_scale: ColorScale,
}

impl ExplorerConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::Config`] if `SHORE_API_BASE_URL` is set but
    /// cannot be parsed as a URL.
    pub fn from_env() -> Result<Self, ExplorerError> {
        dotenvy::dotenv().ok();

        let base = std::env::var("SHORE_API_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:5000".to_string());
        let api_base_url = parse_base_url(&base)?;

        let download_bands = std::env::var("SHORE_DOWNLOAD_BANDS")
            .ok()
            .map(|v| parse_band_list(&v))
            .filter(|bands| !bands.is_empty())
            .unwrap_or_else(default_bands);

        Ok(Self {
            api_base_url,
            request_timeout: Duration::from_secs(parse_env("SHORE_REQUEST_TIMEOUT_SECS", 30)),
            default_window_days: parse_env("SHORE_DEFAULT_WINDOW_DAYS", 15),
            default_cloud_coverage: parse_env::<u8>("SHORE_DEFAULT_CLOUD_COVERAGE", 20).min(100),
            default_page_size: parse_env("SHORE_DEFAULT_PAGE_SIZE", 20),
            export_page_size: parse_env("SHORE_EXPORT_PAGE_SIZE", 100),
            export_max_pages: parse_env("SHORE_EXPORT_MAX_PAGES", 50),
            server_sorted: parse_env_bool("SHORE_SERVER_SORTED", true),
            date_locale: std::env::var("SHORE_DATE_LOCALE").unwrap_or_else(|_| "en_US".into()),
            download_bands,
            csv_file_name: std::env::var("SHORE_CSV_FILE_NAME")
                .unwrap_or_else(|_| DEFAULT_CSV_FILE_NAME.to_string()),
            follow_auth_redirect: parse_env_bool("SHORE_FOLLOW_AUTH_REDIRECT", true),
            color_scale: ColorScale::default(),
        })
    }

    /// Builds a configuration with defaults pointing at `base_url`.
    ///
    /// Intended for tests and embedding; ignores the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::Config`] if `base_url` is not a valid URL.
    pub fn with_base_url(base_url: &str) -> Result<Self, ExplorerError> {
        Ok(Self {
            api_base_url: parse_base_url(base_url)?,
            request_timeout: Duration::from_secs(30),
            default_window_days: 15,
            default_cloud_coverage: 20,
            default_page_size: 20,
            export_page_size: 100,
            export_max_pages: 50,
            server_sorted: true,
            date_locale: "en_US".to_string(),
            download_bands: default_bands(),
            csv_file_name: DEFAULT_CSV_FILE_NAME.to_string(),
            follow_auth_redirect: true,
            color_scale: ColorScale::default(),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ExplorerError> {
    Url::parse(raw).map_err(|e| ExplorerError::Config(format!("invalid base url {raw:?}: {e}")))
}

fn default_bands() -> Vec<String> {
    ["B04", "B03", "B02"].iter().map(|b| (*b).to_string()).collect()
}

/// Splits a comma-separated band list, dropping blanks.
fn parse_band_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().map(|v| v.to_ascii_lowercase()).as_deref() {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        _ => default,
    }
}
