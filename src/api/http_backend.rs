//! [`SearchBackend`] over HTTP with `reqwest`.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::backend::SearchBackend;
use super::dto::{
    ApiErrorBody, DownloadLinksResponse, ProcessGeometryRequest, ProcessGeometryResponse,
    SearchResponse, StationLevelsResponse, StationsResponse,
};
use crate::config::ExplorerConfig;
use crate::domain::{ImageDetails, ImportSource, SearchPage, SearchQuery, Station, StationLevelReading};
use crate::error::{ExplorerError, Result};

/// HTTP client for the SHORE backend.
///
/// Holds one pooled [`reqwest::Client`]; clone-free and safe to share
/// behind an `Arc`.
#[derive(Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    download_bands: Vec<String>,
}

impl HttpBackend {
    /// Creates a backend client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::Transport`] if the HTTP client cannot be
    /// built.
    pub fn new(base_url: Url, request_timeout: Duration, download_bands: Vec<String>) -> Result<Self> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            base_url,
            download_bands,
        })
    }

    /// Creates a backend client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::Transport`] if the HTTP client cannot be
    /// built.
    pub fn from_config(config: &ExplorerConfig) -> Result<Self> {
        Self::new(
            config.api_base_url.clone(),
            config.request_timeout,
            config.download_bands.clone(),
        )
    }

    /// Joins percent-encoded path segments onto the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ExplorerError::Config(format!("base url cannot take a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &Url) -> Result<T> {
        tracing::debug!(%url, "backend request");
        let response = request.send().await.map_err(|e| {
            tracing::error!(%url, error = %e, "backend unreachable");
            ExplorerError::Transport(e)
        })?;
        let status = response.status();
        let body = response.bytes().await?;
        tracing::debug!(%url, %status, bytes = body.len(), "backend response");
        decode_body(status, url, &body)
    }
}

/// Maps a raw response to `T`, recognising the auth signal first.
///
/// # Errors
///
/// [`ExplorerError::AuthenticationRequired`] for the auth signal,
/// [`ExplorerError::HttpStatus`] for other non-2xx answers and
/// [`ExplorerError::Decode`] for unexpected bodies.
pub fn decode_body<T: DeserializeOwned>(status: StatusCode, url: &Url, body: &[u8]) -> Result<T> {
    if let Ok(error_body) = serde_json::from_slice::<ApiErrorBody>(body)
        && let Some(auth_url) = error_body.auth_redirect()
    {
        tracing::warn!(%url, auth_url, "backend requires authentication");
        return Err(ExplorerError::AuthenticationRequired {
            auth_url: auth_url.to_string(),
        });
    }
    if !status.is_success() {
        tracing::error!(%url, %status, "backend returned an error status");
        return Err(ExplorerError::HttpStatus {
            status,
            url: url.to_string(),
        });
    }
    Ok(serde_json::from_slice(body)?)
}

impl SearchBackend for HttpBackend {
    async fn search_images(&self, query: &SearchQuery) -> Result<SearchPage> {
        let url = self.endpoint(&["api", "search_images"])?;
        let request = self.client.post(url.clone()).json(query);
        let response: SearchResponse = self.send(request, &url).await?;
        let page = response.into_page(query);
        tracing::info!(
            page = page.pagination.current_page,
            shown = page.records.len(),
            total = page.pagination.total_results,
            "search page received"
        );
        Ok(page)
    }

    async fn download_links(&self, image_id: &str) -> Result<BTreeMap<String, String>> {
        let url = self.endpoint(&["api", "download_links", image_id])?;
        let request = self
            .client
            .get(url.clone())
            .query(&[("bands", self.download_bands.join(","))]);
        let response: DownloadLinksResponse = self.send(request, &url).await?;
        Ok(response.links)
    }

    async fn image_details(&self, image_id: &str) -> Result<ImageDetails> {
        let url = self.endpoint(&["api", "image_details", image_id])?;
        let request = self.client.get(url.clone());
        self.send(request, &url).await
    }

    async fn water_level_stations(&self) -> Result<Vec<Station>> {
        let url = self.endpoint(&["api", "water_level_stations"])?;
        let request = self.client.get(url.clone());
        let response: StationsResponse = self.send(request, &url).await?;
        Ok(response.stations)
    }

    async fn water_level_at_time(&self, time: DateTime<Utc>) -> Result<Vec<StationLevelReading>> {
        let url = self.endpoint(&["api", "water_level_at_time"])?;
        let iso = time.to_rfc3339_opts(SecondsFormat::Millis, true);
        let request = self.client.get(url.clone()).query(&[("time", iso)]);
        let response: StationLevelsResponse = self.send(request, &url).await?;
        Ok(response.station_levels)
    }

    async fn process_geometry(&self, source: &ImportSource) -> Result<ProcessGeometryResponse> {
        let url = self.endpoint(&["process_geometry"])?;
        let request = self
            .client
            .post(url.clone())
            .json(&ProcessGeometryRequest::from(source));
        self.send(request, &url).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn backend(base: &str) -> HttpBackend {
        let Ok(url) = Url::parse(base) else {
            panic!("valid url");
        };
        let Ok(backend) = HttpBackend::new(url, Duration::from_secs(5), vec!["B04".into()]) else {
            panic!("client builds");
        };
        backend
    }

    #[test]
    fn endpoint_joins_and_encodes_segments() {
        let b = backend("http://localhost:5000");
        let Ok(url) = b.endpoint(&["api", "image_details", "S2A 1/2"]) else {
            panic!("endpoint builds");
        };
        assert_eq!(url.as_str(), "http://localhost:5000/api/image_details/S2A%201%2F2");
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let b = backend("http://localhost:5000/shore/");
        let Ok(url) = b.endpoint(&["api", "water_level_stations"]) else {
            panic!("endpoint builds");
        };
        assert_eq!(url.as_str(), "http://localhost:5000/shore/api/water_level_stations");
    }

    #[test]
    fn decode_recognises_auth_signal_on_any_status() {
        let Ok(url) = Url::parse("http://localhost/api/search_images") else {
            panic!("valid url");
        };
        let body = br#"{"error":"Not authenticated with OpenEO","auth_url":"/openeo/login"}"#;
        let result: Result<SearchResponse> = decode_body(StatusCode::OK, &url, body);
        let Err(ExplorerError::AuthenticationRequired { auth_url }) = result else {
            panic!("expected auth signal");
        };
        assert_eq!(auth_url, "/openeo/login");
    }

    #[test]
    fn decode_maps_error_status() {
        let Ok(url) = Url::parse("http://localhost/api/search_images") else {
            panic!("valid url");
        };
        let result: Result<SearchResponse> =
            decode_body(StatusCode::BAD_REQUEST, &url, br#"{"error":"Missing geometry data"}"#);
        assert!(matches!(
            result,
            Err(ExplorerError::HttpStatus {
                status: StatusCode::BAD_REQUEST,
                ..
            })
        ));
    }

    #[test]
    fn decode_reports_malformed_bodies() {
        let Ok(url) = Url::parse("http://localhost/api/image_details/x") else {
            panic!("valid url");
        };
        let result: Result<ImageDetails> = decode_body(StatusCode::OK, &url, b"{}");
        assert!(matches!(result, Err(ExplorerError::Decode(_))));
    }
}
