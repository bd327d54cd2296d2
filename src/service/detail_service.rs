//! On-demand fetches behind the download and details modals.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::SearchBackend;
use crate::domain::ImageDetails;
use crate::error::{ExplorerError, Result};

/// Fetches per-image data keyed by image id.
#[derive(Debug)]
pub struct DetailService<B> {
    backend: Arc<B>,
}

impl<B> Clone for DetailService<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: SearchBackend> DetailService<B> {
    /// Creates a new `DetailService`.
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Band-to-URL download links for an image.
    ///
    /// # Errors
    ///
    /// [`ExplorerError::Validation`] for a blank id, otherwise the backend
    /// error.
    pub async fn fetch_download_links(&self, image_id: &str) -> Result<BTreeMap<String, String>> {
        let image_id = checked_id(image_id)?;
        let links = self.backend.download_links(image_id).await?;
        tracing::info!(image_id, links = links.len(), "download links fetched");
        Ok(links)
    }

    /// Full STAC-like details for an image.
    ///
    /// # Errors
    ///
    /// [`ExplorerError::Validation`] for a blank id, otherwise the backend
    /// error.
    pub async fn fetch_details(&self, image_id: &str) -> Result<ImageDetails> {
        let image_id = checked_id(image_id)?;
        let details = self.backend.image_details(image_id).await?;
        tracing::info!(image_id, assets = details.assets.len(), "image details fetched");
        Ok(details)
    }
}

fn checked_id(image_id: &str) -> Result<&str> {
    let trimmed = image_id.trim();
    if trimmed.is_empty() {
        return Err(ExplorerError::validation("No image selected."));
    }
    Ok(trimmed)
}
