//! Per-image DTOs for download links.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Response body for `GET /api/download_links/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadLinksResponse {
    /// Download URL keyed by band name (or `data` for a single archive).
    #[serde(default)]
    pub links: BTreeMap<String, String>,
}
