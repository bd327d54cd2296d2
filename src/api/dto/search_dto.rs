//! Search endpoint DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::{ImageRecord, PaginationState, SearchPage, SearchQuery};

/// Error string the backend sends when an OpenEO login is required.
pub const AUTH_REQUIRED_ERROR: &str = "Not authenticated with OpenEO";

/// Pagination metadata included in search responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Current page number.
    #[serde(default)]
    pub page: u32,
    /// Items per page.
    #[serde(default)]
    pub limit: u32,
    /// Total number of items.
    #[serde(default)]
    pub total: u32,
    /// A following page exists.
    #[serde(default)]
    pub next: bool,
    /// A preceding page exists.
    #[serde(default)]
    pub prev: bool,
}

/// Response body for `POST /api/search_images`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Matching scenes on this page.
    #[serde(default)]
    pub images: Vec<ImageRecord>,
    /// Pagination metadata; older backends omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,
}

impl SearchResponse {
    /// Converts to a [`SearchPage`], synthesising pagination from the
    /// query when the backend sent none.
    #[must_use]
    pub fn into_page(self, query: &SearchQuery) -> SearchPage {
        let shown = self.images.len();
        let pagination = match self.pagination {
            Some(meta) => PaginationState::from_response(
                if meta.page == 0 { query.page } else { meta.page },
                if meta.limit == 0 { query.limit } else { meta.limit },
                meta.total,
                meta.next,
                meta.prev,
                shown,
            ),
            None => PaginationState::from_response(
                query.page,
                query.limit,
                0,
                false,
                query.page > 1,
                shown,
            ),
        };
        SearchPage {
            records: self.images,
            pagination,
        }
    }
}

/// Error body the backend returns instead of results.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Error message.
    pub error: String,
    /// Login URL, present with [`AUTH_REQUIRED_ERROR`].
    #[serde(default)]
    pub auth_url: Option<String>,
}

impl ApiErrorBody {
    /// The auth URL when this body is the authentication-required signal.
    #[must_use]
    pub fn auth_redirect(&self) -> Option<&str> {
        if self.error == AUTH_REQUIRED_ERROR {
            self.auth_url.as_deref()
        } else {
            None
        }
    }
}
