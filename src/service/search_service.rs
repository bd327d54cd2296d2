//! Search executor: one backend call per trigger, applied unconditionally.

use std::sync::Arc;

use crate::api::SearchBackend;
use crate::domain::{PaginationState, ResultsStore, SearchPage, SearchQuery};
use crate::error::Result;

/// Runs searches against a [`SearchBackend`].
///
/// Holds no state of its own; results are written into the caller's
/// [`ResultsStore`] and [`PaginationState`].
#[derive(Debug)]
pub struct SearchService<B> {
    backend: Arc<B>,
}

impl<B> Clone for SearchService<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: SearchBackend> SearchService<B> {
    /// Creates a new `SearchService`.
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Issues exactly one `search_images` call and applies the page.
    ///
    /// The response replaces the store and pagination wholesale, whichever
    /// request it answers.
    ///
    /// # Errors
    ///
    /// Propagates the backend error; the store is left untouched.
    pub async fn execute(
        &self,
        query: SearchQuery,
        results: &mut ResultsStore,
        pagination: &mut PaginationState,
    ) -> Result<()> {
        tracing::info!(
            page = query.page,
            limit = query.limit,
            sort_by = query.sort_by.as_param(),
            start = %query.start_date,
            end = %query.end_date,
            "searching images"
        );
        let page = self.backend.search_images(&query).await?;
        apply(page, query, results, pagination);
        Ok(())
    }
}

/// Writes a received page into the store.
pub fn apply(
    page: SearchPage,
    query: SearchQuery,
    results: &mut ResultsStore,
    pagination: &mut PaginationState,
) {
    tracing::debug!(
        shown = page.records.len(),
        total = page.pagination.total_results,
        "applying search page"
    );
    *pagination = page.pagination;
    results.replace(Some(query), page.records);
}
