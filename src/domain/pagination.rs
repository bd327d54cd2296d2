//! Results store and page-control model.

use super::image_record::ImageRecord;
use super::search_query::SearchQuery;

/// Largest number of page links shown at once.
pub const PAGE_WINDOW: u32 = 5;

/// Pagination metadata of the last applied search response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    /// Current page (1-indexed).
    pub current_page: u32,
    /// Results per page.
    pub results_per_page: u32,
    /// Total matching results.
    pub total_results: u32,
    /// A following page exists.
    pub has_next_page: bool,
    /// A preceding page exists.
    pub has_prev_page: bool,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            current_page: 1,
            results_per_page: 20,
            total_results: 0,
            has_next_page: false,
            has_prev_page: false,
        }
    }
}

impl PaginationState {
    /// Builds the state from response metadata.
    ///
    /// `shown` is the number of records on the page; the total is raised to
    /// it when the backend under-reports.
    #[must_use]
    pub fn from_response(
        page: u32,
        limit: u32,
        total: u32,
        next: bool,
        prev: bool,
        shown: usize,
    ) -> Self {
        let shown = u32::try_from(shown).unwrap_or(u32::MAX);
        Self {
            current_page: page.max(1),
            results_per_page: limit.max(1),
            total_results: total.max(shown),
            has_next_page: next,
            has_prev_page: prev,
        }
    }

    /// Number of pages, `ceil(total / per_page)`.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.total_results.div_ceil(self.results_per_page.max(1))
    }

    /// Page controls for this state.
    #[must_use]
    pub fn controls(&self) -> Vec<PageControl> {
        page_window(self.current_page, self.total_pages())
    }
}

/// One element of the page-control bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageControl {
    /// "Previous" button.
    Prev {
        /// Page it navigates to.
        target: u32,
        /// No previous page exists.
        disabled: bool,
    },
    /// Numbered page link.
    Page {
        /// Page number.
        number: u32,
        /// Whether this is the current page.
        active: bool,
    },
    /// Gap marker between the window and an edge page.
    Ellipsis,
    /// "Next" button.
    Next {
        /// Page it navigates to.
        target: u32,
        /// No next page exists.
        disabled: bool,
    },
}

/// Computes the page-control bar: at most [`PAGE_WINDOW`] numbers centred
/// on `current`, clamped to `[1, total_pages]`, with the edge pages and an
/// ellipsis added when the window doesn't reach them.
#[must_use]
pub fn page_window(current: u32, total_pages: u32) -> Vec<PageControl> {
    if total_pages == 0 {
        return Vec::new();
    }
    let current = current.clamp(1, total_pages);
    let half = PAGE_WINDOW / 2;
    let mut start = current.saturating_sub(half).max(1);
    let end = (start + PAGE_WINDOW - 1).min(total_pages);
    start = end.saturating_sub(PAGE_WINDOW - 1).max(1);

    let mut controls = vec![PageControl::Prev {
        target: current.saturating_sub(1).max(1),
        disabled: current == 1,
    }];
    if start > 1 {
        controls.push(PageControl::Page {
            number: 1,
            active: false,
        });
        if start > 2 {
            controls.push(PageControl::Ellipsis);
        }
    }
    controls.extend((start..=end).map(|number| PageControl::Page {
        number,
        active: number == current,
    }));
    if end < total_pages {
        if end < total_pages - 1 {
            controls.push(PageControl::Ellipsis);
        }
        controls.push(PageControl::Page {
            number: total_pages,
            active: false,
        });
    }
    controls.push(PageControl::Next {
        target: (current + 1).min(total_pages),
        disabled: current == total_pages,
    });
    controls
}

/// One page of search results with its pagination metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    /// Records on this page.
    pub records: Vec<ImageRecord>,
    /// Pagination metadata.
    pub pagination: PaginationState,
}

/// Records of the last applied search response.
#[derive(Debug, Clone, Default)]
pub struct ResultsStore {
    records: Vec<ImageRecord>,
    query: Option<SearchQuery>,
}

impl ResultsStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the store wholesale.
    pub fn replace(&mut self, query: Option<SearchQuery>, records: Vec<ImageRecord>) {
        self.query = query;
        self.records = records;
    }

    /// Records on the loaded page.
    #[must_use]
    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    /// Query that produced the loaded page.
    #[must_use]
    pub fn query(&self) -> Option<&SearchQuery> {
        self.query.as_ref()
    }

    /// Returns `true` if no records are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of loaded records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }
}
