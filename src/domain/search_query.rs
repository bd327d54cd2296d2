//! Search request builder.
//!
//! [`SearchForm`] holds the form controls between searches; every trigger
//! builds a fresh, immutable [`SearchQuery`] from it.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::geometry::Geometry;
use crate::error::ExplorerError;

/// Largest page size the backend accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Sort key for search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    /// Acquisition timestamp.
    #[default]
    #[serde(rename = "datetime")]
    AcquisitionTime,
    /// Cloud-cover percentage.
    #[serde(rename = "cloud_cover")]
    CloudCoverage,
}

impl SortBy {
    /// Wire name of the sort key.
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::AcquisitionTime => "datetime",
            Self::CloudCoverage => "cloud_cover",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

/// One search request, serialised as the `POST /api/search_images` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Area of interest.
    pub geometry: Geometry,
    /// First acquisition day (inclusive).
    pub start_date: NaiveDate,
    /// Last acquisition day (inclusive).
    pub end_date: NaiveDate,
    /// Maximum cloud coverage in percent.
    pub max_cloud_coverage: u8,
    /// Page number (1-indexed).
    pub page: u32,
    /// Results per page.
    pub limit: u32,
    /// Sort key.
    pub sort_by: SortBy,
    /// Sort direction.
    pub sort_direction: SortDirection,
}

impl SearchQuery {
    /// Same query for another page and page size.
    #[must_use]
    pub fn with_page(&self, page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
            ..self.clone()
        }
    }
}

/// Form-control state feeding the request builder.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchForm {
    /// Explicit start date; `None` means `today - window_days`.
    pub start_date: Option<NaiveDate>,
    /// Explicit end date; `None` means today.
    pub end_date: Option<NaiveDate>,
    /// Default window width in days.
    pub window_days: u64,
    /// Cloud-cover slider value.
    pub max_cloud_coverage: u8,
    /// Current page.
    pub page: u32,
    /// Results per page.
    pub limit: u32,
    /// Sort key.
    pub sort_by: SortBy,
    /// Sort direction.
    pub sort_direction: SortDirection,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            window_days: 15,
            max_cloud_coverage: 20,
            page: 1,
            limit: 20,
            sort_by: SortBy::default(),
            sort_direction: SortDirection::default(),
        }
    }
}

impl SearchForm {
    /// Creates a form with the given defaults.
    #[must_use]
    pub fn new(window_days: i64, max_cloud_coverage: u8, limit: u32) -> Self {
        Self {
            window_days: u64::try_from(window_days).unwrap_or(15),
            max_cloud_coverage: max_cloud_coverage.min(100),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
            ..Self::default()
        }
    }

    /// Resolved `(start, end)` for a given "today".
    #[must_use]
    pub fn date_range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = self.start_date.unwrap_or_else(|| {
            today
                .checked_sub_days(Days::new(self.window_days))
                .unwrap_or(today)
        });
        (start, self.end_date.unwrap_or(today))
    }

    /// Validates the form and builds the query.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::Validation`] if the cloud coverage exceeds
    /// 100 or the start date is after the end date.
    pub fn build(&self, geometry: Geometry, today: NaiveDate) -> Result<SearchQuery, ExplorerError> {
        if self.max_cloud_coverage > 100 {
            return Err(ExplorerError::validation(format!(
                "Cloud coverage must be between 0 and 100, got {}.",
                self.max_cloud_coverage
            )));
        }
        let (start_date, end_date) = self.date_range(today);
        if start_date > end_date {
            return Err(ExplorerError::validation(format!(
                "Start date {start_date} is after end date {end_date}."
            )));
        }
        Ok(SearchQuery {
            geometry,
            start_date,
            end_date,
            max_cloud_coverage: self.max_cloud_coverage,
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_PAGE_SIZE),
            sort_by: self.sort_by,
            sort_direction: self.sort_direction,
        })
    }
}
