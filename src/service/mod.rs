//! Service layer: backend orchestration.
//!
//! Each service holds an `Arc` to the [`crate::api::SearchBackend`] and
//! writes its results into state owned by the caller.

pub mod detail_service;
pub mod export_service;
pub mod search_service;
pub mod station_service;

pub use detail_service::DetailService;
pub use export_service::{CSV_CONTENT_TYPE, csv_for, drain_all_pages};
pub use search_service::SearchService;
pub use station_service::{OverlayPhase, StationOverlay, StationService};
