//! Client state owned by the [`crate::controller::Controller`].

use crate::config::ExplorerConfig;
use crate::domain::{AreaOfInterest, PaginationState, ResultsStore, SearchForm};
use crate::service::StationOverlay;
use crate::view::Modal;

/// Everything the explorer remembers between operations.
///
/// Owned by exactly one controller and mutated only through it.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Drawn and imported geometries.
    pub aoi: AreaOfInterest,
    /// Form controls feeding the next search.
    pub form: SearchForm,
    /// Records of the last applied search.
    pub results: ResultsStore,
    /// Pagination of the last applied search.
    pub pagination: PaginationState,
    /// Water-level station overlay.
    pub overlay: StationOverlay,
    /// Shared download and details modal.
    pub modal: Modal,
}

impl AppState {
    /// Initial state with form defaults taken from configuration.
    #[must_use]
    pub fn new(config: &ExplorerConfig) -> Self {
        Self {
            form: SearchForm::new(
                config.default_window_days,
                config.default_cloud_coverage,
                config.default_page_size,
            ),
            pagination: PaginationState {
                results_per_page: config.default_page_size.max(1),
                ..PaginationState::default()
            },
            ..Self::default()
        }
    }
}
