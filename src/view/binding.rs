//! The view-binding seam between the controller and a concrete UI.
//!
//! A browser front end implements it over DOM elements; the CLI implements
//! it over the terminal; tests record every call.

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{AoiMode, ImportFile, StationMarker};

/// Typed accessors for form state plus sinks for everything the
/// controller displays.
pub trait ViewBinding {
    /// Which geometry source the mode selector points at.
    fn aoi_mode(&self) -> AoiMode;

    /// Text of the WKT paste box.
    fn wkt_text(&self) -> String;

    /// File picked for import, if any.
    fn import_file(&self) -> Option<ImportFile>;

    /// Date pickers as `(start, end)`; `None` keeps the default window.
    fn date_range(&self) -> (Option<NaiveDate>, Option<NaiveDate>);

    /// Cloud-cover slider; `None` keeps the form value.
    fn max_cloud_coverage(&self) -> Option<u8>;

    /// Time picker of the station overlay.
    fn selected_time(&self) -> Option<DateTime<Utc>>;

    /// Disables the search button and shows a spinner, or restores it.
    fn set_search_busy(&mut self, busy: bool);

    /// Replaces the results container with rendered HTML.
    fn show_results(&mut self, html: &str);

    /// Replaces the page-control bar with rendered HTML.
    fn show_pagination(&mut self, html: &str);

    /// Blocking alert.
    fn alert(&mut self, message: &str);

    /// Blocking yes/no question.
    fn confirm(&mut self, message: &str) -> bool;

    /// Transient status line.
    fn status(&mut self, message: &str, is_error: bool);

    /// Fills and shows the shared modal.
    fn show_modal(&mut self, html: &str);

    /// Hides the shared modal.
    fn hide_modal(&mut self);

    /// Navigates the whole page away.
    fn redirect(&mut self, url: &str);

    /// Offers a generated file for download.
    fn deliver_file(&mut self, name: &str, content_type: &str, bytes: &[u8]);

    /// Draws station markers with their label HTML (same order).
    fn show_station_markers(&mut self, markers: &[StationMarker], labels_html: &[String]);

    /// Removes every station marker.
    fn clear_station_markers(&mut self);
}
