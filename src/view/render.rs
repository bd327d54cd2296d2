//! HTML templates for results, page controls and station labels.
//!
//! Every function is pure: data in, markup out. Interpolated text is
//! escaped with [`html_escape`].

use chrono::{DateTime, Locale, Utc};

use crate::config::ExplorerConfig;
use crate::domain::{ImageRecord, PageControl, PaginationState, StationMarker};

/// Message rendered for an empty result list.
pub const EMPTY_RESULTS_MESSAGE: &str = "No images found for the selected area.";

/// Identifiers longer than this are truncated in the table.
pub const ID_DISPLAY_LEN: usize = 30;

/// Rendering knobs shared by all templates.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Results arrive already sorted; skip the client-side sort.
    pub server_sorted: bool,
    /// Locale for date and time formatting.
    pub locale: Locale,
    /// Maximum displayed identifier length.
    pub id_max_len: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            server_sorted: true,
            locale: Locale::en_US,
            id_max_len: ID_DISPLAY_LEN,
        }
    }
}

impl RenderOptions {
    /// Options from configuration; an unknown locale falls back to `en_US`.
    #[must_use]
    pub fn from_config(config: &ExplorerConfig) -> Self {
        let locale = Locale::try_from(config.date_locale.as_str()).unwrap_or_else(|_| {
            tracing::warn!(locale = %config.date_locale, "unknown locale, using en_US");
            Locale::en_US
        });
        Self {
            server_sorted: config.server_sorted,
            locale,
            ..Self::default()
        }
    }
}

/// Escapes text for HTML element content and attribute values.
#[must_use]
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Cuts `id` to `max` characters, appending an ellipsis when shortened.
#[must_use]
pub fn truncate_id(id: &str, max: usize) -> String {
    if id.chars().count() <= max {
        return id.to_string();
    }
    let mut cut: String = id.chars().take(max).collect();
    cut.push('…');
    cut
}

/// Locale-aware `date time` text.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>, locale: Locale) -> String {
    at.format_localized("%x %X", locale).to_string()
}

/// Renders the results table.
///
/// Records without a parsable date are logged and left out. When the
/// backend has not sorted, rows are ordered newest first.
#[must_use]
pub fn results_table(records: &[ImageRecord], options: &RenderOptions) -> String {
    let mut dated: Vec<(DateTime<Utc>, &ImageRecord)> = records
        .iter()
        .filter_map(|record| match record.acquired_at() {
            Some(at) => Some((at, record)),
            None => {
                tracing::warn!(image_id = %record.id, date = ?record.date, "skipping record without a valid date");
                None
            }
        })
        .collect();

    if dated.is_empty() {
        return format!(r#"<p class="no-results">{EMPTY_RESULTS_MESSAGE}</p>"#);
    }
    if !options.server_sorted {
        dated.sort_by(|a, b| b.0.cmp(&a.0));
    }

    let mut rows = String::new();
    for (at, record) in dated {
        rows.push_str(&result_row(record, at, options));
    }

    format!(
        r#"<table class="table table-striped results-table">
    <thead>
        <tr><th>Preview</th><th>ID</th><th>Date</th><th>Cloud Coverage</th><th>Water Level</th><th>Actions</th></tr>
    </thead>
    <tbody>
{rows}    </tbody>
</table>"#
    )
}

fn result_row(record: &ImageRecord, at: DateTime<Utc>, options: &RenderOptions) -> String {
    let id = html_escape(&record.id);
    let short_id = html_escape(&truncate_id(&record.id, options.id_max_len));
    let thumbnail = record.preview_url.as_deref().map_or_else(
        || r#"<span class="text-muted">No preview</span>"#.to_string(),
        |url| {
            format!(
                r#"<img src="{}" class="img-thumbnail" width="80" alt="Preview" loading="lazy">"#,
                html_escape(url)
            )
        },
    );
    let water = record
        .water_level
        .as_ref()
        .and_then(|w| w.value)
        .map_or_else(|| "N/A".to_string(), |v| format!("{v:.2} cm"));

    format!(
        r#"        <tr data-image-id="{id}">
            <td>{thumbnail}</td>
            <td title="{id}">{short_id}</td>
            <td>{date}</td>
            <td>{cloud:.1}%</td>
            <td>{water}</td>
            <td>
                <button class="btn btn-sm btn-outline-primary" data-action="download" data-image-id="{id}">Download</button>
                <button class="btn btn-sm btn-outline-secondary" data-action="details" data-image-id="{id}">Details</button>
            </td>
        </tr>
"#,
        date = html_escape(&format_timestamp(at, options.locale)),
        cloud = record.cloud_coverage,
    )
}

/// Renders the page-control bar with a "showing x–y of z" summary.
#[must_use]
pub fn pagination_controls(state: &PaginationState, shown: usize) -> String {
    let controls = state.controls();
    if controls.is_empty() {
        return String::new();
    }

    let mut items = String::new();
    for control in controls {
        let item = match control {
            PageControl::Prev { target, disabled } => page_item("Previous", target, disabled, false),
            PageControl::Next { target, disabled } => page_item("Next", target, disabled, false),
            PageControl::Page { number, active } => {
                page_item(&number.to_string(), number, false, active)
            }
            PageControl::Ellipsis => {
                r#"<li class="page-item disabled"><span class="page-link">…</span></li>"#.to_string()
            }
        };
        items.push_str(&item);
    }

    let shown = u64::try_from(shown).unwrap_or(u64::MAX);
    let first = u64::from(state.current_page.saturating_sub(1)) * u64::from(state.results_per_page) + 1;
    let last = (first + shown).saturating_sub(1);
    let summary = if shown == 0 {
        format!("No results on page {}", state.current_page)
    } else {
        format!("Showing {first}–{last} of {} results", state.total_results)
    };

    format!(
        r#"<div class="pagination-summary">{summary}</div>
<nav aria-label="Search results pages"><ul class="pagination">{items}</ul></nav>"#
    )
}

fn page_item(text: &str, target: u32, disabled: bool, active: bool) -> String {
    let class = match (disabled, active) {
        (true, _) => "page-item disabled",
        (false, true) => "page-item active",
        (false, false) => "page-item",
    };
    let current = if active { r#" aria-current="page""# } else { "" };
    format!(
        r##"<li class="{class}"><a class="page-link" href="#" data-page="{target}"{current}>{text}</a></li>"##
    )
}

/// Standalone HTML page wrapping rendered results and page controls.
#[must_use]
pub fn results_page(results_html: &str, pagination_html: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>SHORE search results</title>
</head>
<body>
<div id="results">
{results_html}
</div>
<div id="pagination">
{pagination_html}
</div>
</body>
</html>
"#
    )
}

/// Label shown next to a station marker.
#[must_use]
pub fn station_label_html(marker: &StationMarker) -> String {
    let class = if marker.has_data {
        "water-level-label"
    } else {
        "water-level-label no-data"
    };
    format!(
        r#"<div class="{class}" style="border-color: {}">{}</div>"#,
        html_escape(marker.color.as_str()),
        html_escape(&marker.label)
    )
}

/// Popup content of a station marker.
#[must_use]
pub fn station_popup_html(marker: &StationMarker) -> String {
    format!(
        r#"<div class="station-marker"><h6>{}</h6><p>Station ID: {}</p><p>Water level: {}</p></div>"#,
        html_escape(&marker.name),
        html_escape(&marker.station_id),
        html_escape(&marker.label)
    )
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{ColorScale, Station, WaterLevelInfo};

    fn record(id: &str, date: Option<&str>) -> ImageRecord {
        ImageRecord {
            id: id.to_string(),
            date: date.map(str::to_string),
            cloud_coverage: 12.5,
            preview_url: None,
            bands: vec!["B02".to_string()],
            sun_elevation: None,
            sun_azimuth: None,
            water_level: None,
            metadata: None,
        }
    }

    #[test]
    fn empty_list_renders_message() {
        let html = results_table(&[], &RenderOptions::default());
        assert!(html.contains(EMPTY_RESULTS_MESSAGE));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn records_without_date_are_skipped() {
        let records = vec![
            record("dated", Some("2024-06-01T10:30:31Z")),
            record("undated", None),
            record("garbled", Some("not a date")),
        ];
        let html = results_table(&records, &RenderOptions::default());
        assert!(html.contains("dated"));
        assert!(!html.contains("undated"));
        assert!(!html.contains("garbled"));
    }

    #[test]
    fn unsorted_results_are_newest_first() {
        let records = vec![
            record("older", Some("2024-06-01T10:00:00Z")),
            record("newer", Some("2024-06-10T10:00:00Z")),
        ];
        let options = RenderOptions {
            server_sorted: false,
            ..RenderOptions::default()
        };
        let html = results_table(&records, &options);
        let (Some(newer), Some(older)) = (html.find("newer"), html.find("older")) else {
            panic!("both rows rendered");
        };
        assert!(newer < older);

        let kept = results_table(&records, &RenderOptions::default());
        let (Some(newer), Some(older)) = (kept.find("newer"), kept.find("older")) else {
            panic!("both rows rendered");
        };
        assert!(older < newer);
    }

    #[test]
    fn long_ids_are_truncated_but_kept_in_attributes() {
        let id = "S2A_MSIL2A_20240601T103031_N0510_R108_T32VNH_20240601T150501";
        let html = results_table(&[record(id, Some("2024-06-01T10:30:31Z"))], &RenderOptions::default());
        let prefix: String = id.chars().take(ID_DISPLAY_LEN).collect();
        assert!(html.contains(&format!("{prefix}…")));
        assert!(html.contains(&format!(r#"data-image-id="{id}""#)));
        assert!(html.contains(r#"data-action="download""#));
        assert!(html.contains(r#"data-action="details""#));
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate_id("æøåæøå", 3), "æøå…");
        assert_eq!(truncate_id("short", 30), "short");
    }

    #[test]
    fn text_is_escaped() {
        let mut r = record("<script>", Some("2024-06-01T10:30:31Z"));
        r.water_level = Some(WaterLevelInfo {
            value: Some(4.0),
            ..WaterLevelInfo::default()
        });
        let html = results_table(&[r], &RenderOptions::default());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("4.00 cm"));
    }

    #[test]
    fn locale_changes_date_format() {
        let Some(at) = crate::domain::image_record::parse_timestamp("2024-06-01T10:30:31Z") else {
            panic!("valid timestamp");
        };
        let us = format_timestamp(at, Locale::en_US);
        let dk = format_timestamp(at, Locale::da_DK);
        assert!(us.contains("2024") || us.contains("24"));
        assert_ne!(us, dk);
    }

    #[test]
    fn pagination_marks_active_and_disabled() {
        let state = PaginationState::from_response(1, 20, 57, true, false, 20);
        let html = pagination_controls(&state, 20);
        assert!(html.contains(r##"<li class="page-item disabled"><a class="page-link" href="#" data-page="1">Previous</a></li>"##));
        assert!(html.contains(r##"<li class="page-item active"><a class="page-link" href="#" data-page="1" aria-current="page">1</a></li>"##));
        assert!(html.contains("Showing 1–20 of 57 results"));
        assert!(pagination_controls(&PaginationState::default(), 0).is_empty());
    }

    #[test]
    fn station_labels() {
        let Ok(station) = serde_json::from_str::<Station>(
            r#"{"stationId":"30336","name":"Aarhus, Havn","coordinates":[10.22,56.15]}"#,
        ) else {
            panic!("valid station");
        };
        let scale = ColorScale::default();
        let with = StationMarker::new(&station, 56.15, 10.22, Some(45.0), &scale);
        assert!(station_label_html(&with).contains(r#"class="water-level-label""#));
        assert!(station_label_html(&with).contains("45.00 cm"));
        let without = StationMarker::new(&station, 56.15, 10.22, None, &scale);
        assert!(station_label_html(&without).contains("no-data"));
        assert!(station_popup_html(&without).contains("Aarhus, Havn"));
    }
}
