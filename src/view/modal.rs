//! The single reusable modal shared by the download and details views.

use std::collections::BTreeMap;

use super::render::{RenderOptions, format_timestamp, html_escape};
use crate::domain::image_record::parse_timestamp;
use crate::domain::{ImageDetails, WaterLevelInfo};

/// What the modal currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalContent {
    /// Band download links for one image.
    DownloadLinks {
        /// Image the links belong to.
        image_id: String,
        /// Band name to URL.
        links: BTreeMap<String, String>,
    },
    /// Full item details.
    Details(Box<ImageDetails>),
    /// Plain message, used for errors inside the modal.
    Message {
        /// Heading.
        title: String,
        /// Body text.
        body: String,
    },
}

/// One modal instance; opening new content replaces the old.
#[derive(Debug, Clone, Default)]
pub struct Modal {
    content: Option<ModalContent>,
}

impl Modal {
    /// Creates a closed modal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the content and opens the modal.
    pub fn open(&mut self, content: ModalContent) {
        self.content = Some(content);
    }

    /// Closes the modal. Returns `false` if it was already closed.
    pub fn close(&mut self) -> bool {
        self.content.take().is_some()
    }

    /// Whether the modal is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.content.is_some()
    }

    /// Current content.
    #[must_use]
    pub fn content(&self) -> Option<&ModalContent> {
        self.content.as_ref()
    }

    /// Renders the modal body, `None` while closed.
    #[must_use]
    pub fn render(&self, options: &RenderOptions) -> Option<String> {
        let (title, body) = match self.content.as_ref()? {
            ModalContent::DownloadLinks { image_id, links } => (
                format!("Download: {}", html_escape(image_id)),
                links_body(links),
            ),
            ModalContent::Details(details) => (
                format!("Image Details: {}", html_escape(&details.id)),
                details_body(details, options),
            ),
            ModalContent::Message { title, body } => {
                (html_escape(title), format!("<p>{}</p>", html_escape(body)))
            }
        };
        Some(format!(
            r#"<div class="modal-header"><h5 class="modal-title">{title}</h5><button type="button" class="btn-close" data-action="close-modal" aria-label="Close"></button></div>
<div class="modal-body">
{body}
</div>"#
        ))
    }
}

fn links_body(links: &BTreeMap<String, String>) -> String {
    if links.is_empty() {
        return "<p>No download links available for this image.</p>".to_string();
    }
    let items: String = links
        .iter()
        .map(|(band, url)| {
            format!(
                r#"<li class="list-group-item"><a href="{}" target="_blank" rel="noopener">{}</a></li>"#,
                html_escape(url),
                html_escape(band)
            )
        })
        .collect();
    format!(r#"<ul class="list-group">{items}</ul>"#)
}

fn details_body(details: &ImageDetails, options: &RenderOptions) -> String {
    let mut body = String::new();

    let rows: String = details
        .properties
        .iter()
        .filter(|(key, _)| key.as_str() != "waterLevel")
        .map(|(key, value)| {
            format!(
                "<tr><th>{}</th><td>{}</td></tr>",
                html_escape(key),
                html_escape(&property_text(key, value, options))
            )
        })
        .collect();
    body.push_str(&format!(
        r#"<table class="table table-sm details-table"><tbody>{rows}</tbody></table>"#
    ));

    if let Some(water) = details.water_level() {
        body.push_str(&water_panel(&water));
    }

    if !details.assets.is_empty() {
        let assets: String = details
            .assets
            .iter()
            .map(|(name, asset)| {
                format!(
                    r#"<li><a href="{}" target="_blank" rel="noopener">{}</a></li>"#,
                    html_escape(&asset.href),
                    html_escape(asset.title.as_deref().unwrap_or(name))
                )
            })
            .collect();
        body.push_str(&format!(r#"<h6>Assets</h6><ul class="asset-list">{assets}</ul>"#));
    }

    let raw = serde_json::to_string_pretty(details).unwrap_or_default();
    body.push_str(&format!(
        r#"<details><summary>Raw JSON</summary><pre class="raw-json">{}</pre></details>"#,
        html_escape(&raw)
    ));
    body
}

fn property_text(key: &str, value: &serde_json::Value, options: &RenderOptions) -> String {
    match value {
        serde_json::Value::String(s) if key.ends_with("datetime") => parse_timestamp(s)
            .map_or_else(|| s.clone(), |at| format_timestamp(at, options.locale)),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn water_panel(water: &WaterLevelInfo) -> String {
    let level = water
        .value
        .map_or_else(|| "N/A".to_string(), |v| format!("{v:.2} cm"));
    let mut rows = format!("<tr><th>Water Level</th><td>{}</td></tr>", html_escape(&level));
    let extra = [
        ("Station", water.station_name.as_deref()),
        ("Station ID", water.station_id.as_deref()),
        ("Observed", water.observed.as_deref()),
        ("Note", water.message.as_deref()),
    ];
    for (label, value) in extra {
        if let Some(value) = value {
            rows.push_str(&format!("<tr><th>{label}</th><td>{}</td></tr>", html_escape(value)));
        }
    }
    if let Some(distance) = water.station_distance {
        rows.push_str(&format!("<tr><th>Distance</th><td>{distance:.1} km</td></tr>"));
    }
    format!(
        r#"<div class="water-level-panel"><h6>Water Level (DVR90)</h6><table class="table table-sm"><tbody>{rows}</tbody></table></div>"#
    )
}
