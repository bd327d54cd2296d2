//! CSV export of search results.

use crate::api::SearchBackend;
use crate::domain::{ImageRecord, SearchQuery};
use crate::error::{ExplorerError, Result};

/// MIME type of the delivered file.
pub const CSV_CONTENT_TYPE: &str = "text/csv;charset=utf-8";

const BASE_COLUMNS: [&str; 5] = [
    "ID",
    "Date",
    "Cloud Coverage (%)",
    "Sun Elevation",
    "Sun Azimuth",
];
const WATER_COLUMNS: [&str; 3] = ["Water Level (cm)", "Station ID", "Station Name"];
const PREVIEW_COLUMN: &str = "Preview URL";

/// Serialises records to CSV.
///
/// Water-level columns are written only when at least one record carries a
/// water-level block. Fields are quoted only when they need it.
///
/// # Errors
///
/// Returns [`ExplorerError::Csv`] if a record cannot be written.
pub fn csv_for(records: &[ImageRecord]) -> Result<Vec<u8>> {
    let with_water = records.iter().any(|r| r.water_level.is_some());
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    let mut header: Vec<&str> = BASE_COLUMNS.to_vec();
    if with_water {
        header.extend(WATER_COLUMNS);
    }
    header.push(PREVIEW_COLUMN);
    writer.write_record(&header)?;

    for record in records {
        let mut row = vec![
            record.id.clone(),
            record.date.clone().unwrap_or_default(),
            record.cloud_coverage.to_string(),
            optional_number(record.sun_elevation),
            optional_number(record.sun_azimuth),
        ];
        if with_water {
            let water = record.water_level.as_ref();
            row.push(optional_number(water.and_then(|w| w.value)));
            row.push(water.and_then(|w| w.station_id.clone()).unwrap_or_default());
            row.push(water.and_then(|w| w.station_name.clone()).unwrap_or_default());
        }
        row.push(record.preview_url.clone().unwrap_or_default());
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|e| ExplorerError::Csv(csv::Error::from(e.into_error())))
}

fn optional_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Fetches every page of `query`, one after another.
///
/// Page `n + 1` is requested only after page `n` arrived; the loop stops
/// when the backend reports no next page or returns an empty page.
///
/// # Errors
///
/// Any failed page aborts the export with its error.
/// [`ExplorerError::ExportPageLimit`] when more than `max_pages` pages
/// would be needed.
pub async fn drain_all_pages<B: SearchBackend>(
    backend: &B,
    query: &SearchQuery,
    page_size: u32,
    max_pages: u32,
) -> Result<Vec<ImageRecord>> {
    let mut records = Vec::new();
    let mut page = 1;
    loop {
        if page > max_pages {
            tracing::warn!(max_pages, fetched = records.len(), "export page limit reached");
            return Err(ExplorerError::ExportPageLimit { max_pages });
        }
        let result = backend.search_images(&query.with_page(page, page_size)).await?;
        let received = result.records.len();
        let has_next = result.pagination.has_next_page;
        records.extend(result.records);
        tracing::debug!(page, received, total = records.len(), "export page fetched");
        if !has_next || received == 0 {
            break;
        }
        page += 1;
    }
    tracing::info!(pages = page, records = records.len(), "export drained");
    Ok(records)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{Geometry, SearchForm};
    use crate::test_support::{FakeBackend, record};

    fn query() -> SearchQuery {
        let today = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap_or_default();
        let Ok(query) =
            SearchForm::default().build(Geometry::rectangle(10.0, 55.0, 11.0, 56.0), today)
        else {
            panic!("valid form");
        };
        query
    }

    fn text(bytes: Vec<u8>) -> String {
        let Ok(text) = String::from_utf8(bytes) else {
            panic!("utf-8 csv");
        };
        text
    }

    #[test]
    fn only_fields_with_separators_are_quoted() {
        let Ok(bytes) = csv_for(&[record(0)]) else {
            panic!("csv written");
        };
        let text = text(bytes);
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some(
                "ID,Date,Cloud Coverage (%),Sun Elevation,Sun Azimuth,Water Level (cm),Station ID,Station Name,Preview URL"
            )
        );
        assert_eq!(
            lines.next(),
            Some(
                r#"S2A_MSIL2A_0000,2024-06-01T10:30:31Z,5,45.5,160.25,12.5,30336,"Aarhus, Havn",https://example.org/0.png"#
            )
        );
    }

    #[test]
    fn water_columns_are_omitted_without_water_data() {
        let Ok(bytes) = csv_for(&[record(1), record(3)]) else {
            panic!("csv written");
        };
        let text = text(bytes);
        assert!(text.starts_with("ID,Date,Cloud Coverage (%),Sun Elevation,Sun Azimuth,Preview URL\n"));
        assert!(!text.contains("Station"));
    }

    #[test]
    fn rows_without_water_data_get_empty_cells() {
        let Ok(bytes) = csv_for(&[record(0), record(1)]) else {
            panic!("csv written");
        };
        let text = text(bytes);
        assert!(text.contains("S2A_MSIL2A_0001,2024-06-02T10:30:31Z,5,45.5,160.25,,,,https://example.org/1.png"));
    }

    #[tokio::test]
    async fn drain_fetches_pages_in_order_until_no_next() {
        let backend = FakeBackend::with_records(230);
        let Ok(records) = drain_all_pages(&backend, &query(), 100, 10).await else {
            panic!("drain succeeds");
        };
        assert_eq!(records.len(), 230);
        assert_eq!(backend.requested_pages(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn drain_aborts_on_failed_page() {
        let backend = FakeBackend {
            fail_on_page: Some(2),
            ..FakeBackend::with_records(230)
        };
        let Err(ExplorerError::HttpStatus { .. }) = drain_all_pages(&backend, &query(), 100, 10).await else {
            panic!("drain aborts");
        };
        assert_eq!(backend.requested_pages(), vec![1, 2]);
    }

    #[tokio::test]
    async fn drain_is_bounded() {
        let backend = FakeBackend::with_records(500);
        let Err(ExplorerError::ExportPageLimit { max_pages: 2 }) =
            drain_all_pages(&backend, &query(), 100, 2).await
        else {
            panic!("page limit hit");
        };
        assert_eq!(backend.search_calls(), 2);
    }
}
