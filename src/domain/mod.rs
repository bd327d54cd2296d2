//! Domain layer: geometry, search queries, scene records, pagination and
//! water-level stations.
//!
//! Everything here is plain data plus pure functions; no I/O happens in
//! this module.

pub mod aoi;
pub mod geometry;
pub mod image_record;
pub mod pagination;
pub mod search_query;
pub mod station;
pub mod wkt;

pub use aoi::{
    AoiMode, AreaOfInterest, FileFormat, GeoJsonParser, GeometryParser, ImportFile, ImportParser,
    ImportSource, WktParser,
};
pub use geometry::{BoundingBox, Geometry, Position};
pub use image_record::{Asset, ImageDetails, ImageMetadata, ImageRecord, WaterLevelInfo};
pub use pagination::{PageControl, PaginationState, ResultsStore, SearchPage};
pub use search_query::{SearchForm, SearchQuery, SortBy, SortDirection};
pub use station::{ColorScale, MarkerColor, Station, StationLevelReading, StationMarker};
