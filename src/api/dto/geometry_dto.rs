//! Legacy `POST /process_geometry` DTOs.
//!
//! The backend parses the import itself and runs a search with default
//! parameters in the same call.

use serde::{Deserialize, Serialize};

use crate::domain::{FileFormat, Geometry, ImageRecord, ImportSource};

/// Request body for `POST /process_geometry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProcessGeometryRequest {
    /// Pasted WKT.
    Wkt {
        /// WKT text.
        wkt: String,
    },
    /// Uploaded file.
    File {
        /// Declared format.
        format: FileFormat,
        /// File contents.
        file: String,
    },
}

impl From<&ImportSource> for ProcessGeometryRequest {
    fn from(source: &ImportSource) -> Self {
        match source {
            ImportSource::Wkt(wkt) => Self::Wkt { wkt: wkt.clone() },
            ImportSource::File(file) => Self::File {
                format: file.format,
                file: file.contents.clone(),
            },
        }
    }
}

/// Response body for `POST /process_geometry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessGeometryResponse {
    /// Geometry the backend extracted.
    pub geometry: Geometry,
    /// Scenes matching it.
    #[serde(default)]
    pub sentinel_images: Vec<ImageRecord>,
}
