//! Area-of-interest input: drawn shapes and imported geometries.
//!
//! Exactly one source is active at a time, chosen by [`AoiMode`]. Drawing
//! keeps a single shape; a new shape replaces the previous one. Imports go
//! through a [`GeometryParser`], whose support level is explicit per format.

use serde::{Deserialize, Serialize};

use super::geometry::Geometry;
use super::wkt::parse_wkt;
use crate::error::ExplorerError;

/// Message shown when searching in draw mode without a shape.
pub const NO_SHAPE_MESSAGE: &str = "Please draw a polygon on the map first.";

/// Message shown when searching in import mode without input.
pub const NO_IMPORT_MESSAGE: &str = "Please select a file or paste WKT.";

/// Which geometry source the mode selector points at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AoiMode {
    /// Shape drawn on the map.
    #[default]
    Draw,
    /// Pasted WKT or an uploaded file.
    Import,
}

/// Formats accepted by the file picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// GeoJSON geometry, Feature or FeatureCollection.
    GeoJson,
    /// A text file holding WKT.
    Wkt,
    /// KML document; only the backend can read it.
    Kml,
    /// ESRI Shapefile, bare `.shp` or a zipped bundle.
    Shapefile,
}

impl FileFormat {
    /// Guesses the format from a file extension.
    #[must_use]
    pub fn from_extension(name: &str) -> Option<Self> {
        let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "geojson" | "json" => Some(Self::GeoJson),
            "wkt" | "txt" => Some(Self::Wkt),
            "kml" => Some(Self::Kml),
            "shp" | "zip" => Some(Self::Shapefile),
            _ => None,
        }
    }
}

/// A file picked in import mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportFile {
    /// Declared format.
    pub format: FileFormat,
    /// Original file name.
    pub name: String,
    /// File contents as text.
    pub contents: String,
}

/// What the user handed to the import path.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportSource {
    /// Pasted WKT text.
    Wkt(String),
    /// Uploaded file.
    File(ImportFile),
}

impl ImportSource {
    /// Picks the import source from the form: pasted WKT wins over a file.
    #[must_use]
    pub fn from_inputs(wkt_text: &str, file: Option<ImportFile>) -> Option<Self> {
        let wkt = wkt_text.trim();
        if !wkt.is_empty() {
            return Some(Self::Wkt(wkt.to_string()));
        }
        file.map(Self::File)
    }
}

/// Turns import input into a geometry.
pub trait GeometryParser {
    /// Parses `input`.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::GeometryParse`] for malformed input and
    /// [`ExplorerError::UnsupportedImport`] for formats the parser declines.
    fn parse(&self, input: &ImportSource) -> Result<Geometry, ExplorerError>;
}

/// Parses GeoJSON text: a bare geometry, a Feature, or the first polygonal
/// geometry of a FeatureCollection.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeoJsonParser;

impl GeoJsonParser {
    /// Parses GeoJSON text directly.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::GeometryParse`] if the text is not JSON or
    /// holds no polygonal geometry.
    pub fn parse_text(&self, text: &str) -> Result<Geometry, ExplorerError> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| ExplorerError::GeometryParse(format!("invalid GeoJSON: {e}")))?;
        first_polygonal(&value).ok_or_else(|| {
            ExplorerError::GeometryParse("GeoJSON holds no Polygon or MultiPolygon".to_string())
        })
    }
}

fn first_polygonal(value: &serde_json::Value) -> Option<Geometry> {
    match value.get("type").and_then(|t| t.as_str())? {
        "FeatureCollection" => value
            .get("features")?
            .as_array()?
            .iter()
            .find_map(first_polygonal),
        "Feature" => value.get("geometry").and_then(first_polygonal),
        "Polygon" | "MultiPolygon" => serde_json::from_value(value.clone()).ok(),
        _ => None,
    }
}

impl GeometryParser for GeoJsonParser {
    fn parse(&self, input: &ImportSource) -> Result<Geometry, ExplorerError> {
        match input {
            ImportSource::Wkt(_) => Err(ExplorerError::UnsupportedImport(
                "GeoJSON parser cannot read WKT".to_string(),
            )),
            ImportSource::File(file) => self.parse_text(&file.contents),
        }
    }
}

/// Parses WKT text, pasted or from a file.
#[derive(Debug, Default, Clone, Copy)]
pub struct WktParser;

impl GeometryParser for WktParser {
    fn parse(&self, input: &ImportSource) -> Result<Geometry, ExplorerError> {
        match input {
            ImportSource::Wkt(text) => parse_wkt(text),
            ImportSource::File(file) => parse_wkt(&file.contents),
        }
    }
}

/// Default import parser: WKT and GeoJSON locally, KML and Shapefile declared
/// unsupported.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImportParser;

impl GeometryParser for ImportParser {
    fn parse(&self, input: &ImportSource) -> Result<Geometry, ExplorerError> {
        match input {
            ImportSource::Wkt(_) => WktParser.parse(input),
            ImportSource::File(file) => match file.format {
                FileFormat::Wkt => WktParser.parse(input),
                FileFormat::GeoJson => GeoJsonParser.parse(input),
                FileFormat::Kml => Err(ExplorerError::UnsupportedImport(format!(
                    "KML import is not supported locally ({}); convert it to GeoJSON or WKT, \
                     or send it to the backend for processing",
                    file.name
                ))),
                FileFormat::Shapefile => Err(ExplorerError::UnsupportedImport(format!(
                    "Shapefile import is not supported ({}); export the layer as GeoJSON or WKT",
                    file.name
                ))),
            },
        }
    }
}

/// Drawn and imported geometry state.
#[derive(Debug, Clone, Default)]
pub struct AreaOfInterest {
    drawn: Option<Geometry>,
    imported: Option<Geometry>,
}

impl AreaOfInterest {
    /// Creates an empty area of interest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the drawn shape after validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::GeometryParse`] if the shape is invalid; the
    /// previous shape is kept in that case.
    pub fn set_drawn(&mut self, shape: Geometry) -> Result<(), ExplorerError> {
        shape.validate()?;
        self.drawn = Some(shape);
        Ok(())
    }

    /// Removes the drawn shape.
    pub fn clear_drawn(&mut self) {
        self.drawn = None;
    }

    /// The currently drawn shape.
    #[must_use]
    pub fn drawn(&self) -> Option<&Geometry> {
        self.drawn.as_ref()
    }

    /// The last successfully imported geometry.
    #[must_use]
    pub fn imported(&self) -> Option<&Geometry> {
        self.imported.as_ref()
    }

    /// Stores a geometry obtained elsewhere (e.g. from the backend).
    pub fn set_imported(&mut self, geometry: Geometry) {
        self.imported = Some(geometry);
    }

    /// Resolves the geometry for a search in the given mode.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::Validation`] when the active source is
    /// empty, or the parser's error when the import cannot be read.
    pub fn resolve(
        &mut self,
        mode: AoiMode,
        import: Option<&ImportSource>,
        parser: &dyn GeometryParser,
    ) -> Result<Geometry, ExplorerError> {
        match mode {
            AoiMode::Draw => self
                .drawn
                .clone()
                .ok_or_else(|| ExplorerError::validation(NO_SHAPE_MESSAGE)),
            AoiMode::Import => {
                let source = import.ok_or_else(|| ExplorerError::validation(NO_IMPORT_MESSAGE))?;
                let geometry = parser.parse(source)?;
                geometry.validate()?;
                self.imported = Some(geometry.clone());
                Ok(geometry)
            }
        }
    }
}
