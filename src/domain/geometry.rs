//! GeoJSON geometry for the area of interest.
//!
//! Only polygonal geometries are searchable. A drawn rectangle is stored as
//! a closed five-position polygon. Geometric predicates run on the `geo`
//! types; [`Geometry`] is only the wire shape.

use geo::{BoundingRect, Coord, Intersects, Line, LineString, MultiPolygon, Polygon, RemoveRepeatedPoints};
use serde::{Deserialize, Serialize};

use crate::error::ExplorerError;

/// `[longitude, latitude]` in WGS84 degrees.
pub type Position = [f64; 2];

/// Polygonal GeoJSON geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// A polygon: exterior ring followed by optional holes.
    Polygon {
        /// Linear rings, each closed (first == last).
        coordinates: Vec<Vec<Position>>,
    },
    /// A set of polygons.
    MultiPolygon {
        /// Polygons, each a list of closed rings.
        coordinates: Vec<Vec<Vec<Position>>>,
    },
}

/// Axis-aligned bounds `(min_lon, min_lat, max_lon, max_lat)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Western edge.
    pub min_lon: f64,
    /// Southern edge.
    pub min_lat: f64,
    /// Eastern edge.
    pub max_lon: f64,
    /// Northern edge.
    pub max_lat: f64,
}

impl BoundingBox {
    /// Center as `(lon, lat)`.
    #[must_use]
    pub fn center(&self) -> Position {
        [
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        ]
    }
}

impl Geometry {
    /// Builds the closed polygon a rectangle tool produces.
    #[must_use]
    pub fn rectangle(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self::Polygon {
            coordinates: vec![vec![
                [min_lon, min_lat],
                [max_lon, min_lat],
                [max_lon, max_lat],
                [min_lon, max_lat],
                [min_lon, min_lat],
            ]],
        }
    }

    /// Iterates over every ring of every polygon.
    pub fn rings(&self) -> Box<dyn Iterator<Item = &Vec<Position>> + '_> {
        match self {
            Self::Polygon { coordinates } => Box::new(coordinates.iter()),
            Self::MultiPolygon { coordinates } => Box::new(coordinates.iter().flatten()),
        }
    }

    /// Converts the wire shape into `geo` polygons.
    #[must_use]
    pub fn to_geo(&self) -> MultiPolygon<f64> {
        match self {
            Self::Polygon { coordinates } => MultiPolygon::new(vec![polygon(coordinates)]),
            Self::MultiPolygon { coordinates } => {
                MultiPolygon::new(coordinates.iter().map(Vec::as_slice).map(polygon).collect())
            }
        }
    }

    /// Bounds over all positions, `None` for an empty geometry.
    #[must_use]
    pub fn bbox(&self) -> Option<BoundingBox> {
        self.to_geo().bounding_rect().map(|rect| BoundingBox {
            min_lon: rect.min().x,
            min_lat: rect.min().y,
            max_lon: rect.max().x,
            max_lat: rect.max().y,
        })
    }

    /// Checks ring closure, coordinate ranges, and self-intersection.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::GeometryParse`] describing the first defect.
    pub fn validate(&self) -> Result<(), ExplorerError> {
        let mut any = false;
        for ring in self.rings() {
            any = true;
            validate_ring(ring)?;
        }
        if any {
            Ok(())
        } else {
            Err(ExplorerError::GeometryParse("geometry has no rings".to_string()))
        }
    }
}

fn ring(positions: &[Position]) -> LineString<f64> {
    positions.iter().map(|&[x, y]| Coord { x, y }).collect()
}

fn polygon(rings: &[Vec<Position>]) -> Polygon<f64> {
    let mut rings = rings.iter().map(Vec::as_slice).map(ring);
    let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
    Polygon::new(exterior, rings.collect())
}

fn validate_ring(positions: &[Position]) -> Result<(), ExplorerError> {
    if positions.first() != positions.last() {
        return Err(ExplorerError::GeometryParse("ring is not closed".to_string()));
    }
    for p in positions {
        let [lon, lat] = *p;
        if !lon.is_finite() || !lat.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(ExplorerError::GeometryParse(format!(
                "longitude out of range: {lon}"
            )));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ExplorerError::GeometryParse(format!(
                "latitude out of range: {lat}"
            )));
        }
    }
    // drawing tools repeat vertices; those are not edges
    let ring = ring(positions).remove_repeated_points();
    if ring.0.len() < 4 {
        return Err(ExplorerError::GeometryParse(format!(
            "ring needs at least 3 distinct positions, got {}",
            ring.0.len().saturating_sub(1)
        )));
    }
    if ring_self_intersects(&ring) {
        return Err(ExplorerError::GeometryParse(
            "polygon edges cannot cross".to_string(),
        ));
    }
    Ok(())
}

/// True when two non-adjacent edges of the closed ring touch or cross.
#[must_use]
pub fn ring_self_intersects(ring: &LineString<f64>) -> bool {
    let edges: Vec<Line<f64>> = ring.lines().collect();
    let last = edges.len().saturating_sub(1);
    edges.iter().enumerate().any(|(i, a)| {
        edges
            .iter()
            .enumerate()
            .skip(i + 2)
            // first and last edge share the closing vertex
            .filter(|(j, _)| !(i == 0 && *j == last))
            .any(|(_, b)| a.intersects(b))
    })
}
