//! Well-Known Text reader for polygonal areas of interest.
//!
//! Accepts `POLYGON` and `MULTIPOLYGON`, optionally prefixed with an EWKT
//! `SRID=…;` tag and tagged with a `Z` dimension (the third ordinate is
//! dropped). Keywords are case-insensitive.

use crate::domain::geometry::{Geometry, Position};
use crate::error::ExplorerError;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Number(f64),
    Open,
    Close,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExplorerError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            c if c.is_ascii_alphabetic() => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if !c.is_ascii_alphabetic() {
                        break;
                    }
                    word.push(c.to_ascii_uppercase());
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                let mut raw = String::new();
                while let Some(&c) = chars.peek() {
                    if !(c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')) {
                        break;
                    }
                    raw.push(c);
                    chars.next();
                }
                let value = raw
                    .parse::<f64>()
                    .map_err(|_| ExplorerError::GeometryParse(format!("bad number {raw:?}")))?;
                tokens.push(Token::Number(value));
            }
            other => {
                return Err(ExplorerError::GeometryParse(format!(
                    "unexpected character {other:?}"
                )));
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, want: &Token, what: &str) -> Result<(), ExplorerError> {
        match self.next() {
            Some(ref t) if t == want => Ok(()),
            Some(t) => Err(ExplorerError::GeometryParse(format!(
                "expected {what}, found {t:?}"
            ))),
            None => Err(ExplorerError::GeometryParse(format!(
                "expected {what}, found end of input"
            ))),
        }
    }

    fn skip_dimension_tag(&mut self) {
        if let Some(Token::Word(w)) = self.peek()
            && (w == "Z" || w == "M" || w == "ZM")
        {
            self.pos += 1;
        }
    }

    fn position(&mut self) -> Result<Position, ExplorerError> {
        let mut ordinates = Vec::with_capacity(3);
        while let Some(Token::Number(v)) = self.peek() {
            ordinates.push(*v);
            self.pos += 1;
        }
        match ordinates.as_slice() {
            [x, y] | [x, y, _] | [x, y, _, _] => Ok([*x, *y]),
            other => Err(ExplorerError::GeometryParse(format!(
                "position needs 2 to 4 ordinates, got {}",
                other.len()
            ))),
        }
    }

    fn ring(&mut self) -> Result<Vec<Position>, ExplorerError> {
        self.expect(&Token::Open, "'('")?;
        let mut ring = vec![self.position()?];
        while self.peek() == Some(&Token::Comma) {
            self.pos += 1;
            ring.push(self.position()?);
        }
        self.expect(&Token::Close, "')'")?;
        Ok(ring)
    }

    fn polygon(&mut self) -> Result<Vec<Vec<Position>>, ExplorerError> {
        self.expect(&Token::Open, "'('")?;
        let mut rings = vec![self.ring()?];
        while self.peek() == Some(&Token::Comma) {
            self.pos += 1;
            rings.push(self.ring()?);
        }
        self.expect(&Token::Close, "')'")?;
        Ok(rings)
    }

    fn multipolygon(&mut self) -> Result<Vec<Vec<Vec<Position>>>, ExplorerError> {
        self.expect(&Token::Open, "'('")?;
        let mut polygons = vec![self.polygon()?];
        while self.peek() == Some(&Token::Comma) {
            self.pos += 1;
            polygons.push(self.polygon()?);
        }
        self.expect(&Token::Close, "')'")?;
        Ok(polygons)
    }
}

/// Strips an EWKT `SRID=<n>;` prefix. Only WGS84 (4326) is accepted.
fn strip_srid(input: &str) -> Result<&str, ExplorerError> {
    let trimmed = input.trim();
    let Some((tag, rest)) = trimmed.split_once(';') else {
        return Ok(trimmed);
    };
    let Some(srid) = tag.trim().to_ascii_uppercase().strip_prefix("SRID=").map(str::to_string)
    else {
        return Ok(trimmed);
    };
    if srid.trim() != "4326" {
        return Err(ExplorerError::GeometryParse(format!(
            "only SRID=4326 is supported, got SRID={srid}"
        )));
    }
    Ok(rest)
}

/// Parses WKT text into a [`Geometry`].
///
/// # Errors
///
/// Returns [`ExplorerError::GeometryParse`] for malformed text and for
/// non-polygonal geometry types.
pub fn parse_wkt(input: &str) -> Result<Geometry, ExplorerError> {
    let body = strip_srid(input)?;
    let mut parser = Parser {
        tokens: tokenize(body)?,
        pos: 0,
    };

    let geometry = match parser.next() {
        Some(Token::Word(kind)) if kind == "POLYGON" => {
            parser.skip_dimension_tag();
            Geometry::Polygon {
                coordinates: parser.polygon()?,
            }
        }
        Some(Token::Word(kind)) if kind == "MULTIPOLYGON" => {
            parser.skip_dimension_tag();
            Geometry::MultiPolygon {
                coordinates: parser.multipolygon()?,
            }
        }
        Some(Token::Word(kind)) => {
            return Err(ExplorerError::GeometryParse(format!(
                "{kind} is not a polygonal geometry"
            )));
        }
        _ => {
            return Err(ExplorerError::GeometryParse(
                "expected a geometry keyword".to_string(),
            ));
        }
    };

    if let Some(extra) = parser.peek() {
        return Err(ExplorerError::GeometryParse(format!(
            "trailing input after geometry: {extra:?}"
        )));
    }
    Ok(geometry)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_polygon() {
        let Ok(geometry) = parse_wkt("POLYGON ((10 55, 11 55, 11 56, 10 56, 10 55))") else {
            panic!("valid wkt");
        };
        assert_eq!(geometry, Geometry::rectangle(10.0, 55.0, 11.0, 56.0));
    }

    #[test]
    fn keywords_are_case_insensitive_and_whitespace_tolerant() {
        let result = parse_wkt("  polygon((10 55,11 55,11 56,10 56,10 55))  ");
        assert!(result.is_ok());
    }

    #[test]
    fn polygon_with_hole_keeps_both_rings() {
        let wkt = "POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0), (2 2, 3 2, 3 3, 2 2))";
        let Ok(Geometry::Polygon { coordinates }) = parse_wkt(wkt) else {
            panic!("valid polygon");
        };
        assert_eq!(coordinates.len(), 2);
    }

    #[test]
    fn multipolygon_and_z_dimension() {
        let wkt = "MULTIPOLYGON Z (((0 0 1, 1 0 1, 1 1 1, 0 0 1)), ((5 5 0, 6 5 0, 6 6 0, 5 5 0)))";
        let Ok(Geometry::MultiPolygon { coordinates }) = parse_wkt(wkt) else {
            panic!("valid multipolygon");
        };
        assert_eq!(coordinates.len(), 2);
        assert_eq!(coordinates.first().and_then(|p| p.first()).map(Vec::len), Some(4));
    }

    #[test]
    fn srid_prefix_is_accepted_for_wgs84_only() {
        assert!(parse_wkt("SRID=4326;POLYGON ((0 0, 1 0, 1 1, 0 0))").is_ok());
        assert!(parse_wkt("SRID=25832;POLYGON ((0 0, 1 0, 1 1, 0 0))").is_err());
    }

    #[test]
    fn rejects_points_and_garbage() {
        assert!(matches!(
            parse_wkt("POINT (10 55)"),
            Err(ExplorerError::GeometryParse(_))
        ));
        assert!(parse_wkt("POLYGON ((10 55, 11").is_err());
        assert!(parse_wkt("").is_err());
        assert!(parse_wkt("POLYGON ((0 0, 1 0, 1 1, 0 0)) extra").is_err());
    }
}
