//! Well-known text writer and parser.
//!
//! The writer uses compact templates without spaces after commas, e.g. `LINESTRING(0 0,10 0)`. The parser accepts
//! `POINT`, `LINESTRING`, `POLYGON`, `MULTIPOINT`, `MULTILINESTRING` and `MULTIPOLYGON` with case-insensitive
//! keywords, arbitrary whitespace, the `EMPTY` marker and an optional `Z` ordinate. The `Z` value is kept for
//! points and for multipoints where every member has one. It is dropped for all other types.

use thiserror::Error;

use crate::shape::{
    BaseShape, LineShape, MultilineShape, MultipointShape, MultipolygonShape, PointShape, PolygonShape, RingShape, Shape,
    ShapeRef, WellKnownType, ELLIPSE_POLYGON_VERTEX_COUNT,
};
use crate::vertex::Vertex;

/// Well-known text parsing error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WktError {
    /// The input ended before the geometry was complete.
    #[error("unexpected end of input")]
    UnexpectedEnd,
    /// A token other than the expected one was found.
    #[error("expected {expected} at position {position}")]
    Expected {
        /// Description of the expected token.
        expected: &'static str,
        /// Byte offset of the unexpected token.
        position: usize,
    },
    /// The geometry keyword is not known.
    #[error("unknown geometry type `{keyword}` at position {position}")]
    UnknownType {
        /// The keyword as written.
        keyword: String,
        /// Byte offset of the keyword.
        position: usize,
    },
    /// The geometry or dimension is valid well-known text, but has no shape counterpart.
    #[error("{0} is not supported")]
    Unsupported(&'static str),
    /// A coordinate is not a valid number.
    #[error("invalid number `{text}` at position {position}")]
    InvalidNumber {
        /// The text that failed to parse.
        text: String,
        /// Byte offset of the number.
        position: usize,
    },
    /// Something follows the end of the geometry.
    #[error("unexpected input after the end of the geometry at position {position}")]
    TrailingInput {
        /// Byte offset of the first unexpected character.
        position: usize,
    },
}

/// Writes the shape as well-known text.
pub fn write(shape: ShapeRef<'_>) -> String {
    let mut out = String::new();
    match shape {
        ShapeRef::Point(point) => match point.z() {
            Some(_) => {
                out.push_str("POINT Z(");
                push_point(&mut out, point);
                out.push(')');
            }
            None => {
                out.push_str("POINT(");
                push_vertex(&mut out, &point.to_vertex());
                out.push(')');
            }
        },
        ShapeRef::Multipoint(multipoint) => {
            let points = multipoint.points();
            if !points.is_empty() && points.iter().all(|point| point.z().is_some()) {
                out.push_str("MULTIPOINT Z(");
                push_list(&mut out, points, push_point);
                out.push(')');
            } else {
                let vertices: Vec<_> = points.iter().map(PointShape::to_vertex).collect();
                push_tagged(&mut out, WellKnownType::MultiPoint, vertices.is_empty(), |out| {
                    push_vertex_list(out, &vertices)
                });
            }
        }
        ShapeRef::Line(line) => {
            push_tagged(&mut out, WellKnownType::LineString, line.vertices().is_empty(), |out| {
                push_vertex_list(out, line.vertices())
            });
        }
        ShapeRef::Multiline(multiline) => {
            push_tagged(
                &mut out,
                WellKnownType::MultiLineString,
                multiline.lines().is_empty(),
                |out| {
                    push_list(out, multiline.lines(), |out, line| {
                        out.push('(');
                        push_vertex_list(out, line.vertices());
                        out.push(')');
                    })
                },
            );
        }
        ShapeRef::Ring(ring) => push_polygon(&mut out, &[ring.vertices()]),
        ShapeRef::Polygon(polygon) => {
            let rings: Vec<_> = polygon.rings().map(RingShape::vertices).collect();
            push_polygon(&mut out, &rings);
        }
        ShapeRef::Multipolygon(multipolygon) => {
            push_tagged(
                &mut out,
                WellKnownType::MultiPolygon,
                multipolygon.polygons().is_empty(),
                |out| {
                    push_list(out, multipolygon.polygons(), |out, polygon| {
                        let rings: Vec<_> = polygon.rings().map(RingShape::vertices).collect();
                        push_rings(out, &rings);
                    })
                },
            );
        }
        ShapeRef::Rectangle(rectangle) => push_polygon(&mut out, &[rectangle.ring_vertices().as_slice()]),
        ShapeRef::Ellipse(ellipse) => {
            push_polygon(&mut out, &[ellipse.polygon_vertices(ELLIPSE_POLYGON_VERTEX_COUNT).as_slice()])
        }
    }

    out
}

fn push_number(out: &mut String, value: f64) {
    out.push_str(&value.to_string());
}

fn push_vertex(out: &mut String, vertex: &Vertex) {
    push_number(out, vertex.x);
    out.push(' ');
    push_number(out, vertex.y);
}

/// Pushes the point coordinates with its `Z` value, if any.
fn push_point(out: &mut String, point: &PointShape) {
    push_vertex(out, &point.to_vertex());
    if let Some(z) = point.z() {
        out.push(' ');
        push_number(out, z);
    }
}

fn push_list<T>(out: &mut String, items: &[T], mut push_item: impl FnMut(&mut String, &T)) {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        push_item(out, item);
    }
}

fn push_vertex_list(out: &mut String, vertices: &[Vertex]) {
    push_list(out, vertices, push_vertex);
}

fn push_tagged(out: &mut String, kind: WellKnownType, is_empty: bool, body: impl FnOnce(&mut String)) {
    out.push_str(kind.wkt_keyword());
    if is_empty {
        out.push_str(" EMPTY");
    } else {
        out.push('(');
        body(out);
        out.push(')');
    }
}

fn push_rings(out: &mut String, rings: &[&[Vertex]]) {
    out.push('(');
    push_list(out, rings, |out, ring| {
        out.push('(');
        push_vertex_list(out, ring);
        out.push(')');
    });
    out.push(')');
}

fn push_polygon(out: &mut String, rings: &[&[Vertex]]) {
    out.push_str(WellKnownType::Polygon.wkt_keyword());
    if rings.iter().all(|ring| ring.is_empty()) {
        out.push_str(" EMPTY");
    } else {
        push_rings(out, rings);
    }
}

/// Parses well-known text into a shape.
pub fn parse(wkt: &str) -> Result<Shape, WktError> {
    let mut parser = Parser { input: wkt, position: 0 };
    let shape = parser.geometry()?;

    parser.skip_whitespace();
    if parser.position < wkt.len() {
        return Err(WktError::TrailingInput {
            position: parser.position,
        });
    }

    log::trace!("Parsed {} from well-known text", shape.shape_type());
    Ok(shape)
}

type ParseResult<T> = Result<T, WktError>;

#[derive(Debug, Copy, Clone)]
struct Coordinate {
    vertex: Vertex,
    z: Option<f64>,
}

struct Parser<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Parser<'a> {
    fn geometry(&mut self) -> ParseResult<Shape> {
        self.skip_whitespace();
        let keyword_position = self.position;
        let keyword = self.word().ok_or(match self.peek() {
            None => WktError::UnexpectedEnd,
            Some(_) => WktError::Expected {
                expected: "geometry type",
                position: keyword_position,
            },
        })?;

        let kind = match keyword.to_ascii_uppercase().as_str() {
            "POINT" => WellKnownType::Point,
            "LINESTRING" => WellKnownType::LineString,
            "POLYGON" => WellKnownType::Polygon,
            "MULTIPOINT" => WellKnownType::MultiPoint,
            "MULTILINESTRING" => WellKnownType::MultiLineString,
            "MULTIPOLYGON" => WellKnownType::MultiPolygon,
            "GEOMETRYCOLLECTION" => return Err(WktError::Unsupported("GEOMETRYCOLLECTION")),
            _ => {
                return Err(WktError::UnknownType {
                    keyword: keyword.to_owned(),
                    position: keyword_position,
                })
            }
        };

        self.dimension()?;
        let is_empty = self.empty();

        let shape = match kind {
            WellKnownType::Point => {
                if is_empty {
                    return Err(WktError::Unsupported("empty POINT"));
                }
                let Coordinate { vertex, z } = self.parenthesized(Self::coordinate)?;
                match z {
                    Some(z) => PointShape::with_z(vertex.x, vertex.y, z).into(),
                    None => PointShape::from_vertex(vertex).into(),
                }
            }
            WellKnownType::LineString => {
                let vertices = if is_empty { vec![] } else { self.vertex_list()? };
                LineShape::new(vertices).into()
            }
            WellKnownType::Polygon => {
                if is_empty {
                    PolygonShape::new(RingShape::new(vec![]), vec![]).into()
                } else {
                    self.polygon()?.into()
                }
            }
            WellKnownType::MultiPoint => {
                let points = if is_empty {
                    vec![]
                } else {
                    self.parenthesized(|p| p.comma_separated(Self::multipoint_member))?
                };
                MultipointShape::new(points).into()
            }
            WellKnownType::MultiLineString => {
                let lines = if is_empty {
                    vec![]
                } else {
                    self.parenthesized(|p| p.comma_separated(|p| p.vertex_list().map(LineShape::new)))?
                };
                MultilineShape::new(lines).into()
            }
            WellKnownType::MultiPolygon => {
                let polygons = if is_empty {
                    vec![]
                } else {
                    self.parenthesized(|p| p.comma_separated(Self::polygon))?
                };
                MultipolygonShape::new(polygons).into()
            }
            WellKnownType::GeometryCollection => return Err(WktError::Unsupported("GEOMETRYCOLLECTION")),
        };

        Ok(shape)
    }

    fn polygon(&mut self) -> ParseResult<PolygonShape> {
        let mut rings = self
            .parenthesized(|p| p.comma_separated(Self::vertex_list))?
            .into_iter()
            .map(RingShape::new);
        let outer = rings.next().unwrap_or_else(|| RingShape::new(vec![]));
        Ok(PolygonShape::new(outer, rings.collect()))
    }

    fn multipoint_member(&mut self) -> ParseResult<PointShape> {
        self.skip_whitespace();
        let coordinate = if self.peek() == Some('(') {
            self.parenthesized(Self::coordinate)?
        } else {
            self.coordinate()?
        };

        Ok(match coordinate.z {
            Some(z) => PointShape::with_z(coordinate.vertex.x, coordinate.vertex.y, z),
            None => PointShape::from_vertex(coordinate.vertex),
        })
    }

    fn vertex_list(&mut self) -> ParseResult<Vec<Vertex>> {
        let coordinates = self.parenthesized(|p| p.comma_separated(Self::coordinate))?;
        Ok(coordinates.into_iter().map(|c| c.vertex).collect())
    }

    fn coordinate(&mut self) -> ParseResult<Coordinate> {
        let x = self.number()?;
        let y = self.number()?;

        self.skip_whitespace();
        let z = match self.peek() {
            Some(c) if is_number_char(c) => Some(self.number()?),
            _ => None,
        };

        Ok(Coordinate {
            vertex: Vertex::new(x, y),
            z,
        })
    }

    fn number(&mut self) -> ParseResult<f64> {
        self.skip_whitespace();
        let start = self.position;
        let text = self.take_while(is_number_char);
        if text.is_empty() {
            return Err(match self.peek() {
                None => WktError::UnexpectedEnd,
                Some(_) => WktError::Expected {
                    expected: "number",
                    position: start,
                },
            });
        }

        text.parse().map_err(|_| WktError::InvalidNumber {
            text: text.to_owned(),
            position: start,
        })
    }

    /// Optional dimension tag after the geometry keyword.
    fn dimension(&mut self) -> ParseResult<()> {
        self.skip_whitespace();
        let start = self.position;
        match self.word().map(str::to_ascii_uppercase).as_deref() {
            Some("Z") => Ok(()),
            Some("M") | Some("ZM") => Err(WktError::Unsupported("M ordinate")),
            _ => {
                self.position = start;
                Ok(())
            }
        }
    }

    fn empty(&mut self) -> bool {
        self.skip_whitespace();
        let start = self.position;
        if self.word().is_some_and(|word| word.eq_ignore_ascii_case("EMPTY")) {
            true
        } else {
            self.position = start;
            false
        }
    }

    fn parenthesized<T>(&mut self, body: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        self.expect('(', "`(`")?;
        let value = body(self)?;
        self.expect(')', "`)`")?;
        Ok(value)
    }

    fn comma_separated<T>(&mut self, mut item: impl FnMut(&mut Self) -> ParseResult<T>) -> ParseResult<Vec<T>> {
        let mut items = vec![item(self)?];
        loop {
            self.skip_whitespace();
            if self.peek() != Some(',') {
                return Ok(items);
            }
            self.position += 1;
            items.push(item(self)?);
        }
    }

    fn expect(&mut self, expected_char: char, expected: &'static str) -> ParseResult<()> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(WktError::UnexpectedEnd),
            Some(c) if c == expected_char => {
                self.position += c.len_utf8();
                Ok(())
            }
            Some(_) => Err(WktError::Expected {
                expected,
                position: self.position,
            }),
        }
    }

    fn word(&mut self) -> Option<&'a str> {
        let word = self.take_while(|c| c.is_ascii_alphabetic());
        (!word.is_empty()).then_some(word)
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let input = self.input;
        let rest = &input[self.position..];
        let length = rest.find(|c: char| !predicate(c)).unwrap_or(rest.len());
        self.position += length;
        &rest[..length]
    }

    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')
}
