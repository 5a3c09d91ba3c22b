use geo_types::{Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};

use crate::error::ShapeResult;
use crate::kernel::{geometry_kind, KernelError};
use crate::shape::{
    LineShape, MultilineShape, MultipolygonShape, PolygonShape, RingShape, ShapeRef, ELLIPSE_POLYGON_VERTEX_COUNT,
};
use crate::vertex::Vertex;

impl From<Vertex> for Coord<f64> {
    fn from(value: Vertex) -> Self {
        Coord { x: value.x, y: value.y }
    }
}

impl From<Coord<f64>> for Vertex {
    fn from(value: Coord<f64>) -> Self {
        Vertex::new(value.x, value.y)
    }
}

fn line_string(vertices: &[Vertex]) -> LineString<f64> {
    LineString::new(vertices.iter().map(|v| Coord::from(*v)).collect())
}

fn polygon(outer: &[Vertex], inner: &[RingShape]) -> Polygon<f64> {
    Polygon::new(
        line_string(outer),
        inner.iter().map(|ring| line_string(ring.vertices())).collect(),
    )
}

fn vertices(line: &LineString<f64>) -> Vec<Vertex> {
    line.0.iter().map(|c| Vertex::from(*c)).collect()
}

fn polygon_shape(polygon: &Polygon<f64>) -> PolygonShape {
    PolygonShape::new(
        RingShape::new(vertices(polygon.exterior())),
        polygon
            .interiors()
            .iter()
            .map(|ring| RingShape::new(vertices(ring)))
            .collect(),
    )
}

/// Kernel representation of the shape. Rectangles and ellipses become polygons, ellipses approximated with
/// [`ELLIPSE_POLYGON_VERTEX_COUNT`] vertices.
pub(crate) fn to_geometry(shape: ShapeRef<'_>) -> Geometry<f64> {
    match shape {
        ShapeRef::Point(p) => Geometry::Point(Point::new(p.x(), p.y())),
        ShapeRef::Multipoint(m) => Geometry::MultiPoint(MultiPoint::new(
            m.points().iter().map(|p| Point::new(p.x(), p.y())).collect(),
        )),
        ShapeRef::Line(l) => Geometry::LineString(line_string(l.vertices())),
        ShapeRef::Multiline(m) => Geometry::MultiLineString(MultiLineString::new(
            m.lines().iter().map(|l| line_string(l.vertices())).collect(),
        )),
        ShapeRef::Ring(r) => Geometry::Polygon(polygon(r.vertices(), &[])),
        ShapeRef::Polygon(p) => Geometry::Polygon(polygon(p.outer_ring().vertices(), p.inner_rings())),
        ShapeRef::Multipolygon(m) => Geometry::MultiPolygon(MultiPolygon::new(
            m.polygons()
                .iter()
                .map(|p| polygon(p.outer_ring().vertices(), p.inner_rings()))
                .collect(),
        )),
        ShapeRef::Rectangle(r) => Geometry::Polygon(polygon(r.ring_vertices().as_slice(), &[])),
        ShapeRef::Ellipse(e) => Geometry::Polygon(polygon(
            e.polygon_vertices(ELLIPSE_POLYGON_VERTEX_COUNT).as_slice(),
            &[],
        )),
    }
}

/// Converts an areal kernel result. Empty collections give an empty multipolygon.
pub(crate) fn to_multipolygon(geometry: Geometry<f64>) -> ShapeResult<MultipolygonShape> {
    let polygons = match geometry {
        Geometry::Polygon(p) => vec![polygon_shape(&p)],
        Geometry::MultiPolygon(m) => m.0.iter().map(polygon_shape).collect(),
        Geometry::Rect(r) => vec![polygon_shape(&r.to_polygon())],
        Geometry::Triangle(t) => vec![polygon_shape(&t.to_polygon())],
        Geometry::GeometryCollection(c) if c.0.is_empty() => vec![],
        other => {
            return Err(KernelError::UnexpectedResult {
                expected: "areal",
                actual: geometry_kind(&other),
            }
            .into())
        }
    };

    Ok(MultipolygonShape::new(polygons))
}

/// Converts a linear kernel result.
pub(crate) fn to_multiline(geometry: Geometry<f64>) -> ShapeResult<MultilineShape> {
    let lines = match geometry {
        Geometry::Line(l) => vec![LineShape::new(vec![l.start.into(), l.end.into()])],
        Geometry::LineString(l) => vec![LineShape::new(vertices(&l))],
        Geometry::MultiLineString(m) => m.0.iter().map(|l| LineShape::new(vertices(l))).collect(),
        Geometry::GeometryCollection(c) if c.0.is_empty() => vec![],
        other => {
            return Err(KernelError::UnexpectedResult {
                expected: "linear",
                actual: geometry_kind(&other),
            }
            .into())
        }
    };

    Ok(MultilineShape::new(lines))
}

/// Outer ring of a single polygon result, such as a convex hull.
pub(crate) fn to_ring(geometry: Geometry<f64>) -> ShapeResult<RingShape> {
    match geometry {
        Geometry::Polygon(p) => Ok(RingShape::new(vertices(p.exterior()))),
        Geometry::MultiPolygon(m) if m.0.len() == 1 => Ok(RingShape::new(vertices(m.0[0].exterior()))),
        Geometry::Rect(r) => Ok(RingShape::new(vertices(r.to_polygon().exterior()))),
        other => Err(KernelError::UnexpectedResult {
            expected: "single polygon",
            actual: geometry_kind(&other),
        }
        .into()),
    }
}
