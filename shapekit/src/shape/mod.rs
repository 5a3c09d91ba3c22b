//! Shape variants and the traits describing their capabilities.
//!
//! The set of shapes is closed: [`Shape`] owns any of the nine variants, and [`ShapeRef`] is a cheap borrowed view of
//! one used by algorithms that dispatch on the variant of their arguments.

use std::any::Any;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ShapeResult;
use crate::units::{DistanceUnit, GeographyUnit};
use crate::vertex::Vertex;

/// Runs the same expression for whichever variant the value holds.
///
/// `for_each_variant!(Shape, value, inner => inner.id())`
macro_rules! for_each_variant {
    ($enum:ident, $value:expr, $inner:ident => $body:expr) => {
        match $value {
            $enum::Point($inner) => $body,
            $enum::Multipoint($inner) => $body,
            $enum::Line($inner) => $body,
            $enum::Multiline($inner) => $body,
            $enum::Ring($inner) => $body,
            $enum::Polygon($inner) => $body,
            $enum::Multipolygon($inner) => $body,
            $enum::Rectangle($inner) => $body,
            $enum::Ellipse($inner) => $body,
        }
    };
}

/// Implements the identity accessors of [`BaseShape`] for a struct with `id` and `tag` fields.
macro_rules! identity_accessors {
    () => {
        fn id(&self) -> &str {
            &self.id
        }

        fn set_id(&mut self, id: String) {
            self.id = id;
        }

        fn tag(&self) -> Option<&crate::shape::Tag> {
            self.tag.as_ref()
        }

        fn set_tag(&mut self, tag: Option<crate::shape::Tag>) {
            self.tag = tag;
        }
    };
}

mod base;
mod ellipse;
mod family;
mod line;
mod multiline;
mod multipoint;
mod multipolygon;
mod point;
mod polygon;
mod rectangle;
mod ring;
mod validation;

pub use base::BaseShape;
pub use ellipse::{EllipseShape, ELLIPSE_POLYGON_VERTEX_COUNT, TANGENT_ROUNDING_DIGITS};
pub use family::{AnyAreaShape, AnyLineShape, AnyPointShape, AreaShape, LinearShape, PointFamily};
pub use line::LineShape;
pub use multiline::MultilineShape;
pub use multipoint::MultipointShape;
pub use multipolygon::MultipolygonShape;
pub use point::PointShape;
pub use polygon::PolygonShape;
pub use rectangle::{RectangleShape, RECTANGLE_DEGENERACY_EPSILON};
pub use ring::RingShape;
pub use validation::{ShapeValidationResult, ValidationMode};

pub(crate) use validation::validate;

/// Variant of a shape.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeType {
    /// [`PointShape`]
    Point,
    /// [`MultipointShape`]
    Multipoint,
    /// [`LineShape`]
    Line,
    /// [`MultilineShape`]
    Multiline,
    /// [`RingShape`]
    Ring,
    /// [`PolygonShape`]
    Polygon,
    /// [`MultipolygonShape`]
    Multipolygon,
    /// [`RectangleShape`]
    Rectangle,
    /// [`EllipseShape`]
    Ellipse,
}

impl ShapeType {
    /// Returns false for the variants that cannot be rotated (rectangles stay axis aligned, ellipses have no
    /// rotation angle).
    pub fn can_rotate(self) -> bool {
        !matches!(self, ShapeType::Rectangle | ShapeType::Ellipse)
    }

    /// Type the variant is written as in well-known text and binary.
    pub fn well_known_type(self) -> WellKnownType {
        match self {
            ShapeType::Point => WellKnownType::Point,
            ShapeType::Multipoint => WellKnownType::MultiPoint,
            ShapeType::Line => WellKnownType::LineString,
            ShapeType::Multiline => WellKnownType::MultiLineString,
            ShapeType::Ring
            | ShapeType::Polygon
            | ShapeType::Rectangle
            | ShapeType::Ellipse => WellKnownType::Polygon,
            ShapeType::Multipolygon => WellKnownType::MultiPolygon,
        }
    }
}

impl Display for ShapeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ShapeType::Point => "Point",
            ShapeType::Multipoint => "Multipoint",
            ShapeType::Line => "Line",
            ShapeType::Multiline => "Multiline",
            ShapeType::Ring => "Ring",
            ShapeType::Polygon => "Polygon",
            ShapeType::Multipolygon => "Multipolygon",
            ShapeType::Rectangle => "Rectangle",
            ShapeType::Ellipse => "Ellipse",
        };
        f.write_str(name)
    }
}

/// OGC geometry type, as written in well-known text and binary.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum WellKnownType {
    /// `POINT`
    Point = 1,
    /// `LINESTRING`
    LineString = 2,
    /// `POLYGON`
    Polygon = 3,
    /// `MULTIPOINT`
    MultiPoint = 4,
    /// `MULTILINESTRING`
    MultiLineString = 5,
    /// `MULTIPOLYGON`
    MultiPolygon = 6,
    /// `GEOMETRYCOLLECTION`. Recognized, but not supported by the codec.
    GeometryCollection = 7,
}

impl WellKnownType {
    /// Numeric code used in well-known binary.
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Type with the given 2d code.
    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            1 => Self::Point,
            2 => Self::LineString,
            3 => Self::Polygon,
            4 => Self::MultiPoint,
            5 => Self::MultiLineString,
            6 => Self::MultiPolygon,
            7 => Self::GeometryCollection,
            _ => return None,
        })
    }

    /// Keyword used in well-known text.
    pub fn wkt_keyword(self) -> &'static str {
        match self {
            Self::Point => "POINT",
            Self::LineString => "LINESTRING",
            Self::Polygon => "POLYGON",
            Self::MultiPoint => "MULTIPOINT",
            Self::MultiLineString => "MULTILINESTRING",
            Self::MultiPolygon => "MULTIPOLYGON",
            Self::GeometryCollection => "GEOMETRYCOLLECTION",
        }
    }
}

/// Opaque user value attached to a shape or a feature.
///
/// Cloning a tag is cheap: clones share the same value.
#[derive(Clone)]
pub struct Tag(Arc<dyn Any + Send + Sync>);

impl Tag {
    /// Wraps the value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Returns the value if it is of type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    /// Returns true if both tags hold the same value instance.
    pub fn ptr_eq(&self, other: &Tag) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Tag(..)")
    }
}

/// Creates a fresh unique shape id.
pub fn new_shape_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Owned shape of any variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Shape {
    /// Single point.
    Point(PointShape),
    /// Set of points.
    Multipoint(MultipointShape),
    /// Polyline.
    Line(LineShape),
    /// Set of polylines.
    Multiline(MultilineShape),
    /// Closed ring.
    Ring(RingShape),
    /// Polygon with holes.
    Polygon(PolygonShape),
    /// Set of polygons.
    Multipolygon(MultipolygonShape),
    /// Axis aligned rectangle.
    Rectangle(RectangleShape),
    /// Axis aligned ellipse.
    Ellipse(EllipseShape),
}

/// Borrowed view of a shape of any variant.
#[derive(Debug, Copy, Clone)]
pub enum ShapeRef<'a> {
    /// Single point.
    Point(&'a PointShape),
    /// Set of points.
    Multipoint(&'a MultipointShape),
    /// Polyline.
    Line(&'a LineShape),
    /// Set of polylines.
    Multiline(&'a MultilineShape),
    /// Closed ring.
    Ring(&'a RingShape),
    /// Polygon with holes.
    Polygon(&'a PolygonShape),
    /// Set of polygons.
    Multipolygon(&'a MultipolygonShape),
    /// Axis aligned rectangle.
    Rectangle(&'a RectangleShape),
    /// Axis aligned ellipse.
    Ellipse(&'a EllipseShape),
}

macro_rules! impl_shape_conversions {
    ($($variant:ident($shape:ident)),* $(,)?) => {
        $(
            impl From<$shape> for Shape {
                fn from(value: $shape) -> Self {
                    Shape::$variant(value)
                }
            }

            impl<'a> From<&'a $shape> for ShapeRef<'a> {
                fn from(value: &'a $shape) -> Self {
                    ShapeRef::$variant(value)
                }
            }
        )*
    };
}

impl_shape_conversions!(
    Point(PointShape),
    Multipoint(MultipointShape),
    Line(LineShape),
    Multiline(MultilineShape),
    Ring(RingShape),
    Polygon(PolygonShape),
    Multipolygon(MultipolygonShape),
    Rectangle(RectangleShape),
    Ellipse(EllipseShape),
);

impl Shape {
    /// Parses well-known text.
    pub fn from_wkt(wkt: &str) -> ShapeResult<Shape> {
        Ok(crate::codec::wkt::parse(wkt)?)
    }

    /// Decodes well-known binary. An empty buffer gives `None`.
    pub fn from_wkb(wkb: &[u8]) -> ShapeResult<Option<Shape>> {
        if wkb.is_empty() {
            return Ok(None);
        }

        Ok(Some(crate::codec::wkb::read(wkb)?))
    }
}

impl<'a> ShapeRef<'a> {
    /// Variant of the shape.
    pub fn shape_type(self) -> ShapeType {
        match self {
            ShapeRef::Point(_) => ShapeType::Point,
            ShapeRef::Multipoint(_) => ShapeType::Multipoint,
            ShapeRef::Line(_) => ShapeType::Line,
            ShapeRef::Multiline(_) => ShapeType::Multiline,
            ShapeRef::Ring(_) => ShapeType::Ring,
            ShapeRef::Polygon(_) => ShapeType::Polygon,
            ShapeRef::Multipolygon(_) => ShapeType::Multipolygon,
            ShapeRef::Rectangle(_) => ShapeType::Rectangle,
            ShapeRef::Ellipse(_) => ShapeType::Ellipse,
        }
    }

    /// Owned copy of the shape.
    pub fn to_shape(self) -> Shape {
        match self {
            ShapeRef::Point(s) => Shape::Point(s.clone()),
            ShapeRef::Multipoint(s) => Shape::Multipoint(s.clone()),
            ShapeRef::Line(s) => Shape::Line(s.clone()),
            ShapeRef::Multiline(s) => Shape::Multiline(s.clone()),
            ShapeRef::Ring(s) => Shape::Ring(s.clone()),
            ShapeRef::Polygon(s) => Shape::Polygon(s.clone()),
            ShapeRef::Multipolygon(s) => Shape::Multipolygon(s.clone()),
            ShapeRef::Rectangle(s) => Shape::Rectangle(s.clone()),
            ShapeRef::Ellipse(s) => Shape::Ellipse(s.clone()),
        }
    }

    /// All vertices of the shape. Ellipses are represented by their polygon approximation.
    pub fn vertices(self) -> Vec<Vertex> {
        let mut vertices = vec![];
        for line in self.line_strings() {
            vertices.extend(line);
        }
        vertices
    }

    /// Vertices of the shape without the closing vertices of rings and, for polygons, without holes.
    ///
    /// The average of these is the center used for scaling.
    pub fn distinct_vertices(self) -> Vec<Vertex> {
        match self {
            ShapeRef::Point(p) => vec![p.to_vertex()],
            ShapeRef::Multipoint(m) => m.points().iter().map(PointShape::to_vertex).collect(),
            ShapeRef::Line(l) => l.vertices().to_vec(),
            ShapeRef::Multiline(m) => m
                .lines()
                .iter()
                .flat_map(|l| l.vertices().iter().copied())
                .collect(),
            ShapeRef::Ring(r) => r.distinct_vertices().to_vec(),
            ShapeRef::Polygon(p) => p.outer_ring().distinct_vertices().to_vec(),
            ShapeRef::Multipolygon(m) => m
                .polygons()
                .iter()
                .flat_map(|p| p.outer_ring().distinct_vertices().iter().copied())
                .collect(),
            ShapeRef::Rectangle(r) => r.corners().to_vec(),
            ShapeRef::Ellipse(e) => vec![e.center()],
        }
    }

    /// Splits the shape into independent vertex sequences: one per line, one per ring (closed, including holes),
    /// one single-vertex sequence per point.
    pub fn line_strings(self) -> Vec<Vec<Vertex>> {
        match self {
            ShapeRef::Point(p) => vec![vec![p.to_vertex()]],
            ShapeRef::Multipoint(m) => m.points().iter().map(|p| vec![p.to_vertex()]).collect(),
            ShapeRef::Line(l) => vec![l.vertices().to_vec()],
            ShapeRef::Multiline(m) => m.lines().iter().map(|l| l.vertices().to_vec()).collect(),
            ShapeRef::Ring(r) => vec![r.vertices().to_vec()],
            ShapeRef::Polygon(p) => p.rings().map(|r| r.vertices().to_vec()).collect(),
            ShapeRef::Multipolygon(m) => m
                .polygons()
                .iter()
                .flat_map(|p| p.rings().map(|r| r.vertices().to_vec()))
                .collect(),
            ShapeRef::Rectangle(r) => vec![r.ring_vertices().to_vec()],
            ShapeRef::Ellipse(e) => vec![e.polygon_vertices(ELLIPSE_POLYGON_VERTEX_COUNT)],
        }
    }
}

impl<'a> From<&'a Shape> for ShapeRef<'a> {
    fn from(value: &'a Shape) -> Self {
        for_each_variant!(Shape, value, s => ShapeRef::from(s))
    }
}

impl BaseShape for Shape {
    fn id(&self) -> &str {
        for_each_variant!(Shape, self, s => s.id())
    }

    fn set_id(&mut self, id: String) {
        for_each_variant!(Shape, self, s => s.set_id(id))
    }

    fn tag(&self) -> Option<&Tag> {
        for_each_variant!(Shape, self, s => s.tag())
    }

    fn set_tag(&mut self, tag: Option<Tag>) {
        for_each_variant!(Shape, self, s => s.set_tag(tag))
    }

    fn as_shape_ref(&self) -> ShapeRef<'_> {
        ShapeRef::from(self)
    }

    fn map_vertices(&mut self, f: &mut dyn FnMut(Vertex) -> Vertex) {
        for_each_variant!(Shape, self, s => s.map_vertices(f))
    }

    fn from_shape(shape: Shape) -> ShapeResult<Self> {
        Ok(shape)
    }

    fn scale_by(&mut self, factor: f64) {
        for_each_variant!(Shape, self, s => s.scale_by(factor))
    }

    fn register(
        &self,
        from_point: &PointShape,
        to_point: &PointShape,
        from_unit: DistanceUnit,
        to_unit: GeographyUnit,
    ) -> ShapeResult<Self> {
        for_each_variant!(Shape, self, s => s.register(from_point, to_point, from_unit, to_unit).map(Shape::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_capability() {
        assert!(ShapeType::Point.can_rotate());
        assert!(ShapeType::Multipolygon.can_rotate());
        assert!(!ShapeType::Rectangle.can_rotate());
        assert!(!ShapeType::Ellipse.can_rotate());
    }

    #[test]
    fn well_known_codes() {
        assert_eq!(ShapeType::Ring.well_known_type(), WellKnownType::Polygon);
        assert_eq!(ShapeType::Ellipse.well_known_type().code(), 3);
        assert_eq!(WellKnownType::from_code(5), Some(WellKnownType::MultiLineString));
        assert_eq!(WellKnownType::from_code(17), None);
    }

    #[test]
    fn tag_downcast() {
        let tag = Tag::new(42u32);
        let clone = tag.clone();
        assert_eq!(clone.downcast_ref::<u32>(), Some(&42));
        assert_eq!(clone.downcast_ref::<i64>(), None);
        assert!(tag.ptr_eq(&clone));
        assert!(!tag.ptr_eq(&Tag::new(42u32)));
    }

    #[test]
    fn shape_ids_are_unique() {
        assert_ne!(new_shape_id(), new_shape_id());
        assert_eq!(new_shape_id().len(), 36);
    }

    #[test]
    fn empty_wkb_gives_no_shape() {
        assert!(matches!(Shape::from_wkb(&[]), Ok(None)));
    }
}
