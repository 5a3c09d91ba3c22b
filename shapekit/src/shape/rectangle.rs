use serde::{Deserialize, Serialize};

use crate::error::{ShapeError, ShapeResult};
use crate::shape::ring::{ring_area, ring_perimeter};
use crate::shape::{AreaShape, BaseShape, PointShape, PolygonShape, RingShape, Shape, ShapeRef, Tag, ValidationMode};
use crate::units::{planar_area, planar_length, AreaUnit, DistanceUnit, GeographyUnit};
use crate::vertex::Vertex;

/// Size added to a collapsed rectangle side, split evenly between both sides of it.
pub const RECTANGLE_DEGENERACY_EPSILON: f64 = 0.00001;

/// Axis aligned rectangle given by its upper left and lower right corners.
///
/// A rectangle never has zero width or height: when both corners share a coordinate, they are moved apart by
/// [`RECTANGLE_DEGENERACY_EPSILON`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RectangleShape {
    #[serde(default = "crate::shape::new_shape_id")]
    id: String,
    #[serde(skip)]
    tag: Option<Tag>,
    upper_left: Vertex,
    lower_right: Vertex,
}

impl RectangleShape {
    /// Creates a new rectangle.
    ///
    /// Fails if `upper_left` is to the right of or below `lower_right`.
    pub fn new(upper_left: Vertex, lower_right: Vertex) -> ShapeResult<Self> {
        crate::error::ensure_finite("upper_left.x", upper_left.x)?;
        crate::error::ensure_finite("upper_left.y", upper_left.y)?;
        crate::error::ensure_finite("lower_right.x", lower_right.x)?;
        crate::error::ensure_finite("lower_right.y", lower_right.y)?;

        if upper_left.x > lower_right.x {
            return Err(ShapeError::invalid_argument(
                "upper_left",
                format!(
                    "x of the upper left corner ({}) is greater than x of the lower right corner ({})",
                    upper_left.x, lower_right.x
                ),
            ));
        }

        if upper_left.y < lower_right.y {
            return Err(ShapeError::invalid_argument(
                "upper_left",
                format!(
                    "y of the upper left corner ({}) is less than y of the lower right corner ({})",
                    upper_left.y, lower_right.y
                ),
            ));
        }

        Ok(Self::from_ordered(upper_left, lower_right))
    }

    /// Creates a new rectangle from its bounds.
    pub fn from_bounds(min_x: f64, max_y: f64, max_x: f64, min_y: f64) -> ShapeResult<Self> {
        Self::new(Vertex::new(min_x, max_y), Vertex::new(max_x, min_y))
    }

    /// Bounding rectangle of the vertices, or `None` if the slice is empty.
    pub fn from_vertices(vertices: &[Vertex]) -> Option<Self> {
        let (first, rest) = vertices.split_first()?;
        let (mut min, mut max) = (*first, *first);
        for v in rest {
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
        }

        Some(Self::from_ordered(
            Vertex::new(min.x, max.y),
            Vertex::new(max.x, min.y),
        ))
    }

    fn from_ordered(mut upper_left: Vertex, mut lower_right: Vertex) -> Self {
        let half = RECTANGLE_DEGENERACY_EPSILON / 2.0;
        if upper_left.x == lower_right.x {
            upper_left.x -= half;
            lower_right.x += half;
        }
        if upper_left.y == lower_right.y {
            upper_left.y += half;
            lower_right.y -= half;
        }

        Self {
            id: crate::shape::new_shape_id(),
            tag: None,
            upper_left,
            lower_right,
        }
    }

    /// Upper left corner.
    pub fn upper_left(&self) -> Vertex {
        self.upper_left
    }

    /// Lower right corner.
    pub fn lower_right(&self) -> Vertex {
        self.lower_right
    }

    /// Upper right corner.
    pub fn upper_right(&self) -> Vertex {
        Vertex::new(self.lower_right.x, self.upper_left.y)
    }

    /// Lower left corner.
    pub fn lower_left(&self) -> Vertex {
        Vertex::new(self.upper_left.x, self.lower_right.y)
    }

    /// Minimum x.
    pub fn min_x(&self) -> f64 {
        self.upper_left.x
    }

    /// Maximum x.
    pub fn max_x(&self) -> f64 {
        self.lower_right.x
    }

    /// Minimum y.
    pub fn min_y(&self) -> f64 {
        self.lower_right.y
    }

    /// Maximum y.
    pub fn max_y(&self) -> f64 {
        self.upper_left.y
    }

    /// Width in native units.
    pub fn width(&self) -> f64 {
        self.lower_right.x - self.upper_left.x
    }

    /// Height in native units.
    pub fn height(&self) -> f64 {
        self.upper_left.y - self.lower_right.y
    }

    /// Center of the rectangle.
    pub fn center(&self) -> PointShape {
        PointShape::new(
            (self.upper_left.x + self.lower_right.x) / 2.0,
            (self.upper_left.y + self.lower_right.y) / 2.0,
        )
    }

    /// Corners, clockwise from the upper left one.
    pub fn corners(&self) -> [Vertex; 4] {
        [
            self.upper_left,
            self.upper_right(),
            self.lower_right,
            self.lower_left(),
        ]
    }

    /// Corners with the closing vertex, as written in polygon representation.
    pub fn ring_vertices(&self) -> [Vertex; 5] {
        let [a, b, c, d] = self.corners();
        [a, b, c, d, a]
    }

    /// Ring along the rectangle sides.
    pub fn to_ring(&self) -> RingShape {
        RingShape::new(self.ring_vertices().to_vec())
    }

    /// Polygon covering the rectangle.
    pub fn to_polygon(&self) -> PolygonShape {
        PolygonShape::new(self.to_ring(), vec![])
    }

    /// Grows the rectangle to cover `other`.
    pub fn expand_to_include(&mut self, other: &RectangleShape) {
        self.upper_left.x = self.upper_left.x.min(other.upper_left.x);
        self.upper_left.y = self.upper_left.y.max(other.upper_left.y);
        self.lower_right.x = self.lower_right.x.max(other.lower_right.x);
        self.lower_right.y = self.lower_right.y.min(other.lower_right.y);
    }

    /// Returns true if the rectangles share at least one point.
    pub fn intersects_rectangle(&self, other: &RectangleShape) -> bool {
        self.min_x() <= other.max_x()
            && self.max_x() >= other.min_x()
            && self.min_y() <= other.max_y()
            && self.max_y() >= other.min_y()
    }

    /// Returns true if `other` lies inside this rectangle or on its sides.
    pub fn contains_rectangle(&self, other: &RectangleShape) -> bool {
        self.contains_vertex(&other.upper_left) && self.contains_vertex(&other.lower_right)
    }

    /// Returns true if the vertex is inside the rectangle or on its sides.
    pub fn contains_vertex(&self, vertex: &Vertex) -> bool {
        vertex.x >= self.min_x() && vertex.x <= self.max_x() && vertex.y >= self.min_y() && vertex.y <= self.max_y()
    }

    /// Returns true if the vertex is inside the rectangle and not on its sides.
    pub fn contains_vertex_strictly(&self, vertex: &Vertex) -> bool {
        vertex.x > self.min_x() && vertex.x < self.max_x() && vertex.y > self.min_y() && vertex.y < self.max_y()
    }
}

impl BaseShape for RectangleShape {
    identity_accessors!();

    fn as_shape_ref(&self) -> ShapeRef<'_> {
        ShapeRef::Rectangle(self)
    }

    /// Maps both corners and reorders them so that the rectangle stays valid.
    fn map_vertices(&mut self, f: &mut dyn FnMut(Vertex) -> Vertex) {
        let a = f(self.upper_left);
        let b = f(self.lower_right);
        let ordered = Self::from_ordered(
            Vertex::new(a.x.min(b.x), a.y.max(b.y)),
            Vertex::new(a.x.max(b.x), a.y.min(b.y)),
        );
        self.upper_left = ordered.upper_left;
        self.lower_right = ordered.lower_right;
    }

    /// Polygonal shapes are converted to their bounding rectangle.
    fn from_shape(shape: Shape) -> ShapeResult<Self> {
        match shape {
            Shape::Rectangle(rectangle) => Ok(rectangle),
            other @ (Shape::Ring(_) | Shape::Polygon(_) | Shape::Multipolygon(_) | Shape::Ellipse(_)) => {
                other.bounding_box()
            }
            other => Err(ShapeError::TypeMismatch {
                expected: "Rectangle",
                actual: other.shape_type(),
            }),
        }
    }
}

impl AreaShape for RectangleShape {
    fn perimeter(&self, shape_unit: GeographyUnit, distance_unit: DistanceUnit) -> ShapeResult<f64> {
        self.validate(ValidationMode::Simple).into_result()?;
        if shape_unit.is_decimal_degree() {
            Ok(ring_perimeter(&self.ring_vertices(), shape_unit, distance_unit))
        } else {
            Ok(planar_length(
                2.0 * (self.width() + self.height()),
                shape_unit,
                distance_unit,
            ))
        }
    }

    fn area(&self, shape_unit: GeographyUnit, area_unit: AreaUnit) -> ShapeResult<f64> {
        self.validate(ValidationMode::Simple).into_result()?;
        if shape_unit.is_decimal_degree() {
            Ok(ring_area(&self.to_ring(), shape_unit, area_unit))
        } else {
            Ok(planar_area(self.width() * self.height(), shape_unit, area_unit))
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn width_and_height() {
        let rectangle = RectangleShape::new(Vertex::new(0.0, 10.0), Vertex::new(10.0, 0.0)).unwrap();
        assert_eq!(rectangle.width(), 10.0);
        assert_eq!(rectangle.height(), 10.0);
        assert_eq!(rectangle.center().to_vertex(), Vertex::new(5.0, 5.0));
        assert_eq!(rectangle.upper_right(), Vertex::new(10.0, 10.0));
        assert_eq!(rectangle.lower_left(), Vertex::new(0.0, 0.0));
        assert_relative_eq!(
            rectangle.area(GeographyUnit::Meter, AreaUnit::SquareMeters).unwrap(),
            100.0
        );
        assert_relative_eq!(
            rectangle.perimeter(GeographyUnit::Meter, DistanceUnit::Meter).unwrap(),
            40.0
        );
    }

    #[test]
    fn never_degenerate() {
        let rectangle = RectangleShape::new(Vertex::new(0.0, 0.0), Vertex::new(0.0, 0.0)).unwrap();
        assert!(rectangle.width() > 0.0);
        assert!(rectangle.height() > 0.0);
        assert_relative_eq!(rectangle.width(), RECTANGLE_DEGENERACY_EPSILON);
        assert_relative_eq!(rectangle.center().x(), 0.0);
    }

    #[test]
    fn corner_order_is_checked() {
        assert_matches!(
            RectangleShape::new(Vertex::new(10.0, 10.0), Vertex::new(0.0, 0.0)),
            Err(ShapeError::InvalidArgument {
                name: "upper_left",
                ..
            })
        );
        assert_matches!(
            RectangleShape::from_bounds(0.0, 0.0, 10.0, 10.0),
            Err(ShapeError::InvalidArgument { .. })
        );
    }

    #[test]
    fn rectangle_relations() {
        let mut a = RectangleShape::from_bounds(0.0, 10.0, 10.0, 0.0).unwrap();
        let b = RectangleShape::from_bounds(5.0, 15.0, 15.0, 5.0).unwrap();
        let c = RectangleShape::from_bounds(2.0, 8.0, 8.0, 2.0).unwrap();
        let d = RectangleShape::from_bounds(20.0, 30.0, 30.0, 20.0).unwrap();

        assert!(a.intersects_rectangle(&b));
        assert!(!a.intersects_rectangle(&d));
        assert!(a.contains_rectangle(&c));
        assert!(!a.contains_rectangle(&b));

        a.expand_to_include(&d);
        assert_eq!(a.upper_left(), Vertex::new(0.0, 30.0));
        assert_eq!(a.lower_right(), Vertex::new(30.0, 0.0));
    }

    #[test]
    fn mapping_keeps_corners_ordered() {
        let mut rectangle = RectangleShape::from_bounds(0.0, 10.0, 10.0, 0.0).unwrap();
        rectangle.map_vertices(&mut |v| Vertex::new(-v.x, v.y));
        assert_eq!(rectangle.upper_left(), Vertex::new(-10.0, 10.0));
        assert_eq!(rectangle.lower_right(), Vertex::new(0.0, 0.0));
    }

    #[test]
    fn rotation_not_supported() {
        let mut rectangle = RectangleShape::from_bounds(0.0, 10.0, 10.0, 0.0).unwrap();
        assert_matches!(
            rectangle.rotate(&PointShape::new(0.0, 0.0), 45.0),
            Err(ShapeError::NotSupported {
                operation: "rotate",
                ..
            })
        );
    }

    #[test]
    fn from_polygon_gives_bounds() {
        let polygon = PolygonShape::from_vertices(vec![
            Vertex::new(1.0, 1.0),
            Vertex::new(3.0, 2.0),
            Vertex::new(2.0, 5.0),
        ]);
        let rectangle = RectangleShape::from_shape(polygon.into()).unwrap();
        assert_eq!(rectangle.upper_left(), Vertex::new(1.0, 5.0));
        assert_eq!(rectangle.lower_right(), Vertex::new(3.0, 1.0));
    }
}
