use std::f64::consts::PI;

use geo_types::{Geometry, MultiPoint, Point};
use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, ShapeError, ShapeResult};
use crate::kernel::{default_kernel, GeometryKernel};
use crate::shape::ring::{ring_area, ring_perimeter};
use crate::shape::{AreaShape, BaseShape, PointShape, PolygonShape, RingShape, Shape, ShapeRef, Tag, ValidationMode};
use crate::units::{planar_area, planar_length, AreaUnit, DistanceUnit, GeographyUnit};
use crate::vertex::Vertex;

mod analytic;

pub use analytic::TANGENT_ROUNDING_DIGITS;
use analytic::Axes;

/// Number of vertices of the polygon an ellipse is written as.
pub const ELLIPSE_POLYGON_VERTEX_COUNT: usize = 360;

/// Axis aligned ellipse.
///
/// `width` and `height` are the full axis lengths in the native units of the shape. In well-known text and binary
/// the ellipse is written as a polygon with [`ELLIPSE_POLYGON_VERTEX_COUNT`] vertices; when such a polygon is loaded
/// back, the ellipse is fitted to its bounding box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EllipseShape {
    #[serde(default = "crate::shape::new_shape_id")]
    id: String,
    #[serde(skip)]
    tag: Option<Tag>,
    center: Vertex,
    width: f64,
    height: f64,
}

impl EllipseShape {
    /// Creates a new ellipse. Both axes must be positive.
    pub fn new(center: Vertex, width: f64, height: f64) -> ShapeResult<Self> {
        crate::error::ensure_finite("center.x", center.x)?;
        crate::error::ensure_finite("center.y", center.y)?;
        ensure_positive("width", width)?;
        ensure_positive("height", height)?;

        Ok(Self {
            id: crate::shape::new_shape_id(),
            tag: None,
            center,
            width,
            height,
        })
    }

    /// Creates a circle.
    pub fn circle(center: Vertex, radius: f64) -> ShapeResult<Self> {
        ensure_positive("radius", radius)?;
        Self::new(center, radius * 2.0, radius * 2.0)
    }

    /// Ellipse inscribed into the rectangle.
    pub fn from_bounds(bounds: &crate::shape::RectangleShape) -> ShapeResult<Self> {
        Self::new(bounds.center().to_vertex(), bounds.width(), bounds.height())
    }

    /// Center of the ellipse.
    pub fn center(&self) -> Vertex {
        self.center
    }

    /// Full horizontal axis length.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Full vertical axis length.
    pub fn height(&self) -> f64 {
        self.height
    }

    fn axes(&self) -> Axes {
        Axes {
            center: self.center,
            a: self.width / 2.0,
            b: self.height / 2.0,
        }
    }

    /// Vertices of the polygon approximation, starting at the rightmost point and going counterclockwise. The
    /// closing vertex is included.
    pub fn polygon_vertices(&self, vertex_count: usize) -> Vec<Vertex> {
        let vertex_count = vertex_count.max(3);
        let Axes { center, a, b } = self.axes();

        let mut vertices: Vec<_> = (0..vertex_count)
            .map(|i| {
                let angle = (i as f64 * 360.0 / vertex_count as f64).to_radians();
                Vertex::new(center.x + a * angle.cos(), center.y + b * angle.sin())
            })
            .collect();
        vertices.push(vertices[0]);
        vertices
    }

    /// Polygon approximation of the ellipse.
    pub fn to_polygon(&self, vertex_count: usize) -> PolygonShape {
        PolygonShape::new(RingShape::new(self.polygon_vertices(vertex_count)), vec![])
    }

    /// Returns true if the point is inside the ellipse or on its boundary.
    pub fn contains_point(&self, point: &Vertex) -> bool {
        analytic::contains(self.axes(), point)
    }

    /// Point where the line from the center towards `point` crosses the ellipse boundary.
    pub fn nearest_boundary_point(&self, point: &Vertex) -> Vertex {
        analytic::nearest_boundary_point(self.axes(), point)
    }

    /// Tangent points of the two outer common tangents of the ellipses as `(point on self, point on other)` pairs.
    ///
    /// Fails for concentric ellipses and if one ellipse contains the other.
    pub fn common_tangent_points(&self, other: &EllipseShape) -> ShapeResult<[(Vertex, Vertex); 2]> {
        analytic::common_tangent_points(self.axes(), other.axes())
    }

    /// Convex hull of the two ellipses, bounded by their outer common tangents.
    pub fn hull_with(&self, other: &EllipseShape) -> ShapeResult<RingShape> {
        self.hull_with_kernel(other, default_kernel())
    }

    /// Same as [`EllipseShape::hull_with`] using the given kernel.
    pub fn hull_with_kernel(&self, other: &EllipseShape, kernel: &dyn GeometryKernel) -> ShapeResult<RingShape> {
        let mut points = self.polygon_vertices(ELLIPSE_POLYGON_VERTEX_COUNT);
        points.extend(other.polygon_vertices(ELLIPSE_POLYGON_VERTEX_COUNT));

        match self.common_tangent_points(other) {
            Ok(pairs) => points.extend(pairs.into_iter().flat_map(|(a, b)| [a, b])),
            Err(err) => log::debug!("Hull of ellipses without tangent points: {err}"),
        }

        let cloud = Geometry::MultiPoint(MultiPoint::new(
            points.into_iter().map(|v| Point::new(v.x, v.y)).collect(),
        ));
        let hull = kernel.convex_hull(&cloud)?;
        crate::kernel::to_ring(hull)
    }
}

impl BaseShape for EllipseShape {
    identity_accessors!();

    fn as_shape_ref(&self) -> ShapeRef<'_> {
        ShapeRef::Ellipse(self)
    }

    /// Moves the center. The axes are not changed.
    fn map_vertices(&mut self, f: &mut dyn FnMut(Vertex) -> Vertex) {
        self.center = f(self.center);
    }

    /// Polygonal shapes are converted to the ellipse inscribed into their bounding box.
    fn from_shape(shape: Shape) -> ShapeResult<Self> {
        match shape {
            Shape::Ellipse(ellipse) => Ok(ellipse),
            other @ (Shape::Ring(_) | Shape::Polygon(_) | Shape::Multipolygon(_) | Shape::Rectangle(_)) => {
                Self::from_bounds(&other.bounding_box()?)
            }
            other => Err(ShapeError::TypeMismatch {
                expected: "Ellipse",
                actual: other.shape_type(),
            }),
        }
    }

    /// Scales the axes. The center stays in place.
    fn scale_by(&mut self, factor: f64) {
        self.width *= factor;
        self.height *= factor;
    }

    /// Registers the polygon approximation and fits the ellipse to its bounding box.
    fn register(
        &self,
        from_point: &PointShape,
        to_point: &PointShape,
        from_unit: DistanceUnit,
        to_unit: GeographyUnit,
    ) -> ShapeResult<Self> {
        self.validate(ValidationMode::Simple).into_result()?;
        let polygon = self.to_polygon(ELLIPSE_POLYGON_VERTEX_COUNT);
        let registered = polygon.register(from_point, to_point, from_unit, to_unit)?;

        let mut ellipse = Self::from_bounds(&registered.bounding_box()?)?;
        ellipse.id.clone_from(&self.id);
        ellipse.tag.clone_from(&self.tag);
        Ok(ellipse)
    }
}

impl AreaShape for EllipseShape {
    /// Ramanujan's approximation for planar coordinates, length of the polygon approximation for decimal degrees.
    fn perimeter(&self, shape_unit: GeographyUnit, distance_unit: DistanceUnit) -> ShapeResult<f64> {
        self.validate(ValidationMode::Simple).into_result()?;
        if shape_unit.is_decimal_degree() {
            return Ok(ring_perimeter(
                &self.polygon_vertices(ELLIPSE_POLYGON_VERTEX_COUNT),
                shape_unit,
                distance_unit,
            ));
        }

        let Axes { a, b, .. } = self.axes();
        let perimeter = PI * (3.0 * (a + b) - ((3.0 * a + b) * (a + 3.0 * b)).sqrt());
        Ok(planar_length(perimeter, shape_unit, distance_unit))
    }

    fn area(&self, shape_unit: GeographyUnit, area_unit: AreaUnit) -> ShapeResult<f64> {
        self.validate(ValidationMode::Simple).into_result()?;
        if shape_unit.is_decimal_degree() {
            let ring = RingShape::new(self.polygon_vertices(ELLIPSE_POLYGON_VERTEX_COUNT));
            return Ok(ring_area(&ring, shape_unit, area_unit));
        }

        let Axes { a, b, .. } = self.axes();
        Ok(planar_area(PI * a * b, shape_unit, area_unit))
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use assert_matches::assert_matches;

    use super::*;
    use crate::shape::RectangleShape;

    fn circle() -> EllipseShape {
        EllipseShape::new(Vertex::new(0.0, 0.0), 4.0, 4.0).unwrap()
    }

    #[test]
    fn axes_must_be_positive() {
        assert_matches!(
            EllipseShape::new(Vertex::new(0.0, 0.0), 0.0, 1.0),
            Err(ShapeError::InvalidArgument { name: "width", .. })
        );
        assert_matches!(
            EllipseShape::circle(Vertex::new(0.0, 0.0), -1.0),
            Err(ShapeError::InvalidArgument { name: "radius", .. })
        );
    }

    #[test]
    fn circle_containment_and_boundary() {
        let circle = circle();
        assert!(circle.contains_point(&Vertex::new(0.0, 0.0)));
        assert!(!circle.contains_point(&Vertex::new(3.0, 0.0)));
        assert_abs_diff_eq!(
            circle.nearest_boundary_point(&Vertex::new(3.0, 0.0)),
            Vertex::new(2.0, 0.0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn polygon_approximation() {
        let vertices = circle().polygon_vertices(ELLIPSE_POLYGON_VERTEX_COUNT);
        assert_eq!(vertices.len(), ELLIPSE_POLYGON_VERTEX_COUNT + 1);
        assert_eq!(vertices[0], vertices[ELLIPSE_POLYGON_VERTEX_COUNT]);
        assert_abs_diff_eq!(vertices[90], Vertex::new(0.0, 2.0), epsilon = 1e-12);
        assert_abs_diff_eq!(vertices[180], Vertex::new(-2.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn area_and_perimeter() {
        let ellipse = EllipseShape::new(Vertex::new(1.0, 1.0), 6.0, 2.0).unwrap();
        assert_relative_eq!(
            ellipse.area(GeographyUnit::Meter, AreaUnit::SquareMeters).unwrap(),
            3.0 * PI
        );
        assert_relative_eq!(
            circle().perimeter(GeographyUnit::Meter, DistanceUnit::Meter).unwrap(),
            4.0 * PI,
            epsilon = 1e-12
        );
    }

    #[test]
    fn scale_changes_axes() {
        let mut ellipse = circle();
        ellipse.scale_up(50.0).unwrap();
        assert_relative_eq!(ellipse.width(), 6.0);
        assert_eq!(ellipse.center(), Vertex::new(0.0, 0.0));
        ellipse.scale_down(50.0).unwrap();
        assert_relative_eq!(ellipse.width(), 3.0);
    }

    #[test]
    fn wkt_round_trip_refits_axes() {
        let ellipse = EllipseShape::new(Vertex::new(10.0, 20.0), 8.0, 2.0).unwrap();
        let copy = ellipse.clone_via_wkt().unwrap();
        assert_abs_diff_eq!(copy.center(), ellipse.center(), epsilon = 1e-9);
        assert_relative_eq!(copy.width(), 8.0, epsilon = 1e-9);
        assert_relative_eq!(copy.height(), 2.0, epsilon = 1e-9);
        assert_ne!(copy.id(), ellipse.id());
    }

    #[test]
    fn from_rectangle() {
        let rectangle = RectangleShape::from_bounds(0.0, 2.0, 4.0, 0.0).unwrap();
        let ellipse = EllipseShape::from_shape(rectangle.into()).unwrap();
        assert_eq!(ellipse.center(), Vertex::new(2.0, 1.0));
        assert_eq!(ellipse.width(), 4.0);
        assert_eq!(ellipse.height(), 2.0);
    }

    #[test]
    fn hull_of_two_circles() {
        let first = circle();
        let second = EllipseShape::circle(Vertex::new(10.0, 0.0), 2.0).unwrap();
        let hull = first.hull_with(&second).unwrap();
        let area = hull.area(GeographyUnit::Meter, AreaUnit::SquareMeters).unwrap();
        // Stadium shape: a 10 x 4 rectangle plus a circle of radius 2.
        assert_relative_eq!(area, 40.0 + 4.0 * PI, epsilon = 0.01);
    }

    #[test]
    fn cannot_rotate() {
        let mut ellipse = circle();
        assert!(!ellipse.can_rotate());
        assert!(ellipse.rotate(&PointShape::new(0.0, 0.0), 10.0).is_err());
    }
}
