use geo_types::Geometry;
use serde::{Deserialize, Serialize};

use crate::error::{ShapeError, ShapeResult};
use crate::kernel::{
    default_kernel, to_geometry, to_multiline, to_multipolygon, to_ring, GeometryKernel, KernelResult,
    SimplificationType,
};
use crate::shape::{
    BaseShape, EllipseShape, LineShape, MultilineShape, MultipointShape, MultipolygonShape, PointShape,
    PolygonShape, RectangleShape, RingShape, Shape, ShapeRef, Tag, ValidationMode,
};
use crate::transform::{scale_factor, ScaleDirection};
use crate::units::{AreaUnit, DistanceUnit, GeographyUnit};
use crate::vertex::Vertex;

/// Shapes that enclose an area: rings, polygons, multipolygons, rectangles and ellipses.
///
/// Set operations are computed by a [`GeometryKernel`]. The methods without the `_with` suffix use
/// [`default_kernel`].
pub trait AreaShape: BaseShape {
    /// Total length of all boundaries.
    fn perimeter(&self, shape_unit: GeographyUnit, distance_unit: DistanceUnit) -> ShapeResult<f64>;

    /// Area of the shape. Holes are subtracted.
    fn area(&self, shape_unit: GeographyUnit, area_unit: AreaUnit) -> ShapeResult<f64>;

    /// Grows the shape by `percentage` about the average of its vertices.
    fn scale_up(&mut self, percentage: f64) -> ShapeResult<()> {
        self.scale_by(scale_factor(percentage, ScaleDirection::Up)?);
        Ok(())
    }

    /// Shrinks the shape by `percentage` about the average of its vertices.
    ///
    /// The factors are `1 + p / 100` and `1 - p / 100`, so scaling down does not undo scaling up by the same
    /// percentage.
    fn scale_down(&mut self, percentage: f64) -> ShapeResult<()> {
        self.scale_by(scale_factor(percentage, ScaleDirection::Down)?);
        Ok(())
    }

    /// Smallest convex ring containing the shape.
    fn convex_hull(&self) -> ShapeResult<RingShape> {
        self.convex_hull_with(default_kernel())
    }

    /// Same as [`AreaShape::convex_hull`] using the given kernel.
    fn convex_hull_with(&self, kernel: &dyn GeometryKernel) -> ShapeResult<RingShape> {
        hull(self.as_shape_ref(), kernel)
    }

    /// Area covered by both shapes.
    fn intersection(&self, other: &impl AreaShape) -> ShapeResult<MultipolygonShape> {
        self.intersection_with(other, default_kernel())
    }

    /// Same as [`AreaShape::intersection`] using the given kernel.
    fn intersection_with(&self, other: &impl AreaShape, kernel: &dyn GeometryKernel) -> ShapeResult<MultipolygonShape> {
        area_overlay(self.as_shape_ref(), other.as_shape_ref(), |a, b| {
            kernel.intersection(a, b)
        })
    }

    /// Area covered by any of the shapes.
    fn union(&self, other: &impl AreaShape) -> ShapeResult<MultipolygonShape> {
        self.union_with(other, default_kernel())
    }

    /// Same as [`AreaShape::union`] using the given kernel.
    fn union_with(&self, other: &impl AreaShape, kernel: &dyn GeometryKernel) -> ShapeResult<MultipolygonShape> {
        area_overlay(self.as_shape_ref(), other.as_shape_ref(), |a, b| kernel.union(a, b))
    }

    /// Area of this shape not covered by `other`.
    fn difference(&self, other: &impl AreaShape) -> ShapeResult<MultipolygonShape> {
        self.difference_with(other, default_kernel())
    }

    /// Same as [`AreaShape::difference`] using the given kernel.
    fn difference_with(&self, other: &impl AreaShape, kernel: &dyn GeometryKernel) -> ShapeResult<MultipolygonShape> {
        area_overlay(self.as_shape_ref(), other.as_shape_ref(), |a, b| {
            kernel.difference(a, b)
        })
    }

    /// Area covered by exactly one of the shapes.
    fn symmetric_difference(&self, other: &impl AreaShape) -> ShapeResult<MultipolygonShape> {
        self.symmetric_difference_with(other, default_kernel())
    }

    /// Same as [`AreaShape::symmetric_difference`] using the given kernel.
    fn symmetric_difference_with(
        &self,
        other: &impl AreaShape,
        kernel: &dyn GeometryKernel,
    ) -> ShapeResult<MultipolygonShape> {
        area_overlay(self.as_shape_ref(), other.as_shape_ref(), |a, b| {
            kernel.symmetric_difference(a, b)
        })
    }

    /// Cuts the shape along the boundary of `by`.
    ///
    /// The result holds the pieces inside `by` followed by the pieces outside of it.
    fn split(&self, by: &impl AreaShape) -> ShapeResult<MultipolygonShape> {
        self.split_with(by, default_kernel())
    }

    /// Same as [`AreaShape::split`] using the given kernel.
    fn split_with(&self, by: &impl AreaShape, kernel: &dyn GeometryKernel) -> ShapeResult<MultipolygonShape> {
        let mut pieces = self.intersection_with(by, kernel)?;
        for polygon in self.difference_with(by, kernel)?.into_polygons() {
            pieces.push(polygon);
        }
        Ok(pieces)
    }

    /// Removes vertices that deviate from the boundary by less than `tolerance`. Without a `mode` the kernel uses
    /// its configured algorithm.
    fn simplify(&self, tolerance: f64, mode: Option<SimplificationType>) -> ShapeResult<MultipolygonShape> {
        self.simplify_with(tolerance, mode, default_kernel())
    }

    /// Same as [`AreaShape::simplify`] using the given kernel.
    fn simplify_with(
        &self,
        tolerance: f64,
        mode: Option<SimplificationType>,
        kernel: &dyn GeometryKernel,
    ) -> ShapeResult<MultipolygonShape> {
        let simplified = simplify_geometry(self.as_shape_ref(), tolerance, mode, kernel)?;
        to_multipolygon(simplified)
    }

    /// Union of all the shapes.
    fn union_all(shapes: &[Self]) -> ShapeResult<MultipolygonShape>
    where
        Self: Sized,
    {
        Self::union_all_with(shapes, default_kernel())
    }

    /// Same as [`AreaShape::union_all`] using the given kernel.
    fn union_all_with(shapes: &[Self], kernel: &dyn GeometryKernel) -> ShapeResult<MultipolygonShape>
    where
        Self: Sized,
    {
        let mut geometries = Vec::with_capacity(shapes.len());
        for shape in shapes {
            validate_operand(shape.as_shape_ref())?;
            geometries.push(to_geometry(shape.as_shape_ref()));
        }

        to_multipolygon(kernel.union_all(&geometries)?)
    }
}

/// Lines and multilines.
pub trait LinearShape: BaseShape {
    /// Total length of all lines.
    fn length(&self, shape_unit: GeographyUnit, distance_unit: DistanceUnit) -> ShapeResult<f64>;

    /// Reverses the direction of traversal.
    fn reverse(&mut self);

    /// Stretches the shape by `percentage` about the average of its vertices.
    fn scale_up(&mut self, percentage: f64) -> ShapeResult<()> {
        self.scale_by(scale_factor(percentage, ScaleDirection::Up)?);
        Ok(())
    }

    /// Shrinks the shape by `percentage` about the average of its vertices.
    fn scale_down(&mut self, percentage: f64) -> ShapeResult<()> {
        self.scale_by(scale_factor(percentage, ScaleDirection::Down)?);
        Ok(())
    }

    /// Smallest convex ring containing all vertices.
    fn convex_hull(&self) -> ShapeResult<RingShape> {
        self.convex_hull_with(default_kernel())
    }

    /// Same as [`LinearShape::convex_hull`] using the given kernel.
    fn convex_hull_with(&self, kernel: &dyn GeometryKernel) -> ShapeResult<RingShape> {
        hull(self.as_shape_ref(), kernel)
    }

    /// Removes vertices that deviate from the lines by less than `tolerance`.
    fn simplify(&self, tolerance: f64, mode: Option<SimplificationType>) -> ShapeResult<MultilineShape> {
        self.simplify_with(tolerance, mode, default_kernel())
    }

    /// Same as [`LinearShape::simplify`] using the given kernel.
    fn simplify_with(
        &self,
        tolerance: f64,
        mode: Option<SimplificationType>,
        kernel: &dyn GeometryKernel,
    ) -> ShapeResult<MultilineShape> {
        to_multiline(simplify_geometry(self.as_shape_ref(), tolerance, mode, kernel)?)
    }

    /// Lines of both shapes.
    fn union(&self, other: &impl LinearShape) -> ShapeResult<MultilineShape> {
        self.union_with(other, default_kernel())
    }

    /// Same as [`LinearShape::union`] using the given kernel.
    fn union_with(&self, other: &impl LinearShape, kernel: &dyn GeometryKernel) -> ShapeResult<MultilineShape> {
        validate_operand(self.as_shape_ref())?;
        validate_operand(other.as_shape_ref())?;
        let united = kernel.union(&to_geometry(self.as_shape_ref()), &to_geometry(other.as_shape_ref()))?;
        to_multiline(united)
    }
}

/// Points and multipoints.
pub trait PointFamily: BaseShape {
    /// Member points. A single point returns itself.
    fn points(&self) -> Vec<PointShape>;

    /// Moves the points away from their average by `percentage`. A single point does not move.
    fn scale_up(&mut self, percentage: f64) -> ShapeResult<()> {
        self.scale_by(scale_factor(percentage, ScaleDirection::Up)?);
        Ok(())
    }

    /// Moves the points towards their average by `percentage`. A single point does not move.
    fn scale_down(&mut self, percentage: f64) -> ShapeResult<()> {
        self.scale_by(scale_factor(percentage, ScaleDirection::Down)?);
        Ok(())
    }

    /// Smallest convex ring containing the points.
    fn convex_hull(&self) -> ShapeResult<RingShape> {
        self.convex_hull_with(default_kernel())
    }

    /// Same as [`PointFamily::convex_hull`] using the given kernel.
    fn convex_hull_with(&self, kernel: &dyn GeometryKernel) -> ShapeResult<RingShape> {
        hull(self.as_shape_ref(), kernel)
    }
}

fn validate_operand(shape: ShapeRef<'_>) -> ShapeResult<()> {
    crate::shape::validate(shape, ValidationMode::Simple).into_result()
}

fn hull(shape: ShapeRef<'_>, kernel: &dyn GeometryKernel) -> ShapeResult<RingShape> {
    validate_operand(shape)?;
    to_ring(kernel.convex_hull(&to_geometry(shape))?)
}

fn area_overlay(
    shape: ShapeRef<'_>,
    other: ShapeRef<'_>,
    op: impl FnOnce(&Geometry<f64>, &Geometry<f64>) -> KernelResult<Geometry<f64>>,
) -> ShapeResult<MultipolygonShape> {
    validate_operand(shape)?;
    validate_operand(other)?;
    let result = op(&to_geometry(shape), &to_geometry(other))?;
    to_multipolygon(result)
}

fn simplify_geometry(
    shape: ShapeRef<'_>,
    tolerance: f64,
    mode: Option<SimplificationType>,
    kernel: &dyn GeometryKernel,
) -> ShapeResult<Geometry<f64>> {
    crate::error::ensure_positive("tolerance", tolerance)?;
    validate_operand(shape)?;
    Ok(kernel.simplify(&to_geometry(shape), tolerance, mode)?)
}

/// Any shape that encloses an area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AnyAreaShape {
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

/// Any linear shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AnyLineShape {
    /// Polyline.
    Line(LineShape),
    /// Set of polylines.
    Multiline(MultilineShape),
}

/// Any point shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AnyPointShape {
    /// Single point.
    Point(PointShape),
    /// Set of points.
    Multipoint(MultipointShape),
}

macro_rules! impl_family {
    ($family:ident, $expected:literal, $($variant:ident($shape:ident)),+ $(,)?) => {
        impl BaseShape for $family {
            fn id(&self) -> &str {
                match self {
                    $(Self::$variant(s) => s.id(),)+
                }
            }

            fn set_id(&mut self, id: String) {
                match self {
                    $(Self::$variant(s) => s.set_id(id),)+
                }
            }

            fn tag(&self) -> Option<&Tag> {
                match self {
                    $(Self::$variant(s) => s.tag(),)+
                }
            }

            fn set_tag(&mut self, tag: Option<Tag>) {
                match self {
                    $(Self::$variant(s) => s.set_tag(tag),)+
                }
            }

            fn as_shape_ref(&self) -> ShapeRef<'_> {
                match self {
                    $(Self::$variant(s) => s.as_shape_ref(),)+
                }
            }

            fn map_vertices(&mut self, f: &mut dyn FnMut(Vertex) -> Vertex) {
                match self {
                    $(Self::$variant(s) => s.map_vertices(f),)+
                }
            }

            fn from_shape(shape: Shape) -> ShapeResult<Self> {
                Self::try_from(shape)
            }

            fn scale_by(&mut self, factor: f64) {
                match self {
                    $(Self::$variant(s) => s.scale_by(factor),)+
                }
            }

            fn register(
                &self,
                from_point: &PointShape,
                to_point: &PointShape,
                from_unit: DistanceUnit,
                to_unit: GeographyUnit,
            ) -> ShapeResult<Self> {
                match self {
                    $(Self::$variant(s) => s.register(from_point, to_point, from_unit, to_unit).map(Self::$variant),)+
                }
            }
        }

        impl TryFrom<Shape> for $family {
            type Error = ShapeError;

            fn try_from(shape: Shape) -> ShapeResult<Self> {
                match shape {
                    $(Shape::$variant(s) => Ok(Self::$variant(s)),)+
                    other => Err(ShapeError::TypeMismatch {
                        expected: $expected,
                        actual: other.shape_type(),
                    }),
                }
            }
        }

        impl From<$family> for Shape {
            fn from(value: $family) -> Self {
                match value {
                    $($family::$variant(s) => Shape::$variant(s),)+
                }
            }
        }

        $(
            impl From<$shape> for $family {
                fn from(value: $shape) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}

impl_family!(
    AnyAreaShape,
    "area shape",
    Ring(RingShape),
    Polygon(PolygonShape),
    Multipolygon(MultipolygonShape),
    Rectangle(RectangleShape),
    Ellipse(EllipseShape),
);
impl_family!(AnyLineShape, "line shape", Line(LineShape), Multiline(MultilineShape));
impl_family!(AnyPointShape, "point shape", Point(PointShape), Multipoint(MultipointShape));

impl AreaShape for AnyAreaShape {
    fn perimeter(&self, shape_unit: GeographyUnit, distance_unit: DistanceUnit) -> ShapeResult<f64> {
        match self {
            Self::Ring(s) => s.perimeter(shape_unit, distance_unit),
            Self::Polygon(s) => s.perimeter(shape_unit, distance_unit),
            Self::Multipolygon(s) => s.perimeter(shape_unit, distance_unit),
            Self::Rectangle(s) => s.perimeter(shape_unit, distance_unit),
            Self::Ellipse(s) => s.perimeter(shape_unit, distance_unit),
        }
    }

    fn area(&self, shape_unit: GeographyUnit, area_unit: AreaUnit) -> ShapeResult<f64> {
        match self {
            Self::Ring(s) => s.area(shape_unit, area_unit),
            Self::Polygon(s) => s.area(shape_unit, area_unit),
            Self::Multipolygon(s) => s.area(shape_unit, area_unit),
            Self::Rectangle(s) => s.area(shape_unit, area_unit),
            Self::Ellipse(s) => s.area(shape_unit, area_unit),
        }
    }
}

impl LinearShape for AnyLineShape {
    fn length(&self, shape_unit: GeographyUnit, distance_unit: DistanceUnit) -> ShapeResult<f64> {
        match self {
            Self::Line(s) => s.length(shape_unit, distance_unit),
            Self::Multiline(s) => s.length(shape_unit, distance_unit),
        }
    }

    fn reverse(&mut self) {
        match self {
            Self::Line(s) => s.reverse(),
            Self::Multiline(s) => s.reverse(),
        }
    }
}

impl PointFamily for AnyPointShape {
    fn points(&self) -> Vec<PointShape> {
        match self {
            Self::Point(s) => s.points(),
            Self::Multipoint(s) => PointFamily::points(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;

    use super::*;
    use crate::shape::ShapeType;

    fn square(x: f64, y: f64, size: f64) -> PolygonShape {
        PolygonShape::from_vertices(vec![
            Vertex::new(x, y),
            Vertex::new(x + size, y),
            Vertex::new(x + size, y + size),
            Vertex::new(x, y + size),
        ])
    }

    fn area(shape: &impl AreaShape) -> f64 {
        shape
            .area(GeographyUnit::Meter, AreaUnit::SquareMeters)
            .expect("valid shape")
    }

    #[test]
    fn overlays() {
        let a = square(0.0, 0.0, 2.0);
        let b = square(1.0, 1.0, 2.0);

        assert_relative_eq!(area(&a.intersection(&b).unwrap()), 1.0, epsilon = 1e-9);
        assert_relative_eq!(area(&a.union(&b).unwrap()), 7.0, epsilon = 1e-9);
        assert_relative_eq!(area(&a.difference(&b).unwrap()), 3.0, epsilon = 1e-9);
        assert_relative_eq!(area(&a.symmetric_difference(&b).unwrap()), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn overlay_of_different_variants() {
        let rectangle = RectangleShape::from_bounds(0.0, 2.0, 2.0, 0.0).unwrap();
        let ring = square(1.0, 0.0, 2.0).into_outer_ring();
        assert_relative_eq!(area(&rectangle.intersection(&ring).unwrap()), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn split_by_area() {
        let shape = square(0.0, 0.0, 2.0);
        let knife = RectangleShape::from_bounds(-1.0, 3.0, 1.0, -1.0).unwrap();
        let pieces = shape.split(&knife).unwrap();
        assert_eq!(pieces.polygons().len(), 2);
        assert_relative_eq!(area(&pieces.polygons()[0]), 2.0, epsilon = 1e-9);
        assert_relative_eq!(area(&pieces.polygons()[1]), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn invalid_operand_is_rejected() {
        let shape = square(0.0, 0.0, 2.0);
        let broken = RingShape::new(vec![Vertex::new(0.0, 0.0), Vertex::new(1.0, 0.0)]);
        assert_matches!(shape.union(&broken), Err(ShapeError::InvalidShape(_)));
    }

    #[test]
    fn union_of_many() {
        let squares = [square(0.0, 0.0, 1.0), square(0.5, 0.0, 1.0), square(5.0, 5.0, 1.0)];
        let united = PolygonShape::union_all(&squares).unwrap();
        assert_eq!(united.polygons().len(), 2);
        assert_relative_eq!(area(&united), 2.5, epsilon = 1e-9);
    }

    #[test]
    fn simplify_polygon() {
        let polygon = PolygonShape::from_vertices(vec![
            Vertex::new(0.0, 0.0),
            Vertex::new(1.0, 0.0001),
            Vertex::new(2.0, 0.0),
            Vertex::new(2.0, 2.0),
            Vertex::new(0.0, 2.0),
        ]);
        let simplified = polygon.simplify(0.01, Some(SimplificationType::DouglasPeucker)).unwrap();
        assert_eq!(simplified.polygons()[0].outer_ring().vertices().len(), 5);
        assert_relative_eq!(area(&simplified), 4.0, epsilon = 1e-9);

        assert_matches!(
            polygon.simplify(-1.0, None),
            Err(ShapeError::InvalidArgument { name: "tolerance", .. })
        );
    }

    #[test]
    fn line_hull_and_union() {
        let a = LineShape::new(vec![Vertex::new(0.0, 0.0), Vertex::new(2.0, 0.0), Vertex::new(2.0, 2.0)]);
        let b = LineShape::new(vec![Vertex::new(5.0, 5.0), Vertex::new(6.0, 5.0)]);

        let hull = a.convex_hull().unwrap();
        assert_eq!(hull.vertices().len(), 4);
        assert_relative_eq!(area(&hull), 2.0, epsilon = 1e-9);

        let united = a.union(&b).unwrap();
        assert_eq!(united.lines().len(), 2);
    }

    #[test]
    fn scale_down_is_not_inverse_of_scale_up() {
        let mut shape = square(0.0, 0.0, 2.0);
        shape.scale_up(50.0).unwrap();
        assert_relative_eq!(area(&shape), 9.0, epsilon = 1e-9);
        shape.scale_down(50.0).unwrap();
        assert_relative_eq!(area(&shape), 2.25, epsilon = 1e-9);
    }

    #[test]
    fn family_conversions() {
        let shape: Shape = square(0.0, 0.0, 1.0).into();
        let family = AnyAreaShape::try_from(shape).unwrap();
        assert_eq!(family.shape_type(), ShapeType::Polygon);
        assert_relative_eq!(area(&family), 1.0);

        let line: Shape = LineShape::new(vec![Vertex::new(0.0, 0.0), Vertex::new(1.0, 1.0)]).into();
        assert_matches!(
            AnyAreaShape::try_from(line.clone()),
            Err(ShapeError::TypeMismatch {
                actual: ShapeType::Line,
                ..
            })
        );

        let mut line = AnyLineShape::try_from(line).unwrap();
        line.reverse();
        assert_eq!(line.as_shape_ref().vertices()[0], Vertex::new(1.0, 1.0));

        let points = AnyPointShape::from(PointShape::new(1.0, 2.0));
        assert_eq!(points.points().len(), 1);
    }

    #[test]
    fn point_family_collects_multipoint_members() {
        let multipoint = MultipointShape::new(vec![PointShape::new(1.0, 2.0), PointShape::with_z(3.0, 4.0, 5.0)]);
        let points = AnyPointShape::from(multipoint).points();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].to_vertex(), Vertex::new(1.0, 2.0));
        assert_eq!(points[1].z(), Some(5.0));
    }

    #[test]
    fn family_scale_dispatches_to_variant() {
        let mut ellipse = AnyAreaShape::from(EllipseShape::circle(Vertex::new(0.0, 0.0), 1.0).unwrap());
        ellipse.scale_up(100.0).unwrap();
        let AnyAreaShape::Ellipse(ellipse) = ellipse else {
            panic!("variant changed");
        };
        assert_relative_eq!(ellipse.width(), 4.0);
    }
}
