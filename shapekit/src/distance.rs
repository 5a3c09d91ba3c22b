//! Distance and closest point computation between shapes of any variants.
//!
//! Shapes that intersect are at distance zero and have no closest points. Otherwise every shape is reduced to an
//! [`Outline`]: isolated points, vertex paths (lines, rings, polygon boundaries including holes) or an analytic
//! ellipse, and the closest pair is searched between the outlines with the point to segment primitive.

use crate::cartesian::Segment;
use crate::error::{ShapeError, ShapeResult};
use crate::kernel::{relate_shapes, GeometryKernel, KernelError, SpatialRelation};
use crate::shape::{EllipseShape, PointShape, ShapeRef};
use crate::units::{DistanceUnit, GeographyUnit};
use crate::vertex::Vertex;

/// Distance between the closest points of the shapes in `distance_unit`.
pub(crate) fn distance(
    a: ShapeRef<'_>,
    b: ShapeRef<'_>,
    shape_unit: GeographyUnit,
    distance_unit: DistanceUnit,
    kernel: &dyn GeometryKernel,
) -> ShapeResult<f64> {
    match closest_pair(a, b, shape_unit, kernel)? {
        Some((from, to)) => Ok(from.distance_to(&to, shape_unit, distance_unit)),
        None => Ok(0.0),
    }
}

/// Closest points of the shapes as `(point of a, point of b)`, or `None` if the shapes intersect.
pub(crate) fn closest_pair(
    a: ShapeRef<'_>,
    b: ShapeRef<'_>,
    shape_unit: GeographyUnit,
    kernel: &dyn GeometryKernel,
) -> ShapeResult<Option<(Vertex, Vertex)>> {
    match relate_shapes(a, b, SpatialRelation::Intersects, kernel) {
        Ok(true) => return Ok(None),
        Ok(false) => {}
        Err(ShapeError::Kernel(KernelError::DegenerateTopology(reason))) if shape_unit.is_decimal_degree() => {
            log::warn!(
                "Degenerate topology while measuring {} to {} in decimal degrees, distance is taken as 0: {reason}",
                a.shape_type(),
                b.shape_type()
            );
            return Ok(None);
        }
        Err(err) => return Err(err),
    }

    let from = Outline::of(a);
    let to = Outline::of(b);
    nearest_pair(&from, &to)
        .map(Some)
        .ok_or_else(|| ShapeError::InvalidShape("cannot measure distance to an empty shape".into()))
}

/// Shape reduced to the parts that matter for distance computation.
#[derive(Debug)]
enum Outline<'a> {
    Points(Vec<Vertex>),
    Paths(Vec<Vec<Vertex>>),
    Ellipse(&'a EllipseShape),
}

impl<'a> Outline<'a> {
    fn of(shape: ShapeRef<'a>) -> Self {
        match shape {
            ShapeRef::Point(p) => Outline::Points(vec![p.to_vertex()]),
            ShapeRef::Multipoint(m) => Outline::Points(m.points().iter().map(PointShape::to_vertex).collect()),
            ShapeRef::Ellipse(e) => Outline::Ellipse(e),
            ShapeRef::Line(_)
            | ShapeRef::Multiline(_)
            | ShapeRef::Ring(_)
            | ShapeRef::Polygon(_)
            | ShapeRef::Multipolygon(_)
            | ShapeRef::Rectangle(_) => Outline::Paths(shape.line_strings()),
        }
    }

    fn order(&self) -> u8 {
        match self {
            Outline::Points(_) => 0,
            Outline::Paths(_) => 1,
            Outline::Ellipse(_) => 2,
        }
    }

    fn segments(paths: &[Vec<Vertex>]) -> impl Iterator<Item = Segment<'_, Vertex>> {
        paths.iter().flat_map(|path| {
            let single = if path.len() == 1 { Some(Segment(&path[0], &path[0])) } else { None };
            single
                .into_iter()
                .chain(path.windows(2).map(|pair| Segment(&pair[0], &pair[1])))
        })
    }
}

/// Closest pair between the outlines. Pairs are always computed in the same operand order so that the result
/// does not depend on which shape is measured from.
fn nearest_pair(a: &Outline<'_>, b: &Outline<'_>) -> Option<(Vertex, Vertex)> {
    if a.order() > b.order() {
        return nearest_pair(b, a).map(|(to, from)| (from, to));
    }

    match (a, b) {
        (Outline::Points(a), Outline::Points(b)) => closest(
            a.iter()
                .flat_map(|p| b.iter().map(move |q| (*p, *q))),
        ),
        (Outline::Points(points), Outline::Paths(paths)) => closest(
            points
                .iter()
                .flat_map(|p| Outline::segments(paths).map(move |s| (*p, s.closest_point(p)))),
        ),
        (Outline::Points(points), Outline::Ellipse(ellipse)) => {
            closest(points.iter().map(|p| (*p, ellipse.nearest_boundary_point(p))))
        }
        (Outline::Paths(a), Outline::Paths(b)) => closest(
            Outline::segments(a).flat_map(|s| Outline::segments(b).map(move |t| segment_pair(s, t))),
        ),
        (Outline::Paths(paths), Outline::Ellipse(ellipse)) => {
            let center = ellipse.center();
            closest(Outline::segments(paths).map(|s| {
                let near = s.closest_point(&center);
                (near, ellipse.nearest_boundary_point(&near))
            }))
        }
        (Outline::Ellipse(a), Outline::Ellipse(b)) => Some((
            a.nearest_boundary_point(&b.center()),
            b.nearest_boundary_point(&a.center()),
        )),
        _ => None,
    }
}

/// Closest points of two segments that do not intersect: one of them is always an end point.
fn segment_pair(s: Segment<'_, Vertex>, t: Segment<'_, Vertex>) -> (Vertex, Vertex) {
    let candidates = [
        (*s.0, t.closest_point(s.0)),
        (*s.1, t.closest_point(s.1)),
        (s.closest_point(t.0), *t.0),
        (s.closest_point(t.1), *t.1),
    ];

    closest(candidates.into_iter()).unwrap_or((*s.0, *t.0))
}

fn closest(pairs: impl Iterator<Item = (Vertex, Vertex)>) -> Option<(Vertex, Vertex)> {
    pairs
        .map(|(p, q)| ((p.x - q.x).hypot(p.y - q.y), (p, q)))
        .min_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, pair)| pair)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;

    use super::*;
    use crate::kernel::default_kernel;
    use crate::shape::{BaseShape, LineShape, MultipointShape, PolygonShape, RectangleShape, RingShape};

    fn planar(a: &impl BaseShape, b: &impl BaseShape) -> f64 {
        a.distance_to(b, GeographyUnit::Meter, DistanceUnit::Meter).unwrap()
    }

    fn square_with_hole() -> PolygonShape {
        let outer = RingShape::new(vec![
            Vertex::new(0.0, 0.0),
            Vertex::new(10.0, 0.0),
            Vertex::new(10.0, 10.0),
            Vertex::new(0.0, 10.0),
        ]);
        let hole = RingShape::new(vec![
            Vertex::new(2.0, 2.0),
            Vertex::new(2.0, 8.0),
            Vertex::new(8.0, 8.0),
            Vertex::new(8.0, 2.0),
        ]);
        PolygonShape::new(outer, vec![hole])
    }

    #[test]
    fn point_to_line() {
        let line = LineShape::new(vec![Vertex::new(0.0, 0.0), Vertex::new(10.0, 0.0)]);
        let above = PointShape::new(5.0, 3.0);
        let beyond = PointShape::new(13.0, 4.0);

        assert_abs_diff_eq!(planar(&above, &line), 3.0);
        assert_abs_diff_eq!(planar(&line, &beyond), 5.0);
        let closest = line.closest_point_to(&above, GeographyUnit::Meter).unwrap();
        assert_abs_diff_eq!(closest.unwrap().to_vertex(), Vertex::new(5.0, 0.0));
    }

    #[test]
    fn point_in_hole_measures_to_hole_boundary() {
        let polygon = square_with_hole();
        let point = PointShape::new(5.0, 4.0);
        assert_abs_diff_eq!(planar(&polygon, &point), 2.0, epsilon = 1e-12);

        let inside = PointShape::new(1.0, 1.0);
        assert_abs_diff_eq!(planar(&polygon, &inside), 0.0);
        assert!(polygon.closest_point_to(&inside, GeographyUnit::Meter).unwrap().is_none());
    }

    #[test]
    fn between_segments() {
        let a = LineShape::new(vec![Vertex::new(0.0, 0.0), Vertex::new(4.0, 0.0)]);
        let b = LineShape::new(vec![Vertex::new(2.0, 1.0), Vertex::new(6.0, 5.0)]);
        assert_abs_diff_eq!(planar(&a, &b), 1.0, epsilon = 1e-12);

        let line = a.shortest_line_to(&b, GeographyUnit::Meter).unwrap().unwrap();
        assert_abs_diff_eq!(line.vertices()[0], Vertex::new(2.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(line.vertices()[1], Vertex::new(2.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn ellipse_distances() {
        let circle = EllipseShape::new(Vertex::new(0.0, 0.0), 4.0, 4.0).unwrap();
        let point = PointShape::new(3.0, 0.0);
        assert_abs_diff_eq!(planar(&circle, &point), 1.0, epsilon = 1e-9);
        let closest = circle.closest_point_to(&point, GeographyUnit::Meter).unwrap().unwrap();
        assert_abs_diff_eq!(closest.to_vertex(), Vertex::new(2.0, 0.0), epsilon = 1e-9);

        let other = EllipseShape::circle(Vertex::new(0.0, 5.0), 1.0).unwrap();
        assert_abs_diff_eq!(planar(&circle, &other), 2.0, epsilon = 1e-9);

        let line = LineShape::new(vec![Vertex::new(-5.0, 4.0), Vertex::new(5.0, 4.0)]);
        assert_abs_diff_eq!(planar(&line, &circle), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn symmetric() {
        let rectangle = RectangleShape::from_bounds(0.0, 1.0, 1.0, 0.0).unwrap();
        let multipoint = MultipointShape::from_vertices([Vertex::new(3.0, 3.0), Vertex::new(-2.0, 0.5)]);
        let circle = EllipseShape::circle(Vertex::new(5.0, 0.0), 1.0).unwrap();

        assert_abs_diff_eq!(planar(&rectangle, &multipoint), planar(&multipoint, &rectangle));
        assert_abs_diff_eq!(planar(&rectangle, &multipoint), 2.0);
        assert_abs_diff_eq!(planar(&circle, &rectangle), planar(&rectangle, &circle));
    }

    #[test]
    fn units() {
        let a = PointShape::new(0.0, 0.0);
        let b = PointShape::new(3.0, 4.0);
        assert_abs_diff_eq!(
            a.distance_to(&b, GeographyUnit::Meter, DistanceUnit::Kilometer).unwrap(),
            0.005
        );
        assert_abs_diff_eq!(
            a.distance_to(&b, GeographyUnit::Feet, DistanceUnit::Feet).unwrap(),
            5.0
        );

        let east = PointShape::new(1.0, 0.0);
        let degrees = a
            .distance_to(&east, GeographyUnit::DecimalDegree, DistanceUnit::Kilometer)
            .unwrap();
        assert_abs_diff_eq!(degrees, 111.195, epsilon = 1e-3);
    }

    #[test]
    fn degenerate_topology_only_tolerated_in_degrees() {
        let collapsed = RingShape::new(vec![
            Vertex::new(0.0, 0.0),
            Vertex::new(1.0, 0.0),
            Vertex::new(2.0, 0.0),
            Vertex::new(0.0, 0.0),
        ]);
        let point = PointShape::new(1.0, 0.000_001);

        assert_eq!(
            distance(
                ShapeRef::from(&collapsed),
                ShapeRef::from(&point),
                GeographyUnit::DecimalDegree,
                DistanceUnit::Meter,
                default_kernel(),
            )
            .unwrap(),
            0.0
        );
        assert_matches!(
            distance(
                ShapeRef::from(&collapsed),
                ShapeRef::from(&point),
                GeographyUnit::Meter,
                DistanceUnit::Meter,
                default_kernel(),
            ),
            Err(ShapeError::Kernel(KernelError::DegenerateTopology(_)))
        );
    }

    #[test]
    fn invalid_shapes_are_rejected() {
        let line = LineShape::new(vec![Vertex::new(0.0, 0.0)]);
        let point = PointShape::new(0.0, 0.0);
        assert_matches!(
            line.distance_to(&point, GeographyUnit::Meter, DistanceUnit::Meter),
            Err(ShapeError::InvalidShape(_))
        );
    }
}
