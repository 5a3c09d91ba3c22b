//! Affine transforms applied vertex by vertex through [`BaseShape::map_vertices`].

use crate::error::{ensure_finite, ensure_in_range, ShapeError, ShapeResult};
use crate::geodesy::MEAN_EARTH_RADIUS;
use crate::shape::{BaseShape, ValidationMode};
use crate::units::{to_shape_length, DistanceUnit, GeographyUnit};
use crate::vertex::Vertex;

/// Whether a percentage grows or shrinks the shape.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ScaleDirection {
    Up,
    Down,
}

pub(crate) fn translate_by_offset<S: BaseShape + ?Sized>(
    shape: &mut S,
    x_offset: f64,
    y_offset: f64,
    shape_unit: GeographyUnit,
    distance_unit: DistanceUnit,
) -> ShapeResult<()> {
    ensure_finite("x_offset", x_offset)?;
    ensure_finite("y_offset", y_offset)?;
    shape.validate(ValidationMode::Simple).into_result()?;

    shape.map_vertices(&mut |v| v.translate_by_offset(x_offset, y_offset, shape_unit, distance_unit));
    Ok(())
}

pub(crate) fn translate_by_degree<S: BaseShape + ?Sized>(
    shape: &mut S,
    distance: f64,
    angle: f64,
    shape_unit: GeographyUnit,
    distance_unit: DistanceUnit,
) -> ShapeResult<()> {
    ensure_finite("distance", distance)?;
    validate_angle(angle)?;
    shape.validate(ValidationMode::Simple).into_result()?;

    shape.map_vertices(&mut |v| v.translate_by_degree(distance, angle, shape_unit, distance_unit));
    Ok(())
}

pub(crate) fn rotate<S: BaseShape + ?Sized>(shape: &mut S, pivot: Vertex, angle: f64) -> ShapeResult<()> {
    if !shape.can_rotate() {
        return Err(ShapeError::NotSupported {
            operation: "rotate",
            shape: shape.shape_type(),
        });
    }

    if !pivot.is_finite() {
        return Err(ShapeError::invalid_argument("pivot", "coordinates must be finite"));
    }
    validate_angle(angle)?;
    shape.validate(ValidationMode::Simple).into_result()?;

    shape.map_vertices(&mut |v| v.rotate(&pivot, angle));
    Ok(())
}

/// Scales the shape about the average of its distinct vertices. Empty shapes are left as is.
pub(crate) fn scale_about_centroid<S: BaseShape + ?Sized>(shape: &mut S, factor: f64) {
    let Some(center) = centroid(&shape.as_shape_ref().distinct_vertices()) else {
        return;
    };

    shape.map_vertices(&mut |v| v.scale_about(&center, factor));
}

/// Factor applied by scale up and scale down operations: `1 + p / 100` or `1 - p / 100`.
pub(crate) fn scale_factor(percentage: f64, direction: ScaleDirection) -> ShapeResult<f64> {
    crate::error::ensure_positive("percentage", percentage)?;
    match direction {
        ScaleDirection::Up => Ok(1.0 + percentage / 100.0),
        ScaleDirection::Down if percentage < 100.0 => Ok(1.0 - percentage / 100.0),
        ScaleDirection::Down => Err(ShapeError::invalid_argument(
            "percentage",
            format!("{percentage} would collapse the shape"),
        )),
    }
}

/// Re-expresses `vertex` as an offset from `from` measured in `from_unit`, applied to `to` in `to_unit`.
pub(crate) fn register_vertex(
    vertex: Vertex,
    from: Vertex,
    to: Vertex,
    from_unit: DistanceUnit,
    to_unit: GeographyUnit,
) -> Vertex {
    let dx = vertex.x - from.x;
    let dy = vertex.y - from.y;
    to.translate_by_offset(dx, dy, to_unit, from_unit)
}

/// Converts a distance into shape coordinate units. For decimal degree shapes the distance is converted into
/// degrees of arc on the mean earth sphere.
pub(crate) fn to_shape_distance(distance: f64, distance_unit: DistanceUnit, shape_unit: GeographyUnit) -> f64 {
    if shape_unit.is_decimal_degree() {
        let meters = DistanceUnit::convert(distance, distance_unit, DistanceUnit::Meter);
        (meters / MEAN_EARTH_RADIUS).to_degrees()
    } else {
        to_shape_length(distance, distance_unit, shape_unit)
    }
}

/// Average of the vertices.
pub(crate) fn centroid(vertices: &[Vertex]) -> Option<Vertex> {
    if vertices.is_empty() {
        return None;
    }

    let count = vertices.len() as f64;
    let (sum_x, sum_y) = vertices
        .iter()
        .fold((0.0, 0.0), |(x, y), v| (x + v.x, y + v.y));
    Some(Vertex::new(sum_x / count, sum_y / count))
}

fn validate_angle(angle: f64) -> ShapeResult<()> {
    ensure_in_range("angle", angle, 0.0, 360.0)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;

    use super::*;
    use crate::shape::{LineShape, PointShape, PolygonShape, RectangleShape, ShapeType};

    fn triangle() -> PolygonShape {
        PolygonShape::from_vertices(vec![Vertex::new(0.0, 0.0), Vertex::new(3.0, 0.0), Vertex::new(0.0, 3.0)])
    }

    #[test]
    fn translate_polygon() {
        let mut polygon = triangle();
        polygon
            .translate_by_offset(1.0, 1.0, GeographyUnit::Meter, DistanceUnit::Meter)
            .unwrap();
        assert_eq!(polygon.outer_ring().vertices()[1], Vertex::new(4.0, 1.0));
        assert_eq!(polygon.outer_ring().vertices()[3], Vertex::new(1.0, 1.0));
    }

    #[test]
    fn translate_in_other_units() {
        let mut point = PointShape::new(0.0, 0.0);
        point
            .translate_by_offset(1.0, 0.0, GeographyUnit::Feet, DistanceUnit::Meter)
            .unwrap();
        assert_abs_diff_eq!(point.x(), 3.280_839_895, epsilon = 1e-6);
    }

    #[test]
    fn translate_by_degree_east() {
        let mut line = LineShape::new(vec![Vertex::new(0.0, 0.0), Vertex::new(1.0, 0.0)]);
        line.translate_by_degree(2.0, 90.0, GeographyUnit::Meter, DistanceUnit::Meter)
            .unwrap();
        assert_abs_diff_eq!(line.vertices()[0], Vertex::new(2.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn angle_range_is_checked() {
        let mut line = LineShape::new(vec![Vertex::new(0.0, 0.0), Vertex::new(1.0, 0.0)]);
        assert_matches!(
            line.translate_by_degree(1.0, 361.0, GeographyUnit::Meter, DistanceUnit::Meter),
            Err(ShapeError::InvalidArgument { name: "angle", .. })
        );
        assert_matches!(
            line.rotate(&PointShape::new(0.0, 0.0), -1.0),
            Err(ShapeError::InvalidArgument { name: "angle", .. })
        );
    }

    #[test]
    fn rotate_line_quarter_turn() {
        let mut line = LineShape::new(vec![Vertex::new(1.0, 0.0), Vertex::new(2.0, 0.0)]);
        line.rotate(&PointShape::new(0.0, 0.0), 90.0).unwrap();
        assert_abs_diff_eq!(line.vertices()[0], Vertex::new(0.0, 1.0), epsilon = 1e-12);
        assert_abs_diff_eq!(line.vertices()[1], Vertex::new(0.0, 2.0), epsilon = 1e-12);
    }

    #[test]
    fn rectangle_cannot_rotate() {
        let mut rectangle = RectangleShape::from_bounds(0.0, 1.0, 1.0, 0.0).unwrap();
        assert_matches!(
            rectangle.rotate(&PointShape::new(0.0, 0.0), 45.0),
            Err(ShapeError::NotSupported {
                operation: "rotate",
                shape: ShapeType::Rectangle
            })
        );
    }

    #[test]
    fn invalid_shape_is_not_transformed() {
        let mut line = LineShape::new(vec![Vertex::new(0.0, 0.0)]);
        assert_matches!(
            line.translate_by_offset(1.0, 1.0, GeographyUnit::Meter, DistanceUnit::Meter),
            Err(ShapeError::InvalidShape(_))
        );
        assert_eq!(line.vertices()[0], Vertex::new(0.0, 0.0));
    }

    #[test]
    fn scale_factors() {
        assert_eq!(scale_factor(50.0, ScaleDirection::Up).unwrap(), 1.5);
        assert_eq!(scale_factor(50.0, ScaleDirection::Down).unwrap(), 0.5);
        assert_matches!(
            scale_factor(0.0, ScaleDirection::Up),
            Err(ShapeError::InvalidArgument { name: "percentage", .. })
        );
        assert!(scale_factor(100.0, ScaleDirection::Down).is_err());
        assert_eq!(scale_factor(150.0, ScaleDirection::Up).unwrap(), 2.5);
    }

    #[test]
    fn scale_uses_vertex_average() {
        // Bounding box center is (1.5, 1.5), vertex average is (1, 1).
        let mut polygon = triangle();
        polygon.scale_by(2.0);
        assert_abs_diff_eq!(polygon.outer_ring().vertices()[0], Vertex::new(-1.0, -1.0), epsilon = 1e-12);
        assert_abs_diff_eq!(polygon.outer_ring().vertices()[1], Vertex::new(5.0, -1.0), epsilon = 1e-12);
    }

    #[test]
    fn register_planar() {
        let line = LineShape::new(vec![Vertex::new(10.0, 10.0), Vertex::new(11.0, 12.0)]);
        let registered = line
            .register(
                &PointShape::new(10.0, 10.0),
                &PointShape::new(0.0, 0.0),
                DistanceUnit::Meter,
                GeographyUnit::Feet,
            )
            .unwrap();
        assert_eq!(registered.id(), line.id());
        assert_abs_diff_eq!(registered.vertices()[0], Vertex::new(0.0, 0.0));
        assert_abs_diff_eq!(
            registered.vertices()[1],
            Vertex::new(3.280_839_895, 6.561_679_790),
            epsilon = 1e-6
        );
        assert_eq!(line.vertices()[0], Vertex::new(10.0, 10.0));
    }

    #[test]
    fn register_into_degrees() {
        let point = PointShape::new(0.0, 1000.0);
        let registered = point
            .register(
                &PointShape::new(0.0, 0.0),
                &PointShape::new(0.0, 0.0),
                DistanceUnit::Kilometer,
                GeographyUnit::DecimalDegree,
            )
            .unwrap();
        // 1000 km along a meridian is about 9 degrees of latitude.
        assert_abs_diff_eq!(registered.y(), 8.993, epsilon = 1e-3);
        assert_abs_diff_eq!(registered.x(), 0.0);
    }

    #[test]
    fn degree_distance() {
        let degrees = to_shape_distance(111.195, DistanceUnit::Kilometer, GeographyUnit::DecimalDegree);
        assert_abs_diff_eq!(degrees, 1.0, epsilon = 1e-4);
        assert_eq!(to_shape_distance(2.0, DistanceUnit::Kilometer, GeographyUnit::Meter), 2000.0);
    }

    #[test]
    fn centroid_of_empty() {
        assert_eq!(centroid(&[]), None);
        assert_eq!(
            centroid(&[Vertex::new(0.0, 0.0), Vertex::new(2.0, 4.0)]),
            Some(Vertex::new(1.0, 2.0))
        );
    }
}
