use serde::{Deserialize, Serialize};

use crate::cartesian::{point_in_ring, Contour, RingPosition, Winding};
use crate::error::{ShapeError, ShapeResult};
use crate::geodesy::{default_geodesy, Geodesy};
use crate::shape::{AreaShape, BaseShape, PolygonShape, Shape, ShapeRef, Tag, ValidationMode};
use crate::units::{planar_area, AreaUnit, DistanceUnit, GeographyUnit};
use crate::vertex::Vertex;

/// Closed ring of vertices. The last vertex always equals the first one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingShape {
    #[serde(default = "crate::shape::new_shape_id")]
    id: String,
    #[serde(skip)]
    tag: Option<Tag>,
    vertices: Vec<Vertex>,
}

impl RingShape {
    /// Creates a new ring. A closing vertex is appended if the last vertex differs from the first one.
    pub fn new(mut vertices: Vec<Vertex>) -> Self {
        if let (Some(first), Some(last)) = (vertices.first(), vertices.last()) {
            if first != last || vertices.len() == 1 {
                let first = *first;
                vertices.push(first);
            }
        }

        Self {
            id: crate::shape::new_shape_id(),
            tag: None,
            vertices,
        }
    }

    /// Vertices of the ring including the closing one.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Vertices of the ring without the closing one.
    pub fn distinct_vertices(&self) -> &[Vertex] {
        match self.vertices.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }

    /// Consumes the ring returning its vertices, including the closing one.
    pub fn into_vertices(self) -> Vec<Vertex> {
        self.vertices
    }

    /// Returns true if the vertices go counterclockwise.
    pub fn is_counter_clockwise(&self) -> bool {
        self.winding() == Some(Winding::CounterClockwise)
    }

    /// Reverses the traversal direction.
    pub fn reverse(&mut self) {
        self.vertices.reverse();
    }

    /// Winding-number point in ring test. Points on the boundary are contained.
    pub fn contains_point(&self, point: &Vertex) -> bool {
        point_in_ring(&self.vertices, point) != RingPosition::Outside
    }

    /// Polygon with this ring as the outer boundary.
    pub fn to_polygon(&self) -> PolygonShape {
        PolygonShape::new(self.clone(), vec![])
    }
}

impl BaseShape for RingShape {
    identity_accessors!();

    fn as_shape_ref(&self) -> ShapeRef<'_> {
        ShapeRef::Ring(self)
    }

    fn map_vertices(&mut self, f: &mut dyn FnMut(Vertex) -> Vertex) {
        let Some(last) = self.vertices.len().checked_sub(1) else {
            return;
        };

        for vertex in &mut self.vertices[..last] {
            *vertex = f(*vertex);
        }
        if last > 0 {
            self.vertices[last] = self.vertices[0];
        } else {
            self.vertices[0] = f(self.vertices[0]);
        }
    }

    fn from_shape(shape: Shape) -> ShapeResult<Self> {
        match shape {
            Shape::Ring(ring) => Ok(ring),
            Shape::Polygon(polygon) if polygon.inner_rings().is_empty() => Ok(polygon.into_outer_ring()),
            Shape::Multipolygon(multipolygon)
                if multipolygon.polygons().len() == 1 && multipolygon.polygons()[0].inner_rings().is_empty() =>
            {
                Ok(multipolygon.into_polygons().remove(0).into_outer_ring())
            }
            Shape::Rectangle(rectangle) => Ok(rectangle.to_ring()),
            Shape::Ellipse(ellipse) => Ok(ellipse.to_polygon(crate::shape::ELLIPSE_POLYGON_VERTEX_COUNT).into_outer_ring()),
            other => Err(ShapeError::TypeMismatch {
                expected: "Ring",
                actual: other.shape_type(),
            }),
        }
    }
}

impl AreaShape for RingShape {
    fn perimeter(&self, shape_unit: GeographyUnit, distance_unit: DistanceUnit) -> ShapeResult<f64> {
        self.validate(ValidationMode::Simple).into_result()?;
        Ok(ring_perimeter(&self.vertices, shape_unit, distance_unit))
    }

    fn area(&self, shape_unit: GeographyUnit, area_unit: AreaUnit) -> ShapeResult<f64> {
        self.validate(ValidationMode::Simple).into_result()?;
        Ok(ring_area(self, shape_unit, area_unit))
    }
}

impl Contour for RingShape {
    fn is_closed(&self) -> bool {
        true
    }

    fn iter_points(&self) -> impl Iterator<Item = &'_ Vertex> {
        self.distinct_vertices().iter()
    }
}

/// Length of the closed vertex sequence in `distance_unit`.
pub(crate) fn ring_perimeter(vertices: &[Vertex], shape_unit: GeographyUnit, distance_unit: DistanceUnit) -> f64 {
    vertices
        .windows(2)
        .map(|pair| pair[0].distance_to(&pair[1], shape_unit, distance_unit))
        .sum()
}

/// Unsigned area enclosed by the ring in `area_unit`.
pub(crate) fn ring_area(ring: &RingShape, shape_unit: GeographyUnit, area_unit: AreaUnit) -> f64 {
    if shape_unit.is_decimal_degree() {
        let square_meters = default_geodesy().ring_area(ring.vertices());
        AreaUnit::convert(square_meters, AreaUnit::SquareMeters, area_unit)
    } else {
        planar_area(ring.area_signed().abs(), shape_unit, area_unit)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn open_square() -> Vec<Vertex> {
        vec![
            Vertex::new(0.0, 0.0),
            Vertex::new(4.0, 0.0),
            Vertex::new(4.0, 4.0),
            Vertex::new(0.0, 4.0),
        ]
    }

    #[test]
    fn closes_open_vertex_list() {
        let ring = RingShape::new(open_square());
        assert_eq!(ring.vertices().len(), 5);
        assert_eq!(ring.vertices()[0], ring.vertices()[4]);
        assert_eq!(ring.distinct_vertices().len(), 4);
    }

    #[test]
    fn does_not_duplicate_closing_vertex() {
        let mut vertices = open_square();
        vertices.push(Vertex::new(0.0, 0.0));
        let ring = RingShape::new(vertices);
        assert_eq!(ring.vertices().len(), 5);
    }

    #[test]
    fn area_and_perimeter() {
        let ring = RingShape::new(open_square());
        assert_relative_eq!(
            ring.area(GeographyUnit::Meter, AreaUnit::SquareMeters).unwrap(),
            16.0
        );
        assert_relative_eq!(
            ring.perimeter(GeographyUnit::Meter, DistanceUnit::Meter).unwrap(),
            16.0
        );
        assert_relative_eq!(
            ring.area(GeographyUnit::Feet, AreaUnit::SquareFeet).unwrap(),
            16.0
        );
    }

    #[test]
    fn orientation() {
        let mut ring = RingShape::new(open_square());
        assert!(ring.is_counter_clockwise());
        ring.reverse();
        assert!(!ring.is_counter_clockwise());
        assert_eq!(ring.vertices()[0], ring.vertices()[4]);
    }

    #[test]
    fn contains_point() {
        let ring = RingShape::new(open_square());
        assert!(ring.contains_point(&Vertex::new(1.0, 1.0)));
        assert!(ring.contains_point(&Vertex::new(4.0, 2.0)));
        assert!(!ring.contains_point(&Vertex::new(4.5, 2.0)));
    }

    #[test]
    fn transforms_keep_ring_closed() {
        let mut ring = RingShape::new(open_square());
        ring.map_vertices(&mut |v| Vertex::new(v.x + 1.0, v.y * 2.0));
        assert_eq!(ring.vertices()[0], Vertex::new(1.0, 0.0));
        assert_eq!(ring.vertices()[4], Vertex::new(1.0, 0.0));
        assert_eq!(ring.vertices()[2], Vertex::new(5.0, 8.0));
    }

    #[test]
    fn too_short_ring_is_invalid() {
        let ring = RingShape::new(vec![Vertex::new(0.0, 0.0), Vertex::new(1.0, 0.0), Vertex::new(0.0, 0.0)]);
        assert!(!ring.validate(ValidationMode::Simple).is_valid);
        assert!(ring.area(GeographyUnit::Meter, AreaUnit::SquareMeters).is_err());
    }
}
