use serde::{Deserialize, Serialize};

use crate::cartesian::{point_in_ring, RingPosition};
use crate::error::{ShapeError, ShapeResult};
use crate::shape::ring::{ring_area, ring_perimeter};
use crate::shape::{AreaShape, BaseShape, RingShape, Shape, ShapeRef, Tag, ValidationMode};
use crate::units::{AreaUnit, DistanceUnit, GeographyUnit};
use crate::vertex::Vertex;

/// Polygon with an outer boundary and any number of holes.
///
/// The type does not check that the holes lie inside the outer ring; see [`ValidationMode::Advanced`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolygonShape {
    #[serde(default = "crate::shape::new_shape_id")]
    id: String,
    #[serde(skip)]
    tag: Option<Tag>,
    outer_ring: RingShape,
    inner_rings: Vec<RingShape>,
}

impl PolygonShape {
    /// Creates a new polygon.
    pub fn new(outer_ring: RingShape, inner_rings: Vec<RingShape>) -> Self {
        Self {
            id: crate::shape::new_shape_id(),
            tag: None,
            outer_ring,
            inner_rings,
        }
    }

    /// Creates a polygon without holes from the outer ring vertices.
    pub fn from_vertices(vertices: Vec<Vertex>) -> Self {
        Self::new(RingShape::new(vertices), vec![])
    }

    /// Outer boundary.
    pub fn outer_ring(&self) -> &RingShape {
        &self.outer_ring
    }

    /// Holes.
    pub fn inner_rings(&self) -> &[RingShape] {
        &self.inner_rings
    }

    /// Adds a hole.
    pub fn push_inner_ring(&mut self, ring: RingShape) {
        self.inner_rings.push(ring);
    }

    /// Outer ring followed by the holes.
    pub fn rings(&self) -> impl Iterator<Item = &RingShape> {
        std::iter::once(&self.outer_ring).chain(self.inner_rings.iter())
    }

    /// Consumes the polygon returning its outer ring.
    pub fn into_outer_ring(self) -> RingShape {
        self.outer_ring
    }

    /// Consumes the polygon returning the outer ring and the holes.
    pub fn into_rings(self) -> (RingShape, Vec<RingShape>) {
        (self.outer_ring, self.inner_rings)
    }

    /// Returns true if the point is inside the outer ring or on its boundary, and not strictly inside any hole.
    pub fn contains_point(&self, point: &Vertex) -> bool {
        if !self.outer_ring.contains_point(point) {
            return false;
        }

        self.inner_rings
            .iter()
            .all(|hole| point_in_ring(hole.vertices(), point) != RingPosition::Inside)
    }
}

impl BaseShape for PolygonShape {
    identity_accessors!();

    fn as_shape_ref(&self) -> ShapeRef<'_> {
        ShapeRef::Polygon(self)
    }

    fn map_vertices(&mut self, f: &mut dyn FnMut(Vertex) -> Vertex) {
        self.outer_ring.map_vertices(f);
        for ring in &mut self.inner_rings {
            ring.map_vertices(f);
        }
    }

    fn from_shape(shape: Shape) -> ShapeResult<Self> {
        match shape {
            Shape::Polygon(polygon) => Ok(polygon),
            Shape::Ring(ring) => Ok(ring.to_polygon()),
            Shape::Rectangle(rectangle) => Ok(rectangle.to_polygon()),
            Shape::Ellipse(ellipse) => Ok(ellipse.to_polygon(crate::shape::ELLIPSE_POLYGON_VERTEX_COUNT)),
            Shape::Multipolygon(multipolygon) if multipolygon.polygons().len() == 1 => {
                Ok(multipolygon.into_polygons().remove(0))
            }
            other => Err(ShapeError::TypeMismatch {
                expected: "Polygon",
                actual: other.shape_type(),
            }),
        }
    }
}

impl AreaShape for PolygonShape {
    /// Total length of the outer ring and all holes.
    fn perimeter(&self, shape_unit: GeographyUnit, distance_unit: DistanceUnit) -> ShapeResult<f64> {
        self.validate(ValidationMode::Simple).into_result()?;
        Ok(self
            .rings()
            .map(|ring| ring_perimeter(ring.vertices(), shape_unit, distance_unit))
            .sum())
    }

    /// Area of the outer ring minus the areas of the holes.
    fn area(&self, shape_unit: GeographyUnit, area_unit: AreaUnit) -> ShapeResult<f64> {
        self.validate(ValidationMode::Simple).into_result()?;
        Ok(polygon_area(self, shape_unit, area_unit))
    }
}

pub(crate) fn polygon_area(polygon: &PolygonShape, shape_unit: GeographyUnit, area_unit: AreaUnit) -> f64 {
    let holes: f64 = polygon
        .inner_rings
        .iter()
        .map(|ring| ring_area(ring, shape_unit, area_unit))
        .sum();
    ring_area(&polygon.outer_ring, shape_unit, area_unit) - holes
}
