use serde::{Deserialize, Serialize};

use crate::error::ShapeResult;
use crate::shape::polygon::polygon_area;
use crate::shape::ring::ring_perimeter;
use crate::shape::{AreaShape, BaseShape, PolygonShape, Shape, ShapeRef, Tag, ValidationMode};
use crate::units::{AreaUnit, DistanceUnit, GeographyUnit};
use crate::vertex::Vertex;

/// Ordered set of polygons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultipolygonShape {
    #[serde(default = "crate::shape::new_shape_id")]
    id: String,
    #[serde(skip)]
    tag: Option<Tag>,
    polygons: Vec<PolygonShape>,
}

impl MultipolygonShape {
    /// Creates a new multipolygon.
    pub fn new(polygons: Vec<PolygonShape>) -> Self {
        Self {
            id: crate::shape::new_shape_id(),
            tag: None,
            polygons,
        }
    }

    /// Member polygons in insertion order.
    pub fn polygons(&self) -> &[PolygonShape] {
        &self.polygons
    }

    /// Mutable access to the member polygons.
    pub fn polygons_mut(&mut self) -> &mut Vec<PolygonShape> {
        &mut self.polygons
    }

    /// Adds a polygon at the end.
    pub fn push(&mut self, polygon: PolygonShape) {
        self.polygons.push(polygon);
    }

    /// Consumes the multipolygon returning its members.
    pub fn into_polygons(self) -> Vec<PolygonShape> {
        self.polygons
    }

    /// Returns true if any member polygon contains the point.
    pub fn contains_point(&self, point: &Vertex) -> bool {
        self.polygons.iter().any(|polygon| polygon.contains_point(point))
    }
}

impl BaseShape for MultipolygonShape {
    identity_accessors!();

    fn as_shape_ref(&self) -> ShapeRef<'_> {
        ShapeRef::Multipolygon(self)
    }

    fn map_vertices(&mut self, f: &mut dyn FnMut(Vertex) -> Vertex) {
        for polygon in &mut self.polygons {
            polygon.map_vertices(f);
        }
    }

    /// Any area shape can be represented as a multipolygon.
    fn from_shape(shape: Shape) -> ShapeResult<Self> {
        match shape {
            Shape::Multipolygon(multipolygon) => Ok(multipolygon),
            other => Ok(Self::new(vec![PolygonShape::from_shape(other)?])),
        }
    }
}

impl AreaShape for MultipolygonShape {
    fn perimeter(&self, shape_unit: GeographyUnit, distance_unit: DistanceUnit) -> ShapeResult<f64> {
        self.validate(ValidationMode::Simple).into_result()?;
        Ok(self
            .polygons
            .iter()
            .flat_map(|polygon| polygon.rings())
            .map(|ring| ring_perimeter(ring.vertices(), shape_unit, distance_unit))
            .sum())
    }

    fn area(&self, shape_unit: GeographyUnit, area_unit: AreaUnit) -> ShapeResult<f64> {
        self.validate(ValidationMode::Simple).into_result()?;
        Ok(self
            .polygons
            .iter()
            .map(|polygon| polygon_area(polygon, shape_unit, area_unit))
            .sum())
    }
}
