use serde::{Deserialize, Serialize};

use crate::error::{ShapeError, ShapeResult};
use crate::shape::{BaseShape, PointFamily, PointShape, Shape, ShapeRef, Tag};
use crate::vertex::Vertex;

/// Ordered set of points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultipointShape {
    #[serde(default = "crate::shape::new_shape_id")]
    id: String,
    #[serde(skip)]
    tag: Option<Tag>,
    points: Vec<PointShape>,
}

impl MultipointShape {
    /// Creates a new multipoint.
    pub fn new(points: Vec<PointShape>) -> Self {
        Self {
            id: crate::shape::new_shape_id(),
            tag: None,
            points,
        }
    }

    /// Creates a multipoint with a point at every vertex.
    pub fn from_vertices(vertices: impl IntoIterator<Item = Vertex>) -> Self {
        Self::new(vertices.into_iter().map(PointShape::from_vertex).collect())
    }

    /// Member points in insertion order.
    pub fn points(&self) -> &[PointShape] {
        &self.points
    }

    /// Mutable access to the member points.
    pub fn points_mut(&mut self) -> &mut Vec<PointShape> {
        &mut self.points
    }

    /// Adds a point at the end.
    pub fn push(&mut self, point: PointShape) {
        self.points.push(point);
    }

    /// Consumes the multipoint returning its members.
    pub fn into_points(self) -> Vec<PointShape> {
        self.points
    }
}

impl BaseShape for MultipointShape {
    identity_accessors!();

    fn as_shape_ref(&self) -> ShapeRef<'_> {
        ShapeRef::Multipoint(self)
    }

    fn map_vertices(&mut self, f: &mut dyn FnMut(Vertex) -> Vertex) {
        for point in &mut self.points {
            point.map_vertices(f);
        }
    }

    fn from_shape(shape: Shape) -> ShapeResult<Self> {
        match shape {
            Shape::Multipoint(multipoint) => Ok(multipoint),
            Shape::Point(point) => Ok(Self::new(vec![point])),
            other => Err(ShapeError::TypeMismatch {
                expected: "Multipoint",
                actual: other.shape_type(),
            }),
        }
    }
}

impl PointFamily for MultipointShape {
    fn points(&self) -> Vec<PointShape> {
        self.points.clone()
    }
}
