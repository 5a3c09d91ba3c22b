use serde::{Deserialize, Serialize};

use crate::cartesian::{Contour, Segment};
use crate::error::{ShapeError, ShapeResult};
use crate::shape::{BaseShape, LinearShape, Shape, ShapeRef, Tag, ValidationMode};
use crate::units::{DistanceUnit, GeographyUnit};
use crate::vertex::Vertex;

/// Polyline through an ordered list of vertices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineShape {
    #[serde(default = "crate::shape::new_shape_id")]
    id: String,
    #[serde(skip)]
    tag: Option<Tag>,
    vertices: Vec<Vertex>,
}

impl LineShape {
    /// Creates a new line.
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self {
            id: crate::shape::new_shape_id(),
            tag: None,
            vertices,
        }
    }

    /// Vertices of the line.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Mutable access to the vertices.
    pub fn vertices_mut(&mut self) -> &mut Vec<Vertex> {
        &mut self.vertices
    }

    /// Consumes the line returning its vertices.
    pub fn into_vertices(self) -> Vec<Vertex> {
        self.vertices
    }

    /// A line is closed if its first and last vertices are exactly equal.
    pub fn is_closed(&self) -> bool {
        self.vertices.len() > 1 && self.vertices.first() == self.vertices.last()
    }

    /// Segments between consecutive vertices.
    pub fn segments(&self) -> impl Iterator<Item = Segment<'_, Vertex>> {
        self.vertices.windows(2).map(|pair| Segment(&pair[0], &pair[1]))
    }

    /// Length along all segments, measured in `distance_unit`.
    pub(crate) fn measured_length(&self, shape_unit: GeographyUnit, distance_unit: DistanceUnit) -> f64 {
        self.vertices
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1], shape_unit, distance_unit))
            .sum()
    }
}

impl BaseShape for LineShape {
    identity_accessors!();

    fn as_shape_ref(&self) -> ShapeRef<'_> {
        ShapeRef::Line(self)
    }

    fn map_vertices(&mut self, f: &mut dyn FnMut(Vertex) -> Vertex) {
        for vertex in &mut self.vertices {
            *vertex = f(*vertex);
        }
    }

    fn from_shape(shape: Shape) -> ShapeResult<Self> {
        match shape {
            Shape::Line(line) => Ok(line),
            Shape::Multiline(multiline) if multiline.lines().len() == 1 => Ok(multiline.into_lines().remove(0)),
            other => Err(ShapeError::TypeMismatch {
                expected: "Line",
                actual: other.shape_type(),
            }),
        }
    }
}

impl LinearShape for LineShape {
    fn length(&self, shape_unit: GeographyUnit, distance_unit: DistanceUnit) -> ShapeResult<f64> {
        self.validate(ValidationMode::Simple).into_result()?;
        Ok(self.measured_length(shape_unit, distance_unit))
    }

    fn reverse(&mut self) {
        self.vertices.reverse();
    }
}

impl Contour for LineShape {
    fn is_closed(&self) -> bool {
        false
    }

    fn iter_points(&self) -> impl Iterator<Item = &'_ Vertex> {
        self.vertices.iter()
    }
}
