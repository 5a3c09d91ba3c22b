use serde::{Deserialize, Serialize};

use crate::error::{ShapeError, ShapeResult};
use crate::shape::{BaseShape, LineShape, LinearShape, Shape, ShapeRef, Tag, ValidationMode};
use crate::units::{DistanceUnit, GeographyUnit};
use crate::vertex::Vertex;

/// Ordered set of lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultilineShape {
    #[serde(default = "crate::shape::new_shape_id")]
    id: String,
    #[serde(skip)]
    tag: Option<Tag>,
    lines: Vec<LineShape>,
}

impl MultilineShape {
    /// Creates a new multiline.
    pub fn new(lines: Vec<LineShape>) -> Self {
        Self {
            id: crate::shape::new_shape_id(),
            tag: None,
            lines,
        }
    }

    /// Member lines in insertion order.
    pub fn lines(&self) -> &[LineShape] {
        &self.lines
    }

    /// Mutable access to the member lines.
    pub fn lines_mut(&mut self) -> &mut Vec<LineShape> {
        &mut self.lines
    }

    /// Adds a line at the end.
    pub fn push(&mut self, line: LineShape) {
        self.lines.push(line);
    }

    /// Consumes the multiline returning its members.
    pub fn into_lines(self) -> Vec<LineShape> {
        self.lines
    }
}

impl BaseShape for MultilineShape {
    identity_accessors!();

    fn as_shape_ref(&self) -> ShapeRef<'_> {
        ShapeRef::Multiline(self)
    }

    fn map_vertices(&mut self, f: &mut dyn FnMut(Vertex) -> Vertex) {
        for line in &mut self.lines {
            line.map_vertices(f);
        }
    }

    fn from_shape(shape: Shape) -> ShapeResult<Self> {
        match shape {
            Shape::Multiline(multiline) => Ok(multiline),
            Shape::Line(line) => Ok(Self::new(vec![line])),
            other => Err(ShapeError::TypeMismatch {
                expected: "Multiline",
                actual: other.shape_type(),
            }),
        }
    }
}

impl LinearShape for MultilineShape {
    fn length(&self, shape_unit: GeographyUnit, distance_unit: DistanceUnit) -> ShapeResult<f64> {
        self.validate(ValidationMode::Simple).into_result()?;
        Ok(self
            .lines
            .iter()
            .map(|line| line.measured_length(shape_unit, distance_unit))
            .sum())
    }

    /// Reverses the order of the lines and the direction of every line.
    fn reverse(&mut self) {
        self.lines.reverse();
        for line in &mut self.lines {
            line.reverse();
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn multiline() -> MultilineShape {
        MultilineShape::new(vec![
            LineShape::new(vec![Vertex::new(0.0, 0.0), Vertex::new(10.0, 0.0)]),
            LineShape::new(vec![Vertex::new(10.0, 5.0), Vertex::new(10.0, 10.0)]),
        ])
    }

    #[test]
    fn total_length() {
        assert_relative_eq!(
            multiline()
                .length(GeographyUnit::Meter, DistanceUnit::Meter)
                .unwrap(),
            15.0
        );
    }

    #[test]
    fn reverse() {
        let mut multiline = multiline();
        multiline.reverse();
        assert_eq!(multiline.lines()[0].vertices()[0], Vertex::new(10.0, 10.0));
        assert_eq!(multiline.lines()[1].vertices()[1], Vertex::new(0.0, 0.0));
    }

    #[test]
    fn invalid_member() {
        let mut multiline = multiline();
        multiline.push(LineShape::new(vec![Vertex::new(0.0, 0.0)]));
        let result = multiline.validate(ValidationMode::Simple);
        assert!(!result.is_valid);
        assert!(MultilineShape::new(vec![]).length(GeographyUnit::Meter, DistanceUnit::Meter).is_err());
    }
}
