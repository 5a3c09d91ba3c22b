use serde::{Deserialize, Serialize};

use crate::cartesian::{point_in_ring, RingPosition, Segment};
use crate::error::{ShapeError, ShapeResult};
use crate::shape::{LineShape, PolygonShape, RingShape, ShapeRef};
use crate::vertex::Vertex;

/// How thoroughly a shape is checked.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationMode {
    /// Structural checks: vertex counts, closed rings, non-empty collections, finite coordinates.
    #[default]
    Simple,
    /// Simple checks plus ring self-intersection and hole placement.
    Advanced,
}

/// Outcome of shape validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeValidationResult {
    /// Whether the shape passed all the checks.
    pub is_valid: bool,
    /// Description of the first failed check. Empty for valid shapes.
    pub message: String,
}

impl ShapeValidationResult {
    fn valid() -> Self {
        Self {
            is_valid: true,
            message: String::new(),
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
        }
    }

    /// Converts a failed validation into [`ShapeError::InvalidShape`].
    pub fn into_result(self) -> ShapeResult<()> {
        if self.is_valid {
            Ok(())
        } else {
            Err(ShapeError::InvalidShape(self.message))
        }
    }
}

type Check = Result<(), String>;

pub(crate) fn validate(shape: ShapeRef<'_>, mode: ValidationMode) -> ShapeValidationResult {
    let check = match shape {
        ShapeRef::Point(point) => check_vertices(&[point.to_vertex()]),
        ShapeRef::Multipoint(multipoint) => {
            if multipoint.points().is_empty() {
                Err("multipoint has no points".into())
            } else {
                let vertices: Vec<_> = multipoint.points().iter().map(|p| p.to_vertex()).collect();
                check_vertices(&vertices)
            }
        }
        ShapeRef::Line(line) => check_line(line),
        ShapeRef::Multiline(multiline) => {
            if multiline.lines().is_empty() {
                Err("multiline has no lines".into())
            } else {
                multiline.lines().iter().try_for_each(check_line)
            }
        }
        ShapeRef::Ring(ring) => check_ring(ring, mode),
        ShapeRef::Polygon(polygon) => check_polygon(polygon, mode),
        ShapeRef::Multipolygon(multipolygon) => {
            if multipolygon.polygons().is_empty() {
                Err("multipolygon has no polygons".into())
            } else {
                multipolygon
                    .polygons()
                    .iter()
                    .try_for_each(|polygon| check_polygon(polygon, mode))
            }
        }
        ShapeRef::Rectangle(rectangle) => {
            check_vertices(&rectangle.corners()).and_then(|()| {
                if rectangle.min_x() < rectangle.max_x() && rectangle.min_y() < rectangle.max_y() {
                    Ok(())
                } else {
                    Err("upper left corner must be above and to the left of the lower right corner".into())
                }
            })
        }
        ShapeRef::Ellipse(ellipse) => check_vertices(&[ellipse.center()]).and_then(|()| {
            let axis_is_valid = |axis: f64| axis.is_finite() && axis > 0.0;
            if axis_is_valid(ellipse.width()) && axis_is_valid(ellipse.height()) {
                Ok(())
            } else {
                Err("ellipse axes must be positive".into())
            }
        }),
    };

    match check {
        Ok(()) => ShapeValidationResult::valid(),
        Err(message) => ShapeValidationResult::invalid(message),
    }
}

fn check_vertices(vertices: &[Vertex]) -> Check {
    match vertices.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(format!("vertex {index} has non-finite coordinates")),
        None => Ok(()),
    }
}

fn check_line(line: &LineShape) -> Check {
    if line.vertices().len() < 2 {
        return Err(format!(
            "line must have at least 2 vertices, but has {}",
            line.vertices().len()
        ));
    }
    check_vertices(line.vertices())
}

fn check_ring(ring: &RingShape, mode: ValidationMode) -> Check {
    let vertices = ring.vertices();
    if vertices.len() < 4 {
        return Err(format!(
            "ring must have at least 4 vertices including the closing one, but has {}",
            vertices.len()
        ));
    }
    if vertices.first() != vertices.last() {
        return Err("ring is not closed".into());
    }
    check_vertices(vertices)?;

    if mode == ValidationMode::Advanced {
        if let Some((i, j)) = self_intersection(vertices) {
            return Err(format!("ring segments {i} and {j} intersect"));
        }
    }

    Ok(())
}

fn check_polygon(polygon: &PolygonShape, mode: ValidationMode) -> Check {
    check_ring(polygon.outer_ring(), mode).map_err(|err| format!("outer {err}"))?;
    for (index, hole) in polygon.inner_rings().iter().enumerate() {
        check_ring(hole, mode).map_err(|err| format!("inner {index}: {err}"))?;

        if mode == ValidationMode::Advanced {
            let outer = polygon.outer_ring().vertices();
            if hole
                .vertices()
                .iter()
                .any(|v| point_in_ring(outer, v) == RingPosition::Outside)
            {
                return Err(format!("inner ring {index} is not inside the outer ring"));
            }
        }
    }

    Ok(())
}

/// First pair of non-adjacent segments of the closed vertex list that intersect.
fn self_intersection(vertices: &[Vertex]) -> Option<(usize, usize)> {
    let segment_count = vertices.len() - 1;
    for i in 0..segment_count {
        let a = Segment(&vertices[i], &vertices[i + 1]);
        for j in (i + 2)..segment_count {
            if i == 0 && j == segment_count - 1 {
                continue;
            }

            let b = Segment(&vertices[j], &vertices[j + 1]);
            if a.intersects(&b) {
                return Some((i, j));
            }
        }
    }

    None
}
