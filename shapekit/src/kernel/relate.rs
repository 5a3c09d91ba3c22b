//! Spatial predicates.
//!
//! Relations involving rectangles and ellipses are answered in closed form where possible. Everything else goes
//! through the kernel's DE-9IM matrix.

use geo::coordinate_position::CoordPos::{self, Inside as I, OnBoundary as B, Outside as E};
use geo::dimensions::Dimensions;
use geo::relate::IntersectionMatrix;

use crate::error::ShapeResult;
use crate::kernel::{to_geometry, GeometryKernel, SpatialRelation};
use crate::shape::{validate, EllipseShape, RectangleShape, ShapeRef, ValidationMode};
use crate::vertex::Vertex;

/// Tests the relation between two shapes.
pub(crate) fn relate_shapes(
    a: ShapeRef<'_>,
    b: ShapeRef<'_>,
    relation: SpatialRelation,
    kernel: &dyn GeometryKernel,
) -> ShapeResult<bool> {
    validate(a, ValidationMode::Simple).into_result()?;
    validate(b, ValidationMode::Simple).into_result()?;

    if let Some(result) = closed_form(a, b, relation) {
        log::trace!(
            "{relation:?} of {} and {} resolved without kernel",
            a.shape_type(),
            b.shape_type()
        );
        return Ok(result);
    }

    Ok(kernel.relate(&to_geometry(a), &to_geometry(b), relation)?)
}

fn closed_form(a: ShapeRef<'_>, b: ShapeRef<'_>, relation: SpatialRelation) -> Option<bool> {
    let bbox_a = RectangleShape::from_vertices(&a.vertices())?;
    let bbox_b = RectangleShape::from_vertices(&b.vertices())?;
    if !bbox_a.intersects_rectangle(&bbox_b) {
        return Some(relation == SpatialRelation::Disjoint);
    }

    shortcut(a, b, relation).or_else(|| shortcut(b, a, relation.converse()))
}

fn shortcut(a: ShapeRef<'_>, b: ShapeRef<'_>, relation: SpatialRelation) -> Option<bool> {
    match (a, b) {
        (ShapeRef::Rectangle(r), ShapeRef::Rectangle(other)) => Some(rectangles(r, other, relation)),
        (ShapeRef::Rectangle(r), ShapeRef::Point(p)) => Some(rectangle_point(r, &p.to_vertex(), relation)),
        (ShapeRef::Rectangle(r), _) => rectangle_other(r, b, relation),
        (ShapeRef::Ellipse(e), ShapeRef::Point(p)) => ellipse_point(e, &p.to_vertex(), relation),
        (ShapeRef::Ellipse(e), _) => ellipse_other(e, b, relation),
        _ => None,
    }
}

fn rectangles(a: &RectangleShape, b: &RectangleShape, relation: SpatialRelation) -> bool {
    let overlap_x = a.max_x().min(b.max_x()) - a.min_x().max(b.min_x());
    let overlap_y = a.max_y().min(b.max_y()) - a.min_y().max(b.min_y());
    let intersects = overlap_x >= 0.0 && overlap_y >= 0.0;
    let interiors_intersect = overlap_x > 0.0 && overlap_y > 0.0;
    let equal = a.upper_left() == b.upper_left() && a.lower_right() == b.lower_right();

    match relation {
        SpatialRelation::Disjoint => !intersects,
        SpatialRelation::Intersects => intersects,
        SpatialRelation::Touches => intersects && !interiors_intersect,
        SpatialRelation::Crosses => false,
        SpatialRelation::Within => b.contains_rectangle(a),
        SpatialRelation::Contains => a.contains_rectangle(b),
        SpatialRelation::Overlaps => interiors_intersect && !a.contains_rectangle(b) && !b.contains_rectangle(a),
        SpatialRelation::TopologicallyEqual => equal,
    }
}

fn rectangle_point(rectangle: &RectangleShape, point: &Vertex, relation: SpatialRelation) -> bool {
    let inside = rectangle.contains_vertex_strictly(point);
    let covered = rectangle.contains_vertex(point);

    match relation {
        SpatialRelation::Disjoint => !covered,
        SpatialRelation::Intersects => covered,
        SpatialRelation::Touches => covered && !inside,
        SpatialRelation::Contains => inside,
        SpatialRelation::Within
        | SpatialRelation::Crosses
        | SpatialRelation::Overlaps
        | SpatialRelation::TopologicallyEqual => false,
    }
}

fn rectangle_other(rectangle: &RectangleShape, other: ShapeRef<'_>, relation: SpatialRelation) -> Option<bool> {
    let vertices = other.vertices();
    match relation {
        SpatialRelation::Contains => {
            if vertices.iter().all(|v| rectangle.contains_vertex_strictly(v)) {
                Some(true)
            } else if vertices.iter().any(|v| !rectangle.contains_vertex(v)) {
                Some(false)
            } else {
                None
            }
        }
        SpatialRelation::Intersects if vertices.iter().any(|v| rectangle.contains_vertex(v)) => Some(true),
        SpatialRelation::Disjoint if vertices.iter().any(|v| rectangle.contains_vertex(v)) => Some(false),
        _ => None,
    }
}

fn ellipse_point(ellipse: &EllipseShape, point: &Vertex, relation: SpatialRelation) -> Option<bool> {
    match relation {
        SpatialRelation::Intersects => Some(ellipse.contains_point(point)),
        SpatialRelation::Disjoint => Some(!ellipse.contains_point(point)),
        _ => None,
    }
}

fn ellipse_other(ellipse: &EllipseShape, other: ShapeRef<'_>, relation: SpatialRelation) -> Option<bool> {
    let vertices = other.vertices();
    match relation {
        SpatialRelation::Contains if vertices.iter().any(|v| !ellipse.contains_point(v)) => Some(false),
        SpatialRelation::Intersects if vertices.iter().any(|v| ellipse.contains_point(v)) => Some(true),
        SpatialRelation::Disjoint if vertices.iter().any(|v| ellipse.contains_point(v)) => Some(false),
        _ => None,
    }
}

fn rank(dimensions: Dimensions) -> i8 {
    match dimensions {
        Dimensions::Empty => -1,
        Dimensions::ZeroDimensional => 0,
        Dimensions::OneDimensional => 1,
        Dimensions::TwoDimensional => 2,
    }
}

/// Evaluates the relation on the intersection matrix of geometries of dimensions `dim_a` and `dim_b`.
pub(crate) fn relation_holds(
    matrix: &IntersectionMatrix,
    relation: SpatialRelation,
    dim_a: Dimensions,
    dim_b: Dimensions,
) -> bool {
    let cell = |a: CoordPos, b: CoordPos| matrix.get(a, b);
    let set = |a: CoordPos, b: CoordPos| cell(a, b) != Dimensions::Empty;
    let intersects = set(I, I) || set(I, B) || set(B, I) || set(B, B);

    match relation {
        SpatialRelation::Disjoint => !intersects,
        SpatialRelation::Intersects => intersects,
        SpatialRelation::Touches => !set(I, I) && intersects,
        SpatialRelation::Within => set(I, I) && !set(I, E) && !set(B, E),
        SpatialRelation::Contains => set(I, I) && !set(E, I) && !set(E, B),
        SpatialRelation::TopologicallyEqual => {
            set(I, I) && !set(I, E) && !set(B, E) && !set(E, I) && !set(E, B)
        }
        SpatialRelation::Crosses => {
            let (a, b) = (rank(dim_a), rank(dim_b));
            if a == 1 && b == 1 {
                cell(I, I) == Dimensions::ZeroDimensional
            } else if a < b {
                set(I, I) && set(I, E)
            } else if a > b {
                set(I, I) && set(E, I)
            } else {
                false
            }
        }
        SpatialRelation::Overlaps => {
            if rank(dim_a) != rank(dim_b) {
                false
            } else if rank(dim_a) == 1 {
                cell(I, I) == Dimensions::OneDimensional && set(I, E) && set(E, I)
            } else {
                set(I, I) && set(I, E) && set(E, I)
            }
        }
    }
}
