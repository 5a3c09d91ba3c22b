//! Closed form solvers for axis aligned ellipses.
//!
//! An ellipse is given by its center and semi-axes `a` (along x) and `b` (along y).

use crate::cartesian::COINCIDENT_VERTEX_TOLERANCE;
use crate::error::{ShapeError, ShapeResult};
use crate::vertex::Vertex;

/// Number of decimal digits the tangent construction inputs are rounded to.
pub const TANGENT_ROUNDING_DIGITS: i32 = 6;

/// Ellipses with size ratio closer to 1 than this are treated as equal sized in the tangent construction.
pub(crate) const EQUAL_SIZE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Copy, Clone)]
pub(crate) struct Axes {
    pub center: Vertex,
    pub a: f64,
    pub b: f64,
}

impl Axes {
    fn rounded(self) -> Self {
        Self {
            center: Vertex::new(round(self.center.x), round(self.center.y)),
            a: round(self.a),
            b: round(self.b),
        }
    }

    fn at(&self, u: f64, v: f64) -> Vertex {
        Vertex::new(self.center.x + u, self.center.y + v)
    }
}

fn round(value: f64) -> f64 {
    let scale = 10f64.powi(TANGENT_ROUNDING_DIGITS);
    (value * scale).round() / scale
}

/// Real roots of `a*x^2 + b*x + c = 0`, smaller first.
pub(crate) fn solve_quadratic(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    if a == 0.0 {
        if b == 0.0 {
            return None;
        }
        let root = -c / b;
        return Some((root, root));
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        if discriminant > -COINCIDENT_VERTEX_TOLERANCE {
            let root = -b / (2.0 * a);
            return Some((root, root));
        }
        return None;
    }

    let sqrt = discriminant.sqrt();
    let r1 = (-b - sqrt) / (2.0 * a);
    let r2 = (-b + sqrt) / (2.0 * a);
    Some((r1.min(r2), r1.max(r2)))
}

/// Point in ellipse test. Boundary points are contained.
///
/// The implicit equation is solved for the coordinate along the shorter axis, and the point is inside if its
/// coordinate lies between the two roots.
pub(crate) fn contains(ellipse: Axes, point: &Vertex) -> bool {
    let dx = point.x - ellipse.center.x;
    let dy = point.y - ellipse.center.y;

    let (along, across, major, minor, center_across) = if ellipse.a >= ellipse.b {
        (dx, point.y, ellipse.a, ellipse.b, ellipse.center.y)
    } else {
        (dy, point.x, ellipse.b, ellipse.a, ellipse.center.x)
    };

    // across^2 - 2*c*across + c^2 - minor^2 * (1 - along^2 / major^2) = 0
    let c = center_across;
    let Some((low, high)) = solve_quadratic(
        1.0,
        -2.0 * c,
        c * c - minor * minor * (1.0 - along * along / (major * major)),
    ) else {
        return false;
    };

    across >= low - COINCIDENT_VERTEX_TOLERANCE && across <= high + COINCIDENT_VERTEX_TOLERANCE
}

/// Point where the line from the ellipse center towards `point` crosses the boundary.
///
/// For the center itself the rightmost point of the ellipse is returned.
pub(crate) fn nearest_boundary_point(ellipse: Axes, point: &Vertex) -> Vertex {
    let dx = point.x - ellipse.center.x;
    let dy = point.y - ellipse.center.y;

    if dx.abs() < COINCIDENT_VERTEX_TOLERANCE && dy.abs() < COINCIDENT_VERTEX_TOLERANCE {
        return ellipse.at(ellipse.a, 0.0);
    }

    if dx.abs() < COINCIDENT_VERTEX_TOLERANCE {
        return ellipse.at(0.0, ellipse.b.copysign(dy));
    }

    // u^2 / a^2 + (m*u)^2 / b^2 = 1
    let slope = dy / dx;
    let a2 = ellipse.a * ellipse.a;
    let b2 = ellipse.b * ellipse.b;
    let Some((low, high)) = solve_quadratic(1.0 / a2 + slope * slope / b2, 0.0, -1.0) else {
        return ellipse.at(ellipse.a.copysign(dx), 0.0);
    };

    let u = if dx > 0.0 { high } else { low };
    ellipse.at(u, slope * u)
}

/// Tangent points of the two outer common tangents of the ellipses.
///
/// Each pair holds the point on the `first` ellipse and the point on the `second` one lying on the same tangent
/// line. The pair for the line to the left of the direction from `first` to `second` goes first.
///
/// Inputs are rounded to [`TANGENT_ROUNDING_DIGITS`] decimal digits. The construction depends on the relative
/// position and size of the ellipses:
/// * centers aligned vertically or horizontally: extreme points of the ellipses across the alignment axis;
/// * different sizes: tangents from the external center of similitude, found from the polar lines of that center;
/// * equal sizes: points where the ellipse tangent is parallel to the line between centers.
///
/// The first and the last cases are exact for similar ellipses only.
pub(crate) fn common_tangent_points(first: Axes, second: Axes) -> ShapeResult<[(Vertex, Vertex); 2]> {
    let first = first.rounded();
    let second = second.rounded();
    let (c1, c2) = (first.center, second.center);

    if c1 == c2 {
        return Err(ShapeError::invalid_argument(
            "other",
            "concentric ellipses have no outer common tangents",
        ));
    }

    let pairs = if c1.x == c2.x {
        [
            (first.at(-first.a, 0.0), second.at(-second.a, 0.0)),
            (first.at(first.a, 0.0), second.at(second.a, 0.0)),
        ]
    } else if c1.y == c2.y {
        [
            (first.at(0.0, first.b), second.at(0.0, second.b)),
            (first.at(0.0, -first.b), second.at(0.0, -second.b)),
        ]
    } else {
        let ratio = second.a / first.a;
        if (ratio - 1.0).abs() > EQUAL_SIZE_TOLERANCE {
            similitude_tangents(first, second)?
        } else {
            parallel_tangents(first, second)
        }
    };

    Ok(order_by_side(pairs, c1, c2))
}

fn similitude_tangents(first: Axes, second: Axes) -> ShapeResult<[(Vertex, Vertex); 2]> {
    let (c1, c2) = (first.center, second.center);
    let (r1, r2) = (first.a, second.a);
    let anchor = Vertex::new(
        (r1 * c2.x - r2 * c1.x) / (r1 - r2),
        (r1 * c2.y - r2 * c1.y) / (r1 - r2),
    );

    let [p1, p2] = polar_tangent_points(first, anchor)?;
    let [q1, q2] = polar_tangent_points(second, anchor)?;

    // Tangent points on the same side of the center line belong to the same tangent.
    let side_p1 = side(c1, c2, p1) > 0.0;
    let side_q1 = side(c1, c2, q1) > 0.0;
    if side_p1 == side_q1 {
        Ok([(p1, q1), (p2, q2)])
    } else {
        Ok([(p1, q2), (p2, q1)])
    }
}

/// Intersections of the polar line of `anchor` with the ellipse, which are the points of tangency of the lines
/// through `anchor`.
fn polar_tangent_points(ellipse: Axes, anchor: Vertex) -> ShapeResult<[Vertex; 2]> {
    let eu = anchor.x - ellipse.center.x;
    let ev = anchor.y - ellipse.center.y;
    let a2 = ellipse.a * ellipse.a;
    let b2 = ellipse.b * ellipse.b;

    let no_tangents = || {
        ShapeError::invalid_argument(
            "other",
            "one ellipse contains the other, there are no outer common tangents",
        )
    };

    if ev.abs() < COINCIDENT_VERTEX_TOLERANCE {
        // Vertical polar line u = a^2 / eu.
        let u = a2 / eu;
        let rest = 1.0 - u * u / a2;
        if rest < 0.0 {
            return Err(no_tangents());
        }
        let v = ellipse.b * rest.sqrt();
        return Ok([ellipse.at(u, v), ellipse.at(u, -v)]);
    }

    // v = b^2 / ev * (1 - u * eu / a^2), substituted into u^2 / a^2 + v^2 / b^2 = 1.
    let k = b2 / (ev * ev);
    let qa = 1.0 / a2 + k * eu * eu / (a2 * a2);
    let qb = -2.0 * k * eu / a2;
    let qc = k - 1.0;
    let (u1, u2) = solve_quadratic(qa, qb, qc).ok_or_else(no_tangents)?;

    let v = |u: f64| b2 / ev * (1.0 - u * eu / a2);
    Ok([ellipse.at(u1, v(u1)), ellipse.at(u2, v(u2))])
}

fn parallel_tangents(first: Axes, second: Axes) -> [(Vertex, Vertex); 2] {
    let direction = Vertex::new(
        second.center.x - first.center.x,
        second.center.y - first.center.y,
    );
    let normal = Vertex::new(-direction.y, direction.x);

    let offset = |ellipse: &Axes| {
        let a2 = ellipse.a * ellipse.a;
        let b2 = ellipse.b * ellipse.b;
        let scale = 1.0 / (a2 * normal.x * normal.x + b2 * normal.y * normal.y).sqrt();
        (a2 * normal.x * scale, b2 * normal.y * scale)
    };

    let (u1, v1) = offset(&first);
    let (u2, v2) = offset(&second);
    [
        (first.at(u1, v1), second.at(u2, v2)),
        (first.at(-u1, -v1), second.at(-u2, -v2)),
    ]
}

/// Positive if `point` is to the left of the direction from `from` to `to`.
fn side(from: Vertex, to: Vertex, point: Vertex) -> f64 {
    (to.x - from.x) * (point.y - from.y) - (to.y - from.y) * (point.x - from.x)
}

fn order_by_side(pairs: [(Vertex, Vertex); 2], c1: Vertex, c2: Vertex) -> [(Vertex, Vertex); 2] {
    let [first, second] = pairs;
    if side(c1, c2, first.0) >= side(c1, c2, second.0) {
        [first, second]
    } else {
        [second, first]
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;

    fn circle(x: f64, y: f64, r: f64) -> Axes {
        Axes {
            center: Vertex::new(x, y),
            a: r,
            b: r,
        }
    }

    fn dot(a: (f64, f64), b: (f64, f64)) -> f64 {
        a.0 * b.0 + a.1 * b.1
    }

    fn assert_tangent(circle: Axes, p: Vertex, q: Vertex) {
        let radius = (p.x - circle.center.x, p.y - circle.center.y);
        let line = (q.x - p.x, q.y - p.y);
        assert_relative_eq!(dot(radius, radius).sqrt(), circle.a, epsilon = 1e-6);
        assert_abs_diff_eq!(dot(radius, line), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn quadratic_roots() {
        assert_eq!(solve_quadratic(1.0, -3.0, 2.0), Some((1.0, 2.0)));
        assert_eq!(solve_quadratic(1.0, 0.0, 1.0), None);
        assert_eq!(solve_quadratic(0.0, 2.0, -4.0), Some((2.0, 2.0)));
    }

    #[test]
    fn containment() {
        let circle = circle(0.0, 0.0, 2.0);
        assert!(contains(circle, &Vertex::new(0.0, 0.0)));
        assert!(contains(circle, &Vertex::new(2.0, 0.0)));
        assert!(!contains(circle, &Vertex::new(3.0, 0.0)));

        let tall = Axes {
            center: Vertex::new(1.0, 1.0),
            a: 1.0,
            b: 3.0,
        };
        assert!(contains(tall, &Vertex::new(1.0, 3.5)));
        assert!(!contains(tall, &Vertex::new(2.5, 1.0)));
        assert!(!contains(tall, &Vertex::new(1.9, 3.5)));
    }

    #[test]
    fn boundary_point() {
        let circle = circle(0.0, 0.0, 2.0);
        assert_abs_diff_eq!(
            nearest_boundary_point(circle, &Vertex::new(3.0, 0.0)),
            Vertex::new(2.0, 0.0),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            nearest_boundary_point(circle, &Vertex::new(-3.0, 0.0)),
            Vertex::new(-2.0, 0.0),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            nearest_boundary_point(circle, &Vertex::new(0.0, -5.0)),
            Vertex::new(0.0, -2.0),
            epsilon = 1e-12
        );
        let s = 2.0_f64.sqrt();
        assert_abs_diff_eq!(
            nearest_boundary_point(circle, &Vertex::new(3.0, 3.0)),
            Vertex::new(s, s),
            epsilon = 1e-12
        );

        let wide = Axes {
            center: Vertex::new(0.0, 0.0),
            a: 4.0,
            b: 1.0,
        };
        assert_abs_diff_eq!(
            nearest_boundary_point(wide, &Vertex::new(0.0, 0.0)),
            Vertex::new(4.0, 0.0)
        );
    }

    #[test]
    fn aligned_tangents() {
        let first = circle(0.0, 0.0, 1.0);
        let second = circle(0.0, 5.0, 1.0);
        let [left, right] = common_tangent_points(first, second).unwrap();
        assert_eq!(left, (Vertex::new(-1.0, 0.0), Vertex::new(-1.0, 5.0)));
        assert_eq!(right, (Vertex::new(1.0, 0.0), Vertex::new(1.0, 5.0)));

        let second = circle(5.0, 0.0, 1.0);
        let [left, right] = common_tangent_points(first, second).unwrap();
        assert_eq!(left, (Vertex::new(0.0, 1.0), Vertex::new(5.0, 1.0)));
        assert_eq!(right, (Vertex::new(0.0, -1.0), Vertex::new(5.0, -1.0)));
    }

    #[test]
    fn tangents_of_different_circles() {
        let first = circle(0.0, 0.0, 1.0);
        let second = circle(3.0, 3.0, 2.0);
        let pairs = common_tangent_points(first, second).unwrap();
        for (p, q) in pairs {
            assert_tangent(first, p, q);
            assert_tangent(second, q, p);
        }
        assert!(side(first.center, second.center, pairs[0].0) > 0.0);
        assert!(side(first.center, second.center, pairs[1].0) < 0.0);
    }

    #[test]
    fn tangents_of_equal_circles() {
        let first = circle(0.0, 0.0, 1.0);
        let second = circle(4.0, 4.0, 1.0);
        let [(p1, q1), (p2, q2)] = common_tangent_points(first, second).unwrap();
        let h = 0.5_f64.sqrt();
        assert_abs_diff_eq!(p1, Vertex::new(-h, h), epsilon = 1e-12);
        assert_abs_diff_eq!(q1, Vertex::new(4.0 - h, 4.0 + h), epsilon = 1e-12);
        assert_abs_diff_eq!(p2, Vertex::new(h, -h), epsilon = 1e-12);
        assert_abs_diff_eq!(q2, Vertex::new(4.0 + h, 4.0 - h), epsilon = 1e-12);
    }

    #[test]
    fn nested_circles_have_no_tangents() {
        let outer = circle(0.0, 0.0, 5.0);
        let inner = circle(1.0, 1.0, 1.0);
        assert!(common_tangent_points(outer, inner).is_err());
        assert!(common_tangent_points(outer, outer).is_err());
    }

    #[test]
    fn inputs_are_rounded() {
        let first = circle(0.0, 0.0, 1.0);
        let second = circle(0.000_000_1, 5.0, 1.0);
        // The centers become vertically aligned after rounding.
        let [left, _] = common_tangent_points(first, second).unwrap();
        assert_eq!(left.1, Vertex::new(-1.0, 5.0));
    }
}
