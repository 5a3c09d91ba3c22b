use num_traits::{One, Zero};

use crate::cartesian::{CartesianPoint2d, CartesianPoint2dFloat, COINCIDENT_VERTEX_TOLERANCE};
use crate::vertex::Vertex;

/// Orientation of an ordered triplet of points.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Orientation {
    /// The points lie on one line.
    Collinear,
    /// The points turn clockwise.
    Clockwise,
    /// The points turn counterclockwise.
    Counterclockwise,
}

impl Orientation {
    /// Orientation of the triplet `p`, `q`, `r`.
    ///
    /// Non-comparable coordinates (NaN) are reported as [`Orientation::Collinear`].
    pub fn triplet<N, P>(p: &P, q: &P, r: &P) -> Self
    where
        N: num_traits::Num + Copy + PartialOrd,
        P: CartesianPoint2d<Num = N>,
    {
        orientation(p, q, r)
    }
}

/// A straight line segment between two points.
#[derive(Debug)]
pub struct Segment<'a, P>(pub &'a P, pub &'a P);

impl<P> Clone for Segment<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Segment<'_, P> {}

impl<P: CartesianPoint2d> Segment<'_, P> {
    /// Squared distance from the segment to the point.
    pub fn distance_to_point_sq<Point: CartesianPoint2d<Num = P::Num>>(&self, point: &Point) -> P::Num {
        if self.0.equal(self.1) {
            return point.distance_sq(self.0);
        }

        let ds = self.1.sub(self.0);
        let dp = point.sub(self.0);
        let ds_len = ds.x * ds.x + ds.y * ds.y;

        let r = (dp.x * ds.x + dp.y * ds.y) / ds_len;
        if r <= P::Num::zero() {
            point.distance_sq(self.0)
        } else if r >= P::Num::one() {
            point.distance_sq(self.1)
        } else {
            let s = (dp.y * ds.x - dp.x * ds.y) / ds_len;
            s * s * ds_len
        }
    }

    /// Returns true if the segments share at least one point, including touching endpoints.
    pub fn intersects(&self, other: &Segment<'_, impl CartesianPoint2d<Num = P::Num>>) -> bool {
        let o1 = orientation(self.0, self.1, other.0);
        let o2 = orientation(self.0, self.1, other.1);
        let o3 = orientation(other.0, other.1, self.0);
        let o4 = orientation(other.0, other.1, self.1);

        if o1 != o2 && o3 != o4 {
            return true;
        }

        (o1 == Orientation::Collinear && on_segment(self.0, other.0, self.1))
            || (o2 == Orientation::Collinear && on_segment(self.0, other.1, self.1))
            || (o3 == Orientation::Collinear && on_segment(other.0, self.0, other.1))
            || (o4 == Orientation::Collinear && on_segment(other.0, self.1, other.1))
    }
}

impl<P: CartesianPoint2d<Num = f64>> Segment<'_, P> {
    /// Euclidean length.
    pub fn length(&self) -> f64 {
        self.0.distance(self.1)
    }

    /// Point of the segment closest to `point`.
    ///
    /// The point is projected onto the line through the segment and the projection is clamped to the segment
    /// extent. Vertical and horizontal segments are handled without computing a slope.
    pub fn closest_point(&self, point: &impl CartesianPoint2d<Num = f64>) -> Vertex {
        let (x1, y1) = (self.0.x(), self.0.y());
        let (x2, y2) = (self.1.x(), self.1.y());

        if self.0.is_near(self.1, COINCIDENT_VERTEX_TOLERANCE) {
            return Vertex::new(x1, y1);
        }

        if x1 == x2 {
            return Vertex::new(x1, point.y().clamp(y1.min(y2), y1.max(y2)));
        }

        if y1 == y2 {
            return Vertex::new(point.x().clamp(x1.min(x2), x1.max(x2)), y1);
        }

        let slope = (y2 - y1) / (x2 - x1);
        let x = (slope * slope * x1 + slope * (point.y() - y1) + point.x()) / (slope * slope + 1.0);
        let x = x.clamp(x1.min(x2), x1.max(x2));

        Vertex::new(x, y1 + slope * (x - x1))
    }

    /// Returns true if `point` is closer to the segment than `tolerance`.
    pub fn contains_point(&self, point: &impl CartesianPoint2d<Num = f64>, tolerance: f64) -> bool {
        self.distance_to_point_sq(point) <= tolerance * tolerance
    }
}

fn orientation<N: num_traits::Num + Copy + PartialOrd>(
    p: &impl CartesianPoint2d<Num = N>,
    q: &impl CartesianPoint2d<Num = N>,
    r: &impl CartesianPoint2d<Num = N>,
) -> Orientation {
    let val = (q.y() - p.y()) * (r.x() - q.x()) - (q.x() - p.x()) * (r.y() - q.y());
    match val.partial_cmp(&N::zero()) {
        Some(std::cmp::Ordering::Greater) => Orientation::Clockwise,
        Some(std::cmp::Ordering::Less) => Orientation::Counterclockwise,
        _ => Orientation::Collinear,
    }
}

/// Checks if `q` lies in the bounding box of `p` and `r`.
fn on_segment<N: PartialOrd + Copy>(
    p: &impl CartesianPoint2d<Num = N>,
    q: &impl CartesianPoint2d<Num = N>,
    r: &impl CartesianPoint2d<Num = N>,
) -> bool {
    let (x_min, x_max) = min_max(p.x(), r.x());
    let (y_min, y_max) = min_max(p.y(), r.y());
    q.x() >= x_min && q.x() <= x_max && q.y() >= y_min && q.y() <= y_max
}

fn min_max<N: PartialOrd>(a: N, b: N) -> (N, N) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
