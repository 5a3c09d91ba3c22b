//! Planar primitives shared by the shape algorithms: the point trait, line segments and contours.

mod contour;
mod point;
mod segment;

pub use contour::{Contour, ContourPointsIterator, ContourSegmentIterator, Winding};
pub use point::{CartesianPoint2d, CartesianPoint2dFloat};
pub use segment::{Orientation, Segment};

pub(crate) use contour::{point_in_ring, RingPosition};

/// Distance under which a point is considered to lie on a segment.
pub const POINT_ON_SEGMENT_TOLERANCE: f64 = 10E-5;

/// Distance under which two vertices are considered to be the same vertex.
pub const COINCIDENT_VERTEX_TOLERANCE: f64 = 1e-8;
