//! Coordinate pair used as the building block of all shapes.

use approx::{AbsDiffEq, RelativeEq};
use serde::{Deserialize, Serialize};

use crate::cartesian::{CartesianPoint2d, CartesianPoint2dFloat};
use crate::geodesy::{default_geodesy, Geodesy};
use crate::units::{planar_length, to_shape_length, DistanceUnit, GeographyUnit};

/// A 2d position. Vertices are plain values: every operation returns a new vertex.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// X coordinate (longitude for decimal degree shapes).
    pub x: f64,
    /// Y coordinate (latitude for decimal degree shapes).
    pub y: f64,
}

impl Vertex {
    /// Creates a new vertex.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance to `other` in `distance_unit`, given the shape coordinates are in `shape_unit`.
    pub fn distance_to(&self, other: &Vertex, shape_unit: GeographyUnit, distance_unit: DistanceUnit) -> f64 {
        if shape_unit.is_decimal_degree() {
            default_geodesy().distance(*self, *other, distance_unit)
        } else {
            planar_length(self.distance(other), shape_unit, distance_unit)
        }
    }

    /// Moves the vertex by `x_offset` and `y_offset` given in `distance_unit`.
    ///
    /// For decimal degree shapes the offsets are converted to longitude and latitude differences at the current
    /// position of the vertex.
    pub fn translate_by_offset(
        &self,
        x_offset: f64,
        y_offset: f64,
        shape_unit: GeographyUnit,
        distance_unit: DistanceUnit,
    ) -> Vertex {
        if shape_unit.is_decimal_degree() {
            let geodesy = default_geodesy();
            let dx = geodesy.longitude_difference_from_distance(x_offset, distance_unit, self.y);
            let dy = geodesy.latitude_difference_from_distance(y_offset, distance_unit, self.x);
            Vertex::new(self.x + dx, self.y + dy)
        } else {
            Vertex::new(
                self.x + to_shape_length(x_offset, distance_unit, shape_unit),
                self.y + to_shape_length(y_offset, distance_unit, shape_unit),
            )
        }
    }

    /// Moves the vertex by `distance` along the compass `bearing` in degrees (0 is north, 90 is east).
    pub fn translate_by_degree(
        &self,
        distance: f64,
        bearing: f64,
        shape_unit: GeographyUnit,
        distance_unit: DistanceUnit,
    ) -> Vertex {
        if shape_unit.is_decimal_degree() {
            default_geodesy().destination(*self, distance, distance_unit, bearing)
        } else {
            let distance = to_shape_length(distance, distance_unit, shape_unit);
            let radians = bearing.to_radians();
            Vertex::new(
                self.x + distance * radians.sin(),
                self.y + distance * radians.cos(),
            )
        }
    }

    /// Rotates the vertex counterclockwise around `pivot` by `angle` degrees.
    pub fn rotate(&self, pivot: &Vertex, angle: f64) -> Vertex {
        let dx = self.x - pivot.x;
        let dy = self.y - pivot.y;
        let radius = dx.hypot(dy);
        if radius == 0.0 {
            return *self;
        }

        let current = dy.atan2(dx);
        let rotated = current + angle.to_radians();

        Vertex::new(
            pivot.x + radius * rotated.cos(),
            pivot.y + radius * rotated.sin(),
        )
    }

    /// Moves the vertex away from (factor above 1) or towards (factor below 1) `center`.
    pub fn scale_about(&self, center: &Vertex, factor: f64) -> Vertex {
        Vertex::new(
            center.x + (self.x - center.x) * factor,
            center.y + (self.y - center.y) * factor,
        )
    }

    /// Linear interpolation between `self` (at 0) and `other` (at 1).
    pub fn lerp(&self, other: &Vertex, fraction: f64) -> Vertex {
        Vertex::new(
            self.x + (other.x - self.x) * fraction,
            self.y + (other.y - self.y) * fraction,
        )
    }

    /// Returns true if both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl CartesianPoint2d for Vertex {
    type Num = f64;

    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }
}

impl From<(f64, f64)> for Vertex {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<[f64; 2]> for Vertex {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl AbsDiffEq for Vertex {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon) && self.y.abs_diff_eq(&other.y, epsilon)
    }
}

impl RelativeEq for Vertex {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        self.x.relative_eq(&other.x, epsilon, max_relative) && self.y.relative_eq(&other.y, epsilon, max_relative)
    }
}
