//! Planar geometry kernel: set operations, buffers, hulls, simplification and spatial predicates.
//!
//! The shapes talk to the kernel through the [`GeometryKernel`] trait over [`geo_types`] geometries, so any
//! conforming implementation can be plugged in with the `*_with` methods of the shape traits. [`GeoKernel`] is the
//! default implementation built on the `geo` crate.

use geo_types::Geometry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod buffer;
mod convert;
mod geo_kernel;
mod relate;

pub use geo_kernel::GeoKernel;

pub(crate) use convert::{to_geometry, to_multiline, to_multipolygon, to_ring};
pub(crate) use relate::relate_shapes;

use crate::config::KernelConfig;

/// Spatial relation between two shapes, as defined by the OGC simple features model.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpatialRelation {
    /// No point in common.
    Disjoint,
    /// At least one point in common.
    Intersects,
    /// Common boundary points, but no common interior points.
    Touches,
    /// Common interior points of lower dimension than the shapes.
    Crosses,
    /// The first shape lies inside the second one.
    Within,
    /// The second shape lies inside the first one.
    Contains,
    /// Common interior points of the same dimension as the shapes, neither shape containing the other.
    Overlaps,
    /// Both shapes cover the same points.
    TopologicallyEqual,
}

impl SpatialRelation {
    /// The relation with the operands swapped.
    pub fn converse(self) -> Self {
        match self {
            Self::Within => Self::Contains,
            Self::Contains => Self::Within,
            other => other,
        }
    }
}

/// Shape of the ends of buffered lines.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BufferCapStyle {
    /// Half circle around the end point.
    #[default]
    Round,
    /// The buffer extends past the end point by the buffer distance.
    Square,
    /// The buffer ends at the end point.
    Butt,
}

/// Line simplification algorithm.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimplificationType {
    /// Ramer–Douglas–Peucker. Fast, but can produce self-intersections.
    #[default]
    DouglasPeucker,
    /// Visvalingam-Whyatt preserving topology: rings and lines never start to intersect. The tolerance is the
    /// smallest area of the triangle formed by a vertex and its neighbours that keeps the vertex.
    TopologyPreserving,
}

/// Error reported by a [`GeometryKernel`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KernelError {
    /// The input has collapsed parts the algorithm cannot work with, e.g. a zero-area ring.
    #[error("degenerate topology: {0}")]
    DegenerateTopology(String),
    /// The operation is not defined for the geometry kinds.
    #[error("{operation} is not supported for {geometry}")]
    Unsupported {
        /// Operation name.
        operation: &'static str,
        /// Kind of geometry the operation got.
        geometry: &'static str,
    },
    /// The kernel returned a geometry kind the caller cannot use.
    #[error("expected {expected} result, but got {actual}")]
    UnexpectedResult {
        /// Expected geometry kind.
        expected: &'static str,
        /// Returned geometry kind.
        actual: &'static str,
    },
}

/// Result of kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;

/// Planar geometry engine used by the shape operations.
pub trait GeometryKernel {
    /// Tests the relation between `a` and `b`.
    fn relate(&self, a: &Geometry<f64>, b: &Geometry<f64>, relation: SpatialRelation) -> KernelResult<bool>;

    /// Smallest convex polygon containing the geometry.
    fn convex_hull(&self, geometry: &Geometry<f64>) -> KernelResult<Geometry<f64>>;

    /// Points common to both geometries.
    fn intersection(&self, a: &Geometry<f64>, b: &Geometry<f64>) -> KernelResult<Geometry<f64>>;

    /// Points of either geometry.
    fn union(&self, a: &Geometry<f64>, b: &Geometry<f64>) -> KernelResult<Geometry<f64>>;

    /// Union of any number of geometries of the same dimension.
    fn union_all(&self, geometries: &[Geometry<f64>]) -> KernelResult<Geometry<f64>>;

    /// Points of `a` that are not in `b`.
    fn difference(&self, a: &Geometry<f64>, b: &Geometry<f64>) -> KernelResult<Geometry<f64>>;

    /// Points in exactly one of the geometries.
    fn symmetric_difference(&self, a: &Geometry<f64>, b: &Geometry<f64>) -> KernelResult<Geometry<f64>>;

    /// Area within `distance` of the geometry. Negative distances erode areas.
    fn buffer(
        &self,
        geometry: &Geometry<f64>,
        distance: f64,
        quadrant_segments: u32,
        cap_style: BufferCapStyle,
    ) -> KernelResult<Geometry<f64>>;

    /// Simplified copy of the geometry. `None` uses the algorithm configured for the kernel.
    fn simplify(
        &self,
        geometry: &Geometry<f64>,
        tolerance: f64,
        mode: Option<SimplificationType>,
    ) -> KernelResult<Geometry<f64>>;
}

/// Kernel used by shape operations that are not given one explicitly.
pub fn default_kernel() -> &'static GeoKernel {
    static KERNEL: GeoKernel = GeoKernel::new(KernelConfig::DEFAULT);
    &KERNEL
}

/// Human readable kind of the geometry, used in error messages.
pub(crate) fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}
