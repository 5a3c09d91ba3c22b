//! 2d vector shapes and the algorithms working on them.
//!
//! The crate provides nine shape variants ([`PointShape`], [`MultipointShape`], [`LineShape`], [`MultilineShape`],
//! [`RingShape`], [`PolygonShape`], [`MultipolygonShape`], [`RectangleShape`] and [`EllipseShape`]) with:
//!
//! * distance and closest point queries between any two shapes,
//! * affine transforms (translation, rotation, scaling) and registration to another anchor,
//! * dynamic segmentation of lines by distance or percentage of length,
//! * analytic algorithms for ellipses,
//! * well-known text and binary encodings,
//! * spatial predicates and overlay operations through a [`GeometryKernel`].
//!
//! Coordinates of a shape are interpreted in a [`GeographyUnit`]. Shapes in decimal degrees are measured on the
//! sphere through a [`Geodesy`] implementation, all others are planar.
//!
//! ```
//! use shapekit::{BaseShape, DistanceUnit, GeographyUnit, LineShape, Shape, StartingPoint};
//!
//! let Shape::Line(line) = Shape::from_wkt("LINESTRING(0 0, 10 0)")? else {
//!     unreachable!()
//! };
//! let middle = line.get_point_on_a_line_by_percentage(StartingPoint::FirstPoint, 50.0, GeographyUnit::Meter)?;
//! assert_eq!(middle.to_wkt(), "POINT(5 0)");
//!
//! let point = shapekit::PointShape::new(5.0, 3.0);
//! let distance = line.distance_to(&point, GeographyUnit::Meter, DistanceUnit::Meter)?;
//! assert_eq!(distance, 3.0);
//! # Ok::<(), shapekit::ShapeError>(())
//! ```

pub mod cartesian;
pub mod codec;
pub mod config;
mod distance;
pub mod error;
pub mod feature;
pub mod geodesy;
pub mod kernel;
pub mod segmentation;
pub mod shape;
mod transform;
pub mod units;
pub mod vertex;

pub use codec::wkb::ByteOrder;
pub use config::KernelConfig;
pub use error::{ShapeError, ShapeResult};
pub use feature::{Attributes, Feature, ReturningColumns};
pub use geodesy::{Geodesy, HaversineGeodesy};
pub use kernel::{BufferCapStyle, GeoKernel, GeometryKernel, SimplificationType, SpatialRelation};
pub use segmentation::StartingPoint;
pub use shape::{
    AnyAreaShape, AnyLineShape, AnyPointShape, AreaShape, BaseShape, EllipseShape, LineShape, LinearShape,
    MultilineShape, MultipointShape, MultipolygonShape, PointFamily, PointShape, PolygonShape, RectangleShape,
    RingShape, Shape, ShapeRef, ShapeType, ShapeValidationResult, Tag, ValidationMode, WellKnownType,
};
pub use units::{AreaUnit, DistanceUnit, GeographyUnit};
pub use vertex::Vertex;
