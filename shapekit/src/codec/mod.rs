//! Well-known text and well-known binary encodings of shapes.
//!
//! Rings, rectangles and ellipses have no counterpart in these formats and are written as polygons. Decoding always
//! produces the standard variants: [`crate::shape::PointShape`], [`crate::shape::LineShape`],
//! [`crate::shape::PolygonShape`] and their multi versions.

pub mod wkb;
pub mod wkt;
