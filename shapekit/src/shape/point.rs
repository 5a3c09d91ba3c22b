use serde::{Deserialize, Serialize};

use crate::cartesian::CartesianPoint2d;
use crate::error::{ShapeError, ShapeResult};
use crate::shape::{BaseShape, PointFamily, Shape, ShapeRef, Tag};
use crate::vertex::Vertex;

/// A single position with an optional z value.
///
/// The z value is stored and written to well-known text and binary, but no algorithm uses it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointShape {
    #[serde(default = "crate::shape::new_shape_id")]
    id: String,
    #[serde(skip)]
    tag: Option<Tag>,
    x: f64,
    y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    z: Option<f64>,
}

impl PointShape {
    /// Creates a new 2d point.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            id: crate::shape::new_shape_id(),
            tag: None,
            x,
            y,
            z: None,
        }
    }

    /// Creates a new point with a z value.
    pub fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self {
            z: Some(z),
            ..Self::new(x, y)
        }
    }

    /// Creates a 2d point at the vertex position.
    pub fn from_vertex(vertex: Vertex) -> Self {
        Self::new(vertex.x, vertex.y)
    }

    /// Position of the point.
    pub fn to_vertex(&self) -> Vertex {
        Vertex::new(self.x, self.y)
    }

    /// X coordinate.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y coordinate.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Z value, if the point has one.
    pub fn z(&self) -> Option<f64> {
        self.z
    }

    /// Sets x coordinate.
    pub fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    /// Sets y coordinate.
    pub fn set_y(&mut self, y: f64) {
        self.y = y;
    }

    /// Sets or removes the z value.
    pub fn set_z(&mut self, z: Option<f64>) {
        self.z = z;
    }
}

impl BaseShape for PointShape {
    identity_accessors!();

    fn as_shape_ref(&self) -> ShapeRef<'_> {
        ShapeRef::Point(self)
    }

    fn map_vertices(&mut self, f: &mut dyn FnMut(Vertex) -> Vertex) {
        let Vertex { x, y } = f(self.to_vertex());
        self.x = x;
        self.y = y;
    }

    fn from_shape(shape: Shape) -> ShapeResult<Self> {
        match shape {
            Shape::Point(point) => Ok(point),
            Shape::Multipoint(multipoint) if multipoint.points().len() == 1 => {
                Ok(multipoint.into_points().remove(0))
            }
            other => Err(ShapeError::TypeMismatch {
                expected: "Point",
                actual: other.shape_type(),
            }),
        }
    }
}

impl PointFamily for PointShape {
    fn points(&self) -> Vec<PointShape> {
        vec![self.clone()]
    }
}

impl CartesianPoint2d for PointShape {
    type Num = f64;

    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }
}

impl From<PointShape> for Vertex {
    fn from(value: PointShape) -> Self {
        value.to_vertex()
    }
}

impl From<&PointShape> for Vertex {
    fn from(value: &PointShape) -> Self {
        value.to_vertex()
    }
}

impl From<Vertex> for PointShape {
    fn from(value: Vertex) -> Self {
        Self::from_vertex(value)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::shape::{LineShape, MultipointShape, ShapeType};
    use crate::units::{DistanceUnit, GeographyUnit};

    #[test]
    fn accessors() {
        let mut point = PointShape::with_z(1.0, 2.0, 3.0);
        assert_eq!(point.x(), 1.0);
        assert_eq!(point.y(), 2.0);
        assert_eq!(point.z(), Some(3.0));
        point.set_z(None);
        assert_eq!(point.z(), None);
        assert_eq!(point.to_vertex(), Vertex::new(1.0, 2.0));
        assert_eq!(point.shape_type(), ShapeType::Point);
    }

    #[test]
    fn from_other_shapes() {
        let single = MultipointShape::new(vec![PointShape::new(1.0, 1.0)]);
        let point = PointShape::from_shape(single.into()).expect("single point");
        assert_eq!(point.to_vertex(), Vertex::new(1.0, 1.0));

        let line = LineShape::new(vec![Vertex::new(0.0, 0.0), Vertex::new(1.0, 1.0)]);
        assert_matches!(
            PointShape::from_shape(line.into()),
            Err(ShapeError::TypeMismatch {
                expected: "Point",
                actual: ShapeType::Line
            })
        );
    }

    #[test]
    fn translate() {
        let mut point = PointShape::new(1.0, 1.0);
        point
            .translate_by_offset(1.0, -2.0, GeographyUnit::Meter, DistanceUnit::Meter)
            .expect("valid offsets");
        assert_eq!(point.to_vertex(), Vertex::new(2.0, -1.0));
    }

    #[test]
    fn scale_is_noop() {
        let mut point = PointShape::new(3.0, 4.0);
        point.scale_up(50.0).expect("valid percentage");
        assert_eq!(point.to_vertex(), Vertex::new(3.0, 4.0));
    }

    #[test]
    fn load_keeps_identity() {
        let mut point = PointShape::new(0.0, 0.0);
        point.set_tag(Some(Tag::new("label")));
        let id = point.id().to_owned();

        point.load_from_wkt("POINT(5 6)").expect("valid wkt");
        assert_eq!(point.to_vertex(), Vertex::new(5.0, 6.0));
        assert_eq!(point.id(), id);
        assert_eq!(point.tag().and_then(|t| t.downcast_ref::<&str>()), Some(&"label"));
    }
}
