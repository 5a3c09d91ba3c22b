use bytes::Bytes;

use crate::codec::wkb::ByteOrder;
use crate::codec::{wkb, wkt};
use crate::error::{ShapeError, ShapeResult};
use crate::kernel::{default_kernel, BufferCapStyle, GeometryKernel, SpatialRelation};
use crate::shape::{
    LineShape, MultipolygonShape, PointShape, RectangleShape, Shape, ShapeRef, ShapeType, ShapeValidationResult,
    Tag, ValidationMode, WellKnownType,
};
use crate::units::{DistanceUnit, GeographyUnit};
use crate::vertex::Vertex;
use crate::{distance, transform};

/// Operations common to all shapes.
///
/// Implementors provide identity accessors, a borrowed [`ShapeRef`] view and a vertex visitor; everything else is
/// derived from those.
pub trait BaseShape {
    /// Unique id of the shape.
    fn id(&self) -> &str;

    /// Replaces the id.
    fn set_id(&mut self, id: String);

    /// User value attached to the shape.
    fn tag(&self) -> Option<&Tag>;

    /// Replaces the attached user value.
    fn set_tag(&mut self, tag: Option<Tag>);

    /// Borrowed view of the shape.
    fn as_shape_ref(&self) -> ShapeRef<'_>;

    /// Replaces every vertex of the shape with `f(vertex)`, recursing into rings, holes and members.
    ///
    /// Rectangles keep their corners ordered and ellipses only move their center.
    fn map_vertices(&mut self, f: &mut dyn FnMut(Vertex) -> Vertex);

    /// Converts a shape of another variant into this one, if the conversion keeps the geometry.
    fn from_shape(shape: Shape) -> ShapeResult<Self>
    where
        Self: Sized;

    /// Variant of the shape.
    fn shape_type(&self) -> ShapeType {
        self.as_shape_ref().shape_type()
    }

    /// Type the shape is written as.
    fn well_known_type(&self) -> WellKnownType {
        self.shape_type().well_known_type()
    }

    /// Whether [`BaseShape::rotate`] is supported.
    fn can_rotate(&self) -> bool {
        self.shape_type().can_rotate()
    }

    /// Owned copy of the shape as a [`Shape`].
    fn to_shape(&self) -> Shape {
        self.as_shape_ref().to_shape()
    }

    /// Checks the structure of the shape.
    fn validate(&self, mode: ValidationMode) -> ShapeValidationResult {
        crate::shape::validate(self.as_shape_ref(), mode)
    }

    /// Smallest rectangle containing the shape.
    fn bounding_box(&self) -> ShapeResult<RectangleShape> {
        RectangleShape::from_vertices(&self.as_shape_ref().vertices())
            .ok_or_else(|| ShapeError::InvalidShape("bounding box of an empty shape".into()))
    }

    /// Center of the bounding box.
    fn center_point(&self) -> ShapeResult<PointShape> {
        Ok(self.bounding_box()?.center())
    }

    /// Well-known text representation.
    fn to_wkt(&self) -> String {
        wkt::write(self.as_shape_ref())
    }

    /// Well-known binary representation.
    fn to_wkb(&self, byte_order: ByteOrder) -> Bytes {
        wkb::write(self.as_shape_ref(), byte_order)
    }

    /// Replaces the geometry of the shape with the parsed one, keeping the id and tag.
    fn load_from_wkt(&mut self, wkt: &str) -> ShapeResult<()>
    where
        Self: Sized,
    {
        let loaded = Self::from_shape(Shape::from_wkt(wkt)?)?;
        replace_geometry(self, loaded);
        Ok(())
    }

    /// Replaces the geometry of the shape with the decoded one, keeping the id and tag.
    fn load_from_wkb(&mut self, wkb: &[u8]) -> ShapeResult<()>
    where
        Self: Sized,
    {
        let shape = Shape::from_wkb(wkb)?.ok_or_else(|| ShapeError::invalid_argument("wkb", "buffer is empty"))?;
        let loaded = Self::from_shape(shape)?;
        replace_geometry(self, loaded);
        Ok(())
    }

    /// Structural copy of the shape, including id and tag.
    fn clone_deep(&self) -> Self
    where
        Self: Sized + Clone,
    {
        self.clone()
    }

    /// Copy made by writing the shape to well-known text and parsing it back. The copy gets a new id and no tag.
    fn clone_via_wkt(&self) -> ShapeResult<Self>
    where
        Self: Sized,
    {
        Self::from_shape(Shape::from_wkt(&self.to_wkt())?)
    }

    /// Tests the spatial relation of the shapes using the default kernel.
    fn relate(&self, other: &impl BaseShape, relation: SpatialRelation) -> ShapeResult<bool> {
        self.relate_with(other, relation, default_kernel())
    }

    /// Tests the spatial relation of the shapes. Rectangles and ellipses answer simple cases without the kernel.
    fn relate_with(
        &self,
        other: &impl BaseShape,
        relation: SpatialRelation,
        kernel: &dyn GeometryKernel,
    ) -> ShapeResult<bool> {
        crate::kernel::relate_shapes(self.as_shape_ref(), other.as_shape_ref(), relation, kernel)
    }

    /// The shapes have no point in common.
    fn is_disjoint(&self, other: &impl BaseShape) -> ShapeResult<bool> {
        self.relate(other, SpatialRelation::Disjoint)
    }

    /// The shapes have at least one point in common.
    fn intersects(&self, other: &impl BaseShape) -> ShapeResult<bool> {
        self.relate(other, SpatialRelation::Intersects)
    }

    /// The shapes share boundary points but no interior points.
    fn touches(&self, other: &impl BaseShape) -> ShapeResult<bool> {
        self.relate(other, SpatialRelation::Touches)
    }

    /// The shapes share some interior points, and the intersection has lower dimension than the shapes.
    fn crosses(&self, other: &impl BaseShape) -> ShapeResult<bool> {
        self.relate(other, SpatialRelation::Crosses)
    }

    /// The shape lies in the interior or on the boundary of `other`.
    fn is_within(&self, other: &impl BaseShape) -> ShapeResult<bool> {
        self.relate(other, SpatialRelation::Within)
    }

    /// `other` lies in the interior or on the boundary of the shape.
    fn contains(&self, other: &impl BaseShape) -> ShapeResult<bool> {
        self.relate(other, SpatialRelation::Contains)
    }

    /// The shapes share some but not all interior points, and the intersection has the same dimension as the shapes.
    fn overlaps(&self, other: &impl BaseShape) -> ShapeResult<bool> {
        self.relate(other, SpatialRelation::Overlaps)
    }

    /// The shapes cover the same set of points.
    fn is_topologically_equal(&self, other: &impl BaseShape) -> ShapeResult<bool> {
        self.relate(other, SpatialRelation::TopologicallyEqual)
    }

    /// Distance between the closest points of the shapes. Zero if the shapes intersect.
    fn distance_to(
        &self,
        other: &impl BaseShape,
        shape_unit: GeographyUnit,
        distance_unit: DistanceUnit,
    ) -> ShapeResult<f64> {
        self.distance_to_with(other, shape_unit, distance_unit, default_kernel())
    }

    /// Same as [`BaseShape::distance_to`], using the given kernel to test for intersection.
    fn distance_to_with(
        &self,
        other: &impl BaseShape,
        shape_unit: GeographyUnit,
        distance_unit: DistanceUnit,
        kernel: &dyn GeometryKernel,
    ) -> ShapeResult<f64> {
        distance::distance(
            self.as_shape_ref(),
            other.as_shape_ref(),
            shape_unit,
            distance_unit,
            kernel,
        )
    }

    /// Point of this shape closest to `other`, or `None` if the shapes intersect.
    fn closest_point_to(&self, other: &impl BaseShape, shape_unit: GeographyUnit) -> ShapeResult<Option<PointShape>> {
        let pair = distance::closest_pair(self.as_shape_ref(), other.as_shape_ref(), shape_unit, default_kernel())?;
        Ok(pair.map(|(from, _)| PointShape::from_vertex(from)))
    }

    /// Line between the closest points of the shapes, or `None` if the shapes intersect.
    fn shortest_line_to(&self, other: &impl BaseShape, shape_unit: GeographyUnit) -> ShapeResult<Option<LineShape>> {
        let pair = distance::closest_pair(self.as_shape_ref(), other.as_shape_ref(), shape_unit, default_kernel())?;
        Ok(pair.map(|(from, to)| LineShape::new(vec![from, to])))
    }

    /// Returns true if the shapes are not further than `distance` from each other.
    fn is_within_distance_of(
        &self,
        other: &impl BaseShape,
        distance: f64,
        shape_unit: GeographyUnit,
        distance_unit: DistanceUnit,
    ) -> ShapeResult<bool> {
        crate::error::ensure_finite("distance", distance)?;
        Ok(self.distance_to(other, shape_unit, distance_unit)? <= distance)
    }

    /// Moves the shape by the given offsets along the axes.
    fn translate_by_offset(
        &mut self,
        x_offset: f64,
        y_offset: f64,
        shape_unit: GeographyUnit,
        distance_unit: DistanceUnit,
    ) -> ShapeResult<()> {
        transform::translate_by_offset(self, x_offset, y_offset, shape_unit, distance_unit)
    }

    /// Moves the shape by `distance` along the compass `angle` (degrees in `[0, 360]`, 0 is north).
    fn translate_by_degree(
        &mut self,
        distance: f64,
        angle: f64,
        shape_unit: GeographyUnit,
        distance_unit: DistanceUnit,
    ) -> ShapeResult<()> {
        transform::translate_by_degree(self, distance, angle, shape_unit, distance_unit)
    }

    /// Rotates the shape counterclockwise around `pivot` by `angle` degrees in `[0, 360]`.
    ///
    /// Fails with [`ShapeError::NotSupported`] for shapes that cannot be rotated.
    fn rotate(&mut self, pivot: &PointShape, angle: f64) -> ShapeResult<()> {
        transform::rotate(self, pivot.to_vertex(), angle)
    }

    /// Scales the shape about the average of its distinct vertices.
    fn scale_by(&mut self, factor: f64) {
        transform::scale_about_centroid(self, factor)
    }

    /// Copy of the shape re-expressed relative to a new anchor.
    ///
    /// Every vertex is taken as an offset from `from_point` measured in `from_unit`, converted into `to_unit`
    /// and applied to `to_point`.
    fn register(
        &self,
        from_point: &PointShape,
        to_point: &PointShape,
        from_unit: DistanceUnit,
        to_unit: GeographyUnit,
    ) -> ShapeResult<Self>
    where
        Self: Sized + Clone,
    {
        self.validate(ValidationMode::Simple).into_result()?;
        let from = from_point.to_vertex();
        let to = to_point.to_vertex();
        let mut registered = self.clone();
        registered.map_vertices(&mut |v| transform::register_vertex(v, from, to, from_unit, to_unit));
        Ok(registered)
    }

    /// Area within `distance` of the shape, using the default buffer settings.
    fn buffer(
        &self,
        distance: f64,
        shape_unit: GeographyUnit,
        distance_unit: DistanceUnit,
    ) -> ShapeResult<MultipolygonShape> {
        let kernel = default_kernel();
        let config = kernel.config();
        self.buffer_with(
            distance,
            config.buffer_quadrant_segments,
            config.buffer_cap_style,
            shape_unit,
            distance_unit,
            kernel,
        )
    }

    /// Area within `distance` of the shape. Negative distances shrink areas.
    fn buffer_with(
        &self,
        distance: f64,
        quadrant_segments: u32,
        cap_style: BufferCapStyle,
        shape_unit: GeographyUnit,
        distance_unit: DistanceUnit,
        kernel: &dyn GeometryKernel,
    ) -> ShapeResult<MultipolygonShape> {
        crate::error::ensure_finite("distance", distance)?;
        crate::config::validate_quadrant_segments(quadrant_segments)?;
        self.validate(ValidationMode::Simple).into_result()?;

        let distance = transform::to_shape_distance(distance, distance_unit, shape_unit);
        let geometry = crate::kernel::to_geometry(self.as_shape_ref());
        let buffered = kernel.buffer(&geometry, distance, quadrant_segments, cap_style)?;
        crate::kernel::to_multipolygon(buffered)
    }
}

fn replace_geometry<S: BaseShape>(target: &mut S, mut loaded: S) {
    loaded.set_id(target.id().to_owned());
    loaded.set_tag(target.tag().cloned());
    *target = loaded;
}
