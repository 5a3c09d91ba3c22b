//! Feature: a shape stored as well-known binary together with an id, a tag and string attributes.

use ahash::{HashMap, HashMapExt};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::codec::wkb::ByteOrder;
use crate::error::{ShapeError, ShapeResult};
use crate::shape::{
    AnyAreaShape, AnyLineShape, AnyPointShape, BaseShape, PointShape, RectangleShape, Shape, Tag, ValidationMode,
    WellKnownType,
};

/// String attributes of a feature. Keys are case-insensitive; the spelling a key was first inserted with is kept.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(from = "HashMap<String, String>", into = "HashMap<String, String>")]
pub struct Attributes {
    entries: HashMap<String, (String, String)>,
}

impl Attributes {
    /// Creates an empty attribute map.
    pub fn new() -> Self {
        Self::default()
    }

    fn normalize(key: &str) -> String {
        key.to_lowercase()
    }

    /// Value of the attribute.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&Self::normalize(key)).map(|(_, value)| value.as_str())
    }

    /// Sets the attribute value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.get_mut(&Self::normalize(&key)) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.insert(Self::normalize(&key), (key, value));
                None
            }
        }
    }

    /// Removes the attribute, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(&Self::normalize(key)).map(|(_, value)| value)
    }

    /// Whether the attribute is set.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&Self::normalize(key))
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Key and value pairs in arbitrary order. Keys are spelled as first inserted.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    fn select(&self, columns: &ReturningColumns) -> Attributes {
        let entries = match columns {
            ReturningColumns::All => self.entries.clone(),
            ReturningColumns::None => HashMap::new(),
            ReturningColumns::Selected(keys) => keys
                .iter()
                .filter_map(|key| {
                    let key = Self::normalize(key);
                    self.entries.get(&key).map(|entry| (key, entry.clone()))
                })
                .collect(),
        };

        Attributes { entries }
    }
}

impl PartialEq for Attributes {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().all(|(key, (_, value))| {
                other
                    .entries
                    .get(key)
                    .is_some_and(|(_, other_value)| value == other_value)
            })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut attributes = Attributes::new();
        for (key, value) in iter {
            attributes.insert(key, value);
        }
        attributes
    }
}

impl From<HashMap<String, String>> for Attributes {
    fn from(value: HashMap<String, String>) -> Self {
        value.into_iter().collect()
    }
}

impl From<Attributes> for HashMap<String, String> {
    fn from(value: Attributes) -> Self {
        value.entries.into_values().collect()
    }
}

/// Attributes copied by [`Feature::clone_deep`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturningColumns {
    /// Every attribute.
    #[default]
    All,
    /// No attributes.
    None,
    /// Only the listed attributes. Keys that are not set are skipped.
    Selected(Vec<String>),
}

/// Shape stored as well-known binary together with identity and attributes.
///
/// The binary is decoded every time the shape is requested, so every [`Feature::get_shape`] call returns an
/// independent shape that can be modified freely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default = "crate::shape::new_shape_id")]
    id: String,
    wkb: Bytes,
    #[serde(skip)]
    tag: Option<Tag>,
    #[serde(default)]
    attributes: Attributes,
}

impl Feature {
    /// Feature of the shape, taking over its id and tag.
    pub fn from_shape(shape: &impl BaseShape) -> Self {
        Self {
            id: shape.id().to_owned(),
            wkb: shape.to_wkb(ByteOrder::default()),
            tag: shape.tag().cloned(),
            attributes: Attributes::new(),
        }
    }

    /// Feature of the shape given as well-known text.
    pub fn from_wkt(wkt: &str) -> ShapeResult<Self> {
        Ok(Self::from_shape(&Shape::from_wkt(wkt)?))
    }

    /// Feature over the well-known binary. The buffer is checked to decode and is stored as is.
    pub fn from_wkb(wkb: impl Into<Bytes>) -> ShapeResult<Self> {
        let wkb = wkb.into();
        if Shape::from_wkb(&wkb)?.is_none() {
            return Err(ShapeError::invalid_argument("wkb", "buffer is empty"));
        }

        Ok(Self {
            id: crate::shape::new_shape_id(),
            wkb,
            tag: None,
            attributes: Attributes::new(),
        })
    }

    /// Point feature.
    pub fn from_xy(x: f64, y: f64) -> Self {
        Self::from_shape(&PointShape::new(x, y))
    }

    /// Replaces the id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Replaces the tag.
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Sets an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key, value);
        self
    }

    /// Replaces all attributes.
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Id of the feature.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// User value attached to the feature.
    pub fn tag(&self) -> Option<&Tag> {
        self.tag.as_ref()
    }

    /// Attributes of the feature.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Stored well-known binary.
    pub fn wkb(&self) -> &Bytes {
        &self.wkb
    }

    /// Decodes the shape. The shape gets the id and the tag of the feature.
    pub fn get_shape(&self) -> ShapeResult<Shape> {
        let mut shape = Shape::from_wkb(&self.wkb)?
            .ok_or_else(|| ShapeError::invalid_argument("wkb", "buffer is empty"))?;
        shape.set_id(self.id.clone());
        shape.set_tag(self.tag.clone());
        Ok(shape)
    }

    /// Decodes the shape, failing with [`ShapeError::TypeMismatch`] if it does not enclose an area.
    pub fn get_area_shape(&self) -> ShapeResult<AnyAreaShape> {
        AnyAreaShape::try_from(self.get_shape()?)
    }

    /// Decodes the shape, failing with [`ShapeError::TypeMismatch`] if it is not a line or a multiline.
    pub fn get_line_shape(&self) -> ShapeResult<AnyLineShape> {
        AnyLineShape::try_from(self.get_shape()?)
    }

    /// Decodes the shape, failing with [`ShapeError::TypeMismatch`] if it is not a point or a multipoint.
    pub fn get_point_shape(&self) -> ShapeResult<AnyPointShape> {
        AnyPointShape::try_from(self.get_shape()?)
    }

    /// Well-known text of the shape.
    pub fn get_wkt(&self) -> ShapeResult<String> {
        Ok(self.get_shape()?.to_wkt())
    }

    /// Well-known binary in the given byte order. The stored buffer is returned if it is already in this order.
    pub fn get_wkb(&self, byte_order: ByteOrder) -> ShapeResult<Bytes> {
        if self.wkb.first() == Some(&(byte_order as u8)) {
            return Ok(self.wkb.clone());
        }

        log::trace!("Re-encoding feature {} into {byte_order:?}", self.id);
        Ok(self.get_shape()?.to_wkb(byte_order))
    }

    /// Bounding box of the shape.
    pub fn bounding_box(&self) -> ShapeResult<RectangleShape> {
        self.get_shape()?.bounding_box()
    }

    /// Type of the stored shape.
    pub fn well_known_type(&self) -> ShapeResult<WellKnownType> {
        Ok(self.get_shape()?.well_known_type())
    }

    /// Returns true if the binary decodes into a shape that passes simple validation.
    pub fn is_valid(&self) -> bool {
        self.get_shape()
            .is_ok_and(|shape| shape.validate(ValidationMode::Simple).is_valid)
    }

    /// Copy of the feature sharing the binary buffer, with the attributes filtered by `columns`.
    pub fn clone_deep(&self, columns: &ReturningColumns) -> Feature {
        Feature {
            id: self.id.clone(),
            wkb: self.wkb.clone(),
            tag: self.tag.clone(),
            attributes: self.attributes.select(columns),
        }
    }
}

impl PartialEq for Feature {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.wkb == other.wkb && self.attributes == other.attributes
    }
}
