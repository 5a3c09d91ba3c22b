//! Well-known binary writer and reader.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shape::{
    BaseShape, LineShape, MultilineShape, MultipointShape, MultipolygonShape, PointShape, PolygonShape, RingShape,
    Shape, ShapeRef, WellKnownType, ELLIPSE_POLYGON_VERTEX_COUNT,
};
use crate::vertex::Vertex;

const EWKB_Z_FLAG: u32 = 0x8000_0000;
const EWKB_M_FLAG: u32 = 0x4000_0000;
const EWKB_SRID_FLAG: u32 = 0x2000_0000;
const ISO_Z_OFFSET: u32 = 1000;

/// Byte order of the numbers in well-known binary.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ByteOrder {
    /// Most significant byte first (XDR).
    BigEndian = 0,
    /// Least significant byte first (NDR).
    #[default]
    LittleEndian = 1,
}

impl ByteOrder {
    fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0 => Some(Self::BigEndian),
            1 => Some(Self::LittleEndian),
            _ => None,
        }
    }
}

/// Well-known binary decoding error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WkbError {
    /// The buffer ended in the middle of a geometry.
    #[error("unexpected end of buffer at offset {offset}: {needed} more bytes needed")]
    UnexpectedEnd {
        /// Offset of the value that could not be read.
        offset: usize,
        /// Number of missing bytes.
        needed: usize,
    },
    /// The byte order flag is neither 0 nor 1.
    #[error("invalid byte order flag {value} at offset {offset}")]
    InvalidByteOrder {
        /// Offset of the flag.
        offset: usize,
        /// Value of the flag.
        value: u8,
    },
    /// The geometry type code is unknown or not supported.
    #[error("unsupported geometry type code {code} at offset {offset}")]
    UnsupportedType {
        /// Offset of the type code.
        offset: usize,
        /// The type code as written.
        code: u32,
    },
    /// A member of a multi geometry has a wrong type.
    #[error("expected {expected:?} member at offset {offset}, but got {actual:?}")]
    UnexpectedMember {
        /// Offset of the member.
        offset: usize,
        /// Type allowed in the collection.
        expected: WellKnownType,
        /// Type of the member.
        actual: WellKnownType,
    },
    /// Bytes remain after the end of the geometry.
    #[error("{count} unexpected bytes after the end of the geometry at offset {offset}")]
    TrailingBytes {
        /// Offset of the first unexpected byte.
        offset: usize,
        /// Number of remaining bytes.
        count: usize,
    },
}

/// Writes the shape as well-known binary.
///
/// Points with a `z` value are written with the ISO `Point Z` type code.
pub fn write(shape: ShapeRef<'_>, byte_order: ByteOrder) -> Bytes {
    let mut writer = Writer {
        buf: BytesMut::new(),
        byte_order,
    };

    match shape {
        ShapeRef::Point(point) => writer.point(point),
        ShapeRef::Multipoint(multipoint) => {
            writer.header(WellKnownType::MultiPoint);
            writer.count(multipoint.points().len());
            for point in multipoint.points() {
                writer.point(point);
            }
        }
        ShapeRef::Line(line) => writer.line(line.vertices()),
        ShapeRef::Multiline(multiline) => {
            writer.header(WellKnownType::MultiLineString);
            writer.count(multiline.lines().len());
            for line in multiline.lines() {
                writer.line(line.vertices());
            }
        }
        ShapeRef::Ring(ring) => writer.polygon(&[ring.vertices()]),
        ShapeRef::Polygon(polygon) => writer.polygon(&polygon_rings(polygon)),
        ShapeRef::Multipolygon(multipolygon) => {
            writer.header(WellKnownType::MultiPolygon);
            writer.count(multipolygon.polygons().len());
            for polygon in multipolygon.polygons() {
                writer.polygon(&polygon_rings(polygon));
            }
        }
        ShapeRef::Rectangle(rectangle) => writer.polygon(&[rectangle.ring_vertices().as_slice()]),
        ShapeRef::Ellipse(ellipse) => {
            writer.polygon(&[ellipse.polygon_vertices(ELLIPSE_POLYGON_VERTEX_COUNT).as_slice()])
        }
    }

    writer.buf.freeze()
}

fn polygon_rings(polygon: &PolygonShape) -> Vec<&[Vertex]> {
    polygon.rings().map(RingShape::vertices).collect()
}

struct Writer {
    buf: BytesMut,
    byte_order: ByteOrder,
}

impl Writer {
    fn header(&mut self, kind: WellKnownType) {
        self.header_with_code(kind.code());
    }

    fn header_with_code(&mut self, code: u32) {
        self.buf.put_u8(self.byte_order as u8);
        self.u32(code);
    }

    fn u32(&mut self, value: u32) {
        match self.byte_order {
            ByteOrder::BigEndian => self.buf.put_u32(value),
            ByteOrder::LittleEndian => self.buf.put_u32_le(value),
        }
    }

    fn f64(&mut self, value: f64) {
        match self.byte_order {
            ByteOrder::BigEndian => self.buf.put_f64(value),
            ByteOrder::LittleEndian => self.buf.put_f64_le(value),
        }
    }

    fn count(&mut self, count: usize) {
        // Counts above u32::MAX cannot be represented and cannot be allocated in practice either.
        self.u32(u32::try_from(count).unwrap_or(u32::MAX));
    }

    fn vertex(&mut self, vertex: &Vertex) {
        self.f64(vertex.x);
        self.f64(vertex.y);
    }

    fn vertices(&mut self, vertices: &[Vertex]) {
        self.count(vertices.len());
        for vertex in vertices {
            self.vertex(vertex);
        }
    }

    fn point(&mut self, point: &PointShape) {
        match point.z() {
            Some(z) => {
                self.header_with_code(WellKnownType::Point.code() + ISO_Z_OFFSET);
                self.vertex(&point.to_vertex());
                self.f64(z);
            }
            None => {
                self.header(WellKnownType::Point);
                self.vertex(&point.to_vertex());
            }
        }
    }

    fn line(&mut self, vertices: &[Vertex]) {
        self.header(WellKnownType::LineString);
        self.vertices(vertices);
    }

    fn polygon(&mut self, rings: &[&[Vertex]]) {
        self.header(WellKnownType::Polygon);
        self.count(rings.len());
        for ring in rings {
            self.vertices(ring);
        }
    }
}

/// Decodes well-known binary into a shape.
///
/// Members of multi geometries may use their own byte order. Z and M ordinates, in both ISO and extended
/// notation, are read and dropped, except for the Z ordinate of points. An embedded SRID is skipped.
pub fn read(wkb: &[u8]) -> Result<Shape, WkbError> {
    let mut reader = Reader {
        data: wkb,
        cursor: wkb,
    };

    let shape = reader.geometry(None)?.shape;
    if reader.cursor.has_remaining() {
        return Err(WkbError::TrailingBytes {
            offset: reader.offset(),
            count: reader.cursor.remaining(),
        });
    }

    log::trace!("Decoded {} from {} bytes of well-known binary", shape.shape_type(), wkb.len());
    Ok(shape)
}

type ReadResult<T> = Result<T, WkbError>;

struct Header {
    offset: usize,
    byte_order: ByteOrder,
    kind: WellKnownType,
    has_z: bool,
    has_m: bool,
}

struct Decoded {
    kind: WellKnownType,
    offset: usize,
    shape: Shape,
}

struct Reader<'a> {
    data: &'a [u8],
    cursor: &'a [u8],
}

impl Reader<'_> {
    fn offset(&self) -> usize {
        self.data.len() - self.cursor.remaining()
    }

    fn ensure(&self, needed: usize) -> ReadResult<()> {
        let remaining = self.cursor.remaining();
        if remaining < needed {
            Err(WkbError::UnexpectedEnd {
                offset: self.offset(),
                needed: needed - remaining,
            })
        } else {
            Ok(())
        }
    }

    fn u8(&mut self) -> ReadResult<u8> {
        self.ensure(1)?;
        Ok(self.cursor.get_u8())
    }

    fn u32(&mut self, byte_order: ByteOrder) -> ReadResult<u32> {
        self.ensure(4)?;
        Ok(match byte_order {
            ByteOrder::BigEndian => self.cursor.get_u32(),
            ByteOrder::LittleEndian => self.cursor.get_u32_le(),
        })
    }

    fn f64(&mut self, byte_order: ByteOrder) -> ReadResult<f64> {
        self.ensure(8)?;
        Ok(match byte_order {
            ByteOrder::BigEndian => self.cursor.get_f64(),
            ByteOrder::LittleEndian => self.cursor.get_f64_le(),
        })
    }

    fn header(&mut self, parent: Option<ByteOrder>) -> ReadResult<Header> {
        let offset = self.offset();
        let flag = self.u8()?;
        let byte_order = ByteOrder::from_flag(flag).ok_or(WkbError::InvalidByteOrder { offset, value: flag })?;
        if parent.is_some_and(|parent| parent != byte_order) {
            log::debug!("Member at offset {offset} switches byte order to {byte_order:?}");
        }

        let type_offset = self.offset();
        let code = self.u32(byte_order)?;
        if code & EWKB_SRID_FLAG != 0 {
            let srid = self.u32(byte_order)?;
            log::trace!("Skipping SRID {srid} at offset {type_offset}");
        }

        let base = code & !(EWKB_Z_FLAG | EWKB_M_FLAG | EWKB_SRID_FLAG);
        let (kind_code, iso_dimension) = (base % ISO_Z_OFFSET, base / ISO_Z_OFFSET);
        let kind = match (WellKnownType::from_code(kind_code), iso_dimension) {
            (Some(kind), 0..=3) if kind != WellKnownType::GeometryCollection => kind,
            _ => {
                return Err(WkbError::UnsupportedType {
                    offset: type_offset,
                    code,
                })
            }
        };

        Ok(Header {
            offset,
            byte_order,
            kind,
            has_z: code & EWKB_Z_FLAG != 0 || iso_dimension == 1 || iso_dimension == 3,
            has_m: code & EWKB_M_FLAG != 0 || iso_dimension == 2 || iso_dimension == 3,
        })
    }

    fn geometry(&mut self, parent: Option<ByteOrder>) -> ReadResult<Decoded> {
        let header = self.header(parent)?;
        let shape = match header.kind {
            WellKnownType::Point => {
                let (vertex, z) = self.coordinate(&header)?;
                match z {
                    Some(z) => PointShape::with_z(vertex.x, vertex.y, z).into(),
                    None => PointShape::from_vertex(vertex).into(),
                }
            }
            WellKnownType::LineString => LineShape::new(self.vertices(&header)?).into(),
            WellKnownType::Polygon => self.polygon(&header)?.into(),
            WellKnownType::MultiPoint => {
                let members = self.members(&header, WellKnownType::Point)?;
                let points = members
                    .into_iter()
                    .filter_map(|shape| match shape {
                        Shape::Point(point) => Some(point),
                        _ => None,
                    })
                    .collect();
                MultipointShape::new(points).into()
            }
            WellKnownType::MultiLineString => {
                let members = self.members(&header, WellKnownType::LineString)?;
                let lines = members
                    .into_iter()
                    .filter_map(|shape| match shape {
                        Shape::Line(line) => Some(line),
                        _ => None,
                    })
                    .collect();
                MultilineShape::new(lines).into()
            }
            WellKnownType::MultiPolygon => {
                let members = self.members(&header, WellKnownType::Polygon)?;
                let polygons = members
                    .into_iter()
                    .filter_map(|shape| match shape {
                        Shape::Polygon(polygon) => Some(polygon),
                        _ => None,
                    })
                    .collect();
                MultipolygonShape::new(polygons).into()
            }
            WellKnownType::GeometryCollection => {
                return Err(WkbError::UnsupportedType {
                    offset: header.offset + 1,
                    code: WellKnownType::GeometryCollection.code(),
                })
            }
        };

        Ok(Decoded {
            kind: header.kind,
            offset: header.offset,
            shape,
        })
    }

    fn members(&mut self, header: &Header, expected: WellKnownType) -> ReadResult<Vec<Shape>> {
        let count = self.count(header, 9)?;
        let mut members = Vec::with_capacity(count);
        for _ in 0..count {
            let member = self.geometry(Some(header.byte_order))?;
            if member.kind != expected {
                return Err(WkbError::UnexpectedMember {
                    offset: member.offset,
                    expected,
                    actual: member.kind,
                });
            }
            members.push(member.shape);
        }

        Ok(members)
    }

    fn polygon(&mut self, header: &Header) -> ReadResult<PolygonShape> {
        let count = self.count(header, 4)?;
        let mut rings = Vec::with_capacity(count);
        for _ in 0..count {
            rings.push(RingShape::new(self.vertices(header)?));
        }

        let mut rings = rings.into_iter();
        let outer = rings.next().unwrap_or_else(|| RingShape::new(vec![]));
        Ok(PolygonShape::new(outer, rings.collect()))
    }

    fn vertices(&mut self, header: &Header) -> ReadResult<Vec<Vertex>> {
        let count = self.count(header, 16)?;
        let mut vertices = Vec::with_capacity(count);
        for _ in 0..count {
            vertices.push(self.coordinate(header)?.0);
        }
        Ok(vertices)
    }

    /// Reads an element count, checking that the rest of the buffer can hold that many elements of at least
    /// `min_size` bytes each.
    fn count(&mut self, header: &Header, min_size: usize) -> ReadResult<usize> {
        let count = self.u32(header.byte_order)? as usize;
        self.ensure(count.saturating_mul(min_size))?;
        Ok(count)
    }

    fn coordinate(&mut self, header: &Header) -> ReadResult<(Vertex, Option<f64>)> {
        let x = self.f64(header.byte_order)?;
        let y = self.f64(header.byte_order)?;
        let z = if header.has_z {
            Some(self.f64(header.byte_order)?)
        } else {
            None
        };
        if header.has_m {
            self.f64(header.byte_order)?;
        }

        Ok((Vertex::new(x, y), z))
    }
}
