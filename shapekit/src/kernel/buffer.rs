//! Buffer construction by unioning simple pieces: a rectangle around every segment, a disc at every joint and
//! the selected caps at the ends of open lines.

use std::f64::consts::PI;

use geo::BooleanOps;
use geo_types::{Coord, Geometry, LineString, MultiPolygon, Polygon};

use crate::kernel::{geometry_kind, BufferCapStyle, KernelError, KernelResult};

pub(crate) fn buffer_geometry(
    geometry: &Geometry<f64>,
    distance: f64,
    quadrant_segments: u32,
    cap_style: BufferCapStyle,
) -> KernelResult<Geometry<f64>> {
    let areal = areal_part(geometry)?;
    let builder = PieceBuilder {
        radius: distance.abs(),
        quadrant_segments,
        cap_style,
    };

    let result = if distance == 0.0 {
        areal.unwrap_or_else(empty)
    } else if distance > 0.0 {
        let mut pieces = builder.pieces(geometry);
        if let Some(areal) = areal {
            pieces.push(areal);
        }
        union_pieces(pieces)
    } else {
        match areal {
            Some(areal) => {
                let boundary = union_pieces(builder.pieces(geometry));
                areal.difference(&boundary)
            }
            None => empty(),
        }
    };

    log::trace!(
        "Buffered {} by {distance} into {} polygons",
        geometry_kind(geometry),
        result.0.len()
    );
    Ok(Geometry::MultiPolygon(result))
}

fn empty() -> MultiPolygon<f64> {
    MultiPolygon::new(vec![])
}

fn areal_part(geometry: &Geometry<f64>) -> KernelResult<Option<MultiPolygon<f64>>> {
    Ok(match geometry {
        Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p.clone()])),
        Geometry::MultiPolygon(m) => Some(m.clone()),
        Geometry::Rect(r) => Some(MultiPolygon::new(vec![r.to_polygon()])),
        Geometry::Triangle(t) => Some(MultiPolygon::new(vec![t.to_polygon()])),
        Geometry::Point(_)
        | Geometry::MultiPoint(_)
        | Geometry::Line(_)
        | Geometry::LineString(_)
        | Geometry::MultiLineString(_) => None,
        Geometry::GeometryCollection(_) => {
            return Err(KernelError::Unsupported {
                operation: "buffer",
                geometry: "GeometryCollection",
            })
        }
    })
}

/// Unions the pieces pairwise, so that every union step works on inputs of similar size.
fn union_pieces(mut pieces: Vec<MultiPolygon<f64>>) -> MultiPolygon<f64> {
    while pieces.len() > 1 {
        let mut merged = Vec::with_capacity(pieces.len() / 2 + 1);
        let mut iter = pieces.into_iter();
        while let Some(first) = iter.next() {
            match iter.next() {
                Some(second) => merged.push(first.union(&second)),
                None => merged.push(first),
            }
        }
        pieces = merged;
    }

    pieces.pop().unwrap_or_else(empty)
}

struct PieceBuilder {
    radius: f64,
    quadrant_segments: u32,
    cap_style: BufferCapStyle,
}

impl PieceBuilder {
    fn pieces(&self, geometry: &Geometry<f64>) -> Vec<MultiPolygon<f64>> {
        let mut pieces = vec![];
        match geometry {
            Geometry::Point(p) => self.point(p.0, &mut pieces),
            Geometry::MultiPoint(m) => m.0.iter().for_each(|p| self.point(p.0, &mut pieces)),
            Geometry::Line(l) => self.path(&[l.start, l.end], false, &mut pieces),
            Geometry::LineString(l) => self.path(&l.0, l.is_closed(), &mut pieces),
            Geometry::MultiLineString(m) => m.0.iter().for_each(|l| self.path(&l.0, l.is_closed(), &mut pieces)),
            Geometry::Polygon(p) => self.polygon(p, &mut pieces),
            Geometry::MultiPolygon(m) => m.0.iter().for_each(|p| self.polygon(p, &mut pieces)),
            Geometry::Rect(r) => self.polygon(&r.to_polygon(), &mut pieces),
            Geometry::Triangle(t) => self.polygon(&t.to_polygon(), &mut pieces),
            Geometry::GeometryCollection(_) => {}
        }

        pieces
    }

    fn polygon(&self, polygon: &Polygon<f64>, pieces: &mut Vec<MultiPolygon<f64>>) {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            self.path(&ring.0, true, pieces);
        }
    }

    fn point(&self, center: Coord<f64>, pieces: &mut Vec<MultiPolygon<f64>>) {
        let r = self.radius;
        match self.cap_style {
            BufferCapStyle::Round => pieces.push(self.disc(center)),
            BufferCapStyle::Square => pieces.push(quad([
                center + Coord::from((-r, -r)),
                center + Coord::from((r, -r)),
                center + Coord::from((r, r)),
                center + Coord::from((-r, r)),
            ])),
            BufferCapStyle::Butt => {}
        }
    }

    fn path(&self, coords: &[Coord<f64>], closed: bool, pieces: &mut Vec<MultiPolygon<f64>>) {
        let mut coords = coords.to_vec();
        coords.dedup();
        match coords.as_slice() {
            [] => return,
            [single] => {
                self.point(*single, pieces);
                return;
            }
            _ => {}
        }

        for pair in coords.windows(2) {
            pieces.push(self.segment(pair[0], pair[1]));
        }

        let last = coords.len() - 1;
        let joints = if closed { &coords[..last] } else { &coords[1..last] };
        for joint in joints {
            pieces.push(self.disc(*joint));
        }

        if !closed {
            self.cap(coords[0], coords[1], pieces);
            self.cap(coords[last], coords[last - 1], pieces);
        }
    }

    /// Cap at `end` of the segment coming from `from`.
    fn cap(&self, end: Coord<f64>, from: Coord<f64>, pieces: &mut Vec<MultiPolygon<f64>>) {
        match self.cap_style {
            BufferCapStyle::Round => pieces.push(self.disc(end)),
            BufferCapStyle::Square => {
                let (direction, normal) = self.frame(from, end);
                pieces.push(quad([
                    end + normal,
                    end + normal + direction,
                    end - normal + direction,
                    end - normal,
                ]));
            }
            BufferCapStyle::Butt => {}
        }
    }

    fn segment(&self, a: Coord<f64>, b: Coord<f64>) -> MultiPolygon<f64> {
        let (_, normal) = self.frame(a, b);
        quad([a - normal, b - normal, b + normal, a + normal])
    }

    /// Direction and left normal of the segment, both of buffer radius length.
    fn frame(&self, a: Coord<f64>, b: Coord<f64>) -> (Coord<f64>, Coord<f64>) {
        let delta = b - a;
        let length = delta.x.hypot(delta.y);
        let direction = delta * (self.radius / length);
        (direction, Coord { x: -direction.y, y: direction.x })
    }

    fn disc(&self, center: Coord<f64>) -> MultiPolygon<f64> {
        let count = self.quadrant_segments * 4;
        let coords: Vec<_> = (0..count)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / count as f64;
                center + Coord::from((self.radius * angle.cos(), self.radius * angle.sin()))
            })
            .collect();
        MultiPolygon::new(vec![Polygon::new(LineString::new(coords), vec![])])
    }
}

fn quad(corners: [Coord<f64>; 4]) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![Polygon::new(LineString::new(corners.to_vec()), vec![])])
}
