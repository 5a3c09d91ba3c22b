use geo::dimensions::HasDimensions;
use geo::{Area, BooleanOps, ConvexHull, Relate, Simplify, SimplifyVwPreserve};
use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Polygon,
};

use crate::config::KernelConfig;
use crate::kernel::buffer::buffer_geometry;
use crate::kernel::relate::relation_holds;
use crate::kernel::{
    geometry_kind, BufferCapStyle, GeometryKernel, KernelError, KernelResult, SimplificationType, SpatialRelation,
};

/// [`GeometryKernel`] implemented with the `geo` crate algorithms.
#[derive(Debug, Clone)]
pub struct GeoKernel {
    config: KernelConfig,
}

impl GeoKernel {
    /// Creates a new kernel.
    pub const fn new(config: KernelConfig) -> Self {
        Self { config }
    }

    /// Settings of the kernel.
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    fn check_topology(&self, geometry: &Geometry<f64>) -> KernelResult<()> {
        if !self.config.reject_degenerate_rings {
            return Ok(());
        }

        match geometry {
            Geometry::Polygon(p) => check_polygon(p),
            Geometry::MultiPolygon(m) => m.0.iter().try_for_each(check_polygon),
            _ => Ok(()),
        }
    }

    fn overlay(
        &self,
        a: &Geometry<f64>,
        b: &Geometry<f64>,
        operation: &'static str,
        op: impl FnOnce(&MultiPolygon<f64>, &MultiPolygon<f64>) -> MultiPolygon<f64>,
    ) -> KernelResult<Geometry<f64>> {
        self.check_topology(a)?;
        self.check_topology(b)?;
        let a = areal(a, operation)?;
        let b = areal(b, operation)?;
        Ok(Geometry::MultiPolygon(op(&a, &b)))
    }
}

impl Default for GeoKernel {
    fn default() -> Self {
        Self::new(KernelConfig::default())
    }
}

fn check_polygon(polygon: &Polygon<f64>) -> KernelResult<()> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .enumerate()
        .try_for_each(|(index, ring)| {
            if ring.0.len() < 4 {
                return Err(KernelError::DegenerateTopology(format!(
                    "ring {index} has only {} coordinates",
                    ring.0.len()
                )));
            }

            if Polygon::new(ring.clone(), vec![]).unsigned_area() == 0.0 {
                return Err(KernelError::DegenerateTopology(format!("ring {index} has zero area")));
            }

            Ok(())
        })
}

/// Relative tolerance of the cross product below which three ring vertices are treated as lying on one line.
const COLLINEAR_TOLERANCE: f64 = 1e-12;

/// Removes the vertices lying on the straight run between their neighbours, which overlays leave where the input
/// boundaries met.
fn without_collinear(polygons: MultiPolygon<f64>) -> MultiPolygon<f64> {
    polygons
        .into_iter()
        .map(|polygon| {
            let (exterior, interiors) = polygon.into_inner();
            Polygon::new(
                simplify_ring(exterior),
                interiors.into_iter().map(simplify_ring).collect(),
            )
        })
        .collect()
}

fn simplify_ring(ring: LineString<f64>) -> LineString<f64> {
    let closed = ring.is_closed();
    let mut coords = ring.0;
    if closed {
        coords.pop();
    }

    loop {
        let before = coords.len();
        let mut index = 0;
        while coords.len() > 3 && index < coords.len() {
            let count = coords.len();
            let prev = coords[(index + count - 1) % count];
            let next = coords[(index + 1) % count];
            if is_on_straight_run(prev, coords[index], next) {
                coords.remove(index);
            } else {
                index += 1;
            }
        }

        if coords.len() == before {
            break;
        }
    }

    if closed {
        if let Some(first) = coords.first().copied() {
            coords.push(first);
        }
    }

    LineString::new(coords)
}

fn is_on_straight_run(prev: Coord<f64>, current: Coord<f64>, next: Coord<f64>) -> bool {
    let incoming = current - prev;
    let outgoing = next - current;
    let scale = incoming.x.hypot(incoming.y) * outgoing.x.hypot(outgoing.y);
    if scale == 0.0 {
        return true;
    }

    let cross = incoming.x * outgoing.y - incoming.y * outgoing.x;
    let dot = incoming.x * outgoing.x + incoming.y * outgoing.y;
    dot > 0.0 && cross.abs() <= scale * COLLINEAR_TOLERANCE
}

fn areal(geometry: &Geometry<f64>, operation: &'static str) -> KernelResult<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => Ok(MultiPolygon::new(vec![p.clone()])),
        Geometry::MultiPolygon(m) => Ok(m.clone()),
        Geometry::Rect(r) => Ok(MultiPolygon::new(vec![r.to_polygon()])),
        Geometry::Triangle(t) => Ok(MultiPolygon::new(vec![t.to_polygon()])),
        other => Err(KernelError::Unsupported {
            operation,
            geometry: geometry_kind(other),
        }),
    }
}

fn lines(geometry: &Geometry<f64>) -> Option<Vec<LineString<f64>>> {
    match geometry {
        Geometry::Line(l) => Some(vec![LineString::from(vec![l.start, l.end])]),
        Geometry::LineString(l) => Some(vec![l.clone()]),
        Geometry::MultiLineString(m) => Some(m.0.clone()),
        _ => None,
    }
}

fn points(geometry: &Geometry<f64>) -> Option<MultiPoint<f64>> {
    match geometry {
        Geometry::Point(p) => Some(MultiPoint::new(vec![*p])),
        Geometry::MultiPoint(m) => Some(m.clone()),
        _ => None,
    }
}

impl GeometryKernel for GeoKernel {
    fn relate(&self, a: &Geometry<f64>, b: &Geometry<f64>, relation: SpatialRelation) -> KernelResult<bool> {
        self.check_topology(a)?;
        self.check_topology(b)?;

        let matrix = a.relate(b);
        Ok(relation_holds(&matrix, relation, a.dimensions(), b.dimensions()))
    }

    fn convex_hull(&self, geometry: &Geometry<f64>) -> KernelResult<Geometry<f64>> {
        if geometry.is_empty() {
            return Err(KernelError::Unsupported {
                operation: "convex hull",
                geometry: "empty geometry",
            });
        }

        Ok(Geometry::Polygon(geometry.convex_hull()))
    }

    fn intersection(&self, a: &Geometry<f64>, b: &Geometry<f64>) -> KernelResult<Geometry<f64>> {
        self.overlay(a, b, "intersection", |a, b| a.intersection(b))
    }

    fn union(&self, a: &Geometry<f64>, b: &Geometry<f64>) -> KernelResult<Geometry<f64>> {
        if let (Some(mut first), Some(second)) = (lines(a), lines(b)) {
            first.extend(second);
            return Ok(Geometry::MultiLineString(MultiLineString::new(first)));
        }

        if let (Some(mut first), Some(second)) = (points(a), points(b)) {
            for point in second {
                if !first.0.contains(&point) {
                    first.0.push(point);
                }
            }
            return Ok(Geometry::MultiPoint(first));
        }

        self.overlay(a, b, "union", |a, b| without_collinear(a.union(b)))
    }

    fn union_all(&self, geometries: &[Geometry<f64>]) -> KernelResult<Geometry<f64>> {
        let Some((first, rest)) = geometries.split_first() else {
            return Ok(Geometry::GeometryCollection(GeometryCollection(vec![])));
        };

        rest.iter()
            .try_fold(first.clone(), |united, next| self.union(&united, next))
    }

    fn difference(&self, a: &Geometry<f64>, b: &Geometry<f64>) -> KernelResult<Geometry<f64>> {
        self.overlay(a, b, "difference", |a, b| a.difference(b))
    }

    fn symmetric_difference(&self, a: &Geometry<f64>, b: &Geometry<f64>) -> KernelResult<Geometry<f64>> {
        self.overlay(a, b, "symmetric difference", |a, b| a.xor(b))
    }

    fn buffer(
        &self,
        geometry: &Geometry<f64>,
        distance: f64,
        quadrant_segments: u32,
        cap_style: BufferCapStyle,
    ) -> KernelResult<Geometry<f64>> {
        self.check_topology(geometry)?;
        buffer_geometry(geometry, distance, quadrant_segments, cap_style)
    }

    fn simplify(
        &self,
        geometry: &Geometry<f64>,
        tolerance: f64,
        mode: Option<SimplificationType>,
    ) -> KernelResult<Geometry<f64>> {
        let mode = mode.unwrap_or(self.config.simplification);
        log::trace!("Simplifying {} with {mode:?}", geometry_kind(geometry));

        macro_rules! simplified {
            ($value:expr) => {
                match mode {
                    SimplificationType::DouglasPeucker => $value.simplify(&tolerance),
                    SimplificationType::TopologyPreserving => $value.simplify_vw_preserve(&tolerance),
                }
            };
        }

        Ok(match geometry {
            Geometry::LineString(l) => Geometry::LineString(simplified!(l)),
            Geometry::MultiLineString(m) => Geometry::MultiLineString(simplified!(m)),
            Geometry::Polygon(p) => Geometry::Polygon(simplified!(p)),
            Geometry::MultiPolygon(m) => Geometry::MultiPolygon(simplified!(m)),
            Geometry::Point(_) | Geometry::MultiPoint(_) => geometry.clone(),
            other => {
                return Err(KernelError::Unsupported {
                    operation: "simplify",
                    geometry: geometry_kind(other),
                })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;
    use geo_types::{line_string, point, polygon};

    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Geometry<f64> {
        Geometry::Polygon(polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
            (x: x, y: y),
        ])
    }

    fn area(geometry: &Geometry<f64>) -> f64 {
        geometry.unsigned_area()
    }

    #[test]
    fn boolean_operations() {
        let kernel = GeoKernel::default();
        let a = square(0.0, 0.0, 2.0);
        let b = square(1.0, 1.0, 2.0);

        assert_relative_eq!(area(&kernel.intersection(&a, &b).unwrap()), 1.0, epsilon = 1e-9);
        assert_relative_eq!(area(&kernel.union(&a, &b).unwrap()), 7.0, epsilon = 1e-9);
        assert_relative_eq!(area(&kernel.difference(&a, &b).unwrap()), 3.0, epsilon = 1e-9);
        assert_relative_eq!(area(&kernel.symmetric_difference(&a, &b).unwrap()), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_rings() {
        let collapsed = Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 0.0, y: 0.0),
        ]);
        let kernel = GeoKernel::default();
        assert_matches!(
            kernel.intersection(&collapsed, &square(0.0, 0.0, 1.0)),
            Err(KernelError::DegenerateTopology(_))
        );
        assert_matches!(
            kernel.relate(&collapsed, &square(0.0, 0.0, 1.0), SpatialRelation::Intersects),
            Err(KernelError::DegenerateTopology(_))
        );

        let permissive = GeoKernel::new(KernelConfig {
            reject_degenerate_rings: false,
            ..Default::default()
        });
        assert!(permissive.check_topology(&collapsed).is_ok());
    }

    #[test]
    fn overlay_of_lines_is_unsupported() {
        let line = Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]);
        assert_matches!(
            GeoKernel::default().intersection(&line, &square(0.0, 0.0, 1.0)),
            Err(KernelError::Unsupported {
                operation: "intersection",
                geometry: "LineString"
            })
        );
    }

    #[test]
    fn union_of_points_drops_duplicates() {
        let kernel = GeoKernel::default();
        let a = Geometry::Point(point!(x: 1.0, y: 1.0));
        let b = Geometry::MultiPoint(MultiPoint::new(vec![point!(x: 1.0, y: 1.0), point!(x: 2.0, y: 2.0)]));
        let Geometry::MultiPoint(united) = kernel.union(&a, &b).unwrap() else {
            panic!("points must be united into a multipoint");
        };
        assert_eq!(united.0.len(), 2);
    }

    #[test]
    fn union_drops_vertices_along_the_seam() {
        let kernel = GeoKernel::default();
        let united = kernel.union(&square(0.0, 0.0, 1.0), &square(0.5, 0.0, 1.0)).unwrap();
        let Geometry::MultiPolygon(united) = united else {
            panic!("expected a multipolygon");
        };
        assert_eq!(united.0.len(), 1);

        let exterior = united.0[0].exterior();
        assert!(exterior.is_closed());
        assert_eq!(exterior.0.len(), 5);
        for corner in [(0.0, 0.0), (1.5, 0.0), (1.5, 1.0), (0.0, 1.0)] {
            assert!(exterior.0.contains(&Coord::from(corner)), "{corner:?}");
        }
        assert_relative_eq!(area(&Geometry::MultiPolygon(united)), 1.5, epsilon = 1e-9);
    }

    #[test]
    fn spikes_and_holes_keep_their_corners() {
        let ring = LineString::from(vec![(0.0, 0.0), (2.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]);
        let hole = LineString::from(vec![(1.0, 1.0), (1.0, 2.0), (2.0, 2.0), (2.0, 1.0), (1.0, 1.0)]);
        let polygons = without_collinear(MultiPolygon::new(vec![Polygon::new(ring, vec![hole.clone()])]));

        assert_eq!(polygons.0[0].exterior().0.len(), 5);
        assert_eq!(polygons.0[0].interiors()[0], hole);

        let spike = LineString::from(vec![(0.0, 0.0), (4.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 0.0)]);
        assert_eq!(simplify_ring(spike.clone()), spike);
    }

    #[test]
    fn union_all_folds() {
        let kernel = GeoKernel::default();
        let united = kernel
            .union_all(&[square(0.0, 0.0, 1.0), square(1.0, 0.0, 1.0), square(10.0, 0.0, 1.0)])
            .unwrap();
        assert_relative_eq!(area(&united), 3.0, epsilon = 1e-9);
        assert_matches!(kernel.union_all(&[]), Ok(Geometry::GeometryCollection(_)));
    }

    #[test]
    fn convex_hull_of_points() {
        let points = Geometry::MultiPoint(MultiPoint::new(vec![
            point!(x: 0.0, y: 0.0),
            point!(x: 4.0, y: 0.0),
            point!(x: 2.0, y: 1.0),
            point!(x: 2.0, y: 3.0),
        ]));
        let hull = GeoKernel::default().convex_hull(&points).unwrap();
        assert_relative_eq!(area(&hull), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn simplification_modes() {
        let kernel = GeoKernel::default();
        let line = Geometry::LineString(line_string![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.01),
            (x: 2.0, y: 0.0),
            (x: 3.0, y: 5.0),
        ]);

        let Geometry::LineString(simplified) = kernel.simplify(&line, 0.1, None).unwrap() else {
            panic!("line must stay a line");
        };
        assert_eq!(simplified.0.len(), 3);

        let Geometry::LineString(preserved) = kernel
            .simplify(&line, 0.1, Some(SimplificationType::TopologyPreserving))
            .unwrap()
        else {
            panic!("line must stay a line");
        };
        assert_eq!(preserved.0.len(), 3);
    }
}
