//! Measurements of decimal degree coordinates on the surface of the Earth.

use geo::{ChamberlainDuquetteArea, HaversineDestination, HaversineDistance, HaversineIntermediate};
use geo_types::{Coord, LineString, Point, Polygon};

use crate::shape::{LineShape, MultilineShape};
use crate::units::DistanceUnit;
use crate::vertex::Vertex;

/// Mean radius of the Earth in meters.
pub const MEAN_EARTH_RADIUS: f64 = 6_371_008.8;

/// Geodetic calculations used by all shapes with [`GeographyUnit::DecimalDegree`](crate::units::GeographyUnit)
/// coordinates.
///
/// Vertices are given as `x` = longitude, `y` = latitude, in degrees.
pub trait Geodesy {
    /// Surface distance between two positions.
    fn distance(&self, from: Vertex, to: Vertex, unit: DistanceUnit) -> f64;

    /// Longitude difference (in degrees) that corresponds to moving `distance` to the east at `at_latitude`.
    fn longitude_difference_from_distance(&self, distance: f64, unit: DistanceUnit, at_latitude: f64) -> f64;

    /// Latitude difference (in degrees) that corresponds to moving `distance` to the north along the meridian
    /// `at_longitude`.
    fn latitude_difference_from_distance(&self, distance: f64, unit: DistanceUnit, at_longitude: f64) -> f64;

    /// Latitude of the point reached by moving from `start` by `distance` along the compass `bearing`.
    fn latitude_from_distance_and_bearing(
        &self,
        start: Vertex,
        distance: f64,
        unit: DistanceUnit,
        bearing: f64,
    ) -> f64;

    /// Longitude of the point reached by moving from `start` by `distance` along the compass `bearing`.
    fn longitude_from_distance_and_bearing(
        &self,
        start: Vertex,
        distance: f64,
        unit: DistanceUnit,
        bearing: f64,
    ) -> f64;

    /// Great circle path between two positions, densified to `segments` segments. The path is split into several
    /// lines where it crosses the antimeridian.
    fn great_circle(&self, from: Vertex, to: Vertex, segments: usize) -> MultilineShape;

    /// Area enclosed by the ring in square meters.
    fn ring_area(&self, vertices: &[Vertex]) -> f64;

    /// Position reached by moving from `start` by `distance` along the compass `bearing`.
    fn destination(&self, start: Vertex, distance: f64, unit: DistanceUnit, bearing: f64) -> Vertex {
        Vertex::new(
            self.longitude_from_distance_and_bearing(start, distance, unit, bearing),
            self.latitude_from_distance_and_bearing(start, distance, unit, bearing),
        )
    }
}

/// Spherical [`Geodesy`] based on the haversine formulas of the `geo` crate.
#[derive(Debug, Default, Copy, Clone)]
pub struct HaversineGeodesy;

impl HaversineGeodesy {
    fn destination_point(start: Vertex, distance: f64, unit: DistanceUnit, bearing: f64) -> Point<f64> {
        let meters = DistanceUnit::convert(distance, unit, DistanceUnit::Meter);
        to_point(start).haversine_destination(bearing, meters)
    }
}

impl Geodesy for HaversineGeodesy {
    fn distance(&self, from: Vertex, to: Vertex, unit: DistanceUnit) -> f64 {
        let meters = to_point(from).haversine_distance(&to_point(to));
        DistanceUnit::convert(meters, DistanceUnit::Meter, unit)
    }

    fn longitude_difference_from_distance(&self, distance: f64, unit: DistanceUnit, at_latitude: f64) -> f64 {
        let meters = DistanceUnit::convert(distance, unit, DistanceUnit::Meter);
        let parallel_radius = MEAN_EARTH_RADIUS * at_latitude.to_radians().cos();
        (meters / parallel_radius).to_degrees()
    }

    fn latitude_difference_from_distance(&self, distance: f64, unit: DistanceUnit, _at_longitude: f64) -> f64 {
        let meters = DistanceUnit::convert(distance, unit, DistanceUnit::Meter);
        (meters / MEAN_EARTH_RADIUS).to_degrees()
    }

    fn latitude_from_distance_and_bearing(
        &self,
        start: Vertex,
        distance: f64,
        unit: DistanceUnit,
        bearing: f64,
    ) -> f64 {
        Self::destination_point(start, distance, unit, bearing).y()
    }

    fn longitude_from_distance_and_bearing(
        &self,
        start: Vertex,
        distance: f64,
        unit: DistanceUnit,
        bearing: f64,
    ) -> f64 {
        Self::destination_point(start, distance, unit, bearing).x()
    }

    fn destination(&self, start: Vertex, distance: f64, unit: DistanceUnit, bearing: f64) -> Vertex {
        let point = Self::destination_point(start, distance, unit, bearing);
        Vertex::new(point.x(), point.y())
    }

    fn great_circle(&self, from: Vertex, to: Vertex, segments: usize) -> MultilineShape {
        let segments = segments.max(1);
        let start = to_point(from);
        let end = to_point(to);

        let mut lines = vec![];
        let mut current: Vec<Vertex> = vec![];
        for i in 0..=segments {
            let point = if i == 0 {
                start
            } else if i == segments {
                end
            } else {
                start.haversine_intermediate(&end, i as f64 / segments as f64)
            };
            let vertex = Vertex::new(point.x(), point.y());

            if let Some(prev) = current.last() {
                if (vertex.x - prev.x).abs() > 180.0 {
                    lines.push(LineShape::new(std::mem::take(&mut current)));
                }
            }
            current.push(vertex);
        }
        lines.push(LineShape::new(current));

        MultilineShape::new(lines)
    }

    fn ring_area(&self, vertices: &[Vertex]) -> f64 {
        let exterior: LineString<f64> = vertices.iter().map(|v| Coord { x: v.x, y: v.y }).collect();
        Polygon::new(exterior, vec![]).chamberlain_duquette_unsigned_area()
    }
}

/// Geodesy used by shape operations.
pub fn default_geodesy() -> &'static HaversineGeodesy {
    static GEODESY: HaversineGeodesy = HaversineGeodesy;
    &GEODESY
}

fn to_point(vertex: Vertex) -> Point<f64> {
    Point::new(vertex.x, vertex.y)
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;
    use crate::shape::BaseShape;

    #[test]
    fn distance_along_meridian() {
        let geodesy = HaversineGeodesy;
        let distance = geodesy.distance(
            Vertex::new(0.0, 0.0),
            Vertex::new(0.0, 1.0),
            DistanceUnit::Meter,
        );
        assert_relative_eq!(
            distance,
            MEAN_EARTH_RADIUS * 1.0_f64.to_radians(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn offsets() {
        let geodesy = HaversineGeodesy;
        let one_degree = MEAN_EARTH_RADIUS * 1.0_f64.to_radians();
        assert_relative_eq!(
            geodesy.latitude_difference_from_distance(one_degree, DistanceUnit::Meter, 0.0),
            1.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            geodesy.longitude_difference_from_distance(one_degree, DistanceUnit::Meter, 60.0),
            2.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn destination() {
        let geodesy = HaversineGeodesy;
        let one_degree = MEAN_EARTH_RADIUS * 1.0_f64.to_radians();
        let north = geodesy.destination(Vertex::new(10.0, 0.0), one_degree, DistanceUnit::Meter, 0.0);
        assert_abs_diff_eq!(north, Vertex::new(10.0, 1.0), epsilon = 1e-9);

        let east = geodesy.destination(Vertex::new(0.0, 0.0), one_degree, DistanceUnit::Meter, 90.0);
        assert_abs_diff_eq!(east, Vertex::new(1.0, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn great_circle_splits_at_antimeridian() {
        let geodesy = HaversineGeodesy;
        let path = geodesy.great_circle(Vertex::new(170.0, 0.0), Vertex::new(-170.0, 0.0), 4);
        assert_eq!(path.lines().len(), 2);
        assert_eq!(path.lines()[0].vertices()[0], Vertex::new(170.0, 0.0));
        assert_eq!(path.lines()[1].vertices().last(), Some(&Vertex::new(-170.0, 0.0)));
        assert!(path.validate(crate::shape::ValidationMode::Simple).is_valid);

        let path = geodesy.great_circle(Vertex::new(0.0, 0.0), Vertex::new(10.0, 0.0), 10);
        assert_eq!(path.lines().len(), 1);
        assert_eq!(path.lines()[0].vertices().len(), 11);
    }

    #[test]
    fn ring_area_is_positive() {
        let geodesy = HaversineGeodesy;
        let ring = [
            Vertex::new(0.0, 0.0),
            Vertex::new(0.0, 1.0),
            Vertex::new(1.0, 1.0),
            Vertex::new(1.0, 0.0),
            Vertex::new(0.0, 0.0),
        ];
        let area = geodesy.ring_area(&ring);
        // Roughly one square degree at the equator.
        assert!(area > 1.2e10 && area < 1.25e10, "{area}");
    }
}
