//! Units of shape coordinates, distances and areas.
//!
//! All conversions are table-driven: every unit knows how many meters (or square meters) it holds, and a conversion
//! is a multiplication followed by a division.

use serde::{Deserialize, Serialize};

/// Class of the coordinate system the shape coordinates are expressed in.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeographyUnit {
    /// Angular longitude/latitude coordinates. All measurements go through the [`Geodesy`](crate::geodesy::Geodesy)
    /// collaborator.
    DecimalDegree,
    /// Planar coordinates in international feet.
    Feet,
    /// Planar coordinates in meters.
    #[default]
    Meter,
}

impl GeographyUnit {
    /// Linear unit of planar coordinates, or `None` for angular coordinates.
    pub fn linear_unit(self) -> Option<DistanceUnit> {
        match self {
            GeographyUnit::DecimalDegree => None,
            GeographyUnit::Feet => Some(DistanceUnit::Feet),
            GeographyUnit::Meter => Some(DistanceUnit::Meter),
        }
    }

    /// Returns true for angular coordinates.
    pub fn is_decimal_degree(self) -> bool {
        self == GeographyUnit::DecimalDegree
    }
}

/// Unit of length.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistanceUnit {
    /// International foot.
    Feet,
    /// Meter.
    #[default]
    Meter,
    /// Kilometer.
    Kilometer,
    /// International statute mile.
    Mile,
    /// International yard.
    Yard,
    /// US survey foot (1200/3937 m).
    UsSurveyFeet,
}

impl DistanceUnit {
    /// Number of meters in one unit.
    pub const fn meters_per_unit(self) -> f64 {
        match self {
            DistanceUnit::Feet => 0.3048,
            DistanceUnit::Meter => 1.0,
            DistanceUnit::Kilometer => 1000.0,
            DistanceUnit::Mile => 1609.344,
            DistanceUnit::Yard => 0.9144,
            DistanceUnit::UsSurveyFeet => 1200.0 / 3937.0,
        }
    }

    /// Converts `value` from `from` units into `to` units.
    pub fn convert(value: f64, from: DistanceUnit, to: DistanceUnit) -> f64 {
        if from == to {
            value
        } else {
            value * from.meters_per_unit() / to.meters_per_unit()
        }
    }

    /// Square unit with the same base length, if there is one.
    pub fn square(self) -> AreaUnit {
        match self {
            DistanceUnit::Feet => AreaUnit::SquareFeet,
            DistanceUnit::Meter => AreaUnit::SquareMeters,
            DistanceUnit::Kilometer => AreaUnit::SquareKilometers,
            DistanceUnit::Mile => AreaUnit::SquareMiles,
            DistanceUnit::Yard => AreaUnit::SquareYards,
            DistanceUnit::UsSurveyFeet => AreaUnit::SquareUsSurveyFeet,
        }
    }
}

/// Unit of area.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AreaUnit {
    /// Square international foot.
    SquareFeet,
    /// Square meter.
    #[default]
    SquareMeters,
    /// Square kilometer.
    SquareKilometers,
    /// Square statute mile.
    SquareMiles,
    /// Square yard.
    SquareYards,
    /// Square US survey foot.
    SquareUsSurveyFeet,
    /// International acre.
    Acres,
}

impl AreaUnit {
    /// Number of square meters in one unit.
    pub const fn square_meters_per_unit(self) -> f64 {
        match self {
            AreaUnit::SquareFeet => 0.09290304,
            AreaUnit::SquareMeters => 1.0,
            AreaUnit::SquareKilometers => 1_000_000.0,
            AreaUnit::SquareMiles => 2_589_988.110336,
            AreaUnit::SquareYards => 0.83612736,
            AreaUnit::SquareUsSurveyFeet => (1200.0 / 3937.0) * (1200.0 / 3937.0),
            AreaUnit::Acres => 4046.8564224,
        }
    }

    /// Converts `value` from `from` units into `to` units.
    pub fn convert(value: f64, from: AreaUnit, to: AreaUnit) -> f64 {
        if from == to {
            value
        } else {
            value * from.square_meters_per_unit() / to.square_meters_per_unit()
        }
    }
}

/// Converts a planar length measured in the linear unit of `shape_unit` into `distance_unit`.
///
/// For decimal degree coordinates there is no linear unit, and the value is returned as is.
pub(crate) fn planar_length(value: f64, shape_unit: GeographyUnit, distance_unit: DistanceUnit) -> f64 {
    match shape_unit.linear_unit() {
        Some(unit) => DistanceUnit::convert(value, unit, distance_unit),
        None => value,
    }
}

/// Converts a planar area measured in the square linear unit of `shape_unit` into `area_unit`.
pub(crate) fn planar_area(value: f64, shape_unit: GeographyUnit, area_unit: AreaUnit) -> f64 {
    match shape_unit.linear_unit() {
        Some(unit) => AreaUnit::convert(value, unit.square(), area_unit),
        None => value,
    }
}

/// Converts a distance given in `distance_unit` into the linear unit of `shape_unit`.
pub(crate) fn to_shape_length(value: f64, distance_unit: DistanceUnit, shape_unit: GeographyUnit) -> f64 {
    match shape_unit.linear_unit() {
        Some(unit) => DistanceUnit::convert(value, distance_unit, unit),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn distance_conversion() {
        assert_relative_eq!(
            DistanceUnit::convert(1.0, DistanceUnit::Mile, DistanceUnit::Feet),
            5280.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            DistanceUnit::convert(3.0, DistanceUnit::Feet, DistanceUnit::Yard),
            1.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            DistanceUnit::convert(3937.0, DistanceUnit::UsSurveyFeet, DistanceUnit::Meter),
            1200.0,
            epsilon = 1e-9
        );
        assert_eq!(
            DistanceUnit::convert(42.0, DistanceUnit::Meter, DistanceUnit::Meter),
            42.0
        );
    }

    #[test]
    fn area_conversion() {
        assert_relative_eq!(
            AreaUnit::convert(1.0, AreaUnit::SquareMiles, AreaUnit::Acres),
            640.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            AreaUnit::convert(1.0, AreaUnit::SquareKilometers, AreaUnit::SquareMeters),
            1_000_000.0
        );
        assert_relative_eq!(
            AreaUnit::convert(9.0, AreaUnit::SquareFeet, AreaUnit::SquareYards),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn shape_unit_lengths() {
        assert_relative_eq!(
            planar_length(1.0, GeographyUnit::Feet, DistanceUnit::Meter),
            0.3048
        );
        assert_relative_eq!(
            planar_area(16.0, GeographyUnit::Meter, AreaUnit::SquareMeters),
            16.0
        );
        assert_relative_eq!(
            to_shape_length(1.0, DistanceUnit::Kilometer, GeographyUnit::Meter),
            1000.0
        );
        assert_eq!(GeographyUnit::DecimalDegree.linear_unit(), None);
    }
}
