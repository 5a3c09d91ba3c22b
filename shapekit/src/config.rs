//! Configuration of the geometry kernel.

use serde::{Deserialize, Serialize};

use crate::error::{ShapeError, ShapeResult};
use crate::kernel::{BufferCapStyle, SimplificationType};

/// Smallest number of segments allowed to approximate a quarter of a circle in buffers.
pub const MIN_QUADRANT_SEGMENTS: u32 = 3;
/// Largest number of segments allowed to approximate a quarter of a circle in buffers.
pub const MAX_QUADRANT_SEGMENTS: u32 = 100;

/// Settings of a [`GeoKernel`](crate::kernel::GeoKernel).
///
/// Can be deserialized from any serde format. Missing fields take their default values:
///
/// ```
/// use shapekit::config::KernelConfig;
///
/// let config: KernelConfig = serde_json::from_str(r#"{"buffer_quadrant_segments": 16}"#).unwrap();
/// assert_eq!(config.buffer_quadrant_segments, 16);
/// assert_eq!(config.reject_degenerate_rings, true);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Number of segments used to approximate a quarter of a circle when buffering.
    pub buffer_quadrant_segments: u32,
    /// End cap style used when buffering line ends.
    pub buffer_cap_style: BufferCapStyle,
    /// Algorithm used when simplification mode is not given explicitly.
    pub simplification: SimplificationType,
    /// If true, polygonal input with collapsed (zero area or too short) rings is reported as
    /// [`KernelError::DegenerateTopology`](crate::kernel::KernelError::DegenerateTopology) instead of being passed to
    /// the algorithms.
    pub reject_degenerate_rings: bool,
}

impl KernelConfig {
    /// Default configuration.
    pub const DEFAULT: Self = Self {
        buffer_quadrant_segments: 8,
        buffer_cap_style: BufferCapStyle::Round,
        simplification: SimplificationType::DouglasPeucker,
        reject_degenerate_rings: true,
    };

    /// Checks that all values are in their allowed ranges.
    pub fn validate(&self) -> ShapeResult<()> {
        validate_quadrant_segments(self.buffer_quadrant_segments)
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

pub(crate) fn validate_quadrant_segments(value: u32) -> ShapeResult<()> {
    if (MIN_QUADRANT_SEGMENTS..=MAX_QUADRANT_SEGMENTS).contains(&value) {
        Ok(())
    } else {
        Err(ShapeError::invalid_argument(
            "quadrant_segments",
            format!(
                "must be in range [{MIN_QUADRANT_SEGMENTS}, {MAX_QUADRANT_SEGMENTS}], but is {value}"
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn deserialize_with_defaults() {
        let config: KernelConfig =
            serde_json::from_str(r#"{"buffer_cap_style": "Square"}"#).expect("valid json");
        assert_eq!(config.buffer_cap_style, BufferCapStyle::Square);
        assert_eq!(config.buffer_quadrant_segments, 8);
        assert_eq!(config.simplification, SimplificationType::DouglasPeucker);
    }

    #[test]
    fn serialize_round_trip() {
        let config = KernelConfig {
            buffer_quadrant_segments: 12,
            reject_degenerate_rings: false,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).expect("serializable");
        let restored: KernelConfig = serde_json::from_str(&json).expect("valid json");
        assert_eq!(restored, config);
    }

    #[test]
    fn quadrant_segments_range() {
        assert!(KernelConfig::default().validate().is_ok());
        let config = KernelConfig {
            buffer_quadrant_segments: 2,
            ..Default::default()
        };
        assert_matches!(
            config.validate(),
            Err(ShapeError::InvalidArgument {
                name: "quadrant_segments",
                ..
            })
        );
        assert!(validate_quadrant_segments(101).is_err());
        assert!(validate_quadrant_segments(100).is_ok());
    }
}
