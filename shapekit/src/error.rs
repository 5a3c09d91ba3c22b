//! Error types used by the crate.

use thiserror::Error;

use crate::codec::wkb::WkbError;
use crate::codec::wkt::WktError;
use crate::kernel::KernelError;
use crate::shape::ShapeType;

/// Result alias used by all fallible shape operations.
pub type ShapeResult<T> = Result<T, ShapeError>;

/// Error enum.
#[derive(Debug, Error)]
pub enum ShapeError {
    /// A required argument is out of its allowed range.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Name of the argument.
        name: &'static str,
        /// What is wrong with the value.
        reason: String,
    },
    /// The shape does not pass simple validation.
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    /// Well-known text could not be parsed.
    #[error("invalid well-known text: {0}")]
    Wkt(#[from] WktError),
    /// Well-known binary could not be decoded.
    #[error("invalid well-known binary: {0}")]
    Wkb(#[from] WkbError),
    /// The shape variant cannot perform the operation.
    #[error("{operation} is not supported by {shape} shapes")]
    NotSupported {
        /// Operation name.
        operation: &'static str,
        /// Variant that rejected the operation.
        shape: ShapeType,
    },
    /// A shape of another kind was expected.
    #[error("expected {expected} shape, but got {actual}")]
    TypeMismatch {
        /// Expected variant or family.
        expected: &'static str,
        /// Actual variant.
        actual: ShapeType,
    },
    /// Geometry kernel failure.
    #[error("geometry kernel error: {0}")]
    Kernel(#[from] KernelError),
}

impl ShapeError {
    pub(crate) fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

/// Fails with [`ShapeError::InvalidArgument`] if `value` is not a finite number.
pub(crate) fn ensure_finite(name: &'static str, value: f64) -> ShapeResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ShapeError::invalid_argument(
            name,
            format!("{value} is not a finite number"),
        ))
    }
}

/// Fails with [`ShapeError::InvalidArgument`] if `value` is not strictly positive.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> ShapeResult<()> {
    ensure_finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ShapeError::invalid_argument(
            name,
            format!("must be greater than 0, but is {value}"),
        ))
    }
}

/// Fails with [`ShapeError::InvalidArgument`] if `value` is outside of `[min, max]`.
pub(crate) fn ensure_in_range(name: &'static str, value: f64, min: f64, max: f64) -> ShapeResult<()> {
    ensure_finite(name, value)?;
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ShapeError::invalid_argument(
            name,
            format!("must be in range [{min}, {max}], but is {value}"),
        ))
    }
}
