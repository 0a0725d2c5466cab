//! Error taxonomy for the retouching pipeline.
//!
//! Every numeric stage is total once its inputs are validated, so the only
//! failures are domain violations caught at the boundary and malformed
//! buffers. A missing or empty source image is not an error: the
//! [`Retoucher`](crate::Retoucher) reports it as a no-op (`Ok(None)`).

use thiserror::Error;

/// Errors returned by the public API of this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetouchError {
    /// A parameter lies outside the domain where the pipeline is defined
    /// (for example `gamma <= 0` or `threshold >= 1`).
    #[error("invalid {field} = {value}: {reason}")]
    InvalidDomain {
        /// Name of the offending parameter
        field: &'static str,
        /// The rejected value
        value: f64,
        /// Human-readable domain constraint
        reason: &'static str,
    },

    /// Sample data does not match `width * height * 4`.
    #[error("pixel buffer has {actual} bytes, expected {expected}")]
    BufferSize {
        /// Required byte length
        expected: usize,
        /// Provided byte length
        actual: usize,
    },
}

impl RetouchError {
    pub(crate) fn invalid(field: &'static str, value: f64, reason: &'static str) -> Self {
        RetouchError::InvalidDomain {
            field,
            value,
            reason,
        }
    }
}

/// Reject NaN and infinities for a named parameter.
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<(), RetouchError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RetouchError::invalid(field, value, "must be a finite number"))
    }
}
