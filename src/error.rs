//! Error taxonomy shared by the grid, the sources, the evaluator and phase
//! symmetry.
//!
//! Parameter errors are raised where the value is assigned and re-checked when
//! an evaluation starts. Per-pixel numeric problems are never raised during
//! evaluation; they stay in the output buffer and can be detected afterwards
//! with [`SampleBuffer::ensure_finite`](crate::buffer::SampleBuffer::ensure_finite).
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum SourceError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("dimension mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("invalid region {region}: {reason}")]
    InvalidRegion { region: String, reason: String },
    #[error("{count} samples are not finite")]
    NumericOverflow { count: usize },
    #[error("input pixel ({x}, {y}) is not finite")]
    NonFiniteInput { x: usize, y: usize },
}

impl SourceError {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_region(region: impl std::fmt::Debug, reason: impl Into<String>) -> Self {
        Self::InvalidRegion {
            region: format!("{region:?}"),
            reason: reason.into(),
        }
    }
}

/// Checks that `value` is finite and strictly positive.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<(), SourceError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SourceError::invalid_parameter(
            name,
            format!("expected a finite value > 0, got {value}"),
        ))
    }
}

pub(crate) fn ensure_finite(name: &'static str, value: f64) -> Result<(), SourceError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SourceError::invalid_parameter(
            name,
            format!("expected a finite value, got {value}"),
        ))
    }
}
