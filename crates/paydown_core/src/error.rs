//! Error types for sweep configuration

use thiserror::Error;

use crate::config::Axis;

/// Validation failures for a sweep configuration.
///
/// Every variant names the offending axis and the rejected values so callers
/// can surface the message directly.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{axis} range must be finite, got min {min}, max {max}, step {step}")]
    NotFinite {
        axis: Axis,
        min: f64,
        max: f64,
        step: f64,
    },

    #[error("{axis} range step must be positive, got {step}")]
    StepNotPositive { axis: Axis, step: f64 },

    #[error("{axis} range is inverted: min {min} exceeds max {max}")]
    MinExceedsMax { axis: Axis, min: f64, max: f64 },

    #[error("{axis} range must start above zero, got {min}")]
    MinNotPositive { axis: Axis, min: f64 },

    #[error("interest rate range must not start below zero, got {min}")]
    NegativeRate { min: f64 },
}
