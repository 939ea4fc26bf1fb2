//! Error types for configuration and construction.
//!
//! The integration hot path never fails: vetoes, sub-floor results and
//! saturation are expressed through return values. Only building a mode,
//! channel or detector from a configuration can be rejected.

use std::time::Duration;

/// Errors raised while validating configurations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DendriticError {
    /// A parameter is outside its biological or numerical range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A time constant is zero where a positive duration is required.
    #[error("invalid time constant `{name}`: {value:?}")]
    InvalidTimeConstant {
        /// Name of the time constant.
        name: &'static str,
        /// The rejected value.
        value: Duration,
    },

    /// A conductance is negative or not finite.
    #[error("invalid conductance `{name}`: {value}")]
    InvalidConductance {
        /// Name of the conductance.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A value that must lie in `[0, 1]` does not.
    #[error("invalid fraction `{name}`: {value} (expected 0.0..=1.0)")]
    InvalidFraction {
        /// Name of the fraction.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, DendriticError>;

pub(crate) fn ensure_finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DendriticError::InvalidParameter {
            name,
            reason: format!("{value} is not finite"),
        })
    }
}

pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<()> {
    ensure_finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(DendriticError::InvalidParameter {
            name,
            reason: format!("{value} must be positive"),
        })
    }
}

pub(crate) fn ensure_non_negative(name: &'static str, value: f64) -> Result<()> {
    ensure_finite(name, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(DendriticError::InvalidParameter {
            name,
            reason: format!("{value} must not be negative"),
        })
    }
}

pub(crate) fn ensure_fraction(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(DendriticError::InvalidFraction { name, value })
    }
}

pub(crate) fn ensure_time_constant(name: &'static str, value: Duration) -> Result<()> {
    if value.is_zero() {
        Err(DendriticError::InvalidTimeConstant { name, value })
    } else {
        Ok(())
    }
}
