use thiserror::Error;

use super::input::Field;

/// Input that cannot be calculated on. Reported before any computation runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(Field),

    #[error("{field} must be a number, got {value:?}")]
    InvalidNumber { field: Field, value: String },

    #[error("{0} must be >= 0")]
    Negative(Field),

    #[error("{0} must be finite")]
    NotFinite(Field),

    #[error("goal already met: principal {principal} >= goal {goal}")]
    GoalAlreadyMet { principal: f64, goal: f64 },

    #[error("period must be at least one month")]
    NonPositivePeriod,

    #[error("retirement age {retirement} must be greater than current age {current}")]
    RetirementAgeNotAfterCurrent { current: u32, retirement: u32 },

    #[error("living off interest needs a rate above zero; set a retirement duration instead")]
    ZeroRateRequiresHorizon,

    #[error("{field} must be <= {max}")]
    TooLarge { field: Field, max: u32 },

    #[error("{0} overflows; use a smaller rate or period")]
    Overflow(&'static str),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("benchmark rate unavailable: {0}")]
    RateUnavailable(String),
}

/// Rejects NaN, infinities and negatives for arguments passed straight into the core.
pub(crate) fn ensure_non_negative(value: f64, what: &'static str) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidArgument(what));
    }
    Ok(())
}

pub(crate) fn ensure_at_most(value: u32, max: u32, field: Field) -> Result<(), ValidationError> {
    if value > max {
        return Err(ValidationError::TooLarge { field, max });
    }
    Ok(())
}

/// Rejects a computed amount that left the finite range.
pub(crate) fn ensure_finite_result(value: f64, what: &'static str) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::Overflow(what));
    }
    Ok(value)
}
