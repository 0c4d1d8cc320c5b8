use geosim_core::CoordinateError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("store catalog is empty; nothing to generate")]
    EmptyCatalog,

    #[error(transparent)]
    Coordinate(#[from] CoordinateError),
}

impl EngineError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Reject NaN, infinities and values `<= 0`.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EngineError::invalid(name, format!("{value} must be > 0")))
    }
}

/// Reject `Some(0)`; `None` means uncapped.
pub(crate) fn require_limit(limit: Option<usize>) -> Result<(), EngineError> {
    match limit {
        Some(0) => Err(EngineError::invalid("limit", "must be at least 1 when set")),
        _ => Ok(()),
    }
}
