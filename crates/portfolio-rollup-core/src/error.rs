use thiserror::Error;

#[derive(Debug, Error)]
pub enum RollupError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for RollupError {
    fn from(e: serde_json::Error) -> Self {
        RollupError::SerializationError(e.to_string())
    }
}

/// Diagnostic attached to a project whose active range cannot be allocated.
///
/// The display strings are user-facing and stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DateRangeError {
    #[error("Start and end dates are required.")]
    Missing,

    #[error("Start date must be on/before end date.")]
    Inverted,
}

/// Diagnostic attached to a project whose amounts do not fit in a `Decimal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Weekly rate is too large to allocate.")]
    ProjectOverflow,

    #[error("Project amounts overflow the portfolio total.")]
    PortfolioOverflow,
}
