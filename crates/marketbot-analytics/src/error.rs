//! Error types for statistics and simulation.

use thiserror::Error;

/// A specialized Result type for analytics operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Errors that can occur during analytics calculations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    /// A caller-supplied parameter violates a precondition
    #[error("invalid input: {0}")]
    Validation(String),

    /// A token in a delimited input is not a finite number
    #[error("invalid number format: '{token}'")]
    InvalidNumber {
        /// The offending token, trimmed
        token: String,
    },

    /// A ratio is undefined because its denominator is zero
    #[error("division by zero in {context}")]
    DivisionByZero {
        /// What was being computed
        context: String,
    },
}

impl AnalyticsError {
    /// Returns true if the error is a rejected input rather than an undefined result.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidNumber { .. })
    }
}
