//! Application-wide error taxonomy.
//!
//! Every ledger failure is classified into exactly one of these variants so
//! collaborators (an HTTP layer, a job runner) can react without matching on
//! domain-specific error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or unbalanced input. Recoverable by resubmitting corrected input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Duplicate entry or stale state; the caller must re-read and decide.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource not found in the caller's company scope.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Business rule violation.
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// An invariant the ledger guarantees was found violated. Fatal.
    #[error("Integrity violation: {0}")]
    Integrity(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// The unit of work exceeded its execution budget and was rolled back.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::BusinessRule(_) => 422,
            Self::Conflict(_) => 409,
            Self::Timeout(_) => 503,
            Self::Integrity(_) | Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Conflict(_) => "CONFLICT",
            Self::Integrity(_) => "INTEGRITY_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
