//! Ledger error types.
//!
//! Every variant belongs to exactly one class of the application taxonomy
//! (`AppError`); see the `From` impl at the bottom of this file.

use chrono::NaiveDate;
use thiserror::Error;

use folio_shared::types::{AccountId, MoneyError, PeriodId, TransactionId};
use folio_shared::AppError;

use super::types::{AccountType, TransactionStatus};
use super::validation::ValidationResult;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// The Validation Engine rejected the transaction.
    #[error("Transaction failed validation: {}", .0.summary())]
    ValidationFailed(Box<ValidationResult>),

    /// Malformed input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A line carries a negative amount.
    #[error("Line {line_number} has a negative amount")]
    NegativeAmount {
        /// 1-based line number.
        line_number: i32,
    },

    /// Parent and child account types differ.
    #[error("Parent account type {parent} does not match account type {child}")]
    ParentTypeMismatch {
        /// Parent's type.
        parent: AccountType,
        /// Requested child type.
        child: AccountType,
    },

    /// Period start is after its end.
    #[error("Start date {start} is after end date {end}")]
    InvalidDateRange {
        /// Requested start.
        start: NaiveDate,
        /// Requested end.
        end: NaiveDate,
    },

    /// The account named for retained earnings is not an equity account.
    #[error("Retained earnings account {0} must be an equity account")]
    RetainedEarningsNotEquity(AccountId),

    /// Money arithmetic failed.
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    // ========== Conflict Errors ==========
    /// Account code already used in this company.
    #[error("Account code already exists: {0}")]
    DuplicateAccountCode(String),

    /// Idempotency key already used.
    #[error("Idempotency key already used: {0}")]
    DuplicateIdempotencyKey(String),

    /// The transaction has already been reversed.
    #[error("Transaction {0} has already been reversed")]
    AlreadyReversed(TransactionId),

    /// A period with an overlapping date range exists.
    #[error("Period overlaps with existing period: {0}")]
    OverlappingPeriod(String),

    /// A serializable transaction lost a race.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    // ========== Not Found Errors ==========
    /// Account not found in this company.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Parent account not found in this company.
    #[error("Parent account not found: {0}")]
    ParentNotFound(AccountId),

    /// Transaction not found in this company.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// Period not found in this company.
    #[error("Accounting period not found: {0}")]
    PeriodNotFound(PeriodId),

    /// No period covers the date.
    #[error("No accounting period covers {0}")]
    NoPeriodForDate(NaiveDate),

    // ========== Business Rule Errors ==========
    /// The requested status transition is not allowed.
    #[error("Cannot move transaction from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status.
        from: TransactionStatus,
        /// Requested status.
        to: TransactionStatus,
    },

    /// The date falls in a closed period.
    #[error("Accounting period '{period}' is closed; cannot post on {date}")]
    PeriodClosed {
        /// Rejected date.
        date: NaiveDate,
        /// Name of the closed period.
        period: String,
    },

    /// Earlier periods must be closed first.
    #[error("Cannot close period: earlier periods are still open ({})", .0.join(", "))]
    EarlierPeriodsOpen(Vec<String>),

    /// The period is already closed.
    #[error("Accounting period {0} is already closed")]
    PeriodAlreadyClosed(PeriodId),

    /// System accounts cannot be deactivated.
    #[error("System account {0} cannot be deactivated")]
    SystemAccountProtected(AccountId),

    // ========== Integrity Errors ==========
    /// An invariant the ledger guarantees was found violated.
    #[error("Ledger integrity violation: {0}")]
    Integrity(String),

    // ========== Infrastructure Errors ==========
    /// The unit of work exceeded its budget and was rolled back.
    #[error("Operation timed out after {0} ms")]
    Timeout(u64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ValidationFailed(result) => result
                .errors
                .first()
                .map_or("VALIDATION_FAILED", |issue| issue.code.as_str()),
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::ParentTypeMismatch { .. } => "PARENT_TYPE_MISMATCH",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::RetainedEarningsNotEquity(_) => "RETAINED_EARNINGS_NOT_EQUITY",
            Self::Money(MoneyError::Overflow) => "AMOUNT_OVERFLOW",
            Self::Money(_) => "MONEY_ERROR",
            Self::DuplicateAccountCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::DuplicateIdempotencyKey(_) => "DUPLICATE_IDEMPOTENCY_KEY",
            Self::AlreadyReversed(_) => "ALREADY_REVERSED",
            Self::OverlappingPeriod(_) => "OVERLAPPING_PERIOD",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::PeriodNotFound(_) => "PERIOD_NOT_FOUND",
            Self::NoPeriodForDate(_) => "NO_PERIOD_FOR_DATE",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::PeriodClosed { .. } => "PERIOD_CLOSED",
            Self::EarlierPeriodsOpen(_) => "EARLIER_PERIODS_OPEN",
            Self::PeriodAlreadyClosed(_) => "PERIOD_ALREADY_CLOSED",
            Self::SystemAccountProtected(_) => "SYSTEM_ACCOUNT_PROTECTED",
            Self::Integrity(_) => "INTEGRITY_VIOLATION",
            Self::Timeout(_) => "TIMEOUT",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        self.to_app_error().status_code()
    }

    /// Returns true if resubmitting the same request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification | Self::Timeout(_))
    }

    /// Classifies this error into the application taxonomy.
    #[must_use]
    pub fn to_app_error(&self) -> AppError {
        let message = self.to_string();
        match self {
            Self::ValidationFailed(_)
            | Self::InvalidInput(_)
            | Self::NegativeAmount { .. }
            | Self::ParentTypeMismatch { .. }
            | Self::InvalidDateRange { .. }
            | Self::RetainedEarningsNotEquity(_)
            | Self::Money(_) => AppError::Validation(message),

            Self::DuplicateAccountCode(_)
            | Self::DuplicateIdempotencyKey(_)
            | Self::AlreadyReversed(_)
            | Self::OverlappingPeriod(_)
            | Self::ConcurrentModification => AppError::Conflict(message),

            Self::AccountNotFound(_)
            | Self::ParentNotFound(_)
            | Self::TransactionNotFound(_)
            | Self::PeriodNotFound(_)
            | Self::NoPeriodForDate(_) => AppError::NotFound(message),

            Self::InvalidStatusTransition { .. }
            | Self::PeriodClosed { .. }
            | Self::EarlierPeriodsOpen(_)
            | Self::PeriodAlreadyClosed(_)
            | Self::SystemAccountProtected(_) => AppError::BusinessRule(message),

            Self::Integrity(_) => AppError::Integrity(message),
            Self::Timeout(_) => AppError::Timeout(message),
            Self::Database(_) => AppError::Database(message),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        err.to_app_error()
    }
}
