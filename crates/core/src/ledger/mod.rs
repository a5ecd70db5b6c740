//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Account and transaction domain types
//! - Normal-balance calculations
//! - The Validation Engine
//! - Reversal construction
//! - Transaction numbering
//! - Error types for ledger operations

pub mod account;
pub mod balance;
pub mod error;
pub mod numbering;
pub mod reversal;
pub mod transaction;
pub mod types;
pub mod validation;

#[cfg(test)]
mod reversal_props;
#[cfg(test)]
mod validation_props;

pub use account::Account;
pub use balance::NormalBalance;
pub use error::LedgerError;
pub use reversal::ReversalService;
pub use transaction::{Transaction, TransactionLine};
pub use types::{
    AccountFilter, AccountPatch, AccountType, CreateAccountInput, CreateTransactionInput, Dimension,
    DimensionFlags, DimensionTags, LineInput, ReverseTransactionInput, TransactionFilter,
    TransactionStatus, TransactionType,
};
pub use validation::{
    AccountInfo, IssueCode, ValidationEngine, ValidationIssue, ValidationLine, ValidationResult,
};
