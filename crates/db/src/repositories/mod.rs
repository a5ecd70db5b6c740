//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations. Every
//! query is scoped by company id; a row of another company behaves as if it
//! did not exist.

pub mod account;
pub mod period;
pub mod report;
pub mod transaction;

pub use account::AccountRepository;
pub use period::{ClosePeriodResult, PeriodRepository};
pub use report::ReportRepository;
pub use transaction::{CreatedTransaction, PostResult, ReversalResult, TransactionRepository};
