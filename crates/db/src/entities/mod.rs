//! `SeaORM` entity definitions.
//!
//! Enum-like columns (`account_type`, `status`, ...) are stored as their
//! lowercase string form so the schema stays portable between Postgres
//! and SQLite.

pub mod accounting_periods;
pub mod accounts;
pub mod transaction_lines;
pub mod transaction_sequences;
pub mod transactions;
