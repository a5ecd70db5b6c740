//! Human-readable transaction numbers: `TXN-<year>-<zero-padded sequence>`.
//!
//! Sequences are per company and fiscal (calendar) year. The sequence row is
//! advanced inside the caller's unit of work, so a rollback returns the value
//! and committed numbers are gap-free.

use chrono::{Datelike, NaiveDate};

/// Prefix of every transaction number.
pub const TRANSACTION_NUMBER_PREFIX: &str = "TXN";

/// The sequence year a transaction dated `date` draws from.
#[must_use]
pub fn sequence_year(date: NaiveDate) -> i32 {
    date.year()
}

/// Formats a transaction number. `width` pads the sequence with zeros;
/// longer sequences are never truncated.
#[must_use]
pub fn format_transaction_number(year: i32, sequence: i64, width: usize) -> String {
    format!("{TRANSACTION_NUMBER_PREFIX}-{year}-{sequence:0width$}")
}
