//! Financial report generation.
//!
//! The trial balance is the only report the ledger produces; statements
//! built on top of it belong to collaborators.

pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use service::ReportService;
pub use types::*;
