//! Shared types, errors, and configuration for the Folio ledger.
//!
//! This crate provides common types used across all other crates:
//! - Money stored as integer minor units with a currency tag
//! - Typed IDs for type-safe entity references
//! - The application-wide error taxonomy
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, DatabaseConfig, LedgerConfig};
pub use error::{AppError, AppResult};
