//! Core business logic for Folio.
//!
//! This crate contains pure ledger logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Double-entry bookkeeping: accounts, transactions, validation, reversal
//! - `fiscal` - Accounting periods and closing entries
//! - `reports` - Trial balance
//! - `events` - Lifecycle events and the event bus

pub mod events;
pub mod fiscal;
pub mod ledger;
pub mod reports;

pub use events::{EventBus, EventEnvelope, LedgerEvent};
