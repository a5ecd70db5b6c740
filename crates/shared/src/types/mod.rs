//! Common types used across the ledger.

pub mod id;
pub mod money;

pub use id::*;
pub use money::{Currency, Money, MoneyError};
