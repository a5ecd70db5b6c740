//! Database layer with `SeaORM` entities, repositories and the ledger facade.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//! - The [`Ledger`] facade that publishes lifecycle events after commit

pub mod entities;
pub mod ledger;
pub mod migration;
pub mod repositories;
pub mod unit_of_work;

mod mapping;

pub use ledger::Ledger;
pub use repositories::{
    AccountRepository, ClosePeriodResult, CreatedTransaction, PeriodRepository, PostResult,
    ReportRepository, ReversalResult, TransactionRepository,
};

use std::time::Duration;

use folio_shared::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a pooled connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .sqlx_logging(false);

    Database::connect(options).await
}
