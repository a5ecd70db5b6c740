//! Unit-of-work helpers.
//!
//! Every mutating ledger operation runs in one serializable database
//! transaction. Row locks are taken with `FOR UPDATE` / `FOR SHARE` on
//! Postgres; SQLite has neither and serializes writers itself, so the lock
//! helpers are no-ops there.

use sea_orm::sqlx;
use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, IsolationLevel, QuerySelect, RuntimeErr, Select, SqlErr, TransactionTrait,
};

use folio_core::ledger::LedgerError;

/// SQLSTATE raised by Postgres when a serializable transaction loses a race.
const SERIALIZATION_FAILURE: &str = "40001";

/// Starts a serializable read-write transaction.
pub async fn begin(db: &DatabaseConnection) -> Result<DatabaseTransaction, LedgerError> {
    let (isolation, access) = match db.get_database_backend() {
        DatabaseBackend::Postgres => (
            Some(IsolationLevel::Serializable),
            Some(AccessMode::ReadWrite),
        ),
        DatabaseBackend::MySql | DatabaseBackend::Sqlite => (None, None),
    };
    db.begin_with_config(isolation, access)
        .await
        .map_err(db_err)
}

/// Commits `txn`.
pub async fn commit(txn: DatabaseTransaction) -> Result<(), LedgerError> {
    txn.commit().await.map_err(db_err)
}

/// Adds `FOR UPDATE` on backends that support it.
pub fn for_update<E: EntityTrait>(select: Select<E>, backend: DatabaseBackend) -> Select<E> {
    match backend {
        DatabaseBackend::Postgres | DatabaseBackend::MySql => select.lock_exclusive(),
        DatabaseBackend::Sqlite => select,
    }
}

/// Adds `FOR SHARE` on backends that support it.
pub fn for_share<E: EntityTrait>(select: Select<E>, backend: DatabaseBackend) -> Select<E> {
    match backend {
        DatabaseBackend::Postgres | DatabaseBackend::MySql => select.lock_shared(),
        DatabaseBackend::Sqlite => select,
    }
}

/// Maps a database error into the ledger taxonomy.
///
/// Serialization failures and unexpected unique violations (a concurrent
/// writer took the same number or row first) are retryable conflicts.
pub fn db_err(err: DbErr) -> LedgerError {
    if is_serialization_failure(&err) {
        return LedgerError::ConcurrentModification;
    }
    if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
        return LedgerError::ConcurrentModification;
    }
    LedgerError::Database(err.to_string())
}

/// Like [`db_err`], but a unique violation becomes `conflict()`.
pub fn unique_or(err: DbErr, conflict: impl FnOnce() -> LedgerError) -> LedgerError {
    if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
        return conflict();
    }
    db_err(err)
}

fn is_serialization_failure(err: &DbErr) -> bool {
    let runtime = match err {
        DbErr::Conn(e) | DbErr::Exec(e) | DbErr::Query(e) => e,
        _ => return false,
    };
    match runtime {
        RuntimeErr::SqlxError(sqlx::Error::Database(e)) => {
            e.code().as_deref() == Some(SERIALIZATION_FAILURE)
        }
        _ => false,
    }
}
