//! Database-level backstop for ledger immutability.
//!
//! Lines of a posted or reversed transaction can never be updated or
//! deleted, whatever code path touches them. Postgres only; SQLite relies
//! on the repository checks.

use sea_orm::DatabaseBackend;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DatabaseBackend::Postgres {
            return Ok(());
        }
        let db = manager.get_connection();
        db.execute_unprepared(LINE_IMMUTABILITY_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DatabaseBackend::Postgres {
            return Ok(());
        }
        let db = manager.get_connection();
        db.execute_unprepared(DROP_LINE_IMMUTABILITY_SQL).await?;
        Ok(())
    }
}

const LINE_IMMUTABILITY_SQL: &str = r"
CREATE OR REPLACE FUNCTION prevent_posted_line_changes()
RETURNS TRIGGER AS $$
DECLARE
    v_status VARCHAR(16);
BEGIN
    SELECT status INTO v_status FROM transactions WHERE id = OLD.transaction_id;
    IF v_status IS NOT NULL AND v_status <> 'draft' THEN
        RAISE EXCEPTION 'Cannot % lines of % transaction %', TG_OP, v_status, OLD.transaction_id
            USING ERRCODE = 'check_violation';
    END IF;
    IF TG_OP = 'DELETE' THEN
        RETURN OLD;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_transaction_lines_immutable
    BEFORE UPDATE OR DELETE ON transaction_lines
    FOR EACH ROW EXECUTE FUNCTION prevent_posted_line_changes();
";

const DROP_LINE_IMMUTABILITY_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_transaction_lines_immutable ON transaction_lines;
DROP FUNCTION IF EXISTS prevent_posted_line_changes();
";
