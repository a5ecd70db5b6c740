//! Ledger schema: accounts, transactions, lines, periods and number sequences.
//!
//! Built with the portable schema builders so the same migration runs on
//! Postgres and SQLite.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // CHART OF ACCOUNTS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Accounts::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Accounts::Code).string_len(32).not_null())
                    .col(ColumnDef::new(Accounts::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Accounts::AccountType).string_len(16).not_null())
                    .col(ColumnDef::new(Accounts::Subtype).string_len(64))
                    .col(ColumnDef::new(Accounts::ParentId).uuid())
                    .col(ColumnDef::new(Accounts::Description).text())
                    .col(ColumnDef::new(Accounts::TaxCode).string_len(32))
                    .col(flag(Accounts::IsBankAccount, false))
                    .col(flag(Accounts::TrackLocation, false))
                    .col(flag(Accounts::TrackDepartment, false))
                    .col(flag(Accounts::TrackProject, false))
                    .col(flag(Accounts::TrackClass, false))
                    .col(flag(Accounts::IsActive, true))
                    .col(flag(Accounts::IsSystem, false))
                    .col(ColumnDef::new(Accounts::CreatedBy).uuid())
                    .col(timestamp(Accounts::CreatedAt))
                    .col(timestamp(Accounts::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_accounts_parent")
                            .from(Accounts::Table, Accounts::ParentId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_accounts_company_code")
                    .table(Accounts::Table)
                    .col(Accounts::CompanyId)
                    .col(Accounts::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // TRANSACTIONS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Transactions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Transactions::CompanyId).uuid().not_null())
                    .col(
                        ColumnDef::new(Transactions::TransactionNumber)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Date).date().not_null())
                    .col(ColumnDef::new(Transactions::Description).text().not_null())
                    .col(ColumnDef::new(Transactions::Reference).string_len(255))
                    .col(
                        ColumnDef::new(Transactions::TransactionType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Currency).string_len(3).not_null())
                    .col(ColumnDef::new(Transactions::SourceId).uuid())
                    .col(ColumnDef::new(Transactions::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Transactions::LocationId).uuid())
                    .col(ColumnDef::new(Transactions::DepartmentId).uuid())
                    .col(ColumnDef::new(Transactions::ProjectId).uuid())
                    .col(ColumnDef::new(Transactions::ClassId).uuid())
                    .col(ColumnDef::new(Transactions::IdempotencyKey).string_len(255))
                    .col(ColumnDef::new(Transactions::PostedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Transactions::PostedBy).uuid())
                    .col(ColumnDef::new(Transactions::ReversedTransactionId).uuid())
                    .col(ColumnDef::new(Transactions::ReversalReason).text())
                    .col(ColumnDef::new(Transactions::CreatedBy).uuid())
                    .col(timestamp(Transactions::CreatedAt))
                    .col(timestamp(Transactions::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_reversed")
                            .from(Transactions::Table, Transactions::ReversedTransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_company_number")
                    .table(Transactions::Table)
                    .col(Transactions::CompanyId)
                    .col(Transactions::TransactionNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // NULL keys never collide, so only keyed submissions are constrained.
        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_idempotency_key")
                    .table(Transactions::Table)
                    .col(Transactions::IdempotencyKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_company_date")
                    .table(Transactions::Table)
                    .col(Transactions::CompanyId)
                    .col(Transactions::Date)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // TRANSACTION LINES
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(TransactionLines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransactionLines::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TransactionLines::TransactionId).uuid().not_null())
                    .col(ColumnDef::new(TransactionLines::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(TransactionLines::AccountId).uuid().not_null())
                    .col(
                        ColumnDef::new(TransactionLines::DebitMinorUnits)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TransactionLines::CreditMinorUnits)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(TransactionLines::Description).text())
                    .col(ColumnDef::new(TransactionLines::LocationId).uuid())
                    .col(ColumnDef::new(TransactionLines::DepartmentId).uuid())
                    .col(ColumnDef::new(TransactionLines::ProjectId).uuid())
                    .col(ColumnDef::new(TransactionLines::ClassId).uuid())
                    .col(ColumnDef::new(TransactionLines::SourceType).string_len(32))
                    .col(ColumnDef::new(TransactionLines::SourceId).uuid())
                    .col(ColumnDef::new(TransactionLines::LineNumber).integer().not_null())
                    .col(timestamp(TransactionLines::CreatedAt))
                    .check(
                        Expr::col(TransactionLines::DebitMinorUnits)
                            .gte(0)
                            .and(Expr::col(TransactionLines::CreditMinorUnits).gte(0)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lines_transaction")
                            .from(TransactionLines::Table, TransactionLines::TransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lines_account")
                            .from(TransactionLines::Table, TransactionLines::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_lines_transaction_number")
                    .table(TransactionLines::Table)
                    .col(TransactionLines::TransactionId)
                    .col(TransactionLines::LineNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_lines_company_account")
                    .table(TransactionLines::Table)
                    .col(TransactionLines::CompanyId)
                    .col(TransactionLines::AccountId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // ACCOUNTING PERIODS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(AccountingPeriods::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountingPeriods::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AccountingPeriods::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(AccountingPeriods::Name).string_len(64).not_null())
                    .col(
                        ColumnDef::new(AccountingPeriods::PeriodType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AccountingPeriods::StartDate).date().not_null())
                    .col(ColumnDef::new(AccountingPeriods::EndDate).date().not_null())
                    .col(flag(AccountingPeriods::IsClosed, false))
                    .col(ColumnDef::new(AccountingPeriods::ClosedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(AccountingPeriods::ClosedBy).uuid())
                    .col(ColumnDef::new(AccountingPeriods::AdjustmentTransactionId).uuid())
                    .col(timestamp(AccountingPeriods::CreatedAt))
                    .check(
                        Expr::col(AccountingPeriods::StartDate)
                            .lte(Expr::col(AccountingPeriods::EndDate)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_periods_company_start")
                    .table(AccountingPeriods::Table)
                    .col(AccountingPeriods::CompanyId)
                    .col(AccountingPeriods::StartDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // TRANSACTION NUMBER SEQUENCES
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(TransactionSequences::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TransactionSequences::CompanyId).uuid().not_null())
                    .col(
                        ColumnDef::new(TransactionSequences::FiscalYear)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionSequences::LastValue)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .primary_key(
                        Index::create()
                            .col(TransactionSequences::CompanyId)
                            .col(TransactionSequences::FiscalYear),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            TransactionSequences::Table.into_iden(),
            AccountingPeriods::Table.into_iden(),
            TransactionLines::Table.into_iden(),
            Transactions::Table.into_iden(),
            Accounts::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

fn flag<T: IntoIden>(column: T, default: bool) -> ColumnDef {
    ColumnDef::new(column)
        .boolean()
        .not_null()
        .default(default)
        .to_owned()
}

fn timestamp<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    CompanyId,
    Code,
    Name,
    AccountType,
    Subtype,
    ParentId,
    Description,
    TaxCode,
    IsBankAccount,
    TrackLocation,
    TrackDepartment,
    TrackProject,
    TrackClass,
    IsActive,
    IsSystem,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    CompanyId,
    TransactionNumber,
    Date,
    Description,
    Reference,
    TransactionType,
    Currency,
    SourceId,
    Status,
    LocationId,
    DepartmentId,
    ProjectId,
    ClassId,
    IdempotencyKey,
    PostedAt,
    PostedBy,
    ReversedTransactionId,
    ReversalReason,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TransactionLines {
    Table,
    Id,
    TransactionId,
    CompanyId,
    AccountId,
    DebitMinorUnits,
    CreditMinorUnits,
    Description,
    LocationId,
    DepartmentId,
    ProjectId,
    ClassId,
    SourceType,
    SourceId,
    LineNumber,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AccountingPeriods {
    Table,
    Id,
    CompanyId,
    Name,
    PeriodType,
    StartDate,
    EndDate,
    IsClosed,
    ClosedAt,
    ClosedBy,
    AdjustmentTransactionId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TransactionSequences {
    Table,
    CompanyId,
    FiscalYear,
    LastValue,
}
