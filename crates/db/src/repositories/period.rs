//! Period repository: accounting periods, the posting gate and closing.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use folio_core::fiscal::{
    AccountingPeriod, ClosePeriodInput, ClosingService, CreatePeriodInput, check_posting_allowed,
    ensure_no_overlap, generate_monthly_periods, validate_close, validate_date_range,
};
use folio_core::ledger::{Account, LedgerError, Transaction, TransactionStatus};
use folio_shared::LedgerConfig;
use folio_shared::types::{ActorId, CompanyId, PeriodId};

use crate::entities::{accounting_periods, transactions};
use crate::mapping::stored;
use crate::unit_of_work::{self, db_err, for_share, for_update};

use super::account::{find_accounts, resolve_retained_earnings};
use super::report::account_activity;
use super::transaction::{insert_transaction, validate};

/// Close operation result.
#[derive(Debug, Clone)]
pub struct ClosePeriodResult {
    /// Period before closing.
    pub before: AccountingPeriod,
    /// Period after closing.
    pub after: AccountingPeriod,
    /// Posted closing-entries transaction, when one was needed.
    pub closing_transaction: Option<Transaction>,
    /// Retained-earnings account created during the close.
    pub created_account: Option<Account>,
    /// Non-fatal findings, one per draft dated inside the period.
    pub warnings: Vec<String>,
}

/// Period repository for accounting period management.
#[derive(Debug, Clone)]
pub struct PeriodRepository {
    db: DatabaseConnection,
    config: LedgerConfig,
}

impl PeriodRepository {
    /// Creates a new period repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, config: LedgerConfig) -> Self {
        Self { db, config }
    }

    /// Creates a single period.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Start date is after end date
    /// - The range overlaps an existing period of the company
    pub async fn create_period(
        &self,
        company_id: CompanyId,
        input: CreatePeriodInput,
    ) -> Result<AccountingPeriod, LedgerError> {
        validate_date_range(input.start_date, input.end_date)?;

        let txn = unit_of_work::begin(&self.db).await?;
        let existing = load_periods(&txn, company_id).await?;
        ensure_no_overlap(input.start_date, input.end_date, &existing)?;
        let period = insert_period(&txn, company_id, input).await?;
        unit_of_work::commit(txn).await?;

        Ok(period)
    }

    /// Creates consecutive monthly periods covering `start..=end`.
    ///
    /// Periods are named like `January 2026`; the first and last are
    /// clipped to the range.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is invalid or overlaps an existing
    /// period. Nothing is created in that case.
    pub async fn open_fiscal_year(
        &self,
        company_id: CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AccountingPeriod>, LedgerError> {
        let inputs = generate_monthly_periods(start, end)?;

        let txn = unit_of_work::begin(&self.db).await?;
        let existing = load_periods(&txn, company_id).await?;
        ensure_no_overlap(start, end, &existing)?;

        let mut periods = Vec::with_capacity(inputs.len());
        for input in inputs {
            periods.push(insert_period(&txn, company_id, input).await?);
        }
        unit_of_work::commit(txn).await?;

        Ok(periods)
    }

    /// Gets a period by ID.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound` if it does not exist in the company.
    pub async fn get_period(
        &self,
        company_id: CompanyId,
        period_id: PeriodId,
    ) -> Result<AccountingPeriod, LedgerError> {
        accounting_periods::Entity::find_by_id(period_id.into_inner())
            .filter(accounting_periods::Column::CompanyId.eq(company_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::PeriodNotFound(period_id))?
            .into_domain()
    }

    /// Lists a company's periods ordered by start date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_periods(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<AccountingPeriod>, LedgerError> {
        load_periods(&self.db, company_id).await
    }

    /// Gets the period containing `as_of`.
    ///
    /// # Errors
    ///
    /// Returns `NoPeriodForDate` if no period covers the date.
    pub async fn get_current_period(
        &self,
        company_id: CompanyId,
        as_of: NaiveDate,
    ) -> Result<AccountingPeriod, LedgerError> {
        covering_period(&self.db, company_id, as_of, false)
            .await?
            .ok_or(LedgerError::NoPeriodForDate(as_of))
    }

    /// Closes a period, optionally posting closing entries first.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Period is not found or already closed
    /// - Any earlier period is still open
    /// - The requested retained-earnings account is missing or not equity
    /// - The closing entry fails validation, e.g. an inactive account
    pub async fn close_period(
        &self,
        company_id: CompanyId,
        actor_id: ActorId,
        input: &ClosePeriodInput,
    ) -> Result<ClosePeriodResult, LedgerError> {
        let txn = unit_of_work::begin(&self.db).await?;

        let before = for_update(
            accounting_periods::Entity::find_by_id(input.period_id.into_inner())
                .filter(accounting_periods::Column::CompanyId.eq(company_id.into_inner())),
            txn.get_database_backend(),
        )
        .one(&txn)
        .await
        .map_err(db_err)?
        .ok_or(LedgerError::PeriodNotFound(input.period_id))?
        .into_domain()?;

        let all_periods = load_periods(&txn, company_id).await?;
        validate_close(&before, &all_periods)?;

        let warnings = draft_warnings(&txn, company_id, &before).await?;

        let mut closing_transaction = None;
        let mut created_account = None;
        if input.generate_closing_entries {
            let activity =
                account_activity(&txn, company_id, before.start_date, before.end_date).await?;
            let has_temporary_activity = activity
                .iter()
                .any(|a| a.account_type.is_temporary() && a.total_debit != a.total_credit);

            if has_temporary_activity {
                let (retained_earnings, created) = resolve_retained_earnings(
                    &txn,
                    company_id,
                    actor_id,
                    input.retained_earnings_account_id,
                )
                .await?;
                if created {
                    created_account = Some(retained_earnings.clone());
                }

                if let Some(entry) =
                    ClosingService::create_closing_entry(&before, &activity, retained_earnings.id)?
                {
                    let closing = insert_transaction(
                        &txn,
                        company_id,
                        actor_id,
                        entry,
                        TransactionStatus::Posted,
                        &self.config,
                    )
                    .await?;
                    let accounts = find_accounts(&txn, company_id, &closing.account_ids()).await?;
                    validate(&closing, &accounts).into_result()?;
                    closing_transaction = Some(closing);
                }
            }
        }

        let now = stored(Utc::now());
        let after = accounting_periods::ActiveModel {
            id: Set(before.id.into_inner()),
            is_closed: Set(true),
            closed_at: Set(Some(now)),
            closed_by: Set(Some(actor_id.into_inner())),
            adjustment_transaction_id: Set(closing_transaction.as_ref().map(|t| t.id.into_inner())),
            ..Default::default()
        }
        .update(&txn)
        .await
        .map_err(db_err)?
        .into_domain()?;

        unit_of_work::commit(txn).await?;

        Ok(ClosePeriodResult {
            before,
            after,
            closing_transaction,
            created_account,
            warnings,
        })
    }
}

/// The posting gate: fails if `date` lies in a closed period.
///
/// The covering period row is share-locked so a concurrent close waits for
/// this unit of work.
pub(crate) async fn ensure_period_open<C: ConnectionTrait>(
    conn: &C,
    company_id: CompanyId,
    date: NaiveDate,
) -> Result<(), LedgerError> {
    let covering = covering_period(conn, company_id, date, true).await?;
    check_posting_allowed(date, covering.as_ref())
}

async fn covering_period<C: ConnectionTrait>(
    conn: &C,
    company_id: CompanyId,
    date: NaiveDate,
    lock: bool,
) -> Result<Option<AccountingPeriod>, LedgerError> {
    let select = accounting_periods::Entity::find()
        .filter(accounting_periods::Column::CompanyId.eq(company_id.into_inner()))
        .filter(accounting_periods::Column::StartDate.lte(date))
        .filter(accounting_periods::Column::EndDate.gte(date));
    let select = if lock {
        for_share(select, conn.get_database_backend())
    } else {
        select
    };

    select
        .one(conn)
        .await
        .map_err(db_err)?
        .map(accounting_periods::Model::into_domain)
        .transpose()
}

async fn load_periods<C: ConnectionTrait>(
    conn: &C,
    company_id: CompanyId,
) -> Result<Vec<AccountingPeriod>, LedgerError> {
    accounting_periods::Entity::find()
        .filter(accounting_periods::Column::CompanyId.eq(company_id.into_inner()))
        .order_by_asc(accounting_periods::Column::StartDate)
        .all(conn)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(accounting_periods::Model::into_domain)
        .collect()
}

async fn insert_period<C: ConnectionTrait>(
    conn: &C,
    company_id: CompanyId,
    input: CreatePeriodInput,
) -> Result<AccountingPeriod, LedgerError> {
    accounting_periods::ActiveModel {
        id: Set(PeriodId::new().into_inner()),
        company_id: Set(company_id.into_inner()),
        name: Set(input.name),
        period_type: Set(input.period_type.as_str().to_string()),
        start_date: Set(input.start_date),
        end_date: Set(input.end_date),
        is_closed: Set(false),
        closed_at: Set(None),
        closed_by: Set(None),
        adjustment_transaction_id: Set(None),
        created_at: Set(stored(Utc::now())),
    }
    .insert(conn)
    .await
    .map_err(db_err)?
    .into_domain()
}

/// One warning per draft dated inside `period`.
async fn draft_warnings<C: ConnectionTrait>(
    conn: &C,
    company_id: CompanyId,
    period: &AccountingPeriod,
) -> Result<Vec<String>, LedgerError> {
    let drafts = transactions::Entity::find()
        .filter(transactions::Column::CompanyId.eq(company_id.into_inner()))
        .filter(transactions::Column::Status.eq(TransactionStatus::Draft.as_str()))
        .filter(transactions::Column::Date.between(period.start_date, period.end_date))
        .order_by_asc(transactions::Column::Date)
        .order_by_asc(transactions::Column::TransactionNumber)
        .all(conn)
        .await
        .map_err(db_err)?;

    Ok(drafts
        .iter()
        .map(|draft| {
            format!(
                "Unreconciled draft {} dated {} remains in {}",
                draft.transaction_number, draft.date, period.name
            )
        })
        .collect())
}
