//! Report repository: posted activity aggregation and the trial balance.
//!
//! Reads posted state only. Lines of `reversed` originals count alongside
//! their reversals so the two net out.

use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use folio_core::fiscal::validate_date_range;
use folio_core::ledger::{LedgerError, TransactionStatus};
use folio_core::reports::{AccountActivity, ReportService, TrialBalance};
use folio_shared::types::{CompanyId, Currency, MoneyError};

use crate::entities::{accounts, transaction_lines, transactions};
use crate::unit_of_work::db_err;

/// Report repository for read-only aggregations.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Builds the trial balance for `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `start` is after `end`
    /// - Posted debits and credits differ (`Integrity`)
    /// - The database query fails
    pub async fn trial_balance(
        &self,
        company_id: CompanyId,
        start: NaiveDate,
        end: NaiveDate,
        currency: Currency,
    ) -> Result<TrialBalance, LedgerError> {
        validate_date_range(start, end)?;
        let activity = account_activity(&self.db, company_id, start, end).await?;
        ReportService::generate_trial_balance(company_id, start, end, currency, activity)?
            .ensure_balanced()
    }
}

/// Per-account posted debit and credit totals for `start..=end`.
///
/// Every account of the company is returned, with zero totals when it has
/// no activity, ordered by code.
pub(crate) async fn account_activity<C: ConnectionTrait>(
    conn: &C,
    company_id: CompanyId,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<AccountActivity>, LedgerError> {
    let lines: Vec<(uuid::Uuid, i64, i64)> = transaction_lines::Entity::find()
        .select_only()
        .column(transaction_lines::Column::AccountId)
        .column(transaction_lines::Column::DebitMinorUnits)
        .column(transaction_lines::Column::CreditMinorUnits)
        .inner_join(transactions::Entity)
        .filter(transaction_lines::Column::CompanyId.eq(company_id.into_inner()))
        .filter(
            transactions::Column::Status.is_in(
                TransactionStatus::ALL
                    .into_iter()
                    .filter(|status| status.affects_balances())
                    .map(TransactionStatus::as_str),
            ),
        )
        .filter(transactions::Column::Date.between(start, end))
        .into_tuple()
        .all(conn)
        .await
        .map_err(db_err)?;

    let mut totals: HashMap<uuid::Uuid, (i64, i64)> = HashMap::new();
    for (account_id, debit, credit) in lines {
        let entry = totals.entry(account_id).or_insert((0, 0));
        entry.0 = entry.0.checked_add(debit).ok_or(MoneyError::Overflow)?;
        entry.1 = entry.1.checked_add(credit).ok_or(MoneyError::Overflow)?;
    }

    let accounts = accounts::Entity::find()
        .filter(accounts::Column::CompanyId.eq(company_id.into_inner()))
        .order_by_asc(accounts::Column::Code)
        .all(conn)
        .await
        .map_err(db_err)?;

    accounts
        .into_iter()
        .map(|model| {
            let (total_debit, total_credit) = totals.get(&model.id).copied().unwrap_or_default();
            let account = model.into_domain()?;
            Ok(AccountActivity {
                account_id: account.id,
                code: account.code,
                name: account.name,
                account_type: account.account_type,
                is_active: account.is_active,
                total_debit,
                total_credit,
            })
        })
        .collect()
}
