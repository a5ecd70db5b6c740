//! Transaction repository: drafts, posting, reversal and queries.
//!
//! Each mutating method is one unit of work. The transaction being changed
//! is locked first, then the posting gate and the Validation Engine run
//! against state read inside the same database transaction.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use folio_core::ledger::numbering::{format_transaction_number, sequence_year};
use folio_core::ledger::{
    Account, CreateTransactionInput, LedgerError, ReversalService, ReverseTransactionInput,
    Transaction, TransactionFilter, TransactionStatus, ValidationEngine, ValidationResult,
};
use folio_shared::LedgerConfig;
use folio_shared::types::{AccountId, ActorId, CompanyId, TransactionId, TransactionLineId};

use crate::entities::{transaction_lines, transaction_sequences, transactions};
use crate::mapping::stored;
use crate::unit_of_work::{self, db_err, for_update, unique_or};

use super::account::find_accounts;
use super::period::ensure_period_open;

/// A newly created draft with the Validation Engine's advisory verdict.
#[derive(Debug, Clone)]
pub struct CreatedTransaction {
    /// The stored draft.
    pub transaction: Transaction,
    /// What posting would currently report. Informational only.
    pub validation: ValidationResult,
}

/// Before/after states of a posting.
#[derive(Debug, Clone)]
pub struct PostResult {
    /// The draft.
    pub before: Transaction,
    /// The posted transaction.
    pub after: Transaction,
}

/// Reverse operation result.
#[derive(Debug, Clone)]
pub struct ReversalResult {
    /// Original before reversal (posted).
    pub before: Transaction,
    /// Original after reversal (reversed).
    pub after: Transaction,
    /// Reversing transaction (posted).
    pub reversal: Transaction,
}

/// Transaction repository for lifecycle operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
    config: LedgerConfig,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, config: LedgerConfig) -> Self {
        Self { db, config }
    }

    /// Creates a draft transaction.
    ///
    /// Drafts may be unbalanced or have fewer than two lines; the returned
    /// validation result says whether posting would currently succeed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A line has a negative amount
    /// - The idempotency key was already used
    /// - A line references an account outside the company
    pub async fn create_transaction(
        &self,
        company_id: CompanyId,
        actor_id: ActorId,
        input: CreateTransactionInput,
    ) -> Result<CreatedTransaction, LedgerError> {
        reject_negative_amounts(&input)?;

        let txn = unit_of_work::begin(&self.db).await?;

        if let Some(key) = &input.idempotency_key {
            let existing = transactions::Entity::find()
                .filter(transactions::Column::IdempotencyKey.eq(key.as_str()))
                .one(&txn)
                .await
                .map_err(db_err)?;
            if existing.is_some() {
                return Err(LedgerError::DuplicateIdempotencyKey(key.clone()));
            }
        }

        let account_ids: Vec<AccountId> = input.lines.iter().map(|l| l.account_id).collect();
        let accounts = find_accounts(&txn, company_id, &account_ids).await?;
        if let Some(missing) = account_ids.iter().find(|id| !accounts.contains_key(id)) {
            return Err(LedgerError::AccountNotFound(*missing));
        }

        let transaction = insert_transaction(
            &txn,
            company_id,
            actor_id,
            input,
            TransactionStatus::Draft,
            &self.config,
        )
        .await?;

        unit_of_work::commit(txn).await?;

        let validation = validate(&transaction, &accounts);
        Ok(CreatedTransaction {
            transaction,
            validation,
        })
    }

    /// Posts a draft transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Transaction is not found
    /// - Transaction is not a draft
    /// - Its date falls in a closed period
    /// - The Validation Engine reports any error
    pub async fn post_transaction(
        &self,
        company_id: CompanyId,
        actor_id: ActorId,
        transaction_id: TransactionId,
    ) -> Result<PostResult, LedgerError> {
        let txn = unit_of_work::begin(&self.db).await?;

        let before = load_transaction(&txn, company_id, transaction_id, true).await?;
        before.ensure_transition(TransactionStatus::Posted)?;
        ensure_period_open(&txn, company_id, before.date).await?;

        let accounts = find_accounts(&txn, company_id, &before.account_ids()).await?;
        validate(&before, &accounts).into_result()?;

        let now = stored(Utc::now());
        transactions::ActiveModel {
            id: Set(transaction_id.into_inner()),
            status: Set(TransactionStatus::Posted.as_str().to_string()),
            posted_at: Set(Some(now)),
            posted_by: Set(Some(actor_id.into_inner())),
            updated_at: Set(now),
            ..Default::default()
        }
        .update(&txn)
        .await
        .map_err(db_err)?;

        let after = load_transaction(&txn, company_id, transaction_id, false).await?;
        unit_of_work::commit(txn).await?;

        Ok(PostResult { before, after })
    }

    /// Reverses a posted transaction.
    ///
    /// Creates a posted reversal mirroring the original's lines and marks
    /// the original `reversed`, atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Transaction is not found
    /// - Transaction was already reversed, or is still a draft
    /// - The reversal date falls in a closed period
    /// - The original's lines do not balance
    pub async fn reverse_transaction(
        &self,
        company_id: CompanyId,
        actor_id: ActorId,
        input: &ReverseTransactionInput,
    ) -> Result<ReversalResult, LedgerError> {
        let txn = unit_of_work::begin(&self.db).await?;

        let before = load_transaction(&txn, company_id, input.transaction_id, true).await?;
        let reversal_input = ReversalService::create_reversal(&before, input)?;
        ensure_period_open(&txn, company_id, reversal_input.date).await?;

        let reversal = insert_transaction(
            &txn,
            company_id,
            actor_id,
            reversal_input,
            TransactionStatus::Posted,
            &self.config,
        )
        .await?;

        let accounts = find_accounts(&txn, company_id, &reversal.account_ids()).await?;
        validate(&reversal, &accounts).into_result()?;

        transactions::ActiveModel {
            id: Set(before.id.into_inner()),
            status: Set(TransactionStatus::Reversed.as_str().to_string()),
            reversed_transaction_id: Set(Some(reversal.id.into_inner())),
            reversal_reason: Set(Some(input.reason.clone())),
            updated_at: Set(stored(Utc::now())),
            ..Default::default()
        }
        .update(&txn)
        .await
        .map_err(db_err)?;

        let after = load_transaction(&txn, company_id, before.id, false).await?;
        unit_of_work::commit(txn).await?;

        Ok(ReversalResult {
            before,
            after,
            reversal,
        })
    }

    /// Gets a transaction with its lines ordered by line number.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` if it does not exist in the company.
    pub async fn get_transaction(
        &self,
        company_id: CompanyId,
        transaction_id: TransactionId,
    ) -> Result<Transaction, LedgerError> {
        load_transaction(&self.db, company_id, transaction_id, false).await
    }

    /// Lists transactions ordered by date, then number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_transactions(
        &self,
        company_id: CompanyId,
        filter: TransactionFilter,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::CompanyId.eq(company_id.into_inner()));

        if let Some(status) = filter.status {
            query = query.filter(transactions::Column::Status.eq(status.as_str()));
        }
        if let Some(from) = filter.date_from {
            query = query.filter(transactions::Column::Date.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(transactions::Column::Date.lte(to));
        }

        let headers = query
            .order_by_asc(transactions::Column::Date)
            .order_by_asc(transactions::Column::TransactionNumber)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        attach_lines(&self.db, company_id, headers).await
    }

    /// Runs the Validation Engine against a stored transaction without
    /// changing anything.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` if it does not exist in the company.
    pub async fn validate_transaction(
        &self,
        company_id: CompanyId,
        transaction_id: TransactionId,
    ) -> Result<ValidationResult, LedgerError> {
        let transaction = load_transaction(&self.db, company_id, transaction_id, false).await?;
        let accounts = find_accounts(&self.db, company_id, &transaction.account_ids()).await?;
        Ok(validate(&transaction, &accounts))
    }
}

/// Runs the Validation Engine on a stored transaction against `accounts`.
pub(crate) fn validate(
    transaction: &Transaction,
    accounts: &HashMap<AccountId, Account>,
) -> ValidationResult {
    ValidationEngine::validate(
        &transaction.validation_lines(),
        &transaction.dimensions,
        transaction.currency,
        |id| accounts.get(&id).map(Account::info),
    )
}

fn reject_negative_amounts(input: &CreateTransactionInput) -> Result<(), LedgerError> {
    for (index, line) in input.lines.iter().enumerate() {
        if line.debit < 0 || line.credit < 0 {
            return Err(LedgerError::NegativeAmount {
                line_number: line_number(index)?,
            });
        }
    }
    Ok(())
}

fn line_number(index: usize) -> Result<i32, LedgerError> {
    index
        .checked_add(1)
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| LedgerError::InvalidInput("Too many transaction lines".into()))
}

/// Inserts a transaction with a freshly allocated number.
///
/// Lines are numbered from 1 in input order.
pub(crate) async fn insert_transaction<C: ConnectionTrait>(
    conn: &C,
    company_id: CompanyId,
    actor_id: ActorId,
    input: CreateTransactionInput,
    status: TransactionStatus,
    config: &LedgerConfig,
) -> Result<Transaction, LedgerError> {
    let transaction_number = next_transaction_number(
        conn,
        company_id,
        input.date,
        config.transaction_number_width,
    )
    .await?;

    let id = TransactionId::new();
    let now = stored(Utc::now());
    let posted = status == TransactionStatus::Posted;
    let key = input.idempotency_key.clone();

    transactions::ActiveModel {
        id: Set(id.into_inner()),
        company_id: Set(company_id.into_inner()),
        transaction_number: Set(transaction_number),
        date: Set(input.date),
        description: Set(input.description),
        reference: Set(input.reference),
        transaction_type: Set(input.transaction_type.as_str().to_string()),
        currency: Set(config.currency.code().to_string()),
        source_id: Set(input.source_id),
        status: Set(status.as_str().to_string()),
        location_id: Set(input.dimensions.location_id),
        department_id: Set(input.dimensions.department_id),
        project_id: Set(input.dimensions.project_id),
        class_id: Set(input.dimensions.class_id),
        idempotency_key: Set(input.idempotency_key),
        posted_at: Set(posted.then_some(now)),
        posted_by: Set(posted.then_some(actor_id.into_inner())),
        reversed_transaction_id: Set(None),
        reversal_reason: Set(None),
        created_by: Set(Some(actor_id.into_inner())),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
    .map_err(|e| match key {
        Some(key) => unique_or(e, || LedgerError::DuplicateIdempotencyKey(key)),
        None => db_err(e),
    })?;

    let mut lines = Vec::with_capacity(input.lines.len());
    for (index, line) in input.lines.into_iter().enumerate() {
        lines.push(transaction_lines::ActiveModel {
            id: Set(TransactionLineId::new().into_inner()),
            transaction_id: Set(id.into_inner()),
            company_id: Set(company_id.into_inner()),
            account_id: Set(line.account_id.into_inner()),
            debit_minor_units: Set(line.debit),
            credit_minor_units: Set(line.credit),
            description: Set(line.description),
            location_id: Set(line.dimensions.location_id),
            department_id: Set(line.dimensions.department_id),
            project_id: Set(line.dimensions.project_id),
            class_id: Set(line.dimensions.class_id),
            source_type: Set(line.source_type),
            source_id: Set(line.source_id),
            line_number: Set(line_number(index)?),
            created_at: Set(now),
        });
    }

    if !lines.is_empty() {
        transaction_lines::Entity::insert_many(lines)
            .exec_without_returning(conn)
            .await
            .map_err(db_err)?;
    }

    load_transaction(conn, company_id, id, false).await
}

/// Allocates the next `TXN-<year>-<seq>` number for the company.
///
/// The sequence row stays locked until the surrounding unit of work ends,
/// so numbers are gap-free among committed transactions.
async fn next_transaction_number<C: ConnectionTrait>(
    conn: &C,
    company_id: CompanyId,
    date: NaiveDate,
    width: usize,
) -> Result<String, LedgerError> {
    let year = sequence_year(date);

    let current = for_update(
        transaction_sequences::Entity::find_by_id((company_id.into_inner(), year)),
        conn.get_database_backend(),
    )
    .one(conn)
    .await
    .map_err(db_err)?;

    let next = match current {
        Some(row) => {
            let next = row
                .last_value
                .checked_add(1)
                .ok_or_else(|| {
                    LedgerError::Integrity(format!("Transaction sequence exhausted for {year}"))
                })?;
            let mut active: transaction_sequences::ActiveModel = row.into();
            active.last_value = Set(next);
            active.update(conn).await.map_err(db_err)?;
            next
        }
        None => {
            transaction_sequences::Entity::insert(transaction_sequences::ActiveModel {
                company_id: Set(company_id.into_inner()),
                fiscal_year: Set(year),
                last_value: Set(1),
            })
            .exec_without_returning(conn)
            .await
            .map_err(db_err)?;
            1
        }
    };

    Ok(format_transaction_number(year, next, width))
}

/// Loads a transaction and its lines, optionally locking the header row.
pub(crate) async fn load_transaction<C: ConnectionTrait>(
    conn: &C,
    company_id: CompanyId,
    transaction_id: TransactionId,
    lock: bool,
) -> Result<Transaction, LedgerError> {
    let select = transactions::Entity::find_by_id(transaction_id.into_inner())
        .filter(transactions::Column::CompanyId.eq(company_id.into_inner()));
    let select = if lock {
        for_update(select, conn.get_database_backend())
    } else {
        select
    };

    let header = select
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or(LedgerError::TransactionNotFound(transaction_id))?;

    let lines = transaction_lines::Entity::find()
        .filter(transaction_lines::Column::CompanyId.eq(company_id.into_inner()))
        .filter(transaction_lines::Column::TransactionId.eq(transaction_id.into_inner()))
        .order_by_asc(transaction_lines::Column::LineNumber)
        .all(conn)
        .await
        .map_err(db_err)?;

    header.into_domain(lines)
}

/// Loads the lines for `headers` in one query and assembles transactions.
pub(crate) async fn attach_lines<C: ConnectionTrait>(
    conn: &C,
    company_id: CompanyId,
    headers: Vec<transactions::Model>,
) -> Result<Vec<Transaction>, LedgerError> {
    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = headers.iter().map(|h| h.id).collect();
    let mut by_transaction: HashMap<Uuid, Vec<transaction_lines::Model>> = HashMap::new();
    for line in transaction_lines::Entity::find()
        .filter(transaction_lines::Column::CompanyId.eq(company_id.into_inner()))
        .filter(transaction_lines::Column::TransactionId.is_in(ids))
        .all(conn)
        .await
        .map_err(db_err)?
    {
        by_transaction.entry(line.transaction_id).or_default().push(line);
    }

    headers
        .into_iter()
        .map(|header| {
            let lines = by_transaction.remove(&header.id).unwrap_or_default();
            header.into_domain(lines)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::ledger::{DimensionTags, LineInput, TransactionType};

    fn input(lines: Vec<LineInput>) -> CreateTransactionInput {
        CreateTransactionInput {
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            description: "Test".into(),
            reference: None,
            transaction_type: TransactionType::Manual,
            idempotency_key: None,
            source_id: None,
            dimensions: DimensionTags::default(),
            lines,
        }
    }

    #[test]
    fn test_negative_amount_names_line() {
        let cash = AccountId::new();
        let result = reject_negative_amounts(&input(vec![
            LineInput::debit(cash, 100),
            LineInput::credit(cash, -100),
        ]));
        assert!(matches!(
            result,
            Err(LedgerError::NegativeAmount { line_number: 2 })
        ));
    }

    #[test]
    fn test_unbalanced_draft_is_accepted_structurally() {
        let cash = AccountId::new();
        assert!(reject_negative_amounts(&input(vec![LineInput::debit(cash, 100)])).is_ok());
    }

    #[test]
    fn test_line_numbers_are_one_based() {
        assert_eq!(line_number(0).unwrap(), 1);
        assert_eq!(line_number(41).unwrap(), 42);
    }
}
