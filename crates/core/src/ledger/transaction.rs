//! Transaction aggregate.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_shared::types::{
    AccountId, ActorId, CompanyId, Currency, Money, TransactionId, TransactionLineId,
};

use super::error::LedgerError;
use super::types::{DimensionTags, TransactionStatus, TransactionType};
use super::validation::ValidationLine;

/// One leg of a transaction, amounts in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLine {
    /// Unique identifier.
    pub id: TransactionLineId,
    /// Owning transaction.
    pub transaction_id: TransactionId,
    /// Owning company, same as the transaction's.
    pub company_id: CompanyId,
    /// Referenced account.
    pub account_id: AccountId,
    /// Debit amount in minor units.
    pub debit: i64,
    /// Credit amount in minor units.
    pub credit: i64,
    /// Optional memo.
    pub description: Option<String>,
    /// Dimension tags.
    pub dimensions: DimensionTags,
    /// Provenance kind.
    pub source_type: Option<String>,
    /// Provenance id.
    pub source_id: Option<Uuid>,
    /// 1-based position within the transaction.
    pub line_number: i32,
    /// Insertion timestamp.
    pub created_at: DateTime<Utc>,
}

impl TransactionLine {
    /// The view the Validation Engine needs.
    #[must_use]
    pub const fn validation_view(&self) -> ValidationLine {
        ValidationLine {
            line_number: self.line_number,
            account_id: self.account_id,
            debit: self.debit,
            credit: self.credit,
            dimensions: self.dimensions,
        }
    }
}

/// An atomic financial event with its ordered lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier.
    pub id: TransactionId,
    /// Owning company.
    pub company_id: CompanyId,
    /// `TXN-<year>-<sequence>`, unique per company.
    pub transaction_number: String,
    /// Economic date.
    pub date: NaiveDate,
    /// Description.
    pub description: String,
    /// Optional external reference.
    pub reference: Option<String>,
    /// Transaction type.
    pub transaction_type: TransactionType,
    /// Ledger currency the amounts are denominated in.
    pub currency: Currency,
    /// Originating record (the reversed transaction, for reversals).
    pub source_id: Option<Uuid>,
    /// Lifecycle status.
    pub status: TransactionStatus,
    /// Header dimension tags.
    pub dimensions: DimensionTags,
    /// Caller-supplied resubmission key.
    pub idempotency_key: Option<String>,
    /// When the transaction was posted.
    pub posted_at: Option<DateTime<Utc>>,
    /// Who posted the transaction.
    pub posted_by: Option<ActorId>,
    /// Set on the original once a reversal exists.
    pub reversed_transaction_id: Option<TransactionId>,
    /// Reason given when reversing.
    pub reversal_reason: Option<String>,
    /// Who created the transaction.
    pub created_by: Option<ActorId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Lines ordered by `line_number`.
    pub lines: Vec<TransactionLine>,
}

impl Transaction {
    /// Lines as seen by the Validation Engine.
    #[must_use]
    pub fn validation_lines(&self) -> Vec<ValidationLine> {
        self.lines.iter().map(TransactionLine::validation_view).collect()
    }

    /// Sum of line debits.
    pub fn total_debits(&self) -> Result<Money, LedgerError> {
        self.lines.iter().try_fold(Money::zero(self.currency), |acc, line| {
            Ok(acc.checked_add(Money::new(line.debit, self.currency))?)
        })
    }

    /// Sum of line credits.
    pub fn total_credits(&self) -> Result<Money, LedgerError> {
        self.lines.iter().try_fold(Money::zero(self.currency), |acc, line| {
            Ok(acc.checked_add(Money::new(line.credit, self.currency))?)
        })
    }

    /// Distinct accounts touched, in line order.
    #[must_use]
    pub fn account_ids(&self) -> Vec<AccountId> {
        let mut ids: Vec<AccountId> = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            if !ids.contains(&line.account_id) {
                ids.push(line.account_id);
            }
        }
        ids
    }

    /// Checks that moving to `to` is a legal lifecycle step.
    pub fn ensure_transition(&self, to: TransactionStatus) -> Result<(), LedgerError> {
        if self.status.can_transition_to(to) {
            Ok(())
        } else {
            Err(LedgerError::InvalidStatusTransition {
                from: self.status,
                to,
            })
        }
    }
}
