//! Reversal builder for undoing posted transactions.
//!
//! A reversal is a new transaction whose lines mirror the original's with
//! debit and credit swapped pairwise, in the same order. It is the only
//! sanctioned way to undo a posted transaction.

use super::error::LedgerError;
use super::transaction::Transaction;
use super::types::{
    CreateTransactionInput, LineInput, ReverseTransactionInput, TransactionStatus, TransactionType,
};
use super::validation::ValidationEngine;

/// `source_type` stamped on reversal lines.
pub const REVERSAL_SOURCE_TYPE: &str = "reversal";

/// Prefix on reversal line memos.
pub const REVERSAL_MEMO_PREFIX: &str = "Reversal: ";

/// Stateless service for building reversal transactions.
pub struct ReversalService;

impl ReversalService {
    /// Checks that `original` may be reversed.
    ///
    /// # Errors
    ///
    /// - `AlreadyReversed` if it is `reversed` or already links to a reversal
    /// - `InvalidStatusTransition` if it is still a draft
    pub fn check_reversible(original: &Transaction) -> Result<(), LedgerError> {
        if original.status == TransactionStatus::Reversed
            || original.reversed_transaction_id.is_some()
        {
            return Err(LedgerError::AlreadyReversed(original.id));
        }
        original.ensure_transition(TransactionStatus::Reversed)
    }

    /// Checks that the original's lines balance.
    ///
    /// Posted transactions always balance, so a failure here means stored
    /// data was corrupted.
    pub fn validate_reversal(original: &Transaction) -> Result<(), LedgerError> {
        if ValidationEngine::is_balanced(&original.validation_lines()) {
            Ok(())
        } else {
            Err(LedgerError::Integrity(format!(
                "Posted transaction {} does not balance",
                original.transaction_number
            )))
        }
    }

    /// Mirrors each line with debit and credit swapped.
    #[must_use]
    pub fn create_reversing_lines(original: &Transaction) -> Vec<LineInput> {
        original
            .lines
            .iter()
            .map(|line| {
                let memo = line.description.as_deref().unwrap_or(&original.description);
                LineInput {
                    account_id: line.account_id,
                    debit: line.credit,
                    credit: line.debit,
                    description: Some(format!("{REVERSAL_MEMO_PREFIX}{memo}")),
                    dimensions: line.dimensions,
                    source_type: Some(REVERSAL_SOURCE_TYPE.to_string()),
                    source_id: Some(line.id.into_inner()),
                }
            })
            .collect()
    }

    /// Builds the full reversal transaction for `original`.
    ///
    /// # Errors
    ///
    /// Fails if `original` is not reversible or does not balance.
    pub fn create_reversal(
        original: &Transaction,
        input: &ReverseTransactionInput,
    ) -> Result<CreateTransactionInput, LedgerError> {
        Self::check_reversible(original)?;
        Self::validate_reversal(original)?;

        Ok(CreateTransactionInput {
            date: input.date.unwrap_or(original.date),
            description: format!(
                "Reversal of {}. Reason: {}",
                original.transaction_number, input.reason
            ),
            reference: Some(original.transaction_number.clone()),
            transaction_type: TransactionType::Reversal,
            idempotency_key: None,
            source_id: Some(original.id.into_inner()),
            dimensions: original.dimensions,
            lines: Self::create_reversing_lines(original),
        })
    }
}
