//! Period-end closing entries.
//!
//! Zeroes each revenue and expense account's net activity for the period
//! and moves the result into a retained-earnings equity account.

use folio_shared::types::{AccountId, MoneyError};

use super::period::AccountingPeriod;
use crate::ledger::{CreateTransactionInput, DimensionTags, LedgerError, LineInput, TransactionType};
use crate::reports::AccountActivity;

/// Stateless builder for closing entries.
pub struct ClosingService;

impl ClosingService {
    /// Builds the closing lines for `activity`.
    ///
    /// Returns an empty vector when no revenue or expense account has a
    /// nonzero net balance.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Money` on overflow.
    pub fn create_closing_lines(
        activity: &[AccountActivity],
        retained_earnings: AccountId,
    ) -> Result<Vec<LineInput>, LedgerError> {
        let mut lines = Vec::new();
        // Net debit of the closing lines so far; the retained-earnings line offsets it.
        let mut net_debit: i64 = 0;

        for account in activity.iter().filter(|a| a.account_type.is_temporary()) {
            let net = checked(account.total_debit.checked_sub(account.total_credit))?;
            if net == 0 {
                continue;
            }

            let line = if net > 0 {
                LineInput::credit(account.account_id, net)
            } else {
                LineInput::debit(account.account_id, checked(net.checked_neg())?)
            };
            net_debit = checked(
                net_debit
                    .checked_add(line.debit)
                    .and_then(|v| v.checked_sub(line.credit)),
            )?;
            lines.push(line.with_description(format!("Close {} {}", account.code, account.name)));
        }

        if net_debit > 0 {
            lines.push(
                LineInput::credit(retained_earnings, net_debit)
                    .with_description("Net income to retained earnings"),
            );
        } else if net_debit < 0 {
            lines.push(
                LineInput::debit(retained_earnings, checked(net_debit.checked_neg())?)
                    .with_description("Net loss to retained earnings"),
            );
        }

        Ok(lines)
    }

    /// Builds the closing transaction for `period`, dated its last day.
    ///
    /// Returns `None` when there is nothing to close.
    pub fn create_closing_entry(
        period: &AccountingPeriod,
        activity: &[AccountActivity],
        retained_earnings: AccountId,
    ) -> Result<Option<CreateTransactionInput>, LedgerError> {
        let lines = Self::create_closing_lines(activity, retained_earnings)?;
        if lines.is_empty() {
            return Ok(None);
        }

        Ok(Some(CreateTransactionInput {
            date: period.end_date,
            description: format!("Closing entries for {}", period.name),
            reference: Some(period.name.clone()),
            transaction_type: TransactionType::Closing,
            idempotency_key: None,
            source_id: Some(period.id.into_inner()),
            dimensions: DimensionTags::default(),
            lines,
        }))
    }
}

fn checked(value: Option<i64>) -> Result<i64, LedgerError> {
    value.ok_or(LedgerError::Money(MoneyError::Overflow))
}
