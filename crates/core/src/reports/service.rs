//! Report generation service.

use chrono::NaiveDate;

use folio_shared::types::{CompanyId, Currency, Money};

use super::types::{AccountActivity, TrialBalance, TrialBalanceRow, TrialBalanceTotals};
use crate::ledger::LedgerError;

/// Service for generating financial reports.
pub struct ReportService;

impl ReportService {
    /// Generates a trial balance from per-account posted activity.
    ///
    /// Every active account is listed, plus inactive accounts that carry
    /// activity in the range. Balances are taken on each account's normal
    /// side.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Money` if a total overflows.
    pub fn generate_trial_balance(
        company_id: CompanyId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        currency: Currency,
        activity: Vec<AccountActivity>,
    ) -> Result<TrialBalance, LedgerError> {
        let mut accounts = Vec::with_capacity(activity.len());
        let mut total_debit = Money::zero(currency);
        let mut total_credit = Money::zero(currency);

        for account in activity {
            if !account.is_active && !account.has_activity() {
                continue;
            }
            let debit = Money::new(account.total_debit, currency);
            let credit = Money::new(account.total_credit, currency);
            let balance = account
                .account_type
                .normal_balance()
                .balance_change(account.total_debit, account.total_credit)?;

            total_debit = total_debit.checked_add(debit)?;
            total_credit = total_credit.checked_add(credit)?;

            accounts.push(TrialBalanceRow {
                account_id: account.account_id,
                code: account.code,
                name: account.name,
                account_type: account.account_type,
                total_debit: debit,
                total_credit: credit,
                balance: Money::new(balance, currency),
            });
        }

        accounts.sort_by(|a, b| a.code.cmp(&b.code));

        Ok(TrialBalance {
            company_id,
            start_date,
            end_date,
            currency,
            accounts,
            totals: TrialBalanceTotals {
                total_debit,
                total_credit,
                is_balanced: total_debit == total_credit,
            },
        })
    }
}

impl TrialBalance {
    /// Returns the report if it balances.
    ///
    /// # Errors
    ///
    /// An unbalanced trial balance over posted transactions means stored
    /// data is corrupt; this returns `LedgerError::Integrity`.
    pub fn ensure_balanced(self) -> Result<Self, LedgerError> {
        if self.totals.is_balanced {
            Ok(self)
        } else {
            Err(LedgerError::Integrity(format!(
                "Trial balance for {}..{} does not balance: debits {} vs credits {}",
                self.start_date, self.end_date, self.totals.total_debit, self.totals.total_credit
            )))
        }
    }
}
