//! Report data types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use folio_shared::types::{AccountId, CompanyId, Currency, Money};

use crate::ledger::AccountType;

/// Posted activity of one account over a date range, in minor units.
///
/// Produced by the persistence layer; consumed by the trial balance and
/// by closing entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountActivity {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Whether the account is active.
    pub is_active: bool,
    /// Sum of posted debits.
    pub total_debit: i64,
    /// Sum of posted credits.
    pub total_credit: i64,
}

impl AccountActivity {
    /// Returns true if any posted amount touched the account.
    #[must_use]
    pub const fn has_activity(&self) -> bool {
        self.total_debit != 0 || self.total_credit != 0
    }
}

/// One account's line in the trial balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Total debit amount.
    pub total_debit: Money,
    /// Total credit amount.
    pub total_credit: Money,
    /// Ending balance on the account's normal side.
    pub balance: Money,
}

/// Trial balance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalance {
    /// Company the report covers.
    pub company_id: CompanyId,
    /// First day, inclusive.
    pub start_date: NaiveDate,
    /// Last day, inclusive.
    pub end_date: NaiveDate,
    /// Ledger currency.
    pub currency: Currency,
    /// Rows ordered by account code.
    pub accounts: Vec<TrialBalanceRow>,
    /// Totals.
    pub totals: TrialBalanceTotals,
}

/// Trial balance totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Total debit.
    pub total_debit: Money,
    /// Total credit.
    pub total_credit: Money,
    /// Whether debits equal credits.
    pub is_balanced: bool,
}
