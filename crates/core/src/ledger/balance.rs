//! Account balance calculations.
//!
//! - Asset/Expense: balance += debit - credit (debit-normal)
//! - Liability/Equity/Revenue: balance += credit - debit (credit-normal)

use serde::{Deserialize, Serialize};

use folio_shared::types::MoneyError;

use super::types::AccountType;

/// The side on which an account's balance naturally increases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Debit-normal accounts (Asset, Expense).
    Debit,
    /// Credit-normal accounts (Liability, Equity, Revenue).
    Credit,
}

impl NormalBalance {
    /// Normal side for an account type.
    #[must_use]
    pub const fn for_account_type(account_type: AccountType) -> Self {
        match account_type {
            AccountType::Asset | AccountType::Expense => Self::Debit,
            AccountType::Liability | AccountType::Equity | AccountType::Revenue => Self::Credit,
        }
    }

    /// Balance change caused by `debit` and `credit` minor units.
    pub fn balance_change(self, debit: i64, credit: i64) -> Result<i64, MoneyError> {
        match self {
            Self::Debit => debit.checked_sub(credit),
            Self::Credit => credit.checked_sub(debit),
        }
        .ok_or(MoneyError::Overflow)
    }
}

impl AccountType {
    /// Normal balance side of this account type.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        NormalBalance::for_account_type(self)
    }
}
