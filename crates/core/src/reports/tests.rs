//! Property-based tests for reports module.

use std::collections::HashMap;

use chrono::NaiveDate;
use proptest::prelude::*;

use folio_shared::types::{AccountId, CompanyId, Currency};

use super::service::ReportService;
use super::types::AccountActivity;
use crate::ledger::AccountType;

/// Strategy for an account type.
fn arb_account_type() -> impl Strategy<Value = AccountType> {
    prop_oneof![
        Just(AccountType::Asset),
        Just(AccountType::Liability),
        Just(AccountType::Equity),
        Just(AccountType::Revenue),
        Just(AccountType::Expense),
    ]
}

/// Balanced transactions as `(debit account index, credit account index, amount)`.
fn arb_postings(accounts: usize) -> impl Strategy<Value = Vec<(usize, usize, i64)>> {
    prop::collection::vec((0..accounts, 0..accounts, 1i64..1_000_000i64), 0..40)
}

fn aggregate(types: &[AccountType], postings: &[(usize, usize, i64)]) -> Vec<AccountActivity> {
    let mut totals: HashMap<usize, (i64, i64)> = HashMap::new();
    for (debit, credit, amount) in postings {
        totals.entry(*debit).or_default().0 += amount;
        totals.entry(*credit).or_default().1 += amount;
    }
    types
        .iter()
        .enumerate()
        .map(|(i, account_type)| {
            let (total_debit, total_credit) = totals.get(&i).copied().unwrap_or_default();
            AccountActivity {
                account_id: AccountId::new(),
                code: format!("{}", 1000 + i),
                name: format!("Account {i}"),
                account_type: *account_type,
                is_active: i % 3 != 0,
                total_debit,
                total_credit,
            }
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A trial balance over balanced postings always balances.
    #[test]
    fn prop_trial_balance_of_balanced_postings_balances(
        types in prop::collection::vec(arb_account_type(), 2..12),
        seed in arb_postings(12),
    ) {
        let postings: Vec<_> = seed
            .into_iter()
            .map(|(d, c, a)| (d % types.len(), c % types.len(), a))
            .collect();
        let day = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();

        let report = ReportService::generate_trial_balance(
            CompanyId::new(), day, day, Currency::Usd, aggregate(&types, &postings),
        ).unwrap();

        prop_assert!(report.totals.is_balanced);
        let expected: i64 = postings.iter().map(|(_, _, a)| a).sum();
        prop_assert_eq!(report.totals.total_debit.minor_units, expected);
        prop_assert!(report.ensure_balanced().is_ok());
    }

    /// Row balances follow the normal side: debit-normal rows are debit - credit.
    #[test]
    fn prop_row_balance_uses_normal_side(
        account_type in arb_account_type(),
        debit in 0i64..1_000_000_000i64,
        credit in 0i64..1_000_000_000i64,
    ) {
        let day = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        let activity = vec![AccountActivity {
            account_id: AccountId::new(),
            code: "1000".into(),
            name: "Account".into(),
            account_type,
            is_active: true,
            total_debit: debit,
            total_credit: credit,
        }];
        let report = ReportService::generate_trial_balance(
            CompanyId::new(), day, day, Currency::Usd, activity,
        ).unwrap();

        let expected = match account_type {
            AccountType::Asset | AccountType::Expense => debit - credit,
            _ => credit - debit,
        };
        prop_assert_eq!(report.accounts[0].balance.minor_units, expected);
    }
}
