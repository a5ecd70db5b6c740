//! End-to-end ledger scenarios: post, report, reverse, close.

mod common;

use common::{date, entry, setup};
use folio_core::fiscal::ClosePeriodInput;
use folio_core::ledger::{
    AccountPatch, AccountType, LedgerError, LineInput, ReverseTransactionInput, TransactionStatus,
};
use folio_shared::AppError;
use folio_shared::types::{Currency, Money};

fn usd(minor_units: i64) -> Money {
    Money::new(minor_units, Currency::Usd)
}

#[tokio::test]
async fn test_post_reverse_and_report() {
    let t = setup().await;
    let cash = t.account("1000", "Cash", AccountType::Asset).await;
    let revenue = t.account("4000", "Revenue", AccountType::Revenue).await;
    let day = date(2026, 3, 14);

    let original = t
        .post(entry(
            day,
            "Cash sale",
            vec![
                LineInput::debit(cash.id, 10_000),
                LineInput::credit(revenue.id, 10_000),
            ],
        ))
        .await;
    assert_eq!(original.status, TransactionStatus::Posted);

    let report = t.ledger.get_trial_balance(t.company, day, day).await.unwrap();
    assert!(report.totals.is_balanced);
    assert_eq!(report.accounts.len(), 2);
    assert_eq!(report.accounts[0].code, "1000");
    assert_eq!(report.accounts[0].balance, usd(10_000));
    assert_eq!(report.accounts[1].balance, usd(10_000));
    assert_eq!(report.totals.total_debit, usd(10_000));
    assert_eq!(report.totals.total_credit, usd(10_000));

    let result = t
        .ledger
        .reverse_transaction(
            t.company,
            t.actor,
            ReverseTransactionInput {
                transaction_id: original.id,
                reason: "Customer refund".into(),
                date: Some(date(2026, 3, 16)),
            },
        )
        .await
        .unwrap();
    assert_eq!(result.after.status, TransactionStatus::Reversed);

    let combined = t
        .ledger
        .get_trial_balance(t.company, day, date(2026, 3, 16))
        .await
        .unwrap();
    assert!(combined.totals.is_balanced);
    assert!(combined.accounts.iter().all(|row| row.balance == usd(0)));
    assert_eq!(combined.totals.total_debit, usd(20_000));
}

#[tokio::test]
async fn test_trial_balance_lists_idle_active_accounts_only() {
    let t = setup().await;
    let chart = t.chart().await;
    t.ledger
        .update_account(
            t.company,
            t.actor,
            chart.payable.id,
            AccountPatch {
                is_active: Some(false),
                ..AccountPatch::default()
            },
        )
        .await
        .unwrap();

    let report = t
        .ledger
        .get_trial_balance(t.company, date(2026, 1, 1), date(2026, 12, 31))
        .await
        .unwrap();

    let codes: Vec<&str> = report.accounts.iter().map(|row| row.code.as_str()).collect();
    assert_eq!(codes, ["1000", "1100", "3000", "4000", "5000"]);
    assert!(report.totals.is_balanced);
    assert_eq!(report.totals.total_debit, usd(0));
}

#[tokio::test]
async fn test_drafts_do_not_reach_the_trial_balance() {
    let t = setup().await;
    let chart = t.chart().await;
    t.ledger
        .create_transaction(
            t.company,
            t.actor,
            entry(
                date(2026, 1, 10),
                "Unbalanced draft",
                vec![
                    LineInput::debit(chart.cash.id, 5_000),
                    LineInput::credit(chart.revenue.id, 4_000),
                ],
            ),
        )
        .await
        .unwrap();

    let report = t
        .ledger
        .get_trial_balance(t.company, date(2026, 1, 1), date(2026, 1, 31))
        .await
        .unwrap();

    assert!(report.totals.is_balanced);
    assert_eq!(report.totals.total_debit, usd(0));
}

#[tokio::test]
async fn test_inverted_report_range_is_a_validation_error() {
    let t = setup().await;

    let err = t
        .ledger
        .get_trial_balance(t.company, date(2026, 2, 1), date(2026, 1, 1))
        .await
        .unwrap_err();

    assert!(matches!(err.to_app_error(), AppError::Validation(_)));
}

#[tokio::test]
async fn test_close_out_of_order_is_a_business_rule_error() {
    let t = setup().await;
    let periods = t
        .ledger
        .open_fiscal_year(t.company, date(2026, 1, 1), date(2026, 3, 31))
        .await
        .unwrap();
    let close = |index: usize| ClosePeriodInput {
        period_id: periods[index].id,
        generate_closing_entries: false,
        retained_earnings_account_id: None,
    };

    t.ledger
        .close_period(t.company, t.actor, close(0))
        .await
        .unwrap();
    let err = t
        .ledger
        .close_period(t.company, t.actor, close(2))
        .await
        .unwrap_err();

    assert!(matches!(&err, LedgerError::EarlierPeriodsOpen(names) if names == &["February 2026"]));
    assert!(matches!(err.to_app_error(), AppError::BusinessRule(_)));
}

#[tokio::test]
async fn test_unbalanced_post_reports_difference() {
    let t = setup().await;
    let chart = t.chart().await;
    let draft = t
        .ledger
        .create_transaction(
            t.company,
            t.actor,
            entry(
                date(2026, 1, 10),
                "Short",
                vec![
                    LineInput::debit(chart.cash.id, 5_000),
                    LineInput::credit(chart.revenue.id, 4_000),
                ],
            ),
        )
        .await
        .unwrap();

    let err = t
        .ledger
        .post_transaction(t.company, t.actor, draft.transaction.id)
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "UNBALANCED");
    assert!(matches!(err.to_app_error(), AppError::Validation(_)));
    match err {
        LedgerError::ValidationFailed(result) => assert_eq!(result.difference, usd(1_000)),
        other => panic!("expected validation failure, got {other:?}"),
    }
}
