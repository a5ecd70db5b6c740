//! Property-based tests for the reversal builder.

use proptest::prelude::*;

use folio_shared::types::AccountId;

use super::reversal::ReversalService;
use super::transaction::fixtures::transaction;
use super::types::TransactionStatus;
use super::validation::{ValidationEngine, ValidationLine};

/// Strategy for generating amounts in cents.
fn arb_amount() -> impl Strategy<Value = i64> {
    1i64..100_000_000i64
}

/// Balanced `(account, debit, credit)` lines built from debit/credit pairs.
fn arb_balanced_lines() -> impl Strategy<Value = Vec<(AccountId, i64, i64)>> {
    prop::collection::vec(arb_amount(), 1..6).prop_map(|amounts| {
        amounts
            .into_iter()
            .flat_map(|amount| [(AccountId::new(), amount, 0), (AccountId::new(), 0, amount)])
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Reversal lines are the original lines with debit/credit swapped, same order.
    #[test]
    fn prop_reversal_is_pairwise_swap(lines in arb_balanced_lines()) {
        let original = transaction(TransactionStatus::Posted, &lines);
        let reversed = ReversalService::create_reversing_lines(&original);

        prop_assert_eq!(reversed.len(), original.lines.len());
        for (orig, rev) in original.lines.iter().zip(&reversed) {
            prop_assert_eq!(rev.account_id, orig.account_id);
            prop_assert_eq!(rev.debit, orig.credit);
            prop_assert_eq!(rev.credit, orig.debit);
        }
    }

    /// Original plus reversal nets to zero on every account.
    #[test]
    fn prop_original_plus_reversal_nets_to_zero(lines in arb_balanced_lines()) {
        let original = transaction(TransactionStatus::Posted, &lines);
        let reversed = ReversalService::create_reversing_lines(&original);

        for (orig, rev) in original.lines.iter().zip(&reversed) {
            prop_assert_eq!(orig.debit + rev.debit, orig.credit + rev.credit);
        }
    }

    /// Reversing a balanced transaction yields a balanced transaction.
    #[test]
    fn prop_reversal_of_balanced_is_balanced(lines in arb_balanced_lines()) {
        let original = transaction(TransactionStatus::Posted, &lines);
        let reversed: Vec<ValidationLine> = ReversalService::create_reversing_lines(&original)
            .iter()
            .enumerate()
            .map(|(i, l)| {
                ValidationLine::new(i32::try_from(i).unwrap() + 1, l.account_id, l.debit, l.credit)
            })
            .collect();

        prop_assert!(ValidationEngine::is_balanced(&reversed));
        prop_assert!(ValidationEngine::has_minimum_lines(&reversed));
    }
}
