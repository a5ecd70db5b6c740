//! Property-based tests for the Validation Engine.

use proptest::prelude::*;

use folio_shared::types::{AccountId, Currency};

use super::validation::{IssueCode, ValidationEngine, ValidationLine};

/// Strategy to generate a valid positive amount in cents (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = i64> {
    1i64..100_000_000i64
}

/// Builds a balanced line set: each amount is debited on one line and
/// credited on another.
fn balanced_lines(amounts: &[i64]) -> Vec<ValidationLine> {
    let mut lines = Vec::with_capacity(amounts.len() * 2);
    for amount in amounts {
        let n = i32::try_from(lines.len()).unwrap() + 1;
        lines.push(ValidationLine::new(n, AccountId::new(), *amount, 0));
        lines.push(ValidationLine::new(n + 1, AccountId::new(), 0, *amount));
    }
    lines
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Mirrored debit/credit pairs always balance.
    #[test]
    fn prop_mirrored_lines_balance(amounts in prop::collection::vec(positive_amount(), 1..20)) {
        let lines = balanced_lines(&amounts);
        let result = ValidationEngine::check_lines(&lines, Currency::Usd);

        prop_assert!(ValidationEngine::is_balanced(&lines));
        prop_assert!(result.is_valid, "unexpected errors: {:?}", result.errors);
        prop_assert!(result.difference.is_zero());
        prop_assert_eq!(result.total_debits, result.total_credits);
    }

    /// Any nonzero skew shows up as UNBALANCED with exactly that difference.
    #[test]
    fn prop_skew_is_reported_exactly(
        amounts in prop::collection::vec(positive_amount(), 1..20),
        skew in prop_oneof![1i64..1_000_000i64, -1_000_000i64..-1i64],
    ) {
        let mut lines = balanced_lines(&amounts);
        if skew > 0 {
            lines[0].debit += skew;
        } else {
            lines[1].credit += -skew;
        }
        let result = ValidationEngine::check_lines(&lines, Currency::Usd);

        prop_assert!(!ValidationEngine::is_balanced(&lines));
        prop_assert!(result.has_error(IssueCode::Unbalanced));
        prop_assert_eq!(result.difference.minor_units, skew);
    }

    /// A single line never passes, whatever its amount.
    #[test]
    fn prop_single_line_rejected(amount in positive_amount(), debit_side in any::<bool>()) {
        let line = if debit_side {
            ValidationLine::new(1, AccountId::new(), amount, 0)
        } else {
            ValidationLine::new(1, AccountId::new(), 0, amount)
        };
        let result = ValidationEngine::check_lines(&[line], Currency::Usd);

        prop_assert!(!ValidationEngine::has_minimum_lines(&[line]));
        prop_assert!(result.has_error(IssueCode::MinLines));
    }

    /// Validity is exactly the absence of errors.
    #[test]
    fn prop_is_valid_iff_no_errors(
        debits in prop::collection::vec(0i64..10_000i64, 0..6),
        credits in prop::collection::vec(0i64..10_000i64, 0..6),
    ) {
        let mut lines = Vec::new();
        for (i, d) in debits.iter().enumerate() {
            lines.push(ValidationLine::new(i32::try_from(i).unwrap() + 1, AccountId::new(), *d, 0));
        }
        for c in &credits {
            let n = i32::try_from(lines.len()).unwrap() + 1;
            lines.push(ValidationLine::new(n, AccountId::new(), 0, *c));
        }
        let result = ValidationEngine::check_lines(&lines, Currency::Usd);

        prop_assert_eq!(result.is_valid, result.errors.is_empty());
        let expected = debits.iter().sum::<i64>() - credits.iter().sum::<i64>();
        prop_assert_eq!(result.difference.minor_units, expected);
    }
}
