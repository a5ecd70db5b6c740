//! Property-based tests for period generation and closing order.

use chrono::{Datelike, Days, NaiveDate};
use proptest::prelude::*;

use super::period::fixtures::period;
use super::period::{
    AccountingPeriod, date_ranges_overlap, generate_monthly_periods, validate_close,
};
use crate::ledger::LedgerError;

/// Strategy for a date between 2000 and roughly 2040.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..15_000u64).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2000, 1, 1)
            .and_then(|d| d.checked_add_days(Days::new(offset)))
            .unwrap()
    })
}

/// Strategy for an inclusive range of up to about three years.
fn arb_range() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    (arb_date(), 0u64..1_100u64)
        .prop_map(|(start, len)| (start, start.checked_add_days(Days::new(len)).unwrap()))
}

fn consecutive_months(count: usize, closed: &[bool]) -> Vec<AccountingPeriod> {
    generate_monthly_periods(
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
    )
    .unwrap()
    .into_iter()
    .take(count)
    .zip(closed)
    .map(|(input, is_closed)| period(&input.name, input.start_date, input.end_date, *is_closed))
    .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Generated months tile the range exactly: no gaps, no overlaps.
    #[test]
    fn prop_monthly_periods_tile_range((start, end) in arb_range()) {
        let periods = generate_monthly_periods(start, end).unwrap();

        prop_assert!(!periods.is_empty());
        prop_assert_eq!(periods[0].start_date, start);
        prop_assert_eq!(periods[periods.len() - 1].end_date, end);

        for p in &periods {
            prop_assert!(p.start_date <= p.end_date);
            prop_assert_eq!(p.start_date.month(), p.end_date.month());
        }
        for pair in periods.windows(2) {
            prop_assert_eq!(pair[0].end_date.succ_opt(), Some(pair[1].start_date));
            prop_assert!(!date_ranges_overlap(
                pair[0].start_date,
                pair[0].end_date,
                pair[1].start_date,
                pair[1].end_date,
            ));
        }
    }

    /// Overlap is symmetric.
    #[test]
    fn prop_overlap_is_symmetric(a in arb_range(), b in arb_range()) {
        prop_assert_eq!(
            date_ranges_overlap(a.0, a.1, b.0, b.1),
            date_ranges_overlap(b.0, b.1, a.0, a.1)
        );
    }

    /// A period may close exactly when every earlier period is closed.
    #[test]
    fn prop_close_requires_earlier_periods_closed(
        closed in prop::collection::vec(any::<bool>(), 12),
        target in 0usize..12,
    ) {
        let mut closed = closed;
        closed[target] = false;
        let periods = consecutive_months(12, &closed);

        let result = validate_close(&periods[target], &periods);
        let earlier_open: Vec<String> = periods[..target]
            .iter()
            .filter(|p| !p.is_closed)
            .map(|p| p.name.clone())
            .collect();

        if earlier_open.is_empty() {
            prop_assert!(result.is_ok());
        } else {
            match result {
                Err(LedgerError::EarlierPeriodsOpen(names)) => prop_assert_eq!(names, earlier_open),
                other => prop_assert!(false, "unexpected result: {:?}", other),
            }
        }
    }
}
