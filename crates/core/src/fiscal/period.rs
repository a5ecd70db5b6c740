//! Accounting period types and rules.
//!
//! The Period Manager is the source of truth for "is this date closed".
//! Closing is strictly chronological and irreversible.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use folio_shared::types::{AccountId, ActorId, CompanyId, PeriodId, TransactionId};

use crate::ledger::LedgerError;

/// Length classification of a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    /// Calendar month.
    Month,
    /// Calendar quarter.
    Quarter,
    /// Full year.
    Year,
    /// Any other range.
    Custom,
}

impl PeriodType {
    /// Lowercase storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
            Self::Custom => "custom",
        }
    }
}

impl std::str::FromStr for PeriodType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            "year" => Ok(Self::Year),
            "custom" => Ok(Self::Custom),
            _ => Err(format!("Unknown period type: {s}")),
        }
    }
}

/// A named, non-overlapping date range per company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingPeriod {
    /// Unique identifier.
    pub id: PeriodId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Period name (e.g., "January 2026").
    pub name: String,
    /// Length classification.
    pub period_type: PeriodType,
    /// First day, inclusive.
    pub start_date: NaiveDate,
    /// Last day, inclusive.
    pub end_date: NaiveDate,
    /// Closed periods reject postings.
    pub is_closed: bool,
    /// When the period was closed.
    pub closed_at: Option<DateTime<Utc>>,
    /// Who closed the period.
    pub closed_by: Option<ActorId>,
    /// Closing-entries transaction, if one was generated.
    pub adjustment_transaction_id: Option<TransactionId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl AccountingPeriod {
    /// Returns true if transactions can be posted to this period.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !self.is_closed
    }

    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

/// Input for creating a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePeriodInput {
    /// Period name.
    pub name: String,
    /// Length classification.
    pub period_type: PeriodType,
    /// First day, inclusive.
    pub start_date: NaiveDate,
    /// Last day, inclusive.
    pub end_date: NaiveDate,
}

/// Input for closing a period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosePeriodInput {
    /// The period to close.
    pub period_id: PeriodId,
    /// Sweep revenue and expense into retained earnings before closing.
    #[serde(default)]
    pub generate_closing_entries: bool,
    /// Equity account receiving the sweep; defaults to the system account.
    pub retained_earnings_account_id: Option<AccountId>,
}

/// Validates that `start` is not after `end`. Single-day periods are allowed.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), LedgerError> {
    if start > end {
        return Err(LedgerError::InvalidDateRange { start, end });
    }
    Ok(())
}

/// Checks if two inclusive date ranges overlap.
///
/// Two ranges [a_start, a_end] and [b_start, b_end] overlap if:
/// a_start <= b_end AND a_end >= b_start
#[must_use]
pub fn date_ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// Rejects a new range that overlaps any existing period.
pub fn ensure_no_overlap(
    start: NaiveDate,
    end: NaiveDate,
    existing: &[AccountingPeriod],
) -> Result<(), LedgerError> {
    match existing
        .iter()
        .find(|p| date_ranges_overlap(start, end, p.start_date, p.end_date))
    {
        Some(p) => Err(LedgerError::OverlappingPeriod(p.name.clone())),
        None => Ok(()),
    }
}

/// Posting gate: may a transaction dated `date` be posted?
///
/// `covering` is the period containing `date`, if any. A date no period
/// covers is open.
pub fn check_posting_allowed(
    date: NaiveDate,
    covering: Option<&AccountingPeriod>,
) -> Result<(), LedgerError> {
    match covering {
        Some(period) if period.is_closed => Err(LedgerError::PeriodClosed {
            date,
            period: period.name.clone(),
        }),
        _ => Ok(()),
    }
}

/// Checks that `period` may be closed given the company's other periods.
///
/// Every period ending before `period` starts must already be closed.
pub fn validate_close(
    period: &AccountingPeriod,
    all_periods: &[AccountingPeriod],
) -> Result<(), LedgerError> {
    if period.is_closed {
        return Err(LedgerError::PeriodAlreadyClosed(period.id));
    }

    let mut earlier_open: Vec<&AccountingPeriod> = all_periods
        .iter()
        .filter(|p| p.id != period.id && p.end_date < period.start_date && !p.is_closed)
        .collect();

    if earlier_open.is_empty() {
        return Ok(());
    }

    earlier_open.sort_by_key(|p| p.start_date);
    Err(LedgerError::EarlierPeriodsOpen(
        earlier_open.into_iter().map(|p| p.name.clone()).collect(),
    ))
}

/// Generates consecutive monthly periods covering `start..=end`.
///
/// The first and last periods are clipped to `start` and `end`.
pub fn generate_monthly_periods(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<CreatePeriodInput>, LedgerError> {
    validate_date_range(start, end)?;

    let mut periods = Vec::new();
    let mut current = start;

    while current <= end {
        // Calculate period end (last day of month or range end)
        let month_end = last_day_of_month(current.year(), current.month())
            .ok_or_else(|| LedgerError::InvalidInput(format!("Date out of range: {current}")))?;
        let period_end = month_end.min(end);

        periods.push(CreatePeriodInput {
            name: format!("{} {}", month_name(current.month()), current.year()),
            period_type: PeriodType::Month,
            start_date: current,
            end_date: period_end,
        });

        match period_end.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }

    Ok(periods)
}

/// Returns the last day of a month.
#[must_use]
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    next_month?.pred_opt()
}

/// Returns month name.
#[must_use]
pub const fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::period;
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn q1(closed: [bool; 3]) -> Vec<AccountingPeriod> {
        vec![
            period("January 2026", d(2026, 1, 1), d(2026, 1, 31), closed[0]),
            period("February 2026", d(2026, 2, 1), d(2026, 2, 28), closed[1]),
            period("March 2026", d(2026, 3, 1), d(2026, 3, 31), closed[2]),
        ]
    }

    #[test]
    fn test_contains_date_is_inclusive() {
        let jan = period("January 2026", d(2026, 1, 1), d(2026, 1, 31), false);
        assert!(jan.contains_date(d(2026, 1, 1)));
        assert!(jan.contains_date(d(2026, 1, 31)));
        assert!(!jan.contains_date(d(2026, 2, 1)));
    }

    #[test]
    fn test_validate_date_range() {
        assert!(validate_date_range(d(2026, 1, 1), d(2026, 1, 1)).is_ok());
        assert!(matches!(
            validate_date_range(d(2026, 2, 1), d(2026, 1, 1)),
            Err(LedgerError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_overlap_detection() {
        let periods = q1([false; 3]);
        assert!(matches!(
            ensure_no_overlap(d(2026, 1, 15), d(2026, 2, 15), &periods),
            Err(LedgerError::OverlappingPeriod(name)) if name == "January 2026"
        ));
        assert!(ensure_no_overlap(d(2026, 4, 1), d(2026, 4, 30), &periods).is_ok());
    }

    #[test]
    fn test_posting_gate() {
        let closed = period("January 2026", d(2026, 1, 1), d(2026, 1, 31), true);
        let open = period("February 2026", d(2026, 2, 1), d(2026, 2, 28), false);
        assert!(matches!(
            check_posting_allowed(d(2026, 1, 10), Some(&closed)),
            Err(LedgerError::PeriodClosed { .. })
        ));
        assert!(check_posting_allowed(d(2026, 2, 10), Some(&open)).is_ok());
        assert!(check_posting_allowed(d(2030, 1, 1), None).is_ok());
    }

    #[test]
    fn test_close_in_order() {
        let periods = q1([true, false, false]);
        assert!(validate_close(&periods[1], &periods).is_ok());
    }

    #[test]
    fn test_close_out_of_order_names_open_periods() {
        let periods = q1([true, false, false]);
        assert!(matches!(
            validate_close(&periods[2], &periods),
            Err(LedgerError::EarlierPeriodsOpen(names))
                if names == vec!["February 2026".to_string()]
        ));
    }

    #[test]
    fn test_close_already_closed() {
        let periods = q1([true, false, false]);
        assert!(matches!(
            validate_close(&periods[0], &periods),
            Err(LedgerError::PeriodAlreadyClosed(_))
        ));
    }

    #[test]
    fn test_later_open_periods_do_not_block() {
        let periods = q1([false, false, false]);
        assert!(validate_close(&periods[0], &periods).is_ok());
    }

    #[test]
    fn test_generate_monthly_periods_calendar_year() {
        let periods = generate_monthly_periods(d(2026, 1, 1), d(2026, 12, 31)).unwrap();
        assert_eq!(periods.len(), 12);
        assert_eq!(periods[0].name, "January 2026");
        assert_eq!(periods[1].end_date, d(2026, 2, 28));
        assert_eq!(periods[11].name, "December 2026");
        assert_eq!(periods[11].end_date, d(2026, 12, 31));
    }

    #[test]
    fn test_generate_monthly_periods_clips_partial_months() {
        let periods = generate_monthly_periods(d(2026, 1, 15), d(2026, 3, 10)).unwrap();
        assert_eq!(periods.len(), 3);
        assert_eq!(periods[0].start_date, d(2026, 1, 15));
        assert_eq!(periods[1].start_date, d(2026, 2, 1));
        assert_eq!(periods[2].end_date, d(2026, 3, 10));
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2024, 2), Some(d(2024, 2, 29)));
        assert_eq!(last_day_of_month(2026, 12), Some(d(2026, 12, 31)));
        assert_eq!(month_name(13), "Unknown");
    }
}
