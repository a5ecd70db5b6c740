//! Accounting periods and period-end closing.

pub mod closing;
pub mod period;

#[cfg(test)]
mod period_props;

pub use closing::ClosingService;
pub use period::{
    AccountingPeriod, ClosePeriodInput, CreatePeriodInput, PeriodType, check_posting_allowed,
    date_ranges_overlap, ensure_no_overlap, generate_monthly_periods, validate_close,
    validate_date_range,
};
