//! Validation Engine: pure checks over a transaction's line set.
//!
//! The same checks run when a draft is created (advisory) and when it is
//! posted (authoritative). Sums are accumulated in `i128` so a line set can
//! never overflow silently; totals that do not fit back into `i64` minor
//! units are reported as `AMOUNT_OVERFLOW`.

use serde::{Deserialize, Serialize};

use folio_shared::types::{AccountId, Currency, Money};

use super::error::LedgerError;
use super::types::{Dimension, DimensionFlags, DimensionTags};

/// Machine-readable validation issue codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    /// Fewer than two lines.
    MinLines,
    /// Debits and credits differ.
    Unbalanced,
    /// A line amount is negative.
    NegativeAmount,
    /// A line references an account outside the company.
    AccountNotFound,
    /// A line references an inactive account.
    AccountInactive,
    /// Totals do not fit in 64-bit minor units.
    AmountOverflow,
    /// A line has both a debit and a credit (warning).
    BothSides,
    /// A line has neither a debit nor a credit (warning).
    ZeroLine,
    /// A tracked dimension is missing on a line and its header (warning).
    MissingDimension,
}

impl IssueCode {
    /// Stable code string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MinLines => "MIN_LINES",
            Self::Unbalanced => "UNBALANCED",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive => "ACCOUNT_INACTIVE",
            Self::AmountOverflow => "AMOUNT_OVERFLOW",
            Self::BothSides => "BOTH_SIDES",
            Self::ZeroLine => "ZERO_LINE",
            Self::MissingDimension => "MISSING_DIMENSION",
        }
    }
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single itemized error or warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Machine-readable code.
    pub code: IssueCode,
    /// Human-readable text.
    pub message: String,
    /// Line the issue refers to, if any.
    pub line_number: Option<i32>,
}

impl ValidationIssue {
    fn new(code: IssueCode, message: impl Into<String>, line_number: Option<i32>) -> Self {
        Self {
            code,
            message: message.into(),
            line_number,
        }
    }
}

/// Structured outcome of a validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True when `errors` is empty.
    pub is_valid: bool,
    /// Blocking issues.
    pub errors: Vec<ValidationIssue>,
    /// Non-blocking issues.
    pub warnings: Vec<ValidationIssue>,
    /// Sum of line debits.
    pub total_debits: Money,
    /// Sum of line credits.
    pub total_credits: Money,
    /// `total_debits - total_credits`, signed.
    pub difference: Money,
}

impl ValidationResult {
    /// Returns true if an error with `code` is present.
    #[must_use]
    pub fn has_error(&self, code: IssueCode) -> bool {
        self.errors.iter().any(|issue| issue.code == code)
    }

    /// One-line rendering of the errors, e.g. `UNBALANCED: ...; MIN_LINES: ...`.
    #[must_use]
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|issue| format!("{}: {}", issue.code, issue.message))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Converts an invalid result into `LedgerError::ValidationFailed`.
    pub fn into_result(self) -> Result<Self, LedgerError> {
        if self.is_valid {
            Ok(self)
        } else {
            Err(LedgerError::ValidationFailed(Box::new(self)))
        }
    }
}

/// The view of a line the engine needs.
#[derive(Debug, Clone, Copy)]
pub struct ValidationLine {
    /// 1-based position in the transaction.
    pub line_number: i32,
    /// Referenced account.
    pub account_id: AccountId,
    /// Debit in minor units.
    pub debit: i64,
    /// Credit in minor units.
    pub credit: i64,
    /// Line dimension tags.
    pub dimensions: DimensionTags,
}

impl ValidationLine {
    /// A line without dimension tags.
    #[must_use]
    pub fn new(line_number: i32, account_id: AccountId, debit: i64, credit: i64) -> Self {
        Self {
            line_number,
            account_id,
            debit,
            credit,
            dimensions: DimensionTags::default(),
        }
    }
}

/// The view of an account the engine needs.
#[derive(Debug, Clone, Copy)]
pub struct AccountInfo {
    /// Whether the account accepts postings.
    pub is_active: bool,
    /// Dimensions the account tracks.
    pub dimensions: DimensionFlags,
}

/// Stateless validation service.
pub struct ValidationEngine;

impl ValidationEngine {
    /// Line count is at least 2.
    #[must_use]
    pub fn has_minimum_lines(lines: &[ValidationLine]) -> bool {
        lines.len() >= 2
    }

    /// Debits equal credits, computed in integer minor units.
    #[must_use]
    pub fn is_balanced(lines: &[ValidationLine]) -> bool {
        let (debits, credits) = Self::sums(lines);
        debits == credits
    }

    /// Runs every check, resolving accounts through `account_lookup`.
    ///
    /// `account_lookup` returns `None` for accounts that do not exist in the
    /// caller's company.
    pub fn validate<A>(
        lines: &[ValidationLine],
        header: &DimensionTags,
        currency: Currency,
        account_lookup: A,
    ) -> ValidationResult
    where
        A: Fn(AccountId) -> Option<AccountInfo>,
    {
        let mut result = Self::check_lines(lines, currency);

        for line in lines {
            let Some(account) = account_lookup(line.account_id) else {
                result.errors.push(ValidationIssue::new(
                    IssueCode::AccountNotFound,
                    format!("Account {} not found", line.account_id),
                    Some(line.line_number),
                ));
                continue;
            };

            if !account.is_active {
                result.errors.push(ValidationIssue::new(
                    IssueCode::AccountInactive,
                    format!("Account {} is inactive", line.account_id),
                    Some(line.line_number),
                ));
            }

            let effective = line.dimensions.or(*header);
            for dimension in Dimension::ALL {
                if account.dimensions.tracks(dimension) && effective.get(dimension).is_none() {
                    result.warnings.push(ValidationIssue::new(
                        IssueCode::MissingDimension,
                        format!(
                            "Account {} tracks {} but none was supplied",
                            line.account_id,
                            dimension.as_str()
                        ),
                        Some(line.line_number),
                    ));
                }
            }
        }

        result.is_valid = result.errors.is_empty();
        result
    }

    /// Structural checks that need no account data.
    #[must_use]
    pub fn check_lines(lines: &[ValidationLine], currency: Currency) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if !Self::has_minimum_lines(lines) {
            errors.push(ValidationIssue::new(
                IssueCode::MinLines,
                format!("Transaction must have at least 2 lines, found {}", lines.len()),
                None,
            ));
        }

        for line in lines {
            if line.debit < 0 || line.credit < 0 {
                errors.push(ValidationIssue::new(
                    IssueCode::NegativeAmount,
                    "Debit and credit amounts must not be negative",
                    Some(line.line_number),
                ));
            }
            if line.debit != 0 && line.credit != 0 {
                warnings.push(ValidationIssue::new(
                    IssueCode::BothSides,
                    "Line has both a debit and a credit",
                    Some(line.line_number),
                ));
            } else if line.debit == 0 && line.credit == 0 {
                warnings.push(ValidationIssue::new(
                    IssueCode::ZeroLine,
                    "Line has neither a debit nor a credit",
                    Some(line.line_number),
                ));
            }
        }

        let (debits, credits) = Self::sums(lines);
        let difference = debits - credits;

        let to_money = |value: i128| i64::try_from(value).ok().map(|v| Money::new(v, currency));
        let (total_debits, total_credits, difference_money) =
            match (to_money(debits), to_money(credits), to_money(difference)) {
                (Some(d), Some(c), Some(diff)) => (d, c, diff),
                _ => {
                    errors.push(ValidationIssue::new(
                        IssueCode::AmountOverflow,
                        "Transaction totals exceed the representable range",
                        None,
                    ));
                    (
                        Money::new(saturate(debits), currency),
                        Money::new(saturate(credits), currency),
                        Money::new(saturate(difference), currency),
                    )
                }
            };

        if difference != 0 {
            errors.push(ValidationIssue::new(
                IssueCode::Unbalanced,
                format!(
                    "Debits {total_debits} do not equal credits {total_credits} (difference {difference_money})"
                ),
                None,
            ));
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            total_debits,
            total_credits,
            difference: difference_money,
        }
    }

    fn sums(lines: &[ValidationLine]) -> (i128, i128) {
        lines.iter().fold((0_i128, 0_i128), |(d, c), line| {
            (d + i128::from(line.debit), c + i128::from(line.credit))
        })
    }
}

fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value.is_negative() { i64::MIN } else { i64::MAX })
}
