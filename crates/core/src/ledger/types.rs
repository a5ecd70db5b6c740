//! Ledger domain types for accounts, transactions and their inputs.
//!
//! These are plain data types. Persistence lives in `folio-db`, which maps
//! its entity models to and from the types here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_shared::types::AccountId;

/// Account type classification.
///
/// Determines the normal balance side and which accounts are swept by
/// closing entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned (debit-normal).
    Asset,
    /// Obligations owed (credit-normal).
    Liability,
    /// Owners' residual interest (credit-normal).
    Equity,
    /// Income earned (credit-normal, closed to retained earnings).
    Revenue,
    /// Costs incurred (debit-normal, closed to retained earnings).
    Expense,
}

impl AccountType {
    /// Lowercase storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }

    /// Returns true for revenue and expense accounts.
    #[must_use]
    pub const fn is_temporary(self) -> bool {
        matches!(self, Self::Revenue | Self::Expense)
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "revenue" => Ok(Self::Revenue),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown account type: {s}")),
        }
    }
}

/// Transaction lifecycle status.
///
/// `Draft -> Posted -> Reversed`. No other transition exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Created, not yet economically real. May be unbalanced.
    Draft,
    /// Posted to the ledger (immutable).
    Posted,
    /// Posted and later negated by a reversal transaction (immutable).
    Reversed,
}

impl TransactionStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Draft, Self::Posted, Self::Reversed];

    /// Lowercase storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
            Self::Reversed => "reversed",
        }
    }

    /// Returns true if the transaction's lines affect balances.
    #[must_use]
    pub const fn affects_balances(self) -> bool {
        matches!(self, Self::Posted | Self::Reversed)
    }

    /// Returns true if `self -> to` is a legal lifecycle step.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Draft, Self::Posted) | (Self::Posted, Self::Reversed)
        )
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "posted" => Ok(Self::Posted),
            "reversed" => Ok(Self::Reversed),
            _ => Err(format!("Unknown transaction status: {s}")),
        }
    }
}

/// Transaction type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Manually entered journal entry.
    Manual,
    /// Adjustment entry.
    Adjustment,
    /// Imported from an external source.
    Imported,
    /// Reversal of a previously posted transaction.
    Reversal,
    /// Period-end closing entry.
    Closing,
}

impl TransactionType {
    /// Snake-case storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Adjustment => "adjustment",
            Self::Imported => "imported",
            Self::Reversal => "reversal",
            Self::Closing => "closing",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "adjustment" => Ok(Self::Adjustment),
            "imported" => Ok(Self::Imported),
            "reversal" => Ok(Self::Reversal),
            "closing" => Ok(Self::Closing),
            _ => Err(format!("Unknown transaction type: {s}")),
        }
    }
}

/// Reporting dimensions an account can require on its lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Physical or legal location.
    Location,
    /// Department or cost center.
    Department,
    /// Project.
    Project,
    /// Free-form class.
    Class,
}

impl Dimension {
    /// All dimensions in display order.
    pub const ALL: [Self; 4] = [Self::Location, Self::Department, Self::Project, Self::Class];

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Department => "department",
            Self::Project => "project",
            Self::Class => "class",
        }
    }
}

/// Optional dimension tags on a transaction header or line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionTags {
    /// Location tag.
    pub location_id: Option<Uuid>,
    /// Department tag.
    pub department_id: Option<Uuid>,
    /// Project tag.
    pub project_id: Option<Uuid>,
    /// Class tag.
    pub class_id: Option<Uuid>,
}

impl DimensionTags {
    /// Returns the tag for a dimension.
    #[must_use]
    pub const fn get(&self, dimension: Dimension) -> Option<Uuid> {
        match dimension {
            Dimension::Location => self.location_id,
            Dimension::Department => self.department_id,
            Dimension::Project => self.project_id,
            Dimension::Class => self.class_id,
        }
    }

    /// Fills every unset tag from `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            location_id: self.location_id.or(fallback.location_id),
            department_id: self.department_id.or(fallback.department_id),
            project_id: self.project_id.or(fallback.project_id),
            class_id: self.class_id.or(fallback.class_id),
        }
    }
}

/// Per-account dimension tracking flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionFlags {
    /// Lines on this account should carry a location.
    pub track_location: bool,
    /// Lines on this account should carry a department.
    pub track_department: bool,
    /// Lines on this account should carry a project.
    pub track_project: bool,
    /// Lines on this account should carry a class.
    pub track_class: bool,
}

impl DimensionFlags {
    /// Returns true if the account tracks `dimension`.
    #[must_use]
    pub const fn tracks(&self, dimension: Dimension) -> bool {
        match dimension {
            Dimension::Location => self.track_location,
            Dimension::Department => self.track_department,
            Dimension::Project => self.track_project,
            Dimension::Class => self.track_class,
        }
    }
}

/// Input for creating an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountInput {
    /// Account code, unique per company.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Optional subtype (e.g. `current_asset`).
    pub subtype: Option<String>,
    /// Optional parent; must share `account_type`.
    pub parent_id: Option<AccountId>,
    /// Free-form description.
    pub description: Option<String>,
    /// Tax code.
    pub tax_code: Option<String>,
    /// Whether this is a bank account.
    #[serde(default)]
    pub is_bank_account: bool,
    /// Dimension tracking flags.
    #[serde(default)]
    pub dimensions: DimensionFlags,
}

/// Partial update of an account's mutable fields.
///
/// `None` leaves a field unchanged. For optional fields, `Some(None)` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountPatch {
    /// New name.
    pub name: Option<String>,
    /// New subtype.
    pub subtype: Option<Option<String>>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New tax code.
    pub tax_code: Option<Option<String>>,
    /// Activate or deactivate.
    pub is_active: Option<bool>,
    /// New dimension flags.
    pub dimensions: Option<DimensionFlags>,
}

/// Filter for listing accounts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AccountFilter {
    /// Only accounts of this type.
    pub account_type: Option<AccountType>,
    /// Only active (or only inactive) accounts.
    pub is_active: Option<bool>,
}

/// Input for a single transaction line, amounts in minor units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineInput {
    /// The account to post to.
    pub account_id: AccountId,
    /// Debit amount in minor units.
    #[serde(default)]
    pub debit: i64,
    /// Credit amount in minor units.
    #[serde(default)]
    pub credit: i64,
    /// Optional memo for this line.
    pub description: Option<String>,
    /// Dimension tags for this line.
    #[serde(default)]
    pub dimensions: DimensionTags,
    /// Provenance kind (e.g. `reversal`).
    pub source_type: Option<String>,
    /// Provenance id (e.g. the mirrored line).
    pub source_id: Option<Uuid>,
}

impl LineInput {
    /// A debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: i64) -> Self {
        Self::new(account_id, amount, 0)
    }

    /// A credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: i64) -> Self {
        Self::new(account_id, 0, amount)
    }

    /// Sets the line memo.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn new(account_id: AccountId, debit: i64, credit: i64) -> Self {
        Self {
            account_id,
            debit,
            credit,
            description: None,
            dimensions: DimensionTags::default(),
            source_type: None,
            source_id: None,
        }
    }
}

/// Input for creating a draft transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionInput {
    /// Economic date of the transaction.
    pub date: NaiveDate,
    /// Description.
    pub description: String,
    /// Optional external reference.
    pub reference: Option<String>,
    /// Transaction type.
    pub transaction_type: TransactionType,
    /// Caller-supplied key that makes resubmission safe.
    pub idempotency_key: Option<String>,
    /// Originating record, e.g. an import batch or the reversed transaction.
    #[serde(default)]
    pub source_id: Option<Uuid>,
    /// Header dimension tags; lines inherit unset tags from here.
    #[serde(default)]
    pub dimensions: DimensionTags,
    /// Lines in submitted order.
    pub lines: Vec<LineInput>,
}

/// Input for reversing a posted transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReverseTransactionInput {
    /// The posted transaction to reverse.
    pub transaction_id: folio_shared::types::TransactionId,
    /// Why the transaction is being reversed.
    pub reason: String,
    /// Date for the reversal; defaults to the original date.
    pub date: Option<NaiveDate>,
}

/// Filter for listing transactions.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TransactionFilter {
    /// Only transactions in this status.
    pub status: Option<TransactionStatus>,
    /// Inclusive lower date bound.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub date_to: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_transaction_status_transitions() {
        use TransactionStatus::{Draft, Posted, Reversed};
        assert!(Draft.can_transition_to(Posted));
        assert!(Posted.can_transition_to(Reversed));
        assert!(!Draft.can_transition_to(Reversed));
        assert!(!Posted.can_transition_to(Posted));
        assert!(!Reversed.can_transition_to(Posted));
        assert!(!Reversed.can_transition_to(Draft));
    }

    #[test]
    fn test_transaction_status_affects_balances() {
        assert!(!TransactionStatus::Draft.affects_balances());
        assert!(TransactionStatus::Posted.affects_balances());
        assert!(TransactionStatus::Reversed.affects_balances());
    }

    #[test]
    fn test_account_type_round_trip_str() {
        for t in [
            AccountType::Asset,
            AccountType::Liability,
            AccountType::Equity,
            AccountType::Revenue,
            AccountType::Expense,
        ] {
            assert_eq!(AccountType::from_str(t.as_str()).unwrap(), t);
        }
        assert!(AccountType::from_str("income").is_err());
    }

    #[test]
    fn test_status_and_type_parse_storage_strings() {
        for s in TransactionStatus::ALL {
            assert_eq!(TransactionStatus::from_str(s.as_str()).unwrap(), s);
        }
        assert_eq!(TransactionType::from_str("closing").unwrap(), TransactionType::Closing);
        assert!(TransactionStatus::from_str("voided").is_err());
    }

    #[test]
    fn test_temporary_accounts() {
        assert!(AccountType::Revenue.is_temporary());
        assert!(AccountType::Expense.is_temporary());
        assert!(!AccountType::Equity.is_temporary());
    }

    #[test]
    fn test_dimension_tags_fallback() {
        let header = DimensionTags {
            project_id: Some(Uuid::nil()),
            ..DimensionTags::default()
        };
        let line = DimensionTags::default().or(header);
        assert_eq!(line.get(Dimension::Project), Some(Uuid::nil()));
        assert_eq!(line.get(Dimension::Location), None);
    }

    #[test]
    fn test_line_input_builders() {
        let account = AccountId::new();
        let debit = LineInput::debit(account, 500).with_description("Cash");
        assert_eq!((debit.debit, debit.credit), (500, 0));
        assert_eq!(debit.description.as_deref(), Some("Cash"));
        let credit = LineInput::credit(account, 500);
        assert_eq!((credit.debit, credit.credit), (0, 500));
    }
}
