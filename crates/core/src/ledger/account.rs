//! Chart-of-accounts domain type and its rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_shared::types::{AccountId, ActorId, CompanyId};

use super::error::LedgerError;
use super::types::{AccountPatch, AccountType, CreateAccountInput, DimensionFlags};
use super::validation::AccountInfo;

/// Code of the system retained-earnings account used by closing entries.
pub const RETAINED_EARNINGS_CODE: &str = "3999";
/// Name of the system retained-earnings account.
pub const RETAINED_EARNINGS_NAME: &str = "Retained Earnings";
/// Subtype of the system retained-earnings account.
pub const RETAINED_EARNINGS_SUBTYPE: &str = "retained_earnings";

/// A ledger bucket in a company's chart of accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Code, unique per company.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Optional subtype.
    pub subtype: Option<String>,
    /// Optional parent of the same type.
    pub parent_id: Option<AccountId>,
    /// Free-form description.
    pub description: Option<String>,
    /// Tax code.
    pub tax_code: Option<String>,
    /// Whether this is a bank account.
    pub is_bank_account: bool,
    /// Dimension tracking flags.
    pub dimensions: DimensionFlags,
    /// Inactive accounts reject new postings.
    pub is_active: bool,
    /// Created by the ledger itself; cannot be deactivated.
    pub is_system: bool,
    /// Who created the account.
    pub created_by: Option<ActorId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// The subset the Validation Engine needs.
    #[must_use]
    pub const fn info(&self) -> AccountInfo {
        AccountInfo {
            is_active: self.is_active,
            dimensions: self.dimensions,
        }
    }

    /// Applies a patch, returning the updated account.
    ///
    /// # Errors
    ///
    /// Fails on a blank name, or when deactivating a system account.
    pub fn apply_patch(
        &self,
        patch: &AccountPatch,
        now: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        let mut next = self.clone();

        if let Some(name) = &patch.name {
            next.name = require_non_blank("name", name)?;
        }
        if let Some(subtype) = &patch.subtype {
            next.subtype.clone_from(subtype);
        }
        if let Some(description) = &patch.description {
            next.description.clone_from(description);
        }
        if let Some(tax_code) = &patch.tax_code {
            next.tax_code.clone_from(tax_code);
        }
        if let Some(dimensions) = patch.dimensions {
            next.dimensions = dimensions;
        }
        if let Some(is_active) = patch.is_active {
            if self.is_system && !is_active {
                return Err(LedgerError::SystemAccountProtected(self.id));
            }
            next.is_active = is_active;
        }

        next.updated_at = now;
        Ok(next)
    }
}

/// Validates the fields of a new account that need no lookups.
///
/// Returns the trimmed code and name.
pub fn validate_new_account(input: &CreateAccountInput) -> Result<(String, String), LedgerError> {
    let code = require_non_blank("code", &input.code)?;
    let name = require_non_blank("name", &input.name)?;
    Ok((code, name))
}

/// Checks a requested parent.
///
/// `parent` is the result of looking up `parent_id` in the same company; an
/// account in another company must be passed as `None`.
pub fn validate_parent(
    child_type: AccountType,
    parent_id: AccountId,
    parent: Option<&Account>,
) -> Result<(), LedgerError> {
    let parent = parent.ok_or(LedgerError::ParentNotFound(parent_id))?;
    if parent.account_type != child_type {
        return Err(LedgerError::ParentTypeMismatch {
            parent: parent.account_type,
            child: child_type,
        });
    }
    Ok(())
}

fn require_non_blank(field: &str, value: &str) -> Result<String, LedgerError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidInput(format!("Account {field} must not be blank")));
    }
    Ok(trimmed.to_string())
}
