//! Conversions between entity models and `folio-core` domain types.
//!
//! A stored value that does not parse back into its domain type means the
//! row was written outside the ledger, so it is reported as an integrity
//! error rather than a bad request.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;

use folio_core::fiscal::{AccountingPeriod, PeriodType};
use folio_core::ledger::{
    Account, AccountType, DimensionFlags, DimensionTags, LedgerError, Transaction,
    TransactionLine, TransactionStatus, TransactionType,
};
use folio_shared::types::{
    AccountId, ActorId, CompanyId, Currency, PeriodId, TransactionId, TransactionLineId,
};

use crate::entities::{accounting_periods, accounts, transaction_lines, transactions};

fn parse<T: FromStr<Err = String>>(value: &str) -> Result<T, LedgerError> {
    T::from_str(value).map_err(LedgerError::Integrity)
}

pub(crate) fn utc(value: DateTimeWithTimeZone) -> DateTime<Utc> {
    value.with_timezone(&Utc)
}

pub(crate) fn stored(value: DateTime<Utc>) -> DateTimeWithTimeZone {
    value.fixed_offset()
}

impl accounts::Model {
    /// Converts the row into an [`Account`].
    pub fn into_domain(self) -> Result<Account, LedgerError> {
        Ok(Account {
            id: AccountId::from_uuid(self.id),
            company_id: CompanyId::from_uuid(self.company_id),
            account_type: parse::<AccountType>(&self.account_type)?,
            code: self.code,
            name: self.name,
            subtype: self.subtype,
            parent_id: self.parent_id.map(AccountId::from_uuid),
            description: self.description,
            tax_code: self.tax_code,
            is_bank_account: self.is_bank_account,
            dimensions: DimensionFlags {
                track_location: self.track_location,
                track_department: self.track_department,
                track_project: self.track_project,
                track_class: self.track_class,
            },
            is_active: self.is_active,
            is_system: self.is_system,
            created_by: self.created_by.map(ActorId::from_uuid),
            created_at: utc(self.created_at),
            updated_at: utc(self.updated_at),
        })
    }
}

impl transaction_lines::Model {
    /// Converts the row into a [`TransactionLine`].
    pub fn into_domain(self) -> TransactionLine {
        TransactionLine {
            id: TransactionLineId::from_uuid(self.id),
            transaction_id: TransactionId::from_uuid(self.transaction_id),
            company_id: CompanyId::from_uuid(self.company_id),
            account_id: AccountId::from_uuid(self.account_id),
            debit: self.debit_minor_units,
            credit: self.credit_minor_units,
            description: self.description,
            dimensions: DimensionTags {
                location_id: self.location_id,
                department_id: self.department_id,
                project_id: self.project_id,
                class_id: self.class_id,
            },
            source_type: self.source_type,
            source_id: self.source_id,
            line_number: self.line_number,
            created_at: utc(self.created_at),
        }
    }
}

impl transactions::Model {
    /// Converts the header and its lines into a [`Transaction`].
    ///
    /// `lines` are sorted by line number.
    pub fn into_domain(
        self,
        lines: Vec<transaction_lines::Model>,
    ) -> Result<Transaction, LedgerError> {
        let mut lines: Vec<TransactionLine> = lines
            .into_iter()
            .map(transaction_lines::Model::into_domain)
            .collect();
        lines.sort_by_key(|line| line.line_number);

        Ok(Transaction {
            id: TransactionId::from_uuid(self.id),
            company_id: CompanyId::from_uuid(self.company_id),
            transaction_number: self.transaction_number,
            date: self.date,
            description: self.description,
            reference: self.reference,
            transaction_type: parse::<TransactionType>(&self.transaction_type)?,
            currency: parse_currency(&self.currency)?,
            source_id: self.source_id,
            status: parse::<TransactionStatus>(&self.status)?,
            dimensions: DimensionTags {
                location_id: self.location_id,
                department_id: self.department_id,
                project_id: self.project_id,
                class_id: self.class_id,
            },
            idempotency_key: self.idempotency_key,
            posted_at: self.posted_at.map(utc),
            posted_by: self.posted_by.map(ActorId::from_uuid),
            reversed_transaction_id: self.reversed_transaction_id.map(TransactionId::from_uuid),
            reversal_reason: self.reversal_reason,
            created_by: self.created_by.map(ActorId::from_uuid),
            created_at: utc(self.created_at),
            updated_at: utc(self.updated_at),
            lines,
        })
    }
}

impl accounting_periods::Model {
    /// Converts the row into an [`AccountingPeriod`].
    pub fn into_domain(self) -> Result<AccountingPeriod, LedgerError> {
        Ok(AccountingPeriod {
            id: PeriodId::from_uuid(self.id),
            company_id: CompanyId::from_uuid(self.company_id),
            period_type: parse::<PeriodType>(&self.period_type)?,
            name: self.name,
            start_date: self.start_date,
            end_date: self.end_date,
            is_closed: self.is_closed,
            closed_at: self.closed_at.map(utc),
            closed_by: self.closed_by.map(ActorId::from_uuid),
            adjustment_transaction_id: self.adjustment_transaction_id.map(TransactionId::from_uuid),
            created_at: utc(self.created_at),
        })
    }
}

fn parse_currency(code: &str) -> Result<Currency, LedgerError> {
    Currency::from_str(code)
        .map_err(|_| LedgerError::Integrity(format!("Unknown currency code: {code}")))
}
