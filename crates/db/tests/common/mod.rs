//! Shared fixtures for ledger integration tests.
//!
//! Every test gets its own in-memory SQLite database with the schema
//! migrated, so tests are independent and need no running server.

#![allow(dead_code)]

use chrono::NaiveDate;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use folio_core::ledger::{
    Account, AccountType, CreateAccountInput, CreateTransactionInput, DimensionFlags,
    DimensionTags, LineInput, Transaction, TransactionType,
};
use folio_db::Ledger;
use folio_db::migration::Migrator;
use folio_shared::LedgerConfig;
use folio_shared::types::{ActorId, CompanyId};

/// A migrated ledger plus the tenant and actor tests act as.
pub struct TestLedger {
    pub ledger: Ledger,
    pub db: DatabaseConnection,
    pub company: CompanyId,
    pub actor: ActorId,
}

/// A small chart of accounts covering every account type.
pub struct Chart {
    pub cash: Account,
    pub receivable: Account,
    pub payable: Account,
    pub capital: Account,
    pub revenue: Account,
    pub rent: Account,
}

pub async fn connect() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn setup() -> TestLedger {
    setup_with(LedgerConfig::default()).await
}

pub async fn setup_with(config: LedgerConfig) -> TestLedger {
    let db = connect().await;
    TestLedger {
        ledger: Ledger::new(db.clone(), config),
        db,
        company: CompanyId::new(),
        actor: ActorId::new(),
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn account_input(code: &str, name: &str, account_type: AccountType) -> CreateAccountInput {
    CreateAccountInput {
        code: code.to_string(),
        name: name.to_string(),
        account_type,
        subtype: None,
        parent_id: None,
        description: None,
        tax_code: None,
        is_bank_account: false,
        dimensions: DimensionFlags::default(),
    }
}

pub fn entry(date: NaiveDate, description: &str, lines: Vec<LineInput>) -> CreateTransactionInput {
    CreateTransactionInput {
        date,
        description: description.to_string(),
        reference: None,
        transaction_type: TransactionType::Manual,
        idempotency_key: None,
        source_id: None,
        dimensions: DimensionTags::default(),
        lines,
    }
}

impl TestLedger {
    pub async fn account(&self, code: &str, name: &str, account_type: AccountType) -> Account {
        self.ledger
            .create_account(self.company, self.actor, account_input(code, name, account_type))
            .await
            .unwrap()
    }

    pub async fn chart(&self) -> Chart {
        Chart {
            cash: self.account("1000", "Cash", AccountType::Asset).await,
            receivable: self.account("1100", "Accounts Receivable", AccountType::Asset).await,
            payable: self.account("2000", "Accounts Payable", AccountType::Liability).await,
            capital: self.account("3000", "Owner Capital", AccountType::Equity).await,
            revenue: self.account("4000", "Sales Revenue", AccountType::Revenue).await,
            rent: self.account("5000", "Rent Expense", AccountType::Expense).await,
        }
    }

    /// Creates and posts `input`, returning the posted transaction.
    pub async fn post(&self, input: CreateTransactionInput) -> Transaction {
        let created = self
            .ledger
            .create_transaction(self.company, self.actor, input)
            .await
            .unwrap();
        self.ledger
            .post_transaction(self.company, self.actor, created.transaction.id)
            .await
            .unwrap()
    }
}
