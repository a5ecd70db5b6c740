//! Database seeder for Folio development and testing.
//!
//! Seeds a demo company with a chart of accounts, monthly periods for the
//! current year and a handful of posted transactions, then logs the
//! resulting trial balance. Running it twice leaves the data unchanged.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Utc};
use sea_orm_migration::MigratorTrait;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use folio_core::ledger::{
    AccountFilter, AccountType, CreateAccountInput, CreateTransactionInput, DimensionFlags,
    DimensionTags, LineInput, TransactionType,
};
use folio_db::Ledger;
use folio_db::migration::Migrator;
use folio_shared::AppConfig;
use folio_shared::types::{AccountId, ActorId, CompanyId};

/// Demo company (consistent for all seeds).
const DEMO_COMPANY_ID: Uuid = Uuid::from_u128(1);
/// Actor recorded on seeded rows.
const SEED_ACTOR_ID: Uuid = Uuid::from_u128(2);

const CHART: &[(&str, &str, AccountType)] = &[
    ("1000", "Cash", AccountType::Asset),
    ("1100", "Accounts Receivable", AccountType::Asset),
    ("2000", "Accounts Payable", AccountType::Liability),
    ("3000", "Owner Capital", AccountType::Equity),
    ("4000", "Sales Revenue", AccountType::Revenue),
    ("5000", "Rent Expense", AccountType::Expense),
    ("5100", "Utilities Expense", AccountType::Expense),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=info,seeder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = folio_db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    Migrator::up(&db, None).await.context("Failed to run migrations")?;
    info!("Connected and migrated");

    let ledger = Ledger::new(db, config.ledger);
    let company = CompanyId::from_uuid(DEMO_COMPANY_ID);
    let actor = ActorId::from_uuid(SEED_ACTOR_ID);

    let existing = ledger.list_accounts(company, AccountFilter::default()).await?;
    if !existing.is_empty() {
        info!(accounts = existing.len(), "Demo company already seeded, skipping");
        return Ok(());
    }

    let accounts = seed_chart(&ledger, company, actor).await?;
    let year = Utc::now().year();
    seed_periods(&ledger, company, year).await?;
    seed_transactions(&ledger, company, actor, year, &accounts).await?;

    let report = ledger
        .get_trial_balance(company, ymd(year, 1, 1)?, ymd(year, 12, 31)?)
        .await?;
    for row in &report.accounts {
        info!(code = %row.code, name = %row.name, balance = %row.balance, "Trial balance");
    }
    info!(
        debits = %report.totals.total_debit,
        credits = %report.totals.total_credit,
        "Seeding complete"
    );

    Ok(())
}

async fn seed_chart(
    ledger: &Ledger,
    company: CompanyId,
    actor: ActorId,
) -> anyhow::Result<Vec<AccountId>> {
    let mut ids = Vec::with_capacity(CHART.len());
    for &(code, name, account_type) in CHART {
        let account = ledger
            .create_account(
                company,
                actor,
                CreateAccountInput {
                    code: code.to_string(),
                    name: name.to_string(),
                    account_type,
                    subtype: None,
                    parent_id: None,
                    description: None,
                    tax_code: None,
                    is_bank_account: code == "1000",
                    dimensions: DimensionFlags::default(),
                },
            )
            .await?;
        ids.push(account.id);
    }
    info!(count = ids.len(), "Seeded chart of accounts");
    Ok(ids)
}

async fn seed_periods(ledger: &Ledger, company: CompanyId, year: i32) -> anyhow::Result<()> {
    let periods = ledger
        .open_fiscal_year(company, ymd(year, 1, 1)?, ymd(year, 12, 31)?)
        .await?;
    info!(count = periods.len(), year, "Seeded accounting periods");
    Ok(())
}

async fn seed_transactions(
    ledger: &Ledger,
    company: CompanyId,
    actor: ActorId,
    year: i32,
    accounts: &[AccountId],
) -> anyhow::Result<()> {
    let &[cash, receivable, payable, capital, revenue, rent, utilities] = accounts else {
        anyhow::bail!("Unexpected chart size {}", accounts.len());
    };

    let entries = [
        ("Owner investment", 1, vec![
            LineInput::debit(cash, 5_000_000),
            LineInput::credit(capital, 5_000_000),
        ]),
        ("January consulting invoice", 15, vec![
            LineInput::debit(receivable, 1_200_000),
            LineInput::credit(revenue, 1_200_000),
        ]),
        ("January rent", 28, vec![
            LineInput::debit(rent, 300_000),
            LineInput::credit(cash, 300_000),
        ]),
        ("Electricity bill", 30, vec![
            LineInput::debit(utilities, 45_000),
            LineInput::credit(payable, 45_000),
        ]),
    ];

    for (description, day, lines) in entries {
        let created = ledger
            .create_transaction(
                company,
                actor,
                CreateTransactionInput {
                    date: ymd(year, 1, day)?,
                    description: description.to_string(),
                    reference: None,
                    transaction_type: TransactionType::Manual,
                    idempotency_key: Some(format!("seed-{year}-{day}")),
                    source_id: None,
                    dimensions: DimensionTags::default(),
                    lines,
                },
            )
            .await?;
        ledger
            .post_transaction(company, actor, created.transaction.id)
            .await?;
    }
    info!("Seeded January transactions");
    Ok(())
}

fn ymd(year: i32, month: u32, day: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .with_context(|| format!("Invalid date {year}-{month}-{day}"))
}
