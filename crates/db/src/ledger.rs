//! The `Ledger` facade: the operation surface external collaborators call.
//!
//! Each operation runs its repository unit of work under the configured
//! time budget, logs the outcome and, only after a successful commit,
//! publishes lifecycle events on the [`EventBus`].

use std::future::Future;
use std::time::Duration;

use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use tokio::sync::broadcast;
use tracing::{error, info, instrument, warn};

use folio_core::events::{EventBus, EventEnvelope, LedgerEvent};
use folio_core::fiscal::{AccountingPeriod, ClosePeriodInput, CreatePeriodInput};
use folio_core::ledger::{
    Account, AccountFilter, AccountPatch, CreateAccountInput, CreateTransactionInput, LedgerError,
    ReverseTransactionInput, Transaction, TransactionFilter, ValidationResult,
};
use folio_core::reports::TrialBalance;
use folio_shared::types::{AccountId, ActorId, CompanyId, PeriodId, TransactionId};
use folio_shared::{AppError, LedgerConfig};

use crate::repositories::{
    AccountRepository, ClosePeriodResult, CreatedTransaction, PeriodRepository, ReportRepository,
    ReversalResult, TransactionRepository,
};

/// Composition root for the ledger: repositories, configuration and the
/// event bus.
#[derive(Debug, Clone)]
pub struct Ledger {
    config: LedgerConfig,
    events: EventBus,
    accounts: AccountRepository,
    transactions: TransactionRepository,
    periods: PeriodRepository,
    reports: ReportRepository,
}

impl Ledger {
    /// Creates a ledger with its own event bus.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: LedgerConfig) -> Self {
        let events = EventBus::new(config.event_channel_capacity);
        Self::with_event_bus(db, config, events)
    }

    /// Creates a ledger publishing on an existing event bus.
    #[must_use]
    pub fn with_event_bus(db: DatabaseConnection, config: LedgerConfig, events: EventBus) -> Self {
        Self {
            accounts: AccountRepository::new(db.clone()),
            transactions: TransactionRepository::new(db.clone(), config.clone()),
            periods: PeriodRepository::new(db.clone(), config.clone()),
            reports: ReportRepository::new(db),
            config,
            events,
        }
    }

    /// Ledger configuration.
    #[must_use]
    pub const fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The bus lifecycle events are published on.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribes to events committed from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.events.subscribe()
    }

    // ========== Account Registry ==========

    /// Adds an account to the company's chart of accounts.
    ///
    /// Publishes `account.created`.
    #[instrument(skip_all, fields(company = %company_id, code = %input.code))]
    pub async fn create_account(
        &self,
        company_id: CompanyId,
        actor_id: ActorId,
        input: CreateAccountInput,
    ) -> Result<Account, LedgerError> {
        let account = self
            .run("create_account", self.accounts.create_account(company_id, actor_id, input))
            .await?;

        info!(account_id = %account.id, code = %account.code, "Account created");
        self.publish(
            company_id,
            actor_id,
            vec![LedgerEvent::AccountCreated {
                after: account.clone(),
            }],
        );
        Ok(account)
    }

    /// Updates an account's mutable fields.
    ///
    /// Publishes `account.updated`.
    #[instrument(skip_all, fields(company = %company_id, account = %account_id))]
    pub async fn update_account(
        &self,
        company_id: CompanyId,
        actor_id: ActorId,
        account_id: AccountId,
        patch: AccountPatch,
    ) -> Result<Account, LedgerError> {
        let (before, after) = self
            .run(
                "update_account",
                self.accounts.update_account(company_id, account_id, &patch),
            )
            .await?;

        info!(is_active = after.is_active, "Account updated");
        self.publish(
            company_id,
            actor_id,
            vec![LedgerEvent::AccountUpdated {
                before,
                after: after.clone(),
            }],
        );
        Ok(after)
    }

    /// Gets an account.
    #[instrument(skip_all, fields(company = %company_id, account = %account_id))]
    pub async fn get_account(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
    ) -> Result<Account, LedgerError> {
        self.run("get_account", self.accounts.get_account(company_id, account_id))
            .await
    }

    /// Lists accounts ordered by code.
    #[instrument(skip_all, fields(company = %company_id))]
    pub async fn list_accounts(
        &self,
        company_id: CompanyId,
        filter: AccountFilter,
    ) -> Result<Vec<Account>, LedgerError> {
        self.run("list_accounts", self.accounts.list_accounts(company_id, filter))
            .await
    }

    // ========== Transaction Engine ==========

    /// Creates a draft transaction.
    ///
    /// The returned validation result is advisory; drafts are not required
    /// to be valid.
    #[instrument(skip_all, fields(company = %company_id, lines = input.lines.len()))]
    pub async fn create_transaction(
        &self,
        company_id: CompanyId,
        actor_id: ActorId,
        input: CreateTransactionInput,
    ) -> Result<CreatedTransaction, LedgerError> {
        let created = self
            .run(
                "create_transaction",
                self.transactions
                    .create_transaction(company_id, actor_id, input),
            )
            .await?;

        info!(
            transaction_id = %created.transaction.id,
            number = %created.transaction.transaction_number,
            valid = created.validation.is_valid,
            "Draft transaction created"
        );
        Ok(created)
    }

    /// Posts a draft transaction.
    ///
    /// Publishes `transaction.posted` then `balances.updated`.
    #[instrument(skip_all, fields(company = %company_id, transaction = %transaction_id))]
    pub async fn post_transaction(
        &self,
        company_id: CompanyId,
        actor_id: ActorId,
        transaction_id: TransactionId,
    ) -> Result<Transaction, LedgerError> {
        let result = self
            .run(
                "post_transaction",
                self.transactions
                    .post_transaction(company_id, actor_id, transaction_id),
            )
            .await?;

        info!(number = %result.after.transaction_number, "Transaction posted");
        let balances = LedgerEvent::balances_updated(&result.after);
        self.publish(
            company_id,
            actor_id,
            vec![
                LedgerEvent::TransactionPosted {
                    before: Some(result.before),
                    after: result.after.clone(),
                },
                balances,
            ],
        );
        Ok(result.after)
    }

    /// Reverses a posted transaction.
    ///
    /// Publishes `transaction.posted` for the reversal, `transaction.reversed`
    /// for the original, then `balances.updated`.
    #[instrument(skip_all, fields(company = %company_id, transaction = %input.transaction_id))]
    pub async fn reverse_transaction(
        &self,
        company_id: CompanyId,
        actor_id: ActorId,
        input: ReverseTransactionInput,
    ) -> Result<ReversalResult, LedgerError> {
        let result = self
            .run(
                "reverse_transaction",
                self.transactions
                    .reverse_transaction(company_id, actor_id, &input),
            )
            .await?;

        info!(
            original = %result.after.transaction_number,
            reversal = %result.reversal.transaction_number,
            "Transaction reversed"
        );
        self.publish(
            company_id,
            actor_id,
            vec![
                LedgerEvent::TransactionPosted {
                    before: None,
                    after: result.reversal.clone(),
                },
                LedgerEvent::TransactionReversed {
                    before: result.before.clone(),
                    after: result.after.clone(),
                    reversal: result.reversal.clone(),
                },
                LedgerEvent::balances_updated(&result.reversal),
            ],
        );
        Ok(result)
    }

    /// Gets a transaction with its lines.
    #[instrument(skip_all, fields(company = %company_id, transaction = %transaction_id))]
    pub async fn get_transaction(
        &self,
        company_id: CompanyId,
        transaction_id: TransactionId,
    ) -> Result<Transaction, LedgerError> {
        self.run(
            "get_transaction",
            self.transactions.get_transaction(company_id, transaction_id),
        )
        .await
    }

    /// Lists transactions ordered by date, then number.
    #[instrument(skip_all, fields(company = %company_id))]
    pub async fn list_transactions(
        &self,
        company_id: CompanyId,
        filter: TransactionFilter,
    ) -> Result<Vec<Transaction>, LedgerError> {
        self.run(
            "list_transactions",
            self.transactions.list_transactions(company_id, filter),
        )
        .await
    }

    /// Dry-runs the Validation Engine on a stored transaction.
    #[instrument(skip_all, fields(company = %company_id, transaction = %transaction_id))]
    pub async fn validate_transaction(
        &self,
        company_id: CompanyId,
        transaction_id: TransactionId,
    ) -> Result<ValidationResult, LedgerError> {
        self.run(
            "validate_transaction",
            self.transactions
                .validate_transaction(company_id, transaction_id),
        )
        .await
    }

    // ========== Period Manager ==========

    /// Creates an accounting period.
    #[instrument(skip_all, fields(company = %company_id, name = %input.name))]
    pub async fn create_period(
        &self,
        company_id: CompanyId,
        input: CreatePeriodInput,
    ) -> Result<AccountingPeriod, LedgerError> {
        let period = self
            .run("create_period", self.periods.create_period(company_id, input))
            .await?;
        info!(period_id = %period.id, "Period created");
        Ok(period)
    }

    /// Creates monthly periods covering `start..=end`.
    #[instrument(skip_all, fields(company = %company_id, %start, %end))]
    pub async fn open_fiscal_year(
        &self,
        company_id: CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AccountingPeriod>, LedgerError> {
        let periods = self
            .run(
                "open_fiscal_year",
                self.periods.open_fiscal_year(company_id, start, end),
            )
            .await?;
        info!(count = periods.len(), "Fiscal year opened");
        Ok(periods)
    }

    /// Gets a period.
    #[instrument(skip_all, fields(company = %company_id, period = %period_id))]
    pub async fn get_period(
        &self,
        company_id: CompanyId,
        period_id: PeriodId,
    ) -> Result<AccountingPeriod, LedgerError> {
        self.run("get_period", self.periods.get_period(company_id, period_id))
            .await
    }

    /// Lists periods ordered by start date.
    #[instrument(skip_all, fields(company = %company_id))]
    pub async fn list_periods(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<AccountingPeriod>, LedgerError> {
        self.run("list_periods", self.periods.list_periods(company_id))
            .await
    }

    /// Gets the period containing `as_of`.
    #[instrument(skip_all, fields(company = %company_id, %as_of))]
    pub async fn get_current_period(
        &self,
        company_id: CompanyId,
        as_of: NaiveDate,
    ) -> Result<AccountingPeriod, LedgerError> {
        self.run(
            "get_current_period",
            self.periods.get_current_period(company_id, as_of),
        )
        .await
    }

    /// Closes a period.
    ///
    /// Publishes `account.created` if a retained-earnings account had to be
    /// created, `transaction.posted` and `balances.updated` for the closing
    /// entry if there was one, then `period.closed`.
    #[instrument(skip_all, fields(company = %company_id, period = %input.period_id))]
    pub async fn close_period(
        &self,
        company_id: CompanyId,
        actor_id: ActorId,
        input: ClosePeriodInput,
    ) -> Result<ClosePeriodResult, LedgerError> {
        let result = self
            .run(
                "close_period",
                self.periods.close_period(company_id, actor_id, &input),
            )
            .await?;

        for warning in &result.warnings {
            warn!(period = %result.after.name, "{warning}");
        }
        info!(
            period = %result.after.name,
            closing_entry = result.closing_transaction.is_some(),
            "Period closed"
        );

        let mut events = Vec::new();
        if let Some(account) = &result.created_account {
            events.push(LedgerEvent::AccountCreated {
                after: account.clone(),
            });
        }
        if let Some(closing) = &result.closing_transaction {
            events.push(LedgerEvent::TransactionPosted {
                before: None,
                after: closing.clone(),
            });
            events.push(LedgerEvent::balances_updated(closing));
        }
        events.push(LedgerEvent::PeriodClosed {
            before: result.before.clone(),
            after: result.after.clone(),
            closing_transaction_id: result.closing_transaction.as_ref().map(|t| t.id),
        });
        self.publish(company_id, actor_id, events);

        Ok(result)
    }

    // ========== Reporting Engine ==========

    /// Builds the trial balance for `start..=end`.
    #[instrument(skip_all, fields(company = %company_id, %start, %end))]
    pub async fn get_trial_balance(
        &self,
        company_id: CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TrialBalance, LedgerError> {
        self.run(
            "get_trial_balance",
            self.reports
                .trial_balance(company_id, start, end, self.config.currency),
        )
        .await
    }

    /// Runs `operation` under the unit-of-work time budget and logs failures.
    async fn run<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, LedgerError>>,
    ) -> Result<T, LedgerError> {
        let budget_ms = self.config.unit_of_work_timeout_ms;
        let result = tokio::time::timeout(Duration::from_millis(budget_ms), fut)
            .await
            .unwrap_or(Err(LedgerError::Timeout(budget_ms)));

        if let Err(err) = &result {
            log_failure(operation, err);
        }
        result
    }

    fn publish(&self, company_id: CompanyId, actor_id: ActorId, events: Vec<LedgerEvent>) {
        self.events.publish_all(
            events
                .into_iter()
                .map(|event| EventEnvelope::new(company_id, actor_id, event)),
        );
    }
}

fn log_failure(operation: &str, err: &LedgerError) {
    let code = err.error_code();
    match err.to_app_error() {
        AppError::Integrity(_) | AppError::Database(_) | AppError::Internal(_) => {
            error!(operation, code, error = %err, "Ledger operation failed");
        }
        _ => {
            warn!(operation, code, error = %err, "Ledger operation rejected");
        }
    }
}
