//! Ledger lifecycle events and the in-process event bus.
//!
//! Events carry before/after snapshots so subscribers can write an audit
//! entry without reading the store again. The bus is owned by whoever
//! composes the ledger and is only published to after a commit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use folio_shared::types::{AccountId, ActorId, CompanyId, TransactionId};

use crate::fiscal::AccountingPeriod;
use crate::ledger::{Account, Transaction};

/// A ledger state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// An account was added to the chart of accounts.
    AccountCreated {
        /// The new account.
        after: Account,
    },
    /// An account's mutable fields changed.
    AccountUpdated {
        /// State before the patch.
        before: Account,
        /// State after the patch.
        after: Account,
    },
    /// A transaction moved to `posted`.
    ///
    /// Reversal and closing transactions are created directly as posted and
    /// carry no `before` snapshot.
    TransactionPosted {
        /// The draft, when there was one.
        before: Option<Transaction>,
        /// The posted transaction.
        after: Transaction,
    },
    /// A posted transaction was reversed.
    TransactionReversed {
        /// Original before reversal.
        before: Transaction,
        /// Original after reversal.
        after: Transaction,
        /// The reversing transaction.
        reversal: Transaction,
    },
    /// Posted activity changed these accounts' balances.
    BalancesUpdated {
        /// Transaction that caused the change.
        transaction_id: TransactionId,
        /// Distinct affected accounts, in line order.
        account_ids: Vec<AccountId>,
    },
    /// An accounting period was closed.
    PeriodClosed {
        /// Period before closing.
        before: AccountingPeriod,
        /// Period after closing.
        after: AccountingPeriod,
        /// Closing transaction, if one was generated.
        closing_transaction_id: Option<TransactionId>,
    },
}

impl LedgerEvent {
    /// Dotted event name, e.g. `transaction.posted`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AccountCreated { .. } => "account.created",
            Self::AccountUpdated { .. } => "account.updated",
            Self::TransactionPosted { .. } => "transaction.posted",
            Self::TransactionReversed { .. } => "transaction.reversed",
            Self::BalancesUpdated { .. } => "balances.updated",
            Self::PeriodClosed { .. } => "period.closed",
        }
    }

    /// `balances.updated` for a transaction that just took effect.
    #[must_use]
    pub fn balances_updated(transaction: &Transaction) -> Self {
        Self::BalancesUpdated {
            transaction_id: transaction.id,
            account_ids: transaction.account_ids(),
        }
    }
}

/// Event plus delivery metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique, time-ordered event id.
    pub id: Uuid,
    /// Same as `payload.name()`.
    pub name: String,
    /// When the event was raised.
    pub occurred_at: DateTime<Utc>,
    /// Owning company.
    pub company_id: CompanyId,
    /// Actor that caused the change.
    pub actor_id: ActorId,
    /// The event itself.
    pub payload: LedgerEvent,
}

impl EventEnvelope {
    /// Wraps `payload` with a fresh id and timestamp.
    #[must_use]
    pub fn new(company_id: CompanyId, actor_id: ActorId, payload: LedgerEvent) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: payload.name().to_string(),
            occurred_at: Utc::now(),
            company_id,
            actor_id,
            payload,
        }
    }
}

/// Broadcast channel for ledger events.
///
/// Cloning shares the underlying channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events per subscriber.
    ///
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribes to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }

    /// Publishes `envelope` and returns how many subscribers received it.
    ///
    /// Zero subscribers is not an error.
    pub fn publish(&self, envelope: EventEnvelope) -> usize {
        self.tx.send(envelope).unwrap_or(0)
    }

    /// Publishes a batch in order.
    pub fn publish_all(&self, envelopes: impl IntoIterator<Item = EventEnvelope>) {
        for envelope in envelopes {
            self.publish(envelope);
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::TransactionStatus;
    use crate::ledger::transaction::fixtures::transaction;

    fn posted_event() -> LedgerEvent {
        LedgerEvent::TransactionPosted {
            before: None,
            after: transaction(
                TransactionStatus::Posted,
                &[(AccountId::new(), 100, 0), (AccountId::new(), 0, 100)],
            ),
        }
    }

    #[test]
    fn test_event_names() {
        assert_eq!(posted_event().name(), "transaction.posted");
        let event = LedgerEvent::BalancesUpdated {
            transaction_id: TransactionId::new(),
            account_ids: vec![],
        };
        assert_eq!(event.name(), "balances.updated");
    }

    #[test]
    fn test_balances_updated_lists_distinct_accounts() {
        let cash = AccountId::new();
        let revenue = AccountId::new();
        let txn = transaction(
            TransactionStatus::Posted,
            &[(cash, 100, 0), (revenue, 0, 60), (revenue, 0, 40)],
        );
        match LedgerEvent::balances_updated(&txn) {
            LedgerEvent::BalancesUpdated { transaction_id, account_ids } => {
                assert_eq!(transaction_id, txn.id);
                assert_eq!(account_ids, vec![cash, revenue]);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_envelope_serializes_with_tag() {
        let envelope = EventEnvelope::new(CompanyId::new(), ActorId::new(), posted_event());
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["name"], "transaction.posted");
        assert_eq!(json["payload"]["type"], "transaction_posted");
        assert!(json["payload"]["before"].is_null());
    }

    #[test]
    fn test_publish_without_subscribers_is_ok() {
        let bus = EventBus::new(4);
        let envelope = EventEnvelope::new(CompanyId::new(), ActorId::new(), posted_event());
        assert_eq!(bus.publish(envelope), 0);
    }

    #[tokio::test]
    async fn test_subscribers_receive_in_order() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let company = CompanyId::new();
        let actor = ActorId::new();
        let txn = transaction(TransactionStatus::Posted, &[(AccountId::new(), 1, 0)]);

        bus.publish_all([
            EventEnvelope::new(company, actor, posted_event()),
            EventEnvelope::new(company, actor, LedgerEvent::balances_updated(&txn)),
        ]);

        assert_eq!(rx.recv().await.unwrap().name, "transaction.posted");
        let second = rx.recv().await.unwrap();
        assert_eq!(second.name, "balances.updated");
        assert_eq!(second.company_id, company);
    }
}
