//! Ledger records and the role-tagged event view.
//!
//! A transaction touches up to two customers: the sender and the receiver.
//! Every detector consumes the same role-tagged event stream, so the
//! sender/receiver split happens exactly once, here.

use crate::types::{CustomerId, TransactionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One immutable row of the transaction ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub sender_customer_id: CustomerId,
    pub receiver_customer_id: CustomerId,
    pub sender_account: String,
    pub receiver_account: String,
    pub sender_location: String,
    pub receiver_location: String,
    pub time: DateTime<Utc>,
    pub payment_type: String,
    pub amount: f64,
}

/// Which side of a transaction a customer was on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Sender,
    Receiver,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sender => "sender",
            Self::Receiver => "receiver",
        }
    }
}

/// A transaction as seen from one customer role.
///
/// A self-transfer (sender == receiver) yields two events for the same
/// customer, one per role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub transaction_id: TransactionId,
    pub customer_id: CustomerId,
    pub role: Role,
    pub location: String,
    pub time: DateTime<Utc>,
    pub amount: f64,
}

impl LedgerEvent {
    /// Canonical ordering key: time, then transaction id, then role.
    /// Timestamp ties are broken by id so every scan is deterministic.
    pub fn sort_key(&self) -> (DateTime<Utc>, &str, Role) {
        (self.time, &self.transaction_id, self.role)
    }

    pub fn cmp_by_key(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl Transaction {
    /// The role-tagged events this transaction contributes, sender first.
    pub fn events(&self) -> [LedgerEvent; 2] {
        [
            LedgerEvent {
                transaction_id: self.transaction_id.clone(),
                customer_id: self.sender_customer_id.clone(),
                role: Role::Sender,
                location: self.sender_location.clone(),
                time: self.time,
                amount: self.amount,
            },
            LedgerEvent {
                transaction_id: self.transaction_id.clone(),
                customer_id: self.receiver_customer_id.clone(),
                role: Role::Receiver,
                location: self.receiver_location.clone(),
                time: self.time,
                amount: self.amount,
            },
        ]
    }

    /// The events that belong to one customer, in canonical order.
    pub fn events_for(&self, customer_id: &str) -> Vec<LedgerEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.customer_id == customer_id)
            .collect()
    }
}

/// Sort a customer's events into canonical order.
pub fn sort_events(events: &mut [LedgerEvent]) {
    events.sort_by(|a, b| a.cmp_by_key(b));
}
