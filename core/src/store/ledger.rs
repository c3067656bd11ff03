use super::AmlStore;
use crate::error::AmlResult;
use crate::ledger::{LedgerEvent, Role, Transaction};
use crate::types::CustomerId;
use chrono::{DateTime, Utc};
use rusqlite::params;

/// Optional predicates for ledger queries. Time bounds are inclusive;
/// `amount_above` is strict (the large-amount rule), `amount_at_most`
/// inclusive (the small-amount rule).
#[derive(Debug, Clone, Default)]
pub struct LedgerFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub amount_above: Option<f64>,
    pub amount_at_most: Option<f64>,
}

impl AmlStore {
    // ── Ledger ────────────────────────────────────────────────────

    pub fn insert_transaction(&self, t: &Transaction) -> AmlResult<()> {
        self.conn.execute(
            "INSERT INTO transactions (
                transaction_id, sender_customer_id, receiver_customer_id,
                sender_account, receiver_account,
                sender_location, receiver_location,
                time, payment_type, amount
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                &t.transaction_id,
                &t.sender_customer_id,
                &t.receiver_customer_id,
                &t.sender_account,
                &t.receiver_account,
                &t.sender_location,
                &t.receiver_location,
                t.time.timestamp(),
                &t.payment_type,
                t.amount,
            ],
        )?;
        Ok(())
    }

    /// Every customer id touched by the ledger, sorted for deterministic
    /// batch iteration.
    pub fn ledger_customer_ids(&self) -> AmlResult<Vec<CustomerId>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT customer_id FROM (
                 SELECT sender_customer_id AS customer_id FROM transactions
                 UNION
                 SELECT receiver_customer_id AS customer_id FROM transactions
             )
             ORDER BY customer_id ASC",
        )?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    /// One customer's role-tagged events in canonical order
    /// (time, transaction id, sender before receiver).
    pub fn events_for_customer(
        &self,
        customer_id: &str,
        filter: &LedgerFilter,
    ) -> AmlResult<Vec<LedgerEvent>> {
        let from = filter.from.map(|t| t.timestamp()).unwrap_or(i64::MIN);
        let to = filter.to.map(|t| t.timestamp()).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(
            "SELECT transaction_id, location, time, amount, role FROM (
                 SELECT transaction_id, sender_location AS location,
                        time, amount, 0 AS role
                 FROM transactions WHERE sender_customer_id = ?1
                 UNION ALL
                 SELECT transaction_id, receiver_location AS location,
                        time, amount, 1 AS role
                 FROM transactions WHERE receiver_customer_id = ?1
             )
             WHERE time >= ?2 AND time <= ?3
               AND (?4 IS NULL OR amount > ?4)
               AND (?5 IS NULL OR amount <= ?5)
             ORDER BY time ASC, transaction_id ASC, role ASC",
        )?;
        let events = stmt
            .query_map(
                params![customer_id, from, to, filter.amount_above, filter.amount_at_most],
                |row| {
                    Ok(LedgerEvent {
                        transaction_id: row.get(0)?,
                        customer_id: customer_id.to_string(),
                        role: if row.get::<_, i64>(4)? == 0 {
                            Role::Sender
                        } else {
                            Role::Receiver
                        },
                        location: row.get(1)?,
                        time: epoch_to_utc(row.get::<_, i64>(2)?),
                        amount: row.get(3)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }

    pub fn transaction_count(&self) -> AmlResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))
            .map_err(Into::into)
    }

    // ── Test / summary helpers ────────────────────────────────────

    pub fn transaction_ids_sorted(&self) -> AmlResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT transaction_id FROM transactions ORDER BY transaction_id ASC")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    pub fn total_ledger_amount(&self) -> AmlResult<f64> {
        self.conn
            .query_row(
                "SELECT COALESCE(SUM(amount), 0.0) FROM transactions",
                [],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}

fn epoch_to_utc(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default()
}
