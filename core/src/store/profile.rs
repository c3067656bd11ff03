use super::AmlStore;
use crate::error::AmlResult;
use crate::risk_scorer::RiskProfile;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

/// Customer master row, as fed to the alerting collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub account_no: String,
    pub location: String,
}

impl AmlStore {
    // ── Customer ──────────────────────────────────────────────────

    pub fn upsert_customer(&self, c: &CustomerRecord) -> AmlResult<()> {
        self.conn.execute(
            "INSERT INTO customer (customer_id, name, email, phone, account_no, location)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(customer_id) DO UPDATE SET
                 name = excluded.name,
                 email = excluded.email,
                 phone = excluded.phone,
                 account_no = excluded.account_no,
                 location = excluded.location",
            params![
                &c.customer_id,
                &c.name,
                &c.email,
                &c.phone,
                &c.account_no,
                &c.location
            ],
        )?;
        Ok(())
    }

    pub fn customer_exists(&self, customer_id: &str) -> AmlResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM customer WHERE customer_id = ?1",
            params![customer_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn customer_info(&self, customer_id: &str) -> AmlResult<Option<CustomerRecord>> {
        self.conn
            .query_row(
                "SELECT customer_id, name, email, phone, account_no, location
                 FROM customer WHERE customer_id = ?1",
                params![customer_id],
                |row| {
                    Ok(CustomerRecord {
                        customer_id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                        phone: row.get(3)?,
                        account_no: row.get(4)?,
                        location: row.get(5)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    // ── Risk profile ──────────────────────────────────────────────

    /// Explicit create-if-absent. Profiles start at score zero; this is
    /// the only path that creates a risk_profile row.
    pub fn ensure_risk_profile(&self, customer_id: &str) -> AmlResult<()> {
        self.conn.execute(
            "INSERT INTO risk_profile (customer_id) VALUES (?1)
             ON CONFLICT(customer_id) DO NOTHING",
            params![customer_id],
        )?;
        Ok(())
    }

    /// Current score, or None when the customer has no profile row yet.
    pub fn risk_score(&self, customer_id: &str) -> AmlResult<Option<f64>> {
        self.conn
            .query_row(
                "SELECT risk_score FROM risk_profile WHERE customer_id = ?1",
                params![customer_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Guarded read-modify-write: succeeds only when the stored score still
    /// equals `expected`. Returns false when a concurrent writer got there
    /// first; the caller re-reads and decides whether to retry.
    pub fn compare_and_set_risk_score(
        &self,
        customer_id: &str,
        expected: f64,
        new_score: f64,
        updated_at: i64,
    ) -> AmlResult<bool> {
        let changed = self.conn.execute(
            "UPDATE risk_profile
             SET risk_score = ?1, previous_risk_score = ?2, last_updated = ?3
             WHERE customer_id = ?4 AND risk_score = ?5",
            params![new_score, expected, updated_at, customer_id, expected],
        )?;
        Ok(changed == 1)
    }

    pub fn risk_profile(&self, customer_id: &str) -> AmlResult<Option<RiskProfile>> {
        self.conn
            .query_row(
                "SELECT customer_id, risk_score, previous_risk_score, last_updated
                 FROM risk_profile WHERE customer_id = ?1",
                params![customer_id],
                risk_profile_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Highest-scored profiles first, for the end-of-run summary.
    pub fn top_risk_profiles(&self, limit: usize) -> AmlResult<Vec<RiskProfile>> {
        let mut stmt = self.conn.prepare(
            "SELECT customer_id, risk_score, previous_risk_score, last_updated
             FROM risk_profile
             ORDER BY risk_score DESC, customer_id ASC
             LIMIT ?1",
        )?;
        let profiles = stmt
            .query_map(params![limit as i64], risk_profile_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(profiles)
    }
}

fn risk_profile_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RiskProfile> {
    Ok(RiskProfile {
        customer_id: row.get(0)?,
        risk_score: row.get(1)?,
        previous_risk_score: row.get(2)?,
        last_updated: row.get(3)?,
    })
}
