//! Risk-score accumulation.
//!
//! Each detected pattern contributes a fixed weight; the sum is merged
//! into the customer's stored score with a guarded read-modify-write so
//! concurrent runs for the same customer never lose an update. The score
//! only grows unless it is explicitly reset out-of-band.

use crate::error::{AmlError, AmlResult};
use crate::pattern::{PatternType, SuspiciousPattern};
use crate::store::AmlStore;
use crate::types::CustomerId;
use chrono::Utc;
use serde::{Deserialize, Serialize};

pub const LARGE_AMOUNT_WEIGHT: f64 = 15.0;
pub const FREQUENT_SMALL_WEIGHT: f64 = 10.0;
pub const MULTI_LOCATION_WEIGHT: f64 = 20.0;

pub fn pattern_weight(pattern_type: PatternType) -> f64 {
    match pattern_type {
        PatternType::LargeAmount => LARGE_AMOUNT_WEIGHT,
        PatternType::FrequentSmall => FREQUENT_SMALL_WEIGHT,
        PatternType::MultiLocation => MULTI_LOCATION_WEIGHT,
    }
}

/// Durable per-customer risk state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskProfile {
    pub customer_id: CustomerId,
    pub risk_score: f64,
    pub previous_risk_score: f64,
    pub last_updated: i64,
}

/// Result of one scoring call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    pub customer_id: CustomerId,
    pub previous_score: f64,
    pub delta: f64,
    pub new_score: f64,
    pub alert_triggered: bool,
}

pub struct RiskScorer<'a> {
    store: &'a AmlStore,
    alert_threshold: f64,
}

impl<'a> RiskScorer<'a> {
    pub fn new(store: &'a AmlStore, alert_threshold: f64) -> AmlResult<Self> {
        if !(alert_threshold > 0.0 && alert_threshold.is_finite()) {
            return Err(AmlError::InvalidParameter {
                name: "scoring.alert_threshold",
                reason: format!("must be a positive amount, got {alert_threshold}"),
            });
        }
        Ok(Self {
            store,
            alert_threshold,
        })
    }

    /// Merge one detection run's patterns into the stored score.
    ///
    /// The customer must exist; scoring never creates profiles for unknown
    /// ids. With an empty pattern list this is a read-only evaluation:
    /// nothing is written and previous == new.
    pub fn score(
        &self,
        customer_id: &str,
        patterns: &[SuspiciousPattern],
    ) -> AmlResult<ScoreUpdate> {
        if !self.store.customer_exists(customer_id)? {
            return Err(AmlError::CustomerNotFound {
                customer_id: customer_id.to_string(),
            });
        }

        let delta: f64 = patterns
            .iter()
            .map(|p| pattern_weight(p.pattern_type()))
            .sum();

        if patterns.is_empty() {
            let current = self.store.risk_score(customer_id)?.unwrap_or(0.0);
            return Ok(ScoreUpdate {
                customer_id: customer_id.to_string(),
                previous_score: current,
                delta: 0.0,
                new_score: current,
                alert_triggered: current >= self.alert_threshold,
            });
        }

        self.store.ensure_risk_profile(customer_id)?;

        // Compare-and-set with one retry: a racing run for the same
        // customer moves the score between our read and our write.
        let mut attempts = 0;
        let (previous, new_score) = loop {
            let previous = self.store.risk_score(customer_id)?.unwrap_or(0.0);
            let new_score = previous + delta;
            let written = self.store.compare_and_set_risk_score(
                customer_id,
                previous,
                new_score,
                Utc::now().timestamp(),
            )?;
            if written {
                break (previous, new_score);
            }
            attempts += 1;
            if attempts > 1 {
                return Err(AmlError::ScoreConflict {
                    customer_id: customer_id.to_string(),
                });
            }
            log::warn!(
                "risk score for {} moved underneath us, retrying once",
                customer_id
            );
        };

        let alert_triggered = new_score >= self.alert_threshold;
        if alert_triggered {
            log::warn!(
                "customer {} crossed alert threshold: {:.1} -> {:.1} (delta {:.1})",
                customer_id,
                previous,
                new_score,
                delta
            );
        } else {
            log::debug!(
                "customer {} scored {:.1} -> {:.1} (delta {:.1})",
                customer_id,
                previous,
                new_score,
                delta
            );
        }

        Ok(ScoreUpdate {
            customer_id: customer_id.to_string(),
            previous_score: previous,
            delta,
            new_score,
            alert_triggered,
        })
    }
}
