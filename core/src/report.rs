//! The structured bundle handed to the report/alerting collaborator.
//!
//! Field names and shapes are stable regardless of which pattern types
//! fired. An empty pattern list means "no activity detected" and is a
//! normal, successful result.

use crate::pattern::SuspiciousPattern;
use crate::risk_scorer::ScoreUpdate;
use crate::store::CustomerRecord;
use crate::types::CustomerId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub previous: f64,
    pub new: f64,
    pub delta: f64,
    pub alert_triggered: bool,
}

impl From<&ScoreUpdate> for RiskSummary {
    fn from(update: &ScoreUpdate) -> Self {
        Self {
            previous: update.previous_score,
            new: update.new_score,
            delta: update.delta,
            alert_triggered: update.alert_triggered,
        }
    }
}

/// One customer's evaluated case for one detection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseReport {
    pub customer_id: CustomerId,
    pub patterns: Vec<SuspiciousPattern>,
    pub risk: RiskSummary,
    /// Contact details for the alerting collaborator; attached only when
    /// the case crossed the threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerRecord>,
}

impl CaseReport {
    pub fn new(
        customer_id: &str,
        patterns: Vec<SuspiciousPattern>,
        update: &ScoreUpdate,
    ) -> Self {
        Self {
            customer_id: customer_id.to_string(),
            patterns,
            risk: RiskSummary::from(update),
            customer: None,
        }
    }
}
