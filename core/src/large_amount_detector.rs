//! Large-amount detection.
//!
//! The simplest of the three detectors: every event strictly above the
//! configured amount becomes its own pattern, tagged with the role and
//! location on which the customer touched the money. Both the sender and
//! the receiver of a large transaction are exposed, so a single ledger row
//! can produce one pattern for each of two customers.

use crate::config::LargeAmountParams;
use crate::error::{AmlError, AmlResult};
use crate::ledger::LedgerEvent;
use crate::pattern::{PatternDetails, SuspiciousPattern};

pub struct LargeAmountDetector {
    params: LargeAmountParams,
}

impl LargeAmountDetector {
    pub fn new(params: LargeAmountParams) -> AmlResult<Self> {
        if !(params.amount_threshold > 0.0 && params.amount_threshold.is_finite()) {
            return Err(AmlError::InvalidParameter {
                name: "large_amount.amount_threshold",
                reason: format!("must be a positive amount, got {}", params.amount_threshold),
            });
        }
        Ok(Self { params })
    }

    /// Scan one customer's events, in canonical order.
    pub fn detect(&self, events: &[LedgerEvent]) -> Vec<SuspiciousPattern> {
        let patterns: Vec<SuspiciousPattern> = events
            .iter()
            .filter(|e| e.amount > self.params.amount_threshold)
            .map(|e| SuspiciousPattern {
                customer_id: e.customer_id.clone(),
                window_start: e.time,
                window_end: e.time,
                transaction_ids: vec![e.transaction_id.clone()],
                details: PatternDetails::LargeAmount {
                    role: e.role,
                    location: e.location.clone(),
                    amount: e.amount,
                },
            })
            .collect();

        if !patterns.is_empty() {
            log::debug!(
                "large-amount: {} event(s) above {:.2}",
                patterns.len(),
                self.params.amount_threshold
            );
        }
        patterns
    }
}
