//! Frequent-small-transaction detection (structuring).
//!
//! Many transactions individually below the reporting radar, packed into a
//! short time window. Events at or below the amount threshold are windowed
//! with the anchored-candidate strategy; every surviving window becomes one
//! pattern.

use crate::config::FrequentSmallParams;
use crate::error::{AmlError, AmlResult};
use crate::ledger::LedgerEvent;
use crate::pattern::{PatternDetails, SuspiciousPattern};
use crate::window::anchored_windows;
use chrono::Duration;

pub struct FrequentSmallDetector {
    params: FrequentSmallParams,
}

impl FrequentSmallDetector {
    pub fn new(params: FrequentSmallParams) -> AmlResult<Self> {
        if !(params.amount_threshold > 0.0 && params.amount_threshold.is_finite()) {
            return Err(AmlError::InvalidParameter {
                name: "frequent_small.amount_threshold",
                reason: format!("must be a positive amount, got {}", params.amount_threshold),
            });
        }
        if params.count_threshold == 0 {
            return Err(AmlError::InvalidParameter {
                name: "frequent_small.count_threshold",
                reason: "must be at least 1".into(),
            });
        }
        if params.time_window_hours <= 0 {
            return Err(AmlError::InvalidParameter {
                name: "frequent_small.time_window_hours",
                reason: format!(
                    "must be a positive number of hours, got {}",
                    params.time_window_hours
                ),
            });
        }
        Ok(Self { params })
    }

    /// Scan one customer's events, in canonical order.
    ///
    /// A self-transfer contributes a sender event and a receiver event, so
    /// it counts twice toward the count threshold; the pattern's member id
    /// list still names the transaction once.
    pub fn detect(&self, customer_id: &str, events: &[LedgerEvent]) -> Vec<SuspiciousPattern> {
        let small: Vec<LedgerEvent> = events
            .iter()
            .filter(|e| e.amount <= self.params.amount_threshold)
            .cloned()
            .collect();

        let windows = anchored_windows(
            &small,
            Duration::hours(self.params.time_window_hours),
            self.params.count_threshold,
        );

        if !windows.is_empty() {
            log::info!(
                "frequent-small: customer {} has {} qualifying window(s)",
                customer_id,
                windows.len()
            );
        }

        windows
            .into_iter()
            .map(|w| SuspiciousPattern {
                customer_id: customer_id.to_string(),
                window_start: w.start(),
                window_end: w.end(),
                transaction_ids: w.transaction_ids(),
                details: PatternDetails::FrequentSmall {
                    transaction_count: w.event_count(),
                    total_amount: w.total_amount(),
                },
            })
            .collect()
    }
}
