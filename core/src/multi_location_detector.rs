//! Multiple-location detection.
//!
//! Groups a customer's merged sender/receiver events into sessions
//! separated by inactivity gaps, then flags sessions that are both busy
//! enough and geographically spread. Sessions partition the stream, so no
//! dedup step is needed here.

use crate::config::MultiLocationParams;
use crate::error::{AmlError, AmlResult};
use crate::ledger::LedgerEvent;
use crate::pattern::{PatternDetails, SuspiciousPattern};
use crate::window::session_windows;
use chrono::Duration;

pub struct MultiLocationDetector {
    params: MultiLocationParams,
}

impl MultiLocationDetector {
    pub fn new(params: MultiLocationParams) -> AmlResult<Self> {
        if params.min_txn_count == 0 {
            return Err(AmlError::InvalidParameter {
                name: "multi_location.min_txn_count",
                reason: "must be at least 1".into(),
            });
        }
        if params.location_threshold == 0 {
            return Err(AmlError::InvalidParameter {
                name: "multi_location.location_threshold",
                reason: "must be at least 1".into(),
            });
        }
        if params.time_window_hours <= 0 {
            return Err(AmlError::InvalidParameter {
                name: "multi_location.time_window_hours",
                reason: format!(
                    "must be a positive number of hours, got {}",
                    params.time_window_hours
                ),
            });
        }
        Ok(Self { params })
    }

    /// Scan one customer's events, in canonical order.
    pub fn detect(&self, customer_id: &str, events: &[LedgerEvent]) -> Vec<SuspiciousPattern> {
        let sessions = session_windows(events, Duration::hours(self.params.time_window_hours));

        let mut patterns = Vec::new();
        for session in sessions {
            let locations = session.distinct_locations();
            if session.event_count() >= self.params.min_txn_count
                && locations.len() >= self.params.location_threshold
            {
                patterns.push(SuspiciousPattern {
                    customer_id: customer_id.to_string(),
                    window_start: session.start(),
                    window_end: session.end(),
                    transaction_ids: session.transaction_ids(),
                    details: PatternDetails::MultiLocation {
                        transaction_count: session.event_count(),
                        location_count: locations.len(),
                        locations,
                    },
                });
            }
        }

        if !patterns.is_empty() {
            log::info!(
                "multi-location: customer {} has {} qualifying session(s)",
                customer_id,
                patterns.len()
            );
        }
        patterns
    }
}
