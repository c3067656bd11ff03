//! Detection output records.
//!
//! Patterns are recomputed fresh on every run and handed straight to the
//! scorer and the report feed; they are never persisted.

use crate::ledger::Role;
use crate::types::{CustomerId, TransactionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of detected suspicious behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    LargeAmount,
    FrequentSmall,
    MultiLocation,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LargeAmount => "large_amount",
            Self::FrequentSmall => "frequent_small",
            Self::MultiLocation => "multi_location",
        }
    }
}

/// Type-specific aggregates carried by a pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatternDetails {
    LargeAmount {
        role: Role,
        location: String,
        amount: f64,
    },
    FrequentSmall {
        transaction_count: usize,
        total_amount: f64,
    },
    MultiLocation {
        transaction_count: usize,
        location_count: usize,
        locations: Vec<String>,
    },
}

/// One detected suspicious window (or single transaction) for one customer.
///
/// `transaction_ids` is ordered by event time (ties by id) and deduplicated;
/// it is never empty. Within one detection run no event is a member of two
/// patterns of the same type for the same customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspiciousPattern {
    pub customer_id: CustomerId,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub transaction_ids: Vec<TransactionId>,
    pub details: PatternDetails,
}

impl SuspiciousPattern {
    pub fn pattern_type(&self) -> PatternType {
        match self.details {
            PatternDetails::LargeAmount { .. } => PatternType::LargeAmount,
            PatternDetails::FrequentSmall { .. } => PatternType::FrequentSmall,
            PatternDetails::MultiLocation { .. } => PatternType::MultiLocation,
        }
    }
}
