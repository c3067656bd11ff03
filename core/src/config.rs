//! Detection configuration.
//!
//! All thresholds live in one JSON document so a run is reproducible from
//! its config file. Every section has serde defaults; `validate()` runs
//! before any query is issued.

use crate::error::{AmlError, AmlResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LargeAmountParams {
    /// Transactions strictly above this amount are flagged, on both the
    /// sender and the receiver side.
    pub amount_threshold: f64,
}

impl Default for LargeAmountParams {
    fn default() -> Self {
        Self {
            amount_threshold: 5000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequentSmallParams {
    /// Maximum amount for a transaction to count as small.
    pub amount_threshold: f64,
    /// Minimum member events for a window to be suspicious.
    pub count_threshold: usize,
    /// Width of each candidate window.
    pub time_window_hours: i64,
}

impl Default for FrequentSmallParams {
    fn default() -> Self {
        Self {
            amount_threshold: 1000.0,
            count_threshold: 3,
            time_window_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiLocationParams {
    /// Minimum member events for a session to be suspicious.
    pub min_txn_count: usize,
    /// Minimum distinct locations for a session to be suspicious.
    pub location_threshold: usize,
    /// Inactivity gap that closes a session.
    pub time_window_hours: i64,
}

impl Default for MultiLocationParams {
    fn default() -> Self {
        Self {
            min_txn_count: 3,
            location_threshold: 2,
            time_window_hours: 48,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringParams {
    /// A customer whose updated score reaches this value (inclusive) is
    /// alerted.
    pub alert_threshold: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            alert_threshold: 50.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    #[serde(default)]
    pub large_amount: LargeAmountParams,
    #[serde(default)]
    pub frequent_small: FrequentSmallParams,
    #[serde(default)]
    pub multi_location: MultiLocationParams,
    #[serde(default)]
    pub scoring: ScoringParams,
    /// Size of the detection worker pool. 1 = fully sequential.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_workers() -> usize {
    1
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            large_amount: LargeAmountParams::default(),
            frequent_small: FrequentSmallParams::default(),
            multi_location: MultiLocationParams::default(),
            scoring: ScoringParams::default(),
            workers: default_workers(),
        }
    }
}

impl DetectionConfig {
    pub fn load(path: &Path) -> AmlResult<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {e}", path.display()))?;
        let config: DetectionConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject unusable parameters before touching the store.
    pub fn validate(&self) -> AmlResult<()> {
        fn positive_amount(name: &'static str, value: f64) -> AmlResult<()> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(AmlError::InvalidParameter {
                    name,
                    reason: format!("must be a positive amount, got {value}"),
                })
            }
        }
        fn positive_count(name: &'static str, value: usize) -> AmlResult<()> {
            if value > 0 {
                Ok(())
            } else {
                Err(AmlError::InvalidParameter {
                    name,
                    reason: "must be at least 1".into(),
                })
            }
        }
        fn positive_hours(name: &'static str, value: i64) -> AmlResult<()> {
            if value > 0 {
                Ok(())
            } else {
                Err(AmlError::InvalidParameter {
                    name,
                    reason: format!("must be a positive number of hours, got {value}"),
                })
            }
        }

        positive_amount("large_amount.amount_threshold", self.large_amount.amount_threshold)?;
        positive_amount(
            "frequent_small.amount_threshold",
            self.frequent_small.amount_threshold,
        )?;
        positive_count(
            "frequent_small.count_threshold",
            self.frequent_small.count_threshold,
        )?;
        positive_hours(
            "frequent_small.time_window_hours",
            self.frequent_small.time_window_hours,
        )?;
        positive_count("multi_location.min_txn_count", self.multi_location.min_txn_count)?;
        positive_count(
            "multi_location.location_threshold",
            self.multi_location.location_threshold,
        )?;
        positive_hours(
            "multi_location.time_window_hours",
            self.multi_location.time_window_hours,
        )?;
        positive_amount("scoring.alert_threshold", self.scoring.alert_threshold)?;
        positive_count("workers", self.workers)?;
        Ok(())
    }
}
