//! AML transaction monitoring engine.
//!
//! A batch pattern-detection and risk-scoring library over an append-only
//! transaction ledger:
//!
//!   - three detectors (large-amount, frequent-small, multi-location)
//!     sharing one role-tagged event extraction and two windowing
//!     strategies;
//!   - a risk scorer that merges pattern weights into a durable
//!     per-customer score with a guarded read-modify-write;
//!   - a batch pipeline (detect → score → report) with per-customer
//!     failure isolation and a bounded detection worker pool.
//!
//! The SQLite store is the single source of truth; callers construct an
//! [`store::AmlStore`] once and pass it into the pipeline.

pub mod batch;
pub mod config;
pub mod error;
pub mod frequent_small_detector;
pub mod large_amount_detector;
pub mod ledger;
pub mod multi_location_detector;
pub mod pattern;
pub mod report;
pub mod risk_scorer;
pub mod rng;
pub mod store;
pub mod synthetic;
pub mod types;
pub mod window;
