//! Shared primitive types used across the monitoring engine.

/// A stable, unique customer identifier as stored in the ledger.
pub type CustomerId = String;

/// A stable, unique transaction identifier.
pub type TransactionId = String;

/// Identifier for one detection batch run.
pub type BatchId = String;
