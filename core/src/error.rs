use thiserror::Error;

#[derive(Error, Debug)]
pub enum AmlError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Customer '{customer_id}' not found")]
    CustomerNotFound { customer_id: String },

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Risk score update for '{customer_id}' lost a concurrent race")]
    ScoreConflict { customer_id: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AmlError {
    /// Whether retrying the same operation can reasonably succeed.
    /// SQLite reports lock contention as busy/locked failures.
    pub fn is_transient(&self) -> bool {
        match self {
            AmlError::Database(rusqlite::Error::SqliteFailure(e, _)) => matches!(
                e.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}

pub type AmlResult<T> = Result<T, AmlError>;
