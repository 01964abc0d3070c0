//! Store error types

use thiserror::Error;

/// Errors raised while persisting store contents.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize store: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Store quota exceeded: {size} bytes (limit {limit})")]
    QuotaExceeded { size: usize, limit: usize },
}
