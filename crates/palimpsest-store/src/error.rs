//! Error types for the store module.

use palimpsest_core::{CoreError, EntryKey, ValidationError};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Entry or content could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// No entry with this key is stored.
    #[error("entry not found: {0}")]
    NotFound(EntryKey),

    /// A replicated entry was rejected.
    #[error("rejected entry: {0}")]
    Validation(#[from] ValidationError),

    /// The backing store cannot serve requests.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CoreError> for StoreError {
    fn from(e: CoreError) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
