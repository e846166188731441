//! Error types for Palimpsest Core.

use thiserror::Error;

use crate::types::EntryKey;

/// Errors raised while building, encoding, or decoding entries.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("malformed entry: {0}")]
    MalformedEntry(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Structural and signature checks on a single entry.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("signature verification failed")]
    SignatureFailed,

    #[error("content hash does not match header")]
    ContentHashMismatch,

    #[error("unsupported entry version: {0}")]
    UnsupportedVersion(u8),

    #[error("invalid sequence number: expected {expected}, got {got}")]
    InvalidSequence { expected: u64, got: u64 },

    #[error("invalid prev pointer: expected {expected:?}, got {got:?}")]
    InvalidPrev {
        expected: Option<EntryKey>,
        got: Option<EntryKey>,
    },

    #[error("undecodable content: {0}")]
    UndecodableContent(String),

    #[error("resource type must not be empty")]
    EmptyResourceType,
}

impl From<CoreError> for ValidationError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidSignature | CoreError::InvalidPublicKey => {
                ValidationError::SignatureFailed
            }
            CoreError::MalformedEntry(msg)
            | CoreError::EncodingError(msg)
            | CoreError::DecodingError(msg) => ValidationError::UndecodableContent(msg),
        }
    }
}
