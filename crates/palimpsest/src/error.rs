//! Error types for the Engine.

use palimpsest_core::{AuthorId, CoreError, RootId, ValidationError};
use palimpsest_store::StoreError;
use palimpsest_view::{ChainFault, ViewError};
use thiserror::Error;

/// Errors that can occur during Engine operations.
///
/// `NotFound`, `PermissionDenied`, `AlreadyActed` and `InvalidState` are
/// expected outcomes of a call and are never retried internally. Store
/// errors propagate unchanged.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The root id is not in the live set.
    #[error("resource not found: {0}")]
    NotFound(RootId),

    /// Only the author of a resource's Creation may change it.
    #[error("permission denied: {actor} does not own a resource of {owner}")]
    PermissionDenied { actor: AuthorId, owner: AuthorId },

    /// The actor is already recorded for this action.
    #[error("actor already acted on {category}")]
    AlreadyActed { category: String },

    /// The resource's effective status forbids the operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The requested chain is malformed and excluded from the live set.
    #[error("malformed chain: {0}")]
    MalformedChain(ChainFault),

    /// The resource does not accept this action category.
    #[error("unknown action category: {0}")]
    UnknownCategory(String),

    /// Fields rejected by the resource type before publishing.
    #[error("invalid fields: {0}")]
    InvalidFields(String),

    /// Validation error on an ingested entry.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Content could not be encoded or decoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] CoreError),
}

impl From<ViewError> for EngineError {
    fn from(e: ViewError) -> Self {
        match e {
            ViewError::AlreadyActed { category } => EngineError::AlreadyActed { category },
            ViewError::UnknownCategory(category) => EngineError::UnknownCategory(category),
            ViewError::MalformedChain(fault) => EngineError::MalformedChain(fault),
            ViewError::Decode(msg) => EngineError::Encoding(CoreError::DecodingError(msg)),
        }
    }
}

/// Result type for Engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
