//! Error types for the view layer.

use std::fmt;

use palimpsest_core::EntryKey;
use thiserror::Error;

/// Why a chain was excluded from the live set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FaultKind {
    /// A `supersedes` pointer leads to an entry that is not a link of this
    /// type (missing, a tombstone, or another type's entry).
    Dangling,
    /// Following `supersedes` revisits an entry.
    Cycle,
    /// The body does not decode as the declared type. Keyed by the root
    /// when the owner's tip is affected, by the edit itself otherwise.
    Undecodable,
    /// An edit by someone other than the owner that is not a well-formed
    /// action of its author.
    Unauthorized,
}

/// A malformed chain, identified by the entry where it was detected.
///
/// For `Dangling`, `Cycle` and `Unauthorized` this is the offending edit;
/// for an undecodable tip it is the root of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainFault {
    pub key: EntryKey,
    pub kind: FaultKind,
}

impl fmt::Display for ChainFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            FaultKind::Dangling => "dangling supersedes pointer",
            FaultKind::Cycle => "supersedes cycle",
            FaultKind::Undecodable => "undecodable body",
            FaultKind::Unauthorized => "edit by a non-owner",
        };
        write!(f, "{} at {}", kind, self.key)
    }
}

/// Errors raised by view-layer operations.
#[derive(Debug, Error)]
pub enum ViewError {
    /// The actor is already recorded for this action.
    #[error("actor already acted on {category}")]
    AlreadyActed { category: String },

    /// The category is not one the resource accepts.
    #[error("unknown action category: {0}")]
    UnknownCategory(String),

    #[error("malformed chain: {0}")]
    MalformedChain(ChainFault),

    /// A body could not be decoded as the declared type.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Result type for view operations.
pub type Result<T> = std::result::Result<T, ViewError>;
