//! Content: what an entry says about a resource.
//!
//! Nothing in a feed can be changed after it is appended, so every state
//! change is expressed as a new entry carrying one of three payloads:
//!
//! - `Creation` declares a resource. Its own entry key becomes the root id.
//! - `Edit` is a full replacement snapshot pointing at the entry it supersedes.
//! - `Tombstone` marks another entry as logically removed.
//!
//! Resource fields travel as an opaque CBOR `body`; only the view layer,
//! which knows the declared type, decodes them.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::crypto::AuthorId;
use crate::error::CoreError;
use crate::types::EntryKey;

/// Classification of an entry by what it does to its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntryKind {
    Creation,
    Edit,
    /// An edit produced by an idempotent per-actor action.
    ActionMarker,
    Tombstone,
}

/// Records which actor and category produced an action edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMarker {
    pub category: String,
    pub actor: AuthorId,
}

/// The payload of a log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Content {
    Creation {
        resource_type: String,
        body: Bytes,
    },
    Edit {
        resource_type: String,
        supersedes: EntryKey,
        /// Position in the chain: the Creation is version 0.
        version: u64,
        action: Option<ActionMarker>,
        body: Bytes,
    },
    Tombstone {
        target: EntryKey,
        deleted_at: i64,
        reason: Option<String>,
    },
}

impl Content {
    pub fn creation<T: Serialize>(resource_type: &str, fields: &T) -> Result<Self, CoreError> {
        Ok(Content::Creation {
            resource_type: resource_type.to_string(),
            body: encode_body(fields)?,
        })
    }

    pub fn edit<T: Serialize>(
        resource_type: &str,
        supersedes: EntryKey,
        version: u64,
        fields: &T,
    ) -> Result<Self, CoreError> {
        Ok(Content::Edit {
            resource_type: resource_type.to_string(),
            supersedes,
            version,
            action: None,
            body: encode_body(fields)?,
        })
    }

    pub fn tombstone(target: EntryKey, deleted_at: i64) -> Self {
        Content::Tombstone {
            target,
            deleted_at,
            reason: None,
        }
    }

    /// Attach an action marker. No effect on anything but edits.
    pub fn with_action(mut self, marker: ActionMarker) -> Self {
        if let Content::Edit { action, .. } = &mut self {
            *action = Some(marker);
        }
        self
    }

    pub fn with_reason(mut self, why: impl Into<String>) -> Self {
        if let Content::Tombstone { reason, .. } = &mut self {
            *reason = Some(why.into());
        }
        self
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Content::Creation { .. } => EntryKind::Creation,
            Content::Edit { action: Some(_), .. } => EntryKind::ActionMarker,
            Content::Edit { .. } => EntryKind::Edit,
            Content::Tombstone { .. } => EntryKind::Tombstone,
        }
    }

    /// The declared resource type. Tombstones are untyped.
    pub fn resource_type(&self) -> Option<&str> {
        match self {
            Content::Creation { resource_type, .. } | Content::Edit { resource_type, .. } => {
                Some(resource_type)
            }
            Content::Tombstone { .. } => None,
        }
    }

    pub fn supersedes(&self) -> Option<&EntryKey> {
        match self {
            Content::Edit { supersedes, .. } => Some(supersedes),
            _ => None,
        }
    }

    pub fn tombstone_target(&self) -> Option<&EntryKey> {
        match self {
            Content::Tombstone { target, .. } => Some(target),
            _ => None,
        }
    }

    pub fn version(&self) -> u64 {
        match self {
            Content::Edit { version, .. } => *version,
            _ => 0,
        }
    }

    pub fn action(&self) -> Option<&ActionMarker> {
        match self {
            Content::Edit { action, .. } => action.as_ref(),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&Bytes> {
        match self {
            Content::Creation { body, .. } | Content::Edit { body, .. } => Some(body),
            Content::Tombstone { .. } => None,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CoreError> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| CoreError::EncodingError(e.to_string()))?;
        Ok(buf)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))
    }
}

/// Encode resource fields to a CBOR body.
pub fn encode_body<T: Serialize>(fields: &T) -> Result<Bytes, CoreError> {
    let mut buf = Vec::new();
    ciborium::into_writer(fields, &mut buf)
        .map_err(|e| CoreError::EncodingError(e.to_string()))?;
    Ok(Bytes::from(buf))
}

/// Decode resource fields from a CBOR body.
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, CoreError> {
    ciborium::from_reader(body).map_err(|e| CoreError::DecodingError(e.to_string()))
}
