//! Entry validation: structure, content hash, and signature.

use crate::canonical::signed_message;
use crate::content::Content;
use crate::crypto::ContentHash;
use crate::entry::{LogEntry, ENTRY_VERSION};
use crate::error::ValidationError;

/// Full validation: structural checks, then signature verification.
pub fn validate_entry(entry: &LogEntry) -> Result<(), ValidationError> {
    validate_entry_structure(entry)?;

    entry
        .author()
        .verify(&signed_message(entry), &entry.signature)
        .map_err(|_| ValidationError::SignatureFailed)
}

/// Structural checks only. Use for entries read back from trusted storage.
///
/// - schema version is supported
/// - content hash matches the header
/// - `seq == 1` has no `prev`, `seq > 1` must have one
/// - content decodes and typed payloads name a type
pub fn validate_entry_structure(entry: &LogEntry) -> Result<(), ValidationError> {
    if entry.header.version != ENTRY_VERSION {
        return Err(ValidationError::UnsupportedVersion(entry.header.version));
    }

    if ContentHash::hash(&entry.content) != entry.header.content_hash {
        return Err(ValidationError::ContentHashMismatch);
    }

    match (entry.seq(), entry.prev()) {
        (0, _) => {
            return Err(ValidationError::InvalidSequence {
                expected: 1,
                got: 0,
            })
        }
        (1, Some(prev)) => {
            return Err(ValidationError::InvalidPrev {
                expected: None,
                got: Some(*prev),
            })
        }
        (seq, None) if seq > 1 => {
            return Err(ValidationError::InvalidPrev {
                expected: None,
                got: None,
            })
        }
        _ => {}
    }

    let content = Content::from_bytes(&entry.content)?;
    if matches!(content.resource_type(), Some(t) if t.is_empty()) {
        return Err(ValidationError::EmptyResourceType);
    }

    Ok(())
}
