//! Content classifier: tags raw entries with what they do to a chain.

use std::collections::BTreeSet;

use palimpsest_core::{AuthorId, Content, EntryKey, EntryKind, LogEntry};
use tracing::trace;

/// The envelope every classified entry shares, whatever its payload.
///
/// Chain resolution and tombstone tracking only ever look at envelopes;
/// bodies are decoded once a tip has been chosen.
pub trait Envelope {
    fn key(&self) -> EntryKey;
    fn author(&self) -> &AuthorId;
    fn timestamp(&self) -> i64;
    fn supersedes(&self) -> Option<&EntryKey>;
    fn tombstone_target(&self) -> Option<&EntryKey>;
}

/// A decoded entry with its kind and declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub key: EntryKey,
    pub author: AuthorId,
    pub timestamp: i64,
    pub kind: EntryKind,
    pub content: Content,
}

impl Classified {
    /// Declared resource type. `None` for tombstones.
    pub fn resource_type(&self) -> Option<&str> {
        self.content.resource_type()
    }
}

impl Envelope for Classified {
    fn key(&self) -> EntryKey {
        self.key
    }

    fn author(&self) -> &AuthorId {
        &self.author
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn supersedes(&self) -> Option<&EntryKey> {
        self.content.supersedes()
    }

    fn tombstone_target(&self) -> Option<&EntryKey> {
        self.content.tombstone_target()
    }
}

/// Classifies entries for a set of known resource types.
///
/// Entries whose content does not decode, or whose declared type is not
/// known, are dropped. Tombstones are untyped and always kept.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    /// Empty means every type is known.
    known: BTreeSet<String>,
}

impl Classifier {
    /// A classifier that accepts every declared type.
    pub fn new() -> Self {
        Self::default()
    }

    /// A classifier that only accepts the given types.
    pub fn for_types<'a>(types: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            known: types.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn is_known(&self, resource_type: &str) -> bool {
        self.known.is_empty() || self.known.contains(resource_type)
    }

    pub fn classify(&self, entry: &LogEntry) -> Option<Classified> {
        let content = match entry.decode_content() {
            Ok(content) => content,
            Err(e) => {
                trace!(key = %entry.key(), error = %e, "dropping undecodable entry");
                return None;
            }
        };

        if let Some(resource_type) = content.resource_type() {
            if !self.is_known(resource_type) {
                return None;
            }
        }

        Some(Classified {
            key: entry.key(),
            author: *entry.author(),
            timestamp: entry.timestamp(),
            kind: content.kind(),
            content,
        })
    }

    /// Classify a batch, dropping duplicates by key.
    pub fn classify_all<'a>(
        &self,
        entries: impl IntoIterator<Item = &'a LogEntry>,
    ) -> Vec<Classified> {
        let mut seen = BTreeSet::new();
        entries
            .into_iter()
            .filter(|entry| seen.insert(entry.key()))
            .filter_map(|entry| self.classify(entry))
            .collect()
    }
}
