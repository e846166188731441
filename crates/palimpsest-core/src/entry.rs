//! LogEntry: one immutable, signed record in an author's feed.
//!
//! Each author's feed is a hash-linked sequence: entry `seq = n` points at
//! entry `n - 1` through `prev`. The global log a reader sees is a merge of
//! many such feeds.

use bytes::Bytes;

use crate::canonical::{canonical_bytes, canonical_header_bytes};
use crate::content::Content;
use crate::crypto::{AuthorId, ContentHash, Keypair, Signature};
use crate::error::CoreError;
use crate::types::EntryKey;

/// The current entry schema version.
pub const ENTRY_VERSION: u8 = 0;

/// Signed metadata of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryHeader {
    pub version: u8,
    pub author: AuthorId,
    /// Position in the author's feed (1-indexed).
    pub seq: u64,
    /// Author-claimed Unix milliseconds. Untrusted.
    pub timestamp: i64,
    /// Key of the author's previous entry (None when `seq == 1`).
    pub prev: Option<EntryKey>,
    pub content_hash: ContentHash,
}

/// An immutable entry: header, encoded content, and signature.
///
/// The key is derived from the canonical bytes once, at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    key: EntryKey,
    pub header: EntryHeader,
    pub content: Bytes,
    pub signature: Signature,
}

impl LogEntry {
    /// Assemble an entry from its parts and derive its key.
    pub fn from_parts(header: EntryHeader, content: Bytes, signature: Signature) -> Self {
        let mut entry = Self {
            key: EntryKey([0; 32]),
            header,
            content,
            signature,
        };
        entry.key = EntryKey(*blake3::hash(&canonical_bytes(&entry)).as_bytes());
        entry
    }

    pub fn key(&self) -> EntryKey {
        self.key
    }

    pub fn author(&self) -> &AuthorId {
        &self.header.author
    }

    pub fn seq(&self) -> u64 {
        self.header.seq
    }

    pub fn timestamp(&self) -> i64 {
        self.header.timestamp
    }

    pub fn prev(&self) -> Option<&EntryKey> {
        self.header.prev.as_ref()
    }

    /// Decode the CBOR content payload.
    pub fn decode_content(&self) -> Result<Content, CoreError> {
        Content::from_bytes(&self.content)
    }
}

/// Builder for signed entries.
///
/// Sequencing (`seq`, `prev`) is the feed store's job; the builder only
/// packs and signs what it is given.
pub struct EntryBuilder {
    author: AuthorId,
    seq: u64,
    timestamp: i64,
    prev: Option<EntryKey>,
    content: Bytes,
}

impl EntryBuilder {
    pub fn new(author: AuthorId, seq: u64) -> Self {
        Self {
            author,
            seq,
            timestamp: 0,
            prev: None,
            content: Bytes::new(),
        }
    }

    pub fn timestamp(mut self, ts: i64) -> Self {
        self.timestamp = ts;
        self
    }

    pub fn prev(mut self, prev: EntryKey) -> Self {
        self.prev = Some(prev);
        self
    }

    /// Set raw content bytes.
    pub fn raw_content(mut self, content: impl Into<Bytes>) -> Self {
        self.content = content.into();
        self
    }

    /// Encode and set a typed content payload.
    pub fn content(self, content: &Content) -> Result<Self, CoreError> {
        let bytes = content.to_bytes()?;
        Ok(self.raw_content(bytes))
    }

    pub fn sign(self, keypair: &Keypair) -> LogEntry {
        let header = EntryHeader {
            version: ENTRY_VERSION,
            author: self.author,
            seq: self.seq,
            timestamp: self.timestamp,
            prev: self.prev,
            content_hash: ContentHash::hash(&self.content),
        };

        let mut message = canonical_header_bytes(&header);
        message.extend_from_slice(&self.content);
        let signature = keypair.sign(&message);

        LogEntry::from_parts(header, self.content, signature)
    }
}
