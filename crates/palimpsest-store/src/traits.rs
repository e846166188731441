//! FeedStore trait: the boundary between the engine and whatever holds the
//! feeds.
//!
//! Implementations include SQLite (persistent) and in-memory (for tests).

use std::sync::Arc;

use async_trait::async_trait;
use palimpsest_core::{AuthorId, Content, EntryKey, Keypair, LogEntry, ValidationError};

use crate::error::Result;

/// Outcome of ingesting a replicated entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertResult {
    /// Entry was new and extends its author's feed.
    Inserted,
    /// Entry is already stored (idempotent, not an error).
    AlreadyExists,
    /// A different entry already holds this `(author, seq)` position.
    Conflict {
        /// The entry already stored at this position.
        existing: EntryKey,
    },
}

/// A position in the local merged log.
///
/// Cursors count entries in local ingestion order; `Cursor::START` is
/// before the first entry. They are local to one store and never leave it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Cursor(pub u64);

impl Cursor {
    pub const START: Cursor = Cursor(0);
}

/// The feed store: async interface over the merged log of all known feeds.
///
/// # Design Notes
///
/// - **Ordering**: `read_all` returns entries in local ingestion order. Each
///   author's entries appear in `seq` order because ingest only accepts the
///   next entry of a feed.
/// - **No retries**: a failing backend surfaces as an error on the call that
///   hit it.
#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Append `content` to the signer's own feed.
    ///
    /// The store assigns `seq` and `prev` from the current feed head.
    async fn append(&self, signer: &Keypair, timestamp: i64, content: &Content)
        -> Result<LogEntry>;

    /// Get an entry by key. Fails with `NotFound` if absent.
    async fn get(&self, key: &EntryKey) -> Result<LogEntry>;

    /// Read the merged log, optionally only entries after `since`.
    async fn read_all(&self, since: Option<Cursor>) -> Result<Vec<LogEntry>>;

    /// Accept an entry produced elsewhere (replication, import).
    ///
    /// The entry must be structurally valid and extend its author's feed
    /// contiguously. Signature checks are the caller's concern.
    async fn ingest(&self, entry: &LogEntry) -> Result<InsertResult>;

    /// The latest `(seq, key)` of an author's feed, if it has any entries.
    async fn feed_head(&self, author: &AuthorId) -> Result<Option<(u64, EntryKey)>>;

    /// The cursor just past the newest entry in the merged log.
    async fn cursor(&self) -> Result<Cursor>;
}

#[async_trait]
impl<S: FeedStore + ?Sized> FeedStore for Arc<S> {
    async fn append(
        &self,
        signer: &Keypair,
        timestamp: i64,
        content: &Content,
    ) -> Result<LogEntry> {
        (**self).append(signer, timestamp, content).await
    }

    async fn get(&self, key: &EntryKey) -> Result<LogEntry> {
        (**self).get(key).await
    }

    async fn read_all(&self, since: Option<Cursor>) -> Result<Vec<LogEntry>> {
        (**self).read_all(since).await
    }

    async fn ingest(&self, entry: &LogEntry) -> Result<InsertResult> {
        (**self).ingest(entry).await
    }

    async fn feed_head(&self, author: &AuthorId) -> Result<Option<(u64, EntryKey)>> {
        (**self).feed_head(author).await
    }

    async fn cursor(&self) -> Result<Cursor> {
        (**self).cursor().await
    }
}

/// Check that `entry` is the next entry after `head` in its author's feed.
pub(crate) fn check_extends(
    head: Option<(u64, EntryKey)>,
    entry: &LogEntry,
) -> std::result::Result<(), ValidationError> {
    let (expected_seq, expected_prev) = match head {
        Some((seq, key)) => (seq + 1, Some(key)),
        None => (1, None),
    };

    if entry.seq() != expected_seq {
        return Err(ValidationError::InvalidSequence {
            expected: expected_seq,
            got: entry.seq(),
        });
    }

    if entry.prev().copied() != expected_prev {
        return Err(ValidationError::InvalidPrev {
            expected: expected_prev,
            got: entry.prev().copied(),
        });
    }

    Ok(())
}
