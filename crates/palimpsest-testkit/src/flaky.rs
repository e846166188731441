//! A feed store that can be made unreachable.
//!
//! Wraps a [`MemoryFeed`]. While unreachable, every call fails with
//! [`StoreError::Unavailable`] and leaves the wrapped feed untouched.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use palimpsest_core::{AuthorId, Content, EntryKey, Keypair, LogEntry};
use palimpsest_store::{Cursor, FeedStore, InsertResult, MemoryFeed, Result, StoreError};

#[derive(Default)]
pub struct FlakyFeed {
    inner: MemoryFeed,
    unreachable: AtomicBool,
}

impl FlakyFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.unreachable.store(!reachable, Ordering::SeqCst);
    }

    pub fn is_reachable(&self) -> bool {
        !self.unreachable.load(Ordering::SeqCst)
    }

    /// The wrapped feed, reachable regardless of the switch.
    pub fn inner(&self) -> &MemoryFeed {
        &self.inner
    }

    fn check(&self) -> Result<()> {
        if self.is_reachable() {
            Ok(())
        } else {
            Err(StoreError::Unavailable("feed switched off".into()))
        }
    }
}

#[async_trait]
impl FeedStore for FlakyFeed {
    async fn append(
        &self,
        signer: &Keypair,
        timestamp: i64,
        content: &Content,
    ) -> Result<LogEntry> {
        self.check()?;
        self.inner.append(signer, timestamp, content).await
    }

    async fn get(&self, key: &EntryKey) -> Result<LogEntry> {
        self.check()?;
        self.inner.get(key).await
    }

    async fn read_all(&self, since: Option<Cursor>) -> Result<Vec<LogEntry>> {
        self.check()?;
        self.inner.read_all(since).await
    }

    async fn ingest(&self, entry: &LogEntry) -> Result<InsertResult> {
        self.check()?;
        self.inner.ingest(entry).await
    }

    async fn feed_head(&self, author: &AuthorId) -> Result<Option<(u64, EntryKey)>> {
        self.check()?;
        self.inner.feed_head(author).await
    }

    async fn cursor(&self) -> Result<Cursor> {
        self.check()?;
        self.inner.cursor().await
    }
}
