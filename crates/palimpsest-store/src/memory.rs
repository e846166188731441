//! In-memory implementation of the FeedStore trait.
//!
//! Same semantics as SQLite, nothing persisted.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use palimpsest_core::{
    validate_entry_structure, AuthorId, Content, EntryBuilder, EntryKey, Keypair, LogEntry,
};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::traits::{check_extends, Cursor, FeedStore, InsertResult};

/// In-memory feed store.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryFeed {
    inner: RwLock<MemoryFeedInner>,
}

#[derive(Default)]
struct MemoryFeedInner {
    /// Entries in ingestion order; index `i` sits at cursor `i + 1`.
    log: Vec<LogEntry>,

    /// Key -> index into `log`.
    by_key: HashMap<EntryKey, usize>,

    /// Position index: (author, seq) -> key.
    positions: HashMap<(AuthorId, u64), EntryKey>,

    /// Latest (seq, key) per author.
    heads: HashMap<AuthorId, (u64, EntryKey)>,
}

impl MemoryFeedInner {
    fn insert(&mut self, entry: LogEntry) {
        let key = entry.key();
        let author = *entry.author();
        self.positions.insert((author, entry.seq()), key);
        self.heads.insert(author, (entry.seq(), key));
        self.by_key.insert(key, self.log.len());
        self.log.push(entry);
    }
}

impl MemoryFeed {
    /// Create a new empty feed store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryFeedInner::default()),
        }
    }

    /// Number of stored entries.
    ///
    /// Counted even after a writer panicked: the log only ever grows by
    /// whole entries. Store operations report the poisoning instead.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .log
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryFeedInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryFeedInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
    }
}

impl Default for MemoryFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedStore for MemoryFeed {
    async fn append(
        &self,
        signer: &Keypair,
        timestamp: i64,
        content: &Content,
    ) -> Result<LogEntry> {
        let mut inner = self.write()?;
        let author = signer.author_id();

        let mut builder = match inner.heads.get(&author) {
            Some(&(seq, key)) => EntryBuilder::new(author, seq + 1).prev(key),
            None => EntryBuilder::new(author, 1),
        };
        builder = builder.timestamp(timestamp).content(content)?;
        let entry = builder.sign(signer);

        debug!(
            author = %author,
            seq = entry.seq(),
            key = %entry.key(),
            kind = ?content.kind(),
            "appended entry"
        );
        inner.insert(entry.clone());
        Ok(entry)
    }

    async fn get(&self, key: &EntryKey) -> Result<LogEntry> {
        let inner = self.read()?;
        inner
            .by_key
            .get(key)
            .map(|&idx| inner.log[idx].clone())
            .ok_or(StoreError::NotFound(*key))
    }

    async fn read_all(&self, since: Option<Cursor>) -> Result<Vec<LogEntry>> {
        let inner = self.read()?;
        let skip = since.map(|c| c.0 as usize).unwrap_or(0);
        Ok(inner.log.iter().skip(skip).cloned().collect())
    }

    async fn ingest(&self, entry: &LogEntry) -> Result<InsertResult> {
        let mut inner = self.write()?;
        let key = entry.key();

        if inner.by_key.contains_key(&key) {
            return Ok(InsertResult::AlreadyExists);
        }

        if let Some(&existing) = inner.positions.get(&(*entry.author(), entry.seq())) {
            debug!(author = %entry.author(), seq = entry.seq(), "ingest conflict");
            return Ok(InsertResult::Conflict { existing });
        }

        validate_entry_structure(entry)?;
        check_extends(inner.heads.get(entry.author()).copied(), entry)?;

        inner.insert(entry.clone());
        Ok(InsertResult::Inserted)
    }

    async fn feed_head(&self, author: &AuthorId) -> Result<Option<(u64, EntryKey)>> {
        Ok(self.read()?.heads.get(author).copied())
    }

    async fn cursor(&self) -> Result<Cursor> {
        Ok(Cursor(self.read()?.log.len() as u64))
    }
}
