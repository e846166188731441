//! SQLite implementation of the FeedStore trait.
//!
//! Uses rusqlite with bundled SQLite, wrapped in async via
//! `tokio::task::spawn_blocking`. Entries are stored as their canonical
//! bytes and decoded on read.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use palimpsest_core::{
    canonical_bytes, decode_entry, validate_entry_structure, AuthorId, Content, EntryBuilder,
    EntryKey, Keypair, LogEntry,
};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::migration::{self, now_millis};
use crate::traits::{check_extends, Cursor, FeedStore, InsertResult};

/// SQLite-backed feed store.
///
/// Thread-safe via an internal Mutex; every call runs on the blocking pool.
#[derive(Clone)]
pub struct SqliteFeed {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteFeed {
    /// Open (or create) a database file and run migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Unavailable(format!("connection mutex poisoned: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("blocking task failed: {}", e)))?
    }
}

fn head_of(conn: &Connection, author: &AuthorId) -> Result<Option<(u64, EntryKey)>> {
    let row: Option<(i64, Vec<u8>)> = conn
        .query_row(
            "SELECT head_seq, head_key FROM feeds WHERE author = ?1",
            params![author.as_bytes().as_slice()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    row.map(|(seq, key)| Ok((seq as u64, key_from_blob(key)?)))
        .transpose()
}

fn key_from_blob(blob: Vec<u8>) -> Result<EntryKey> {
    EntryKey::try_from(blob.as_slice())
        .map_err(|_| StoreError::Serialization(format!("bad key length: {}", blob.len())))
}

fn key_exists(conn: &Connection, key: &EntryKey) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT pos FROM entries WHERE entry_key = ?1",
            params![key.as_bytes().as_slice()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn insert_entry(tx: &Transaction<'_>, entry: &LogEntry) -> Result<()> {
    let key = entry.key();
    tx.execute(
        "INSERT INTO entries (entry_key, author, seq, timestamp, prev, canonical, ingested_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            key.as_bytes().as_slice(),
            entry.author().as_bytes().as_slice(),
            entry.seq() as i64,
            entry.timestamp(),
            entry.prev().map(|p| p.as_bytes().to_vec()),
            canonical_bytes(entry),
            now_millis(),
        ],
    )?;
    tx.execute(
        "INSERT INTO feeds (author, head_seq, head_key) VALUES (?1, ?2, ?3)
         ON CONFLICT(author) DO UPDATE SET head_seq = excluded.head_seq, head_key = excluded.head_key",
        params![
            entry.author().as_bytes().as_slice(),
            entry.seq() as i64,
            key.as_bytes().as_slice(),
        ],
    )?;
    Ok(())
}

#[async_trait]
impl FeedStore for SqliteFeed {
    async fn append(
        &self,
        signer: &Keypair,
        timestamp: i64,
        content: &Content,
    ) -> Result<LogEntry> {
        let signer = signer.clone();
        let bytes = content.to_bytes()?;
        let kind = content.kind();

        let entry = self
            .run(move |conn| {
                let tx = conn.transaction()?;
                let author = signer.author_id();

                let builder = match head_of(&tx, &author)? {
                    Some((seq, key)) => EntryBuilder::new(author, seq + 1).prev(key),
                    None => EntryBuilder::new(author, 1),
                };
                let entry = builder.timestamp(timestamp).raw_content(bytes).sign(&signer);

                insert_entry(&tx, &entry)?;
                tx.commit()?;
                Ok(entry)
            })
            .await?;

        debug!(
            author = %entry.author(),
            seq = entry.seq(),
            key = %entry.key(),
            kind = ?kind,
            "appended entry"
        );
        Ok(entry)
    }

    async fn get(&self, key: &EntryKey) -> Result<LogEntry> {
        let key = *key;
        self.run(move |conn| {
            let canonical: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT canonical FROM entries WHERE entry_key = ?1",
                    params![key.as_bytes().as_slice()],
                    |row| row.get(0),
                )
                .optional()?;

            match canonical {
                Some(bytes) => Ok(decode_entry(&bytes)?),
                None => Err(StoreError::NotFound(key)),
            }
        })
        .await
    }

    async fn read_all(&self, since: Option<Cursor>) -> Result<Vec<LogEntry>> {
        let after = since.unwrap_or(Cursor::START).0 as i64;
        self.run(move |conn| {
            let mut stmt =
                conn.prepare("SELECT canonical FROM entries WHERE pos > ?1 ORDER BY pos")?;
            let rows = stmt.query_map(params![after], |row| row.get::<_, Vec<u8>>(0))?;

            let mut entries = Vec::new();
            for bytes in rows {
                entries.push(decode_entry(&bytes?)?);
            }
            Ok(entries)
        })
        .await
    }

    async fn ingest(&self, entry: &LogEntry) -> Result<InsertResult> {
        let entry = entry.clone();
        self.run(move |conn| {
            let tx = conn.transaction()?;

            if key_exists(&tx, &entry.key())? {
                return Ok(InsertResult::AlreadyExists);
            }

            let existing: Option<Vec<u8>> = tx
                .query_row(
                    "SELECT entry_key FROM entries WHERE author = ?1 AND seq = ?2",
                    params![entry.author().as_bytes().as_slice(), entry.seq() as i64],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(existing) = existing {
                debug!(author = %entry.author(), seq = entry.seq(), "ingest conflict");
                return Ok(InsertResult::Conflict {
                    existing: key_from_blob(existing)?,
                });
            }

            validate_entry_structure(&entry)?;
            check_extends(head_of(&tx, entry.author())?, &entry)?;

            insert_entry(&tx, &entry)?;
            tx.commit()?;
            Ok(InsertResult::Inserted)
        })
        .await
    }

    async fn feed_head(&self, author: &AuthorId) -> Result<Option<(u64, EntryKey)>> {
        let author = *author;
        self.run(move |conn| head_of(conn, &author)).await
    }

    async fn cursor(&self) -> Result<Cursor> {
        self.run(|conn| {
            let pos: i64 =
                conn.query_row("SELECT COALESCE(MAX(pos), 0) FROM entries", [], |row| {
                    row.get(0)
                })?;
            Ok(Cursor(pos as u64))
        })
        .await
    }
}
