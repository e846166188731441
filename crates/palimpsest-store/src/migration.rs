//! Database schema migrations for SQLite.
//!
//! Each migration is a SQL batch that moves the schema from version N to
//! N+1. Applied versions are recorded in `schema_migrations`.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 2;

/// Initialize or migrate the database schema. Idempotent.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
        tracing::info!(from = current, to = CURRENT_VERSION, "migrated feed schema");
    }

    Ok(())
}

fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        2 => apply_v2(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: the merged log.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- One row per entry; `pos` is the local ingestion order (cursor).
        CREATE TABLE entries (
            pos INTEGER PRIMARY KEY AUTOINCREMENT,
            entry_key BLOB NOT NULL UNIQUE,  -- 32 bytes, Blake3 of canonical bytes
            author BLOB NOT NULL,            -- 32 bytes, Ed25519 public key
            seq INTEGER NOT NULL,            -- position in the author's feed
            timestamp INTEGER NOT NULL,      -- author-claimed (Unix ms)
            prev BLOB,                       -- 32 bytes, NULL for seq = 1
            canonical BLOB NOT NULL,         -- header || content || signature
            ingested_at INTEGER NOT NULL,    -- local clock (Unix ms)

            UNIQUE(author, seq)
        );

        CREATE INDEX idx_entries_author_seq ON entries(author, seq);
        "#,
    )?;

    Ok(())
}

/// Migration v2: feed heads, so appends need not scan an author's feed.
fn apply_v2(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE feeds (
            author BLOB PRIMARY KEY,
            head_seq INTEGER NOT NULL,
            head_key BLOB NOT NULL
        );

        INSERT INTO feeds (author, head_seq, head_key)
        SELECT e.author, e.seq, e.entry_key FROM entries e
        WHERE e.seq = (SELECT MAX(seq) FROM entries WHERE author = e.author);
        "#,
    )?;

    Ok(())
}

pub(crate) fn now_millis() -> i64 {
    palimpsest_core::unix_millis(std::time::SystemTime::now())
}
