//! # Palimpsest Store
//!
//! The feed-store boundary. Every identity owns one append-only feed; the
//! store sequences local appends, accepts replicated entries, and hands the
//! merged log back in local ingestion order.
//!
//! ## Key Types
//!
//! - [`FeedStore`] - The async trait the engine reads from and appends to
//! - [`SqliteFeed`] - SQLite-backed persistent feed
//! - [`MemoryFeed`] - In-memory feed for tests and ephemeral use
//! - [`InsertResult`] - Outcome of ingesting a replicated entry
//! - [`Cursor`] - Position in the local merged log
//!
//! ## Usage
//!
//! ```rust,no_run
//! use palimpsest_core::{Content, Keypair};
//! use palimpsest_store::{FeedStore, SqliteFeed};
//!
//! async fn example() {
//!     let feed = SqliteFeed::open("palimpsest.db").unwrap();
//!     let keypair = Keypair::generate();
//!
//!     let content = Content::creation("bookmark", &"https://example.org").unwrap();
//!     let entry = feed.append(&keypair, 1_736_870_400_000, &content).await.unwrap();
//!     assert_eq!(entry.seq(), 1);
//!
//!     let log = feed.read_all(None).await.unwrap();
//!     assert_eq!(log.len(), 1);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Appends are sequenced per author**: `seq` and `prev` are assigned
//!   under the store's write lock, so one author's appends never interleave.
//! - **Idempotent ingest**: ingesting a known entry returns `AlreadyExists`.
//! - **Conflict detection**: a different entry at a taken `(author, seq)`
//!   returns `Conflict` and is not stored.
//! - **Contiguity**: ingest only accepts the next entry of a feed; gaps and
//!   broken `prev` links are rejected.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryFeed;
pub use sqlite::SqliteFeed;
pub use traits::{Cursor, FeedStore, InsertResult};
