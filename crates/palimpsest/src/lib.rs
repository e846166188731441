//! # Palimpsest
//!
//! The unified API for Palimpsest: materialized views over append-only,
//! per-identity signed feeds.
//!
//! ## Overview
//!
//! Nothing in a feed is ever changed. Resources are declared by a Creation,
//! revised by Edits that point at the entry they supersede, and removed by
//! Tombstones. The Engine compacts that history back into one current
//! record per live resource, on every read.
//!
//! - **Collections**: per-type list/get/create/update/remove
//! - **Actions**: votes, confirmations and toggles, at most once per actor
//! - **Derived status**: deadlines close resources on read, never on disk
//! - **Activity**: one deduplicated feed across every built-in type
//!
//! ## Usage
//!
//! ```rust,no_run
//! use palimpsest::{Context, Engine, EngineConfig, ListFilter};
//! use palimpsest::core::Keypair;
//! use palimpsest::resources::Task;
//! use palimpsest::store::SqliteFeed;
//!
//! async fn example() {
//!     let keypair = Keypair::generate();
//!     let feed = SqliteFeed::open("palimpsest.db").unwrap();
//!     let engine = Engine::new(feed, EngineConfig::default());
//!     let ctx = Context::system(&keypair);
//!
//!     let tasks = engine.collection::<Task>();
//!     let created = tasks.create(&ctx, Task::new("water the plants")).await.unwrap();
//!
//!     let record = tasks.get_by_id(&ctx, &created.key()).await.unwrap();
//!     assert_eq!(record.body.title, "water the plants");
//!
//!     let open = tasks.list_all(&ctx, &ListFilter::default()).await.unwrap();
//!     assert_eq!(open.len(), 1);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `palimpsest::core` - Entries, content, keys, validation
//! - `palimpsest::store` - Feed store trait, SQLite and in-memory feeds
//! - `palimpsest::view` - Pure compaction: chains, tombstones, live sets

pub mod activity;
pub mod collection;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod mutation;
pub mod reader;
pub mod resources;

// Re-export component crates
pub use palimpsest_core as core;
pub use palimpsest_store as store;
pub use palimpsest_view as view;

// Re-export main types for convenience
pub use activity::{ActivityFilter, ActivityItem, ActivityOrder};
pub use collection::{Collection, ListFilter};
pub use config::{EngineConfig, WriteMode};
pub use context::Context;
pub use engine::{Engine, IngestResult};
pub use error::{EngineError, Result};
pub use mutation::MutationHelper;
pub use reader::EntryReader;

// Re-export commonly used types
pub use palimpsest_core::{AuthorId, Content, EntryKey, Keypair, LogEntry, RootId};
pub use palimpsest_view::{
    Actionable, ChainFault, CurrentRecord, FaultKind, Resource, Revision, Status, TombstonePolicy,
};
