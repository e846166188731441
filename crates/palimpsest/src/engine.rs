//! The Engine: unified API over a feed store.
//!
//! The Engine holds a store and its configuration and nothing else. Every
//! view is recomputed from the log on each call, and every operation takes
//! an explicit [`Context`] naming the acting identity.

use std::sync::Arc;

use palimpsest_core::{validate_entry, EntryKey, LogEntry};
use palimpsest_store::{FeedStore, InsertResult};
use palimpsest_view::{Classifier, Resource};
use tracing::{debug, warn};

use crate::activity::{collect_activity, ActivityFilter, ActivityItem, ActivityOrder};
use crate::collection::Collection;
use crate::config::EngineConfig;
use crate::context::Context;
use crate::error::Result;
use crate::mutation::MutationHelper;
use crate::reader::EntryReader;

/// The main Engine struct.
pub struct Engine<S: FeedStore> {
    store: Arc<S>,
    config: EngineConfig,
}

impl<S: FeedStore> Engine<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self::with_shared_store(Arc::new(store), config)
    }

    /// Build an engine over a store shared with other components.
    pub fn with_shared_store(store: Arc<S>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn reader(&self) -> EntryReader<'_, S> {
        EntryReader::new(self.store.as_ref(), self.config.verify_signatures)
    }

    pub fn mutations(&self) -> MutationHelper<'_, S> {
        MutationHelper::new(self.store.as_ref(), &self.config)
    }

    /// The operations on resources of type `R`.
    pub fn collection<R: Resource>(&self) -> Collection<'_, S, R> {
        Collection::new(self.store.as_ref(), &self.config)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Ingest Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Ingest an entry produced elsewhere.
    ///
    /// Verifies the signature first when `validate_on_ingest` is set.
    pub async fn ingest(&self, entry: &LogEntry) -> Result<IngestResult> {
        if self.config.validate_on_ingest {
            validate_entry(entry)?;
        }

        let key = entry.key();
        match self.store.ingest(entry).await? {
            InsertResult::Inserted => {
                debug!(%key, author = %entry.author(), seq = entry.seq(), "ingested entry");
                Ok(IngestResult::Accepted(key))
            }
            InsertResult::AlreadyExists => Ok(IngestResult::Duplicate),
            InsertResult::Conflict { existing } => {
                warn!(
                    %key,
                    %existing,
                    author = %entry.author(),
                    seq = entry.seq(),
                    "conflicting entry at an occupied feed position"
                );
                Ok(IngestResult::Conflict { existing })
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Aggregation
    // ─────────────────────────────────────────────────────────────────────────

    /// Live records of every built-in type, merged and deduplicated.
    pub async fn activity(
        &self,
        ctx: &Context<'_>,
        filter: &ActivityFilter,
        order: ActivityOrder,
    ) -> Result<Vec<ActivityItem>> {
        let entries = self.reader().read_all(Some(ActivityItem::ORIGINS)).await?;
        let classified =
            Classifier::for_types(ActivityItem::ORIGINS.iter().copied()).classify_all(&entries);
        Ok(collect_activity(&classified, filter, order, ctx.now))
    }
}

/// Result of ingesting an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestResult {
    /// Entry was accepted and stored.
    Accepted(EntryKey),
    /// Entry was already in store (idempotent).
    Duplicate,
    /// A different entry holds the same feed position.
    Conflict { existing: EntryKey },
}
