//! Idempotent mutation helper: read the tip, change a copy, publish an Edit.
//!
//! Every update and action goes through [`MutationHelper::apply`]. The
//! helper re-reads the log, hands the closure the current record and a
//! mutable copy of its body, and publishes the copy only if the closure
//! succeeds. A failing closure appends nothing.
//!
//! The read and the append are not atomic: two writers that read the same
//! tip both publish, and the chain forks. Readers converge on one tip by
//! `(depth, timestamp, key)`.

use palimpsest_core::{ActionMarker, Content, LogEntry, RootId};
use palimpsest_store::FeedStore;
use palimpsest_view::{CurrentRecord, Resource, TombstonePolicy};
use tracing::{debug, info};

use crate::config::{EngineConfig, WriteMode};
use crate::context::Context;
use crate::error::{EngineError, Result};
use crate::reader::EntryReader;

pub struct MutationHelper<'e, S: ?Sized> {
    store: &'e S,
    config: &'e EngineConfig,
}

impl<'e, S: FeedStore + ?Sized> MutationHelper<'e, S> {
    pub fn new(store: &'e S, config: &'e EngineConfig) -> Self {
        Self { store, config }
    }

    /// Apply `f` to the current state of `root` and publish the result.
    ///
    /// `action` marks the Edit as an idempotent action.
    pub async fn apply<R, F>(
        &self,
        ctx: &Context<'_>,
        root: &RootId,
        action: Option<ActionMarker>,
        f: F,
    ) -> Result<LogEntry>
    where
        R: Resource,
        F: FnOnce(&CurrentRecord<R>, &mut R) -> Result<()>,
    {
        let reader = EntryReader::new(self.store, self.config.verify_signatures);
        let current = reader.current::<R>(root).await?;

        let mut next = current.body.clone();
        f(&current, &mut next)?;
        next.validate().map_err(EngineError::InvalidFields)?;

        self.publish(ctx, &current, &next, action).await
    }

    /// Publish `next` as the successor of `current`'s tip.
    pub async fn publish<R: Resource>(
        &self,
        ctx: &Context<'_>,
        current: &CurrentRecord<R>,
        next: &R,
        action: Option<ActionMarker>,
    ) -> Result<LogEntry> {
        let version = current.version + 1;
        let mut content = Content::edit(R::TYPE, current.tip, version, next)?;
        if let Some(marker) = action {
            content = content.with_action(marker);
        }

        if self.tombstones_first::<R>(ctx, current) {
            let tombstone = Content::tombstone(current.tip, ctx.now).with_reason("superseded");
            let entry = self.store.append(ctx.actor, ctx.now, &tombstone).await?;
            debug!(
                root = %current.id,
                target = %current.tip,
                key = %entry.key(),
                "tombstoned old tip"
            );
        }

        let entry = self.store.append(ctx.actor, ctx.now, &content).await?;
        info!(
            resource_type = R::TYPE,
            root = %current.id,
            version,
            key = %entry.key(),
            "published edit"
        );
        Ok(entry)
    }

    /// The old tip is tombstoned only for `TipOnly` types edited by their
    /// owner in `TombstoneThenEdit` mode.
    fn tombstones_first<R: Resource>(&self, ctx: &Context<'_>, current: &CurrentRecord<R>) -> bool {
        self.config.write_mode == WriteMode::TombstoneThenEdit
            && R::POLICY == TombstonePolicy::TipOnly
            && ctx.actor_id() == current.owner
    }
}
