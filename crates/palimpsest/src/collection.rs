//! Per-type collections: the uniform read/write surface for one resource
//! type.

use std::marker::PhantomData;

use palimpsest_core::{ActionMarker, AuthorId, Content, LogEntry, RootId};
use palimpsest_store::FeedStore;
use palimpsest_view::{
    chain_history, derive_status, Actionable, CurrentRecord, LiveSet, Resource, Revision, Status,
};
use tracing::info;

use crate::config::EngineConfig;
use crate::context::Context;
use crate::error::{EngineError, Result};
use crate::mutation::MutationHelper;
use crate::reader::EntryReader;

/// Filter for [`Collection::list_all`]. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub owner: Option<AuthorId>,
    /// Compared against the effective status at the context's `now`.
    pub status: Option<Status>,
    /// Keep resources created strictly after this instant.
    pub created_after: Option<i64>,
}

impl ListFilter {
    pub fn owned_by(mut self, owner: AuthorId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn created_after(mut self, at: i64) -> Self {
        self.created_after = Some(at);
        self
    }

    pub fn matches<R>(&self, record: &CurrentRecord<R>) -> bool {
        self.owner.map_or(true, |owner| record.owner == owner)
            && self.status.map_or(true, |status| record.status == Some(status))
            && self.created_after.map_or(true, |at| record.created_at > at)
    }
}

/// All operations on resources of type `R`.
pub struct Collection<'e, S: ?Sized, R> {
    store: &'e S,
    config: &'e EngineConfig,
    _resource: PhantomData<fn() -> R>,
}

impl<'e, S: FeedStore + ?Sized, R: Resource> Collection<'e, S, R> {
    pub fn new(store: &'e S, config: &'e EngineConfig) -> Self {
        Self {
            store,
            config,
            _resource: PhantomData,
        }
    }

    fn reader(&self) -> EntryReader<'e, S> {
        EntryReader::new(self.store, self.config.verify_signatures)
    }

    fn mutations(&self) -> MutationHelper<'e, S> {
        MutationHelper::new(self.store, self.config)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// The raw live set, with stored status and faults.
    pub async fn live_set(&self) -> Result<LiveSet<R>> {
        self.reader().live_set::<R>().await
    }

    /// Live records matching `filter`, newest first.
    pub async fn list_all(
        &self,
        ctx: &Context<'_>,
        filter: &ListFilter,
    ) -> Result<Vec<CurrentRecord<R>>> {
        self.list_where(ctx, |record| filter.matches(record)).await
    }

    /// Live records for which `predicate` holds, newest first.
    ///
    /// Status is derived at `ctx.now` before the predicate runs.
    pub async fn list_where(
        &self,
        ctx: &Context<'_>,
        predicate: impl Fn(&CurrentRecord<R>) -> bool,
    ) -> Result<Vec<CurrentRecord<R>>> {
        let live = self.live_set().await?;
        let mut records: Vec<CurrentRecord<R>> = live
            .into_records()
            .into_iter()
            .map(|record| record.evaluate(ctx.now))
            .filter(|record| predicate(record))
            .collect();

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    pub async fn get_by_id(&self, ctx: &Context<'_>, root: &RootId) -> Result<CurrentRecord<R>> {
        let record = self.reader().current::<R>(root).await?;
        Ok(record.evaluate(ctx.now))
    }

    /// Every link of the chain, Creation first. Includes hidden chains.
    pub async fn history(&self, root: &RootId) -> Result<Vec<Revision<R>>> {
        let entries = self.reader().read_all(Some(&[R::TYPE])).await?;
        chain_history::<R>(&entries, root).ok_or(EngineError::NotFound(*root))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────────

    /// Publish a Creation. Its key is the new resource's root id.
    pub async fn create(&self, ctx: &Context<'_>, fields: R) -> Result<LogEntry> {
        fields.validate().map_err(EngineError::InvalidFields)?;

        let content = Content::creation(R::TYPE, &fields)?;
        let entry = self.store.append(ctx.actor, ctx.now, &content).await?;
        info!(resource_type = R::TYPE, root = %entry.key(), "created resource");
        Ok(entry)
    }

    /// Replace the fields of `root`, keeping recorded actions.
    ///
    /// Owner only. Fails `InvalidState` once the effective status is
    /// terminal.
    pub async fn update(&self, ctx: &Context<'_>, root: &RootId, fields: R) -> Result<LogEntry> {
        let actor = ctx.actor_id();
        let now = ctx.now;
        self.mutations()
            .apply(ctx, root, None, move |current, next: &mut R| {
                ensure_owner(&actor, current)?;
                ensure_open(current, now)?;
                let mut fields = fields;
                fields.carry_over(next);
                *next = fields;
                Ok(())
            })
            .await
    }

    /// Change some fields of `root` in place. Same rules as [`update`].
    ///
    /// [`update`]: Collection::update
    pub async fn modify(
        &self,
        ctx: &Context<'_>,
        root: &RootId,
        change: impl FnOnce(&mut R),
    ) -> Result<LogEntry> {
        let actor = ctx.actor_id();
        let now = ctx.now;
        self.mutations()
            .apply(ctx, root, None, move |current, next: &mut R| {
                ensure_owner(&actor, current)?;
                ensure_open(current, now)?;
                change(next);
                Ok(())
            })
            .await
    }

    /// Tombstone the current tip. Owner only.
    pub async fn remove(&self, ctx: &Context<'_>, root: &RootId) -> Result<LogEntry> {
        let current = self.reader().current::<R>(root).await?;
        ensure_owner(&ctx.actor_id(), &current)?;

        let content = Content::tombstone(current.tip, ctx.now).with_reason("removed");
        let entry = self.store.append(ctx.actor, ctx.now, &content).await?;
        info!(resource_type = R::TYPE, root = %root, key = %entry.key(), "removed resource");
        Ok(entry)
    }
}

impl<'e, S: FeedStore + ?Sized, R: Actionable> Collection<'e, S, R> {
    /// Record the actor in `category`. At most once per actor.
    ///
    /// Open to any actor. Fails `AlreadyActed` on a repeat, leaving the log
    /// untouched.
    pub async fn record_action(
        &self,
        ctx: &Context<'_>,
        root: &RootId,
        category: &str,
    ) -> Result<LogEntry> {
        let actor = ctx.actor_id();
        let now = ctx.now;
        let marker = ActionMarker {
            category: category.to_string(),
            actor,
        };
        self.mutations()
            .apply(ctx, root, Some(marker), move |current, next: &mut R| {
                ensure_accepts(next, category)?;
                ensure_open(current, now)?;
                next.ledger_mut().record(category, actor, R::SCOPE)?;
                Ok(())
            })
            .await
    }

    /// Add the actor to `category`, or remove them if already present.
    pub async fn toggle_action(
        &self,
        ctx: &Context<'_>,
        root: &RootId,
        category: &str,
    ) -> Result<LogEntry> {
        let actor = ctx.actor_id();
        let now = ctx.now;
        let marker = ActionMarker {
            category: category.to_string(),
            actor,
        };
        self.mutations()
            .apply(ctx, root, Some(marker), move |current, next: &mut R| {
                ensure_accepts(next, category)?;
                ensure_open(current, now)?;
                next.ledger_mut().toggle(category, actor, R::SCOPE);
                Ok(())
            })
            .await
    }
}

fn ensure_owner<R>(actor: &AuthorId, current: &CurrentRecord<R>) -> Result<()> {
    if actor != &current.owner {
        return Err(EngineError::PermissionDenied {
            actor: *actor,
            owner: current.owner,
        });
    }
    Ok(())
}

fn ensure_open<R: Resource>(current: &CurrentRecord<R>, now: i64) -> Result<()> {
    match derive_status(&current.body, now) {
        Some(status) if status.is_terminal() => Err(EngineError::InvalidState(format!(
            "{} {} is {:?}",
            R::TYPE,
            current.id,
            status
        ))),
        _ => Ok(()),
    }
}

fn ensure_accepts<R: Actionable>(resource: &R, category: &str) -> Result<()> {
    if !resource.accepts(category) {
        return Err(EngineError::UnknownCategory(category.to_string()));
    }
    Ok(())
}
