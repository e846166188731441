//! Collection operations over a live engine: create, read, update, remove,
//! and how the log's history compacts into what readers see.

mod common;

use anyhow::Result;
use common::{engine, engine_with, keypair, MINUTE, T0};
use palimpsest::core::{ActionMarker, EntryBuilder, EntryKind};
use palimpsest::resources::{Report, Task};
use palimpsest::store::{FeedStore, MemoryFeed};
use palimpsest::{
    Content, Context, Engine, EngineConfig, EngineError, EntryKey, FaultKind, ListFilter,
    Resource, Status, TombstonePolicy, WriteMode,
};

const MODES: [WriteMode; 2] = [WriteMode::TombstoneThenEdit, WriteMode::VersionedEdit];

#[tokio::test]
async fn test_create_then_get() -> Result<()> {
    let engine = engine();
    let alice = keypair(1);
    let ctx = Context::new(&alice, T0);
    let tasks = engine.collection::<Task>();

    let entry = tasks.create(&ctx, Task::new("sweep the stairs")).await?;
    let record = tasks.get_by_id(&ctx, &entry.key()).await?;

    assert_eq!(record.id, entry.key());
    assert_eq!(record.tip, entry.key());
    assert_eq!(record.owner, alice.author_id());
    assert_eq!(record.version, 0);
    assert_eq!(record.created_at, T0);
    assert_eq!(record.status, Some(Status::Open));
    assert_eq!(record.body.title, "sweep the stairs");
    Ok(())
}

#[tokio::test]
async fn test_update_is_visible_in_every_write_mode() -> Result<()> {
    for mode in MODES {
        let engine = engine_with(EngineConfig::default().with_write_mode(mode));
        let alice = keypair(1);
        let tasks = engine.collection::<Task>();

        let root = tasks
            .create(&Context::new(&alice, T0), Task::new("draft"))
            .await?
            .key();
        let later = Context::new(&alice, T0 + MINUTE);
        tasks
            .update(&later, &root, Task::new("final").with_description("v2"))
            .await?;

        let record = tasks.get_by_id(&later, &root).await?;
        assert_eq!(record.body.title, "final", "{mode:?}");
        assert_eq!(record.body.description, "v2");
        assert_eq!(record.version, 1);
        assert_eq!(record.updated_at, T0 + MINUTE);

        let all = tasks.list_all(&later, &ListFilter::default()).await?;
        assert_eq!(all.len(), 1, "{mode:?}: one record per root");
    }
    Ok(())
}

#[tokio::test]
async fn test_update_by_non_owner_is_denied() -> Result<()> {
    let engine = engine();
    let alice = keypair(1);
    let bob = keypair(2);
    let tasks = engine.collection::<Task>();

    let root = tasks
        .create(&Context::new(&alice, T0), Task::new("mine"))
        .await?
        .key();
    let before = engine.store().len();

    let result = tasks
        .update(&Context::new(&bob, T0 + 1), &root, Task::new("theirs"))
        .await;
    assert!(matches!(
        result,
        Err(EngineError::PermissionDenied { actor, owner })
            if actor == bob.author_id() && owner == alice.author_id()
    ));

    let removal = tasks.remove(&Context::new(&bob, T0 + 1), &root).await;
    assert!(matches!(removal, Err(EngineError::PermissionDenied { .. })));

    assert_eq!(engine.store().len(), before);
    Ok(())
}

#[tokio::test]
async fn test_terminal_status_rejects_updates() -> Result<()> {
    let engine = engine();
    let alice = keypair(1);
    let tasks = engine.collection::<Task>();

    let root = tasks
        .create(
            &Context::new(&alice, T0),
            Task::new("file taxes").with_deadline(T0 + 10 * MINUTE),
        )
        .await?
        .key();

    tasks
        .modify(&Context::new(&alice, T0 + MINUTE), &root, |t| {
            t.description = "receipts in the blue folder".into()
        })
        .await?;

    let late = Context::new(&alice, T0 + 20 * MINUTE);
    let result = tasks.update(&late, &root, Task::new("file taxes")).await;
    assert!(matches!(result, Err(EngineError::InvalidState(_))));

    let closed = tasks
        .create(
            &Context::new(&alice, T0),
            Task::new("done").with_status(Status::Closed),
        )
        .await?
        .key();
    let result = tasks
        .modify(&Context::new(&alice, T0), &closed, |t| t.title = "again".into())
        .await;
    assert!(matches!(result, Err(EngineError::InvalidState(_))));
    Ok(())
}

#[tokio::test]
async fn test_expired_deadline_reads_closed_without_writing() -> Result<()> {
    let engine = engine();
    let alice = keypair(1);
    let tasks = engine.collection::<Task>();

    let root = tasks
        .create(
            &Context::new(&alice, T0),
            Task::new("renew passport").with_deadline(T0 + MINUTE),
        )
        .await?
        .key();
    let entries = engine.store().len();

    let before = Context::new(&alice, T0 + MINUTE);
    assert_eq!(tasks.get_by_id(&before, &root).await?.status, Some(Status::Open));

    let after = Context::new(&alice, T0 + MINUTE + 1);
    let record = tasks.get_by_id(&after, &root).await?;
    assert_eq!(record.status, Some(Status::Closed));
    assert_eq!(record.body.status, Status::Open, "stored status untouched");

    let closed = ListFilter::default().with_status(Status::Closed);
    assert_eq!(tasks.list_all(&after, &closed).await?.len(), 1);
    assert!(tasks.list_all(&before, &closed).await?.is_empty());

    assert_eq!(engine.store().len(), entries);
    Ok(())
}

#[tokio::test]
async fn test_remove_hides_from_every_read() -> Result<()> {
    let engine = engine();
    let alice = keypair(1);
    let ctx = Context::new(&alice, T0);
    let tasks = engine.collection::<Task>();

    let keep = tasks.create(&ctx, Task::new("keep")).await?.key();
    let gone = tasks.create(&ctx, Task::new("drop")).await?.key();
    tasks.modify(&ctx, &gone, |t| t.title = "drop v2".into()).await?;
    tasks.remove(&ctx, &gone).await?;

    assert!(matches!(
        tasks.get_by_id(&ctx, &gone).await,
        Err(EngineError::NotFound(id)) if id == gone
    ));
    let all = tasks.list_all(&ctx, &ListFilter::default()).await?;
    assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![keep]);
    assert!(tasks.live_set().await?.is_hidden(&gone));
    Ok(())
}

/// Creation(K1) -> Edit(supersedes K1) -> Tombstone(K1), per policy.
#[tokio::test]
async fn test_tombstone_on_superseded_link_depends_on_policy() -> Result<()> {
    let engine = engine_with(EngineConfig::default().with_write_mode(WriteMode::VersionedEdit));
    let alice = keypair(1);
    let ctx = Context::new(&alice, T0);

    assert_eq!(Task::POLICY, TombstonePolicy::TipOnly);
    let tasks = engine.collection::<Task>();
    let k1 = tasks.create(&ctx, Task::new("old")).await?.key();
    tasks.modify(&ctx, &k1, |t| t.title = "new".into()).await?;
    engine
        .store()
        .append(&alice, T0, &Content::tombstone(k1, T0))
        .await?;
    assert_eq!(tasks.get_by_id(&ctx, &k1).await?.body.title, "new");

    assert_eq!(Report::POLICY, TombstonePolicy::WholeChain);
    let reports = engine.collection::<Report>();
    let r1 = reports
        .create(&ctx, Report::new("broken lamp", "corner of 5th"))
        .await?
        .key();
    reports
        .modify(&ctx, &r1, |r| r.description = "still broken".into())
        .await?;
    engine
        .store()
        .append(&alice, T0, &Content::tombstone(r1, T0))
        .await?;
    assert!(matches!(
        reports.get_by_id(&ctx, &r1).await,
        Err(EngineError::NotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_whole_chain_types_survive_default_updates() -> Result<()> {
    let engine = engine();
    let alice = keypair(1);
    let ctx = Context::new(&alice, T0);
    let reports = engine.collection::<Report>();

    let root = reports
        .create(&ctx, Report::new("pothole", "Main St"))
        .await?
        .key();
    reports
        .update(&ctx, &root, Report::new("pothole", "Main St & 3rd"))
        .await?;

    let record = reports.get_by_id(&ctx, &root).await?;
    assert_eq!(record.body.description, "Main St & 3rd");

    let kinds: Vec<EntryKind> = reports
        .history(&root)
        .await?
        .into_iter()
        .map(|rev| rev.kind)
        .collect();
    assert_eq!(kinds, vec![EntryKind::Creation, EntryKind::Edit]);
    Ok(())
}

#[tokio::test]
async fn test_foreign_tombstones_do_not_hide() -> Result<()> {
    let engine = engine();
    let alice = keypair(1);
    let mallory = keypair(6);
    let tasks = engine.collection::<Task>();

    let root = tasks
        .create(&Context::new(&alice, T0), Task::new("alice's"))
        .await?
        .key();
    engine
        .store()
        .append(&mallory, T0 + 1, &Content::tombstone(root, T0 + 1))
        .await?;

    let record = tasks.get_by_id(&Context::new(&alice, T0 + 2), &root).await?;
    assert_eq!(record.body.title, "alice's");
    Ok(())
}

/// Two actions on the same link from different feeds, delivered in
/// opposite orders.
#[tokio::test]
async fn test_fork_resolves_the_same_everywhere() -> Result<()> {
    let alice = keypair(1);
    let bob = keypair(2);
    let carol = keypair(3);

    let base = Task::new("root");
    let creation = EntryBuilder::new(alice.author_id(), 1)
        .timestamp(T0)
        .content(&Content::creation("task", &base)?)?
        .sign(&alice);
    let k1 = creation.key();
    let assign = |who: &palimpsest::Keypair| -> Result<_> {
        let body = base
            .acted_on(Task::ASSIGNEE, who.author_id())
            .ok_or_else(|| anyhow::anyhow!("assignee rejected"))?;
        let marker = ActionMarker {
            category: Task::ASSIGNEE.into(),
            actor: who.author_id(),
        };
        Ok(EntryBuilder::new(who.author_id(), 1)
            .timestamp(T0 + MINUTE)
            .content(&Content::edit("task", k1, 1, &body)?.with_action(marker))?
            .sign(who))
    };
    let from_bob = assign(&bob)?;
    let from_carol = assign(&carol)?;

    let first = Engine::new(MemoryFeed::new(), EngineConfig::default());
    for entry in [&creation, &from_bob, &from_carol] {
        first.ingest(entry).await?;
    }
    let second = Engine::new(MemoryFeed::new(), EngineConfig::default());
    for entry in [&from_carol, &from_bob, &creation] {
        second.ingest(entry).await?;
    }

    let ctx = Context::new(&alice, T0 + 2 * MINUTE);
    let a = first.collection::<Task>().get_by_id(&ctx, &k1).await?;
    let b = second.collection::<Task>().get_by_id(&ctx, &k1).await?;
    assert_eq!(a, b);
    assert_eq!(a.revisions, 3);
    assert_eq!(a.tip, from_bob.key().max(from_carol.key()));
    assert_eq!(a.body.assignees.count(Task::ASSIGNEE), 1);
    Ok(())
}

#[tokio::test]
async fn test_malformed_chain_is_excluded_not_fatal() -> Result<()> {
    let engine = engine();
    let alice = keypair(1);
    let ctx = Context::new(&alice, T0);
    let tasks = engine.collection::<Task>();

    let good = tasks.create(&ctx, Task::new("fine")).await?.key();
    let missing = EntryKey::from_bytes([7; 32]);
    let orphan = engine
        .store()
        .append(
            &alice,
            T0,
            &Content::edit("task", missing, 1, &Task::new("orphan"))?,
        )
        .await?
        .key();

    let all = tasks.list_all(&ctx, &ListFilter::default()).await?;
    assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![good]);

    let faults = tasks.live_set().await?.faults().to_vec();
    assert_eq!(faults.len(), 1);
    assert_eq!(faults[0].kind, FaultKind::Dangling);

    assert!(matches!(
        tasks.get_by_id(&ctx, &orphan).await,
        Err(EngineError::MalformedChain(fault)) if fault.key == orphan
    ));
    Ok(())
}

#[tokio::test]
async fn test_list_all_filters_and_orders() -> Result<()> {
    let engine = engine();
    let alice = keypair(1);
    let bob = keypair(2);
    let tasks = engine.collection::<Task>();

    let a1 = tasks
        .create(&Context::new(&alice, T0), Task::new("a1"))
        .await?
        .key();
    tasks
        .create(&Context::new(&bob, T0 + 1), Task::new("b1"))
        .await?;
    let a2 = tasks
        .create(&Context::new(&alice, T0 + 2), Task::new("a2"))
        .await?
        .key();

    let ctx = Context::new(&alice, T0 + 3);
    let all = tasks.list_all(&ctx, &ListFilter::default()).await?;
    assert_eq!(
        all.iter().map(|r| r.body.title.as_str()).collect::<Vec<_>>(),
        vec!["a2", "b1", "a1"]
    );

    let mine = ListFilter::default().owned_by(alice.author_id());
    let ids: Vec<_> = tasks.list_all(&ctx, &mine).await?.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![a2, a1]);

    let recent = ListFilter::default().created_after(T0);
    assert_eq!(tasks.list_all(&ctx, &recent).await?.len(), 2);

    let short = tasks.list_where(&ctx, |r| r.body.title.len() == 2).await?;
    assert_eq!(short.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_invalid_fields_append_nothing() -> Result<()> {
    let engine = engine();
    let alice = keypair(1);
    let ctx = Context::new(&alice, T0);
    let tasks = engine.collection::<Task>();

    assert!(matches!(
        tasks.create(&ctx, Task::new("   ")).await,
        Err(EngineError::InvalidFields(_))
    ));
    let root = tasks.create(&ctx, Task::new("ok")).await?.key();
    assert!(matches!(
        tasks.modify(&ctx, &root, |t| t.title.clear()).await,
        Err(EngineError::InvalidFields(_))
    ));
    assert_eq!(engine.store().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_history_shows_the_whole_chain() -> Result<()> {
    let engine = engine();
    let alice = keypair(1);
    let tasks = engine.collection::<Task>();

    let root = tasks
        .create(&Context::new(&alice, T0), Task::new("v0"))
        .await?
        .key();
    tasks
        .modify(&Context::new(&alice, T0 + 1), &root, |t| t.title = "v1".into())
        .await?;

    let history = tasks.history(&root).await?;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].key, root);
    assert!(history[0].tombstoned, "old tip tombstoned by the default write mode");
    assert!(!history[0].is_tip);
    assert!(history[1].is_tip);
    assert_eq!(history[1].version, 1);
    assert_eq!(
        history[1].body.as_ref().map(|t| t.title.as_str()),
        Some("v1")
    );

    let unknown = EntryKey::from_bytes([1; 32]);
    assert!(matches!(
        tasks.history(&unknown).await,
        Err(EngineError::NotFound(_))
    ));
    Ok(())
}
