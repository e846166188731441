//! Ingesting replicated entries, and engines over SQLite feeds.

mod common;

use anyhow::Result;
use common::{init_tracing, keypair, T0};
use palimpsest::core::{EntryBuilder, ValidationError};
use palimpsest::resources::Task;
use palimpsest::store::{FeedStore, MemoryFeed, SqliteFeed};
use palimpsest::{Content, Context, Engine, EngineConfig, EngineError, IngestResult, ListFilter};

#[tokio::test]
async fn test_replica_converges_on_the_same_view() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let alice = keypair(1);
    let bob = keypair(2);

    let origin = Engine::new(MemoryFeed::new(), EngineConfig::default());
    let tasks = origin.collection::<Task>();
    let root = tasks
        .create(&Context::new(&alice, T0), Task::new("paint fence"))
        .await?
        .key();
    tasks
        .toggle_action(&Context::new(&bob, T0 + 1), &root, Task::ASSIGNEE)
        .await?;
    tasks
        .modify(&Context::new(&alice, T0 + 2), &root, |t| {
            t.description = "white, two coats".into()
        })
        .await?;

    let replica = Engine::new(
        SqliteFeed::open(dir.path().join("replica.db"))?,
        EngineConfig::default(),
    );
    for entry in origin.store().read_all(None).await? {
        assert!(matches!(
            replica.ingest(&entry).await?,
            IngestResult::Accepted(key) if key == entry.key()
        ));
    }

    let ctx = Context::new(&alice, T0 + 3);
    let all = ListFilter::default();
    let here = origin.collection::<Task>().list_all(&ctx, &all).await?;
    let there = replica.collection::<Task>().list_all(&ctx, &all).await?;
    assert_eq!(here, there);
    assert_eq!(there[0].body.description, "white, two coats");
    assert!(there[0].body.assignees.contains(Task::ASSIGNEE, &bob.author_id()));
    Ok(())
}

#[tokio::test]
async fn test_ingest_outcomes() -> Result<()> {
    init_tracing();
    let alice = keypair(1);
    let mallory = keypair(6);
    let engine = Engine::new(MemoryFeed::new(), EngineConfig::default());

    let first = EntryBuilder::new(alice.author_id(), 1)
        .timestamp(T0)
        .content(&Content::creation("task", &Task::new("one"))?)?
        .sign(&alice);
    assert!(matches!(engine.ingest(&first).await?, IngestResult::Accepted(_)));
    assert_eq!(engine.ingest(&first).await?, IngestResult::Duplicate);

    let rival = EntryBuilder::new(alice.author_id(), 1)
        .timestamp(T0 + 1)
        .content(&Content::creation("task", &Task::new("other one"))?)?
        .sign(&alice);
    assert_eq!(
        engine.ingest(&rival).await?,
        IngestResult::Conflict {
            existing: first.key()
        }
    );

    let forged = EntryBuilder::new(alice.author_id(), 2)
        .timestamp(T0 + 2)
        .prev(first.key())
        .content(&Content::creation("task", &Task::new("forged"))?)?
        .sign(&mallory);
    assert!(matches!(
        engine.ingest(&forged).await,
        Err(EngineError::Validation(ValidationError::SignatureFailed))
    ));
    assert_eq!(engine.store().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_ingest_rejects_gaps() -> Result<()> {
    init_tracing();
    let alice = keypair(1);
    let engine = Engine::new(MemoryFeed::new(), EngineConfig::default());

    let skipped = EntryBuilder::new(alice.author_id(), 2)
        .timestamp(T0)
        .prev(palimpsest::EntryKey::from_bytes([1; 32]))
        .content(&Content::creation("task", &Task::new("two"))?)?
        .sign(&alice);
    assert!(matches!(
        engine.ingest(&skipped).await,
        Err(EngineError::Store(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_sqlite_engine_survives_reopen() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("feeds.db");
    let alice = keypair(1);
    let ctx = Context::new(&alice, T0);

    let root = {
        let engine = Engine::new(SqliteFeed::open(&path)?, EngineConfig::default());
        let tasks = engine.collection::<Task>();
        let root = tasks.create(&ctx, Task::new("persist me")).await?.key();
        tasks
            .modify(&ctx, &root, |t| t.title = "persisted".into())
            .await?;
        root
    };

    let engine = Engine::new(SqliteFeed::open(&path)?, EngineConfig::default());
    let record = engine.collection::<Task>().get_by_id(&ctx, &root).await?;
    assert_eq!(record.body.title, "persisted");
    assert_eq!(record.version, 1);
    Ok(())
}
