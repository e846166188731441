//! Store failures surface unchanged through the engine.

use anyhow::Result;
use palimpsest::resources::Task;
use palimpsest::{Context, Engine, EngineConfig, EngineError, ListFilter};
use palimpsest_store::{FeedStore, StoreError};
use palimpsest_testkit::fixtures::{Participant, EPOCH};
use palimpsest_testkit::{init_tracing, FlakyFeed};

fn unavailable<T>(result: palimpsest::Result<T>) -> bool {
    matches!(result, Err(EngineError::Store(StoreError::Unavailable(_))))
}

#[tokio::test]
async fn test_unreachable_store_fails_every_operation() -> Result<()> {
    init_tracing();
    let engine = Engine::new(FlakyFeed::new(), EngineConfig::default());
    let alice = Participant::new("alice", 1);
    let ctx = Context::new(&alice.keypair, EPOCH);
    let tasks = engine.collection::<Task>();

    let root = tasks.create(&ctx, Task::new("fix the gate")).await?.key();
    let stored = engine.store().inner().read_all(None).await?;

    engine.store().set_reachable(false);

    assert!(unavailable(tasks.list_all(&ctx, &ListFilter::default()).await));
    assert!(unavailable(tasks.get_by_id(&ctx, &root).await));
    assert!(unavailable(tasks.create(&ctx, Task::new("again")).await));
    assert!(unavailable(
        tasks.modify(&ctx, &root, |task| task.title = "renamed".into()).await
    ));
    assert!(unavailable(tasks.remove(&ctx, &root).await));
    assert!(unavailable(engine.ingest(&stored[0]).await));

    // Nothing was written while the store was down.
    assert_eq!(engine.store().inner().len(), 1);

    engine.store().set_reachable(true);
    let record = tasks.get_by_id(&ctx, &root).await?;
    assert_eq!(record.body.title, "fix the gate");
    assert_eq!(record.version, 0);
    Ok(())
}

#[tokio::test]
async fn test_activity_propagates_store_errors() -> Result<()> {
    let engine = Engine::new(FlakyFeed::new(), EngineConfig::default());
    let alice = Participant::new("alice", 1);
    let ctx = Context::new(&alice.keypair, EPOCH);

    engine.store().set_reachable(false);
    let result = engine
        .activity(&ctx, &Default::default(), Default::default())
        .await;
    assert!(unavailable(result));
    Ok(())
}
