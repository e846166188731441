//! The cross-type activity feed.

mod common;

use anyhow::Result;
use common::{engine, keypair, MINUTE, T0};
use palimpsest::resources::{Bookmark, Poll, Task};
use palimpsest::view::Reducible;
use palimpsest::{ActivityFilter, ActivityItem, ActivityOrder, Context, Status};

#[tokio::test]
async fn test_activity_merges_types_and_collapses_resubmissions() -> Result<()> {
    let engine = engine();
    let alice = keypair(1);
    let bob = keypair(2);

    engine
        .collection::<Bookmark>()
        .create(
            &Context::new(&alice, T0),
            Bookmark::new("https://example.org/garden", "Community garden"),
        )
        .await?;
    engine
        .collection::<Task>()
        .create(&Context::new(&bob, T0 + MINUTE), Task::new("Bring shovels"))
        .await?;
    engine
        .collection::<Bookmark>()
        .create(
            &Context::new(&bob, T0 + 2 * MINUTE),
            Bookmark::new("https://EXAMPLE.org/garden/", "Garden (again)")
                .tagged(["outdoors"]),
        )
        .await?;
    engine
        .collection::<Poll>()
        .create(
            &Context::new(&alice, T0 + 3 * MINUTE),
            Poll::new("Meet at 10?", ["yes", "no"]),
        )
        .await?;

    let ctx = Context::new(&alice, T0 + 4 * MINUTE);
    let items = engine
        .activity(&ctx, &ActivityFilter::default(), ActivityOrder::RecentlyUpdated)
        .await?;

    let titles: Vec<&str> = items.iter().map(ActivityItem::title).collect();
    assert_eq!(titles, vec!["Meet at 10?", "Garden (again)", "Bring shovels"]);

    let oldest = engine
        .activity(&ctx, &ActivityFilter::default(), ActivityOrder::Oldest)
        .await?;
    assert_eq!(oldest[0].origin(), "task");
    Ok(())
}

#[tokio::test]
async fn test_activity_filters() -> Result<()> {
    let engine = engine();
    let alice = keypair(1);
    let bob = keypair(2);
    let tasks = engine.collection::<Task>();

    tasks
        .create(
            &Context::new(&alice, T0),
            Task::new("expired").with_deadline(T0 + MINUTE),
        )
        .await?;
    tasks
        .create(&Context::new(&bob, T0 + 2 * MINUTE), Task::new("fresh"))
        .await?;
    engine
        .collection::<Bookmark>()
        .create(
            &Context::new(&bob, T0 + 3 * MINUTE),
            Bookmark::new("https://example.org", "Example"),
        )
        .await?;

    let ctx = Context::new(&alice, T0 + 10 * MINUTE);
    let order = ActivityOrder::RecentlyCreated;

    let closed = ActivityFilter::default().with_status(Status::Closed);
    let items = engine.activity(&ctx, &closed, order).await?;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title(), "expired");

    let bobs_tasks = ActivityFilter::default()
        .owned_by(bob.author_id())
        .of_type("task");
    let items = engine.activity(&ctx, &bobs_tasks, order).await?;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title(), "fresh");

    let recent = ActivityFilter::default().since(T0 + 2 * MINUTE);
    assert_eq!(engine.activity(&ctx, &recent, order).await?.len(), 2);
    Ok(())
}
