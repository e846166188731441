//! Edits published by someone other than a resource's owner: only
//! well-formed actions of their own author join the chain.

mod common;

use anyhow::Result;
use common::{engine, keypair, MINUTE, T0};
use palimpsest::core::ActionMarker;
use palimpsest::resources::{Poll, Task};
use palimpsest::store::FeedStore;
use palimpsest::{Actionable, Content, Context, FaultKind, Keypair, ListFilter, Resource};

fn marker(category: &str, actor: &Keypair) -> ActionMarker {
    ActionMarker {
        category: category.into(),
        actor: actor.author_id(),
    }
}

#[tokio::test]
async fn test_undecodable_foreign_edit_cannot_hide_a_resource() -> Result<()> {
    let engine = engine();
    let alice = keypair(1);
    let mallory = keypair(6);
    let tasks = engine.collection::<Task>();

    let root = tasks
        .create(&Context::new(&alice, T0), Task::new("alice's"))
        .await?
        .key();
    let plain = engine
        .store()
        .append(&mallory, T0 + 1, &Content::edit("task", root, 1, &42u32)?)
        .await?
        .key();
    let marked = engine
        .store()
        .append(
            &mallory,
            T0 + 2,
            &Content::edit("task", root, 1, &42u32)?
                .with_action(marker(Task::ASSIGNEE, &mallory)),
        )
        .await?
        .key();

    let ctx = Context::new(&alice, T0 + MINUTE);
    let record = tasks.get_by_id(&ctx, &root).await?;
    assert_eq!(record.body.title, "alice's");
    assert_eq!(record.tip, root);
    assert_eq!(tasks.list_all(&ctx, &ListFilter::default()).await?.len(), 1);

    let live = tasks.live_set().await?;
    assert!(live.fault_for(&root).is_none());
    assert_eq!(live.fault_for(&plain).unwrap().kind, FaultKind::Unauthorized);
    assert_eq!(live.fault_for(&marked).unwrap().kind, FaultKind::Undecodable);
    Ok(())
}

#[tokio::test]
async fn test_foreign_rewrite_keeps_fields_and_votes() -> Result<()> {
    let engine = engine();
    let alice = keypair(1);
    let bob = keypair(2);
    let carol = keypair(3);
    let mallory = keypair(6);
    let polls = engine.collection::<Poll>();

    let root = polls
        .create(&Context::new(&alice, T0), Poll::new("Picnic?", ["yes", "no"]))
        .await?
        .key();
    let vote = polls
        .record_action(&Context::new(&bob, T0 + MINUTE), &root, "yes")
        .await?;

    let rewrite = engine
        .store()
        .append(
            &mallory,
            T0 + 2 * MINUTE,
            &Content::edit("poll", vote.key(), 2, &Poll::new("Mallory's?", ["a", "b"]))?,
        )
        .await?;

    let ctx = Context::new(&alice, T0 + 3 * MINUTE);
    let record = polls.get_by_id(&ctx, &root).await?;
    assert_eq!(record.body.question, "Picnic?");
    assert_eq!(record.tip, vote.key());
    assert_eq!(record.body.results(), vec![("yes", 1), ("no", 0)]);
    assert_eq!(
        polls.live_set().await?.fault_for(&rewrite.key()).unwrap().kind,
        FaultKind::Unauthorized
    );

    // Later actions chain from the real tip.
    let next = polls
        .record_action(&Context::new(&carol, T0 + 4 * MINUTE), &root, "no")
        .await?;
    let record = polls.get_by_id(&ctx, &root).await?;
    assert_eq!(record.tip, next.key());
    assert_eq!(record.body.results(), vec![("yes", 1), ("no", 1)]);
    assert_eq!(polls.history(&root).await?.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_forged_ledger_is_rejected_but_raw_actions_count() -> Result<()> {
    let engine = engine();
    let alice = keypair(1);
    let bob = keypair(2);
    let carol = keypair(3);
    let mallory = keypair(6);
    let polls = engine.collection::<Poll>();

    let root = polls
        .create(&Context::new(&alice, T0), Poll::new("Lunch?", ["soup", "salad"]))
        .await?
        .key();
    let vote = polls
        .record_action(&Context::new(&bob, T0 + MINUTE), &root, "soup")
        .await?;
    let ctx = Context::new(&alice, T0 + 2 * MINUTE);
    let before = polls.get_by_id(&ctx, &root).await?.body;

    // Mallory's own vote, with bob's quietly dropped.
    let mut forged = before.clone();
    forged.votes.toggle("soup", bob.author_id(), Poll::SCOPE);
    forged.votes.toggle("soup", mallory.author_id(), Poll::SCOPE);
    let forgery = engine
        .store()
        .append(
            &mallory,
            T0 + 2 * MINUTE,
            &Content::edit("poll", vote.key(), 2, &forged)?.with_action(marker("soup", &mallory)),
        )
        .await?;

    let honest = before
        .acted_on("salad", carol.author_id())
        .ok_or_else(|| anyhow::anyhow!("salad rejected"))?;
    let action = engine
        .store()
        .append(
            &carol,
            T0 + 3 * MINUTE,
            &Content::edit("poll", vote.key(), 2, &honest)?.with_action(marker("salad", &carol)),
        )
        .await?;

    let record = polls.get_by_id(&Context::new(&alice, T0 + 4 * MINUTE), &root).await?;
    assert_eq!(record.tip, action.key());
    assert_eq!(record.last_editor, carol.author_id());
    assert_eq!(record.body.results(), vec![("soup", 1), ("salad", 1)]);
    assert!(!record.body.votes.contains("soup", &mallory.author_id()));
    assert_eq!(
        polls.live_set().await?.fault_for(&forgery.key()).unwrap().kind,
        FaultKind::Unauthorized
    );
    Ok(())
}
