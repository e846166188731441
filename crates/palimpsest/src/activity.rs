//! Cross-type activity feed over the built-in resource types.
//!
//! One log read feeds every type's live set; the records are merged by the
//! aggregation reducer, which collapses resubmissions (same bookmark URL
//! posted twice) before filtering and ordering.

use std::cmp::Ordering;

use palimpsest_core::{AuthorId, RootId};
use palimpsest_view::{
    build_from_classified, Classified, CurrentRecord, Reducer, Reducible, Resource, Status,
};

use crate::resources::{Bookmark, MarketItem, Poll, Post, Report, Task};

/// A live record of any built-in type.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityItem {
    Task(CurrentRecord<Task>),
    Poll(CurrentRecord<Poll>),
    Report(CurrentRecord<Report>),
    Bookmark(CurrentRecord<Bookmark>),
    Post(CurrentRecord<Post>),
    Market(CurrentRecord<MarketItem>),
}

macro_rules! each {
    ($item:expr, $record:ident => $body:expr) => {
        match $item {
            ActivityItem::Task($record) => $body,
            ActivityItem::Poll($record) => $body,
            ActivityItem::Report($record) => $body,
            ActivityItem::Bookmark($record) => $body,
            ActivityItem::Post($record) => $body,
            ActivityItem::Market($record) => $body,
        }
    };
}

impl ActivityItem {
    /// Every type the feed aggregates.
    pub const ORIGINS: &'static [&'static str] = &[
        Task::TYPE,
        Poll::TYPE,
        Report::TYPE,
        Bookmark::TYPE,
        Post::TYPE,
        MarketItem::TYPE,
    ];

    pub fn owner(&self) -> AuthorId {
        each!(self, record => record.owner)
    }

    pub fn created_at(&self) -> i64 {
        each!(self, record => record.created_at)
    }

    pub fn status(&self) -> Option<Status> {
        each!(self, record => record.status)
    }

    pub fn title(&self) -> &str {
        each!(self, record => record.body.title())
    }
}

impl Reducible for ActivityItem {
    fn origin(&self) -> &'static str {
        match self {
            ActivityItem::Task(_) => Task::TYPE,
            ActivityItem::Poll(_) => Poll::TYPE,
            ActivityItem::Report(_) => Report::TYPE,
            ActivityItem::Bookmark(_) => Bookmark::TYPE,
            ActivityItem::Post(_) => Post::TYPE,
            ActivityItem::Market(_) => MarketItem::TYPE,
        }
    }

    fn id(&self) -> RootId {
        each!(self, record => record.id)
    }

    fn dedupe_key(&self) -> Option<String> {
        each!(self, record => record.body.dedupe_key())
    }

    fn updated_at(&self) -> i64 {
        each!(self, record => record.updated_at)
    }
}

/// Which items the feed keeps. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFilter {
    pub owner: Option<AuthorId>,
    /// Resource types to include. Empty means all of them.
    pub origins: Vec<String>,
    /// Effective status at the context's `now`. Status-less types never
    /// match a status filter.
    pub status: Option<Status>,
    /// Keep items updated at or after this instant.
    pub since: Option<i64>,
}

impl ActivityFilter {
    pub fn owned_by(mut self, owner: AuthorId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn of_type(mut self, origin: impl Into<String>) -> Self {
        self.origins.push(origin.into());
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn since(mut self, at: i64) -> Self {
        self.since = Some(at);
        self
    }

    pub fn includes(&self, origin: &str) -> bool {
        self.origins.is_empty() || self.origins.iter().any(|o| o == origin)
    }

    pub fn matches(&self, item: &ActivityItem) -> bool {
        self.includes(item.origin())
            && self.owner.map_or(true, |owner| item.owner() == owner)
            && self.status.map_or(true, |status| item.status() == Some(status))
            && self.since.map_or(true, |at| item.updated_at() >= at)
    }
}

/// Ordering of the activity feed. Ties fall back to root id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivityOrder {
    #[default]
    RecentlyUpdated,
    RecentlyCreated,
    Oldest,
}

impl ActivityOrder {
    fn compare(self, a: &ActivityItem, b: &ActivityItem) -> Ordering {
        match self {
            ActivityOrder::RecentlyUpdated => b.updated_at().cmp(&a.updated_at()),
            ActivityOrder::RecentlyCreated => b.created_at().cmp(&a.created_at()),
            ActivityOrder::Oldest => a.created_at().cmp(&b.created_at()),
        }
    }
}

/// Merge the live sets of every built-in type from one classified log.
pub fn collect_activity(
    classified: &[Classified],
    filter: &ActivityFilter,
    order: ActivityOrder,
    now: i64,
) -> Vec<ActivityItem> {
    let mut reducer = Reducer::new();
    gather(&mut reducer, classified, filter, now, ActivityItem::Task);
    gather(&mut reducer, classified, filter, now, ActivityItem::Poll);
    gather(&mut reducer, classified, filter, now, ActivityItem::Report);
    gather(&mut reducer, classified, filter, now, ActivityItem::Bookmark);
    gather(&mut reducer, classified, filter, now, ActivityItem::Post);
    gather(&mut reducer, classified, filter, now, ActivityItem::Market);

    reducer
        .filter(|item| filter.matches(item))
        .sort_by(move |a, b| order.compare(a, b))
        .finish()
}

fn gather<R: Resource>(
    reducer: &mut Reducer<'_, ActivityItem>,
    classified: &[Classified],
    filter: &ActivityFilter,
    now: i64,
    wrap: fn(CurrentRecord<R>) -> ActivityItem,
) {
    if !filter.includes(R::TYPE) {
        return;
    }
    let live = build_from_classified::<R>(classified);
    reducer.extend(
        live.into_records()
            .into_iter()
            .map(|record| wrap(record.evaluate(now))),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use palimpsest_core::{Content, EntryBuilder, Keypair, LogEntry};
    use palimpsest_view::Classifier;

    fn entry(who: &Keypair, seq: u64, at: i64, content: &Content) -> LogEntry {
        EntryBuilder::new(who.author_id(), seq)
            .timestamp(at)
            .content(content)
            .unwrap()
            .sign(who)
    }

    fn classify(entries: &[LogEntry]) -> Vec<Classified> {
        Classifier::for_types(ActivityItem::ORIGINS.iter().copied()).classify_all(entries)
    }

    fn create<T: serde::Serialize>(ty: &str, fields: &T) -> Content {
        Content::creation(ty, fields).unwrap()
    }

    #[test]
    fn test_resubmitted_bookmark_collapses_to_latest() {
        let alice = Keypair::from_seed(&[1; 32]);
        let bob = Keypair::from_seed(&[2; 32]);
        let first = Bookmark::new("https://a.org/", "A");
        let again = Bookmark::new("https://A.org", "A again");
        let log = vec![
            entry(&alice, 1, 10, &create("bookmark", &first)),
            entry(&bob, 1, 20, &create("bookmark", &again)),
            entry(&bob, 2, 30, &create("task", &Task::new("read a.org"))),
        ];

        let items = collect_activity(
            &classify(&log),
            &ActivityFilter::default(),
            ActivityOrder::default(),
            40,
        );
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].origin(), "task");
        assert_eq!(items[1].title(), "A again");
    }

    #[test]
    fn test_filter_by_origin_and_owner() {
        let alice = Keypair::from_seed(&[1; 32]);
        let bob = Keypair::from_seed(&[2; 32]);
        let log = vec![
            entry(&alice, 1, 10, &create("task", &Task::new("a"))),
            entry(&bob, 1, 20, &create("task", &Task::new("b"))),
            entry(&bob, 2, 30, &create("post", &Post::new("hello"))),
        ];
        let classified = classify(&log);

        let tasks = ActivityFilter::default().of_type("task");
        let items = collect_activity(&classified, &tasks, ActivityOrder::Oldest, 40);
        assert_eq!(items.len(), 2);

        let bobs = ActivityFilter::default().owned_by(bob.author_id());
        let items = collect_activity(&classified, &bobs, ActivityOrder::Oldest, 40);
        assert_eq!(
            items.iter().map(ActivityItem::title).collect::<Vec<_>>(),
            vec!["b", "hello"]
        );
    }

    #[test]
    fn test_status_filter_uses_derived_status() {
        let alice = Keypair::from_seed(&[1; 32]);
        let log = vec![
            entry(&alice, 1, 10, &create("task", &Task::new("due").with_deadline(50))),
            entry(&alice, 2, 20, &create("task", &Task::new("open"))),
        ];
        let classified = classify(&log);
        let closed = ActivityFilter::default().with_status(Status::Closed);

        assert!(collect_activity(&classified, &closed, ActivityOrder::default(), 40).is_empty());
        let late = collect_activity(&classified, &closed, ActivityOrder::default(), 60);
        assert_eq!(late.len(), 1);
        assert_eq!(late[0].title(), "due");
    }
}
