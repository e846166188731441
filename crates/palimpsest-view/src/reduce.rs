//! Aggregation reducer: merges records of several types into one listing.
//!
//! Records are tagged with their origin type and deduplicated by
//! `(origin, dedupe key)`: when the same thing was submitted more than once
//! the most recently updated record wins. The survivors are then filtered
//! and sorted by the caller's rules.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use palimpsest_core::RootId;

use crate::live_set::CurrentRecord;
use crate::resource::Resource;

/// Something the reducer can merge.
pub trait Reducible {
    /// The resource type the item came from.
    fn origin(&self) -> &'static str;
    fn id(&self) -> RootId;
    /// Identity for collapsing resubmissions. Defaults to the root id.
    fn dedupe_key(&self) -> Option<String> {
        None
    }
    fn updated_at(&self) -> i64;
}

impl<R: Resource> Reducible for CurrentRecord<R> {
    fn origin(&self) -> &'static str {
        R::TYPE
    }

    fn id(&self) -> RootId {
        self.id
    }

    fn dedupe_key(&self) -> Option<String> {
        self.body.dedupe_key()
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }
}

type Filter<'a, T> = Box<dyn Fn(&T) -> bool + 'a>;
type Comparator<'a, T> = Box<dyn Fn(&T, &T) -> Ordering + 'a>;

/// Deduplicating, filtering, sorting merge.
pub struct Reducer<'a, T> {
    items: BTreeMap<(&'static str, String), T>,
    filter: Option<Filter<'a, T>>,
    order: Option<Comparator<'a, T>>,
}

impl<'a, T: Reducible> Default for Reducer<'a, T> {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
            filter: None,
            order: None,
        }
    }
}

impl<'a, T: Reducible> Reducer<'a, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item, replacing an older item with the same dedupe key.
    ///
    /// Newer `updated_at` wins; ties go to the larger root id.
    pub fn push(&mut self, item: T) {
        let key = (
            item.origin(),
            item.dedupe_key().unwrap_or_else(|| item.id().to_hex()),
        );
        match self.items.get(&key) {
            Some(existing) if rank(existing) >= rank(&item) => {}
            _ => {
                self.items.insert(key, item);
            }
        }
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = T>) {
        for item in items {
            self.push(item);
        }
    }

    /// Keep only items matching `predicate`.
    pub fn filter(mut self, predicate: impl Fn(&T) -> bool + 'a) -> Self {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Order results with `compare`. Equal items fall back to root id.
    pub fn sort_by(mut self, compare: impl Fn(&T, &T) -> Ordering + 'a) -> Self {
        self.order = Some(Box::new(compare));
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Apply the filter and ordering. Without an ordering, the most recently
    /// updated items come first.
    pub fn finish(self) -> Vec<T> {
        let Reducer {
            items,
            filter,
            order,
        } = self;

        let mut out: Vec<T> = match &filter {
            Some(keep) => items.into_values().filter(|item| keep(item)).collect(),
            None => items.into_values().collect(),
        };

        match &order {
            Some(compare) => {
                out.sort_by(|a, b| compare(a, b).then_with(|| a.id().cmp(&b.id())))
            }
            None => out.sort_by(|a, b| rank(b).cmp(&rank(a))),
        }
        out
    }
}

fn rank<T: Reducible>(item: &T) -> (i64, RootId) {
    (item.updated_at(), item.id())
}
