//! Idempotent per-actor actions: votes, opinions, confirmations, toggles.
//!
//! An action adds an actor to a named category of a resource. The ledger
//! travels inside the resource snapshot, so the current ledger is simply
//! the tip's.

use std::collections::{BTreeMap, BTreeSet};

use palimpsest_core::AuthorId;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewError};
use crate::resource::Resource;

/// How categories of one resource relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionScope {
    /// An actor appears at most once in each category (confirmations,
    /// reactions).
    PerCategory,
    /// An actor appears in at most one category of the resource (poll
    /// votes, opinions).
    Exclusive,
}

/// Actor sets keyed by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLedger {
    categories: BTreeMap<String, BTreeSet<AuthorId>>,
}

impl ActionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, category: &str, actor: &AuthorId) -> bool {
        self.categories
            .get(category)
            .is_some_and(|actors| actors.contains(actor))
    }

    /// The first category (by name) the actor appears in.
    pub fn category_of(&self, actor: &AuthorId) -> Option<&str> {
        self.categories
            .iter()
            .find(|(_, actors)| actors.contains(actor))
            .map(|(name, _)| name.as_str())
    }

    /// Whether recording `actor` in `category` would be a repeat.
    pub fn has_acted(&self, category: &str, actor: &AuthorId, scope: ActionScope) -> bool {
        match scope {
            ActionScope::PerCategory => self.contains(category, actor),
            ActionScope::Exclusive => self.category_of(actor).is_some(),
        }
    }

    /// Add `actor` to `category`. Fails if the actor already acted.
    pub fn record(&mut self, category: &str, actor: AuthorId, scope: ActionScope) -> Result<()> {
        if self.has_acted(category, &actor, scope) {
            return Err(ViewError::AlreadyActed {
                category: category.to_string(),
            });
        }
        self.categories
            .entry(category.to_string())
            .or_default()
            .insert(actor);
        Ok(())
    }

    /// Flip `actor`'s membership in `category`. Returns whether the actor
    /// is present afterwards.
    ///
    /// Under `Exclusive`, switching into a category removes the actor
    /// from every other one.
    pub fn toggle(&mut self, category: &str, actor: AuthorId, scope: ActionScope) -> bool {
        if self.contains(category, &actor) {
            self.remove(category, &actor);
            return false;
        }
        if scope == ActionScope::Exclusive {
            let names: Vec<String> = self.categories.keys().cloned().collect();
            for name in names {
                self.remove(&name, &actor);
            }
        }
        self.categories
            .entry(category.to_string())
            .or_default()
            .insert(actor);
        true
    }

    fn remove(&mut self, category: &str, actor: &AuthorId) {
        if let Some(actors) = self.categories.get_mut(category) {
            actors.remove(actor);
            if actors.is_empty() {
                self.categories.remove(category);
            }
        }
    }

    pub fn count(&self, category: &str) -> usize {
        self.categories.get(category).map_or(0, BTreeSet::len)
    }

    pub fn actors(&self, category: &str) -> impl Iterator<Item = &AuthorId> {
        self.categories.get(category).into_iter().flatten()
    }

    /// Count per non-empty category.
    pub fn tally(&self) -> BTreeMap<&str, usize> {
        self.categories
            .iter()
            .map(|(name, actors)| (name.as_str(), actors.len()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// A resource that accepts idempotent actions.
///
/// Implementors should also override [`Resource::acted_on`] with
/// [`toggled`], or actions by anyone but the owner never reach the tip.
pub trait Actionable: Resource {
    const SCOPE: ActionScope;

    /// Fixed category names. Empty means any category is accepted.
    const CATEGORIES: &'static [&'static str] = &[];

    fn ledger(&self) -> &ActionLedger;

    fn ledger_mut(&mut self) -> &mut ActionLedger;

    fn accepts(&self, category: &str) -> bool {
        Self::CATEGORIES.is_empty() || Self::CATEGORIES.iter().any(|c| *c == category)
    }
}

/// `resource` with `actor` toggled in `category`, respecting the type's
/// scope. `None` if the category is not accepted.
pub fn toggled<R: Actionable>(resource: &R, category: &str, actor: AuthorId) -> Option<R> {
    if !resource.accepts(category) {
        return None;
    }
    let mut next = resource.clone();
    next.ledger_mut().toggle(category, actor, R::SCOPE);
    Some(next)
}
