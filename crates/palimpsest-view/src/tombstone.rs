//! Tombstone tracker: which entries have been marked deleted, and by whom.

use std::collections::{BTreeMap, BTreeSet};

use palimpsest_core::{AuthorId, EntryKey};

use crate::chain::Chain;
use crate::classify::Envelope;
use crate::resource::TombstonePolicy;

/// Collects tombstone targets from the log.
///
/// Anyone can publish a tombstone naming any key, but only tombstones
/// written by a chain's owner (the author of its Creation) hide it.
/// Tombstones from other actors are recorded but never hide a chain.
#[derive(Debug, Clone, Default)]
pub struct TombstoneTracker {
    targets: BTreeMap<EntryKey, BTreeSet<AuthorId>>,
}

impl TombstoneTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `entry` if it is a tombstone. Returns whether it was one.
    pub fn record<E: Envelope>(&mut self, entry: &E) -> bool {
        match entry.tombstone_target() {
            Some(target) => {
                self.targets
                    .entry(*target)
                    .or_default()
                    .insert(*entry.author());
                true
            }
            None => false,
        }
    }

    pub fn is_tombstoned(&self, key: &EntryKey) -> bool {
        self.targets.contains_key(key)
    }

    pub fn is_tombstoned_by(&self, key: &EntryKey, author: &AuthorId) -> bool {
        self.targets
            .get(key)
            .is_some_and(|authors| authors.contains(author))
    }

    /// Whether `chain`, owned by `owner`, is hidden under `policy`.
    pub fn hides(&self, chain: &Chain, policy: TombstonePolicy, owner: &AuthorId) -> bool {
        match policy {
            TombstonePolicy::TipOnly => self.is_tombstoned_by(&chain.tip().key, owner),
            TombstonePolicy::WholeChain => {
                chain.keys().any(|key| self.is_tombstoned_by(key, owner))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
