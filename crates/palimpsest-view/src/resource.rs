//! The Resource trait: what a declared resource type tells the compactor.

use palimpsest_core::AuthorId;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::status::Status;

/// Which tombstones remove a resource from the live set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TombstonePolicy {
    /// Only a tombstone on the selected tip hides the resource. Tombstones
    /// on superseded links are ignored, which is what lets a mutation
    /// publish `Tombstone(old tip)` followed by `Edit(supersedes: old tip)`.
    TipOnly,
    /// A tombstone on any link of the chain hides the resource. Such types
    /// are always mutated with a single versioned edit.
    WholeChain,
}

/// A resource type that lives in the log as an edit chain.
///
/// Implementors are full snapshots: every Creation and Edit body carries
/// all fields, so the current state is simply the tip's body.
pub trait Resource: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The declared type name written into each Creation and Edit.
    const TYPE: &'static str;

    const POLICY: TombstonePolicy = TombstonePolicy::TipOnly;

    /// Key used to collapse resubmissions of the same thing when results
    /// are aggregated. `None` means the root id is the identity.
    fn dedupe_key(&self) -> Option<String> {
        None
    }

    /// Check fields before they are published.
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }

    /// Copy state that an update must not erase (recorded actions, mostly)
    /// from the previous snapshot into `self`.
    fn carry_over(&mut self, _previous: &Self) {}

    /// The status as stored in the snapshot, for status-bearing types.
    fn stored_status(&self) -> Option<Status> {
        None
    }

    /// Unix ms after which an open resource reads as closed.
    fn deadline(&self) -> Option<i64> {
        None
    }

    /// The snapshot after `actor` toggles their membership in `category`.
    ///
    /// An edit by anyone but the owner is admitted only if its body is
    /// exactly this, applied to the body it supersedes. `None` (the
    /// default) admits no such edits. Actionable types return
    /// [`crate::actions::toggled`].
    fn acted_on(&self, _category: &str, _actor: AuthorId) -> Option<Self> {
        None
    }

    /// Short human-readable label, used by aggregated listings.
    fn title(&self) -> &str {
        ""
    }
}
