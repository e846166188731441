//! Entry stream reader: pulls the merged log from the store.
//!
//! Every read is a full re-scan. Nothing is cached between calls, so a view
//! always reflects exactly what the store held when it was read.

use palimpsest_core::{validate_entry, LogEntry, RootId};
use palimpsest_store::FeedStore;
use palimpsest_view::{build_live_set, CurrentRecord, LiveSet, Resource};
use tracing::{debug, warn};

use crate::error::{EngineError, Result};

/// Reads and filters the merged log.
pub struct EntryReader<'s, S: ?Sized> {
    store: &'s S,
    verify_signatures: bool,
}

impl<'s, S: FeedStore + ?Sized> EntryReader<'s, S> {
    pub fn new(store: &'s S, verify_signatures: bool) -> Self {
        Self {
            store,
            verify_signatures,
        }
    }

    /// Read every entry, keeping those whose declared type is in
    /// `type_filter`.
    ///
    /// Tombstones are untyped and always kept. Store failures propagate
    /// unchanged.
    pub async fn read_all(&self, type_filter: Option<&[&str]>) -> Result<Vec<LogEntry>> {
        let entries = self.store.read_all(None).await?;
        let total = entries.len();

        let kept: Vec<LogEntry> = entries
            .into_iter()
            .filter(|entry| self.admits(entry, type_filter))
            .collect();

        debug!(total, kept = kept.len(), "read merged log");
        Ok(kept)
    }

    fn admits(&self, entry: &LogEntry, type_filter: Option<&[&str]>) -> bool {
        if self.verify_signatures {
            if let Err(e) = validate_entry(entry) {
                warn!(
                    key = %entry.key(),
                    author = %entry.author(),
                    error = %e,
                    "dropping entry that fails verification"
                );
                return false;
            }
        }

        let Some(types) = type_filter else {
            return true;
        };
        match entry.decode_content() {
            Ok(content) => match content.resource_type() {
                Some(declared) => types.iter().any(|ty| *ty == declared),
                None => true,
            },
            Err(_) => false,
        }
    }

    /// The live set of `R`, with stored (not time-derived) status.
    pub async fn live_set<R: Resource>(&self) -> Result<LiveSet<R>> {
        let entries = self.read_all(Some(&[R::TYPE])).await?;
        Ok(build_live_set(&entries))
    }

    /// The current record of `root`.
    ///
    /// Fails `MalformedChain` if the key is part of a faulted chain and
    /// `NotFound` if it is absent or hidden.
    pub async fn current<R: Resource>(&self, root: &RootId) -> Result<CurrentRecord<R>> {
        let live = self.live_set::<R>().await?;
        lookup(&live, root)
    }
}

pub(crate) fn lookup<R: Clone>(live: &LiveSet<R>, root: &RootId) -> Result<CurrentRecord<R>> {
    if let Some(record) = live.get(root) {
        return Ok(record.clone());
    }
    match live.fault_for(root) {
        Some(fault) => Err(EngineError::MalformedChain(*fault)),
        None => Err(EngineError::NotFound(*root)),
    }
}
