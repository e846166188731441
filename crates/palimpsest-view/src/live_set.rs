//! Live-set builder: one current record per visible resource.
//!
//! Composes the classifier, the chain resolver, and the tombstone tracker:
//! classify every entry, resolve the chains of one type, drop chains the
//! type's policy hides, and decode each remaining tip.

use std::collections::{BTreeMap, BTreeSet};

use palimpsest_core::{
    decode_body, encode_body, ActionMarker, AuthorId, EntryKey, EntryKind, LogEntry, RootId,
};
use tracing::{debug, warn};

use crate::chain::{ChainResolver, Resolution};
use crate::classify::{Classified, Classifier};
use crate::error::{ChainFault, FaultKind, ViewError};
use crate::resource::Resource;
use crate::status::{derive_status, Status};
use crate::tombstone::TombstoneTracker;

/// The current state of one live resource.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentRecord<R> {
    /// The root id: key of the Creation.
    pub id: RootId,
    /// Key of the selected tip.
    pub tip: EntryKey,
    /// Author of the Creation.
    pub owner: AuthorId,
    /// Author of the tip.
    pub last_editor: AuthorId,
    pub created_at: i64,
    pub updated_at: i64,
    /// Depth of the tip in its chain.
    pub version: u64,
    /// Number of links in the chain, forks included.
    pub revisions: usize,
    /// Stored status until [`CurrentRecord::evaluate`] derives it for a
    /// point in time.
    pub status: Option<Status>,
    pub body: R,
}

impl<R: Resource> CurrentRecord<R> {
    /// Recompute time-derived status at `now`. Nothing is written back.
    pub fn evaluate(mut self, now: i64) -> Self {
        self.status = derive_status(&self.body, now);
        self
    }
}

/// One link of a chain, as shown by history views.
#[derive(Debug, Clone, PartialEq)]
pub struct Revision<R> {
    pub key: EntryKey,
    pub author: AuthorId,
    pub timestamp: i64,
    pub version: u64,
    pub kind: EntryKind,
    pub action: Option<ActionMarker>,
    /// Someone published a tombstone for this link.
    pub tombstoned: bool,
    pub is_tip: bool,
    /// `None` if the body does not decode as the declared type.
    pub body: Option<R>,
}

/// The live set of one resource type.
#[derive(Debug, Clone)]
pub struct LiveSet<R> {
    records: BTreeMap<RootId, CurrentRecord<R>>,
    hidden: BTreeSet<RootId>,
    faults: Vec<ChainFault>,
}

impl<R> LiveSet<R> {
    pub fn get(&self, id: &RootId) -> Option<&CurrentRecord<R>> {
        self.records.get(id)
    }

    /// Records ordered by root id.
    pub fn iter(&self) -> impl Iterator<Item = &CurrentRecord<R>> {
        self.records.values()
    }

    pub fn into_records(self) -> Vec<CurrentRecord<R>> {
        self.records.into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether `id` is a well-formed chain removed by a tombstone.
    pub fn is_hidden(&self, id: &RootId) -> bool {
        self.hidden.contains(id)
    }

    pub fn faults(&self) -> &[ChainFault] {
        &self.faults
    }

    pub fn fault_for(&self, key: &EntryKey) -> Option<&ChainFault> {
        self.faults.iter().find(|fault| &fault.key == key)
    }
}

/// Classified entries of one type, with tombstones and resolved chains.
struct Compaction<'a> {
    nodes: BTreeMap<EntryKey, &'a Classified>,
    tracker: TombstoneTracker,
    resolution: Resolution,
}

impl<'a> Compaction<'a> {
    fn new<R: Resource>(classified: &'a [Classified]) -> Self {
        let mut tracker = TombstoneTracker::new();
        let mut resolver = ChainResolver::new();
        let mut nodes = BTreeMap::new();

        for entry in classified {
            if tracker.record(entry) {
                continue;
            }
            if entry.resource_type() == Some(R::TYPE) {
                resolver.insert(entry);
                nodes.insert(entry.key, entry);
            }
        }

        Self {
            nodes,
            tracker,
            resolution: resolver.resolve_with(admit::<R>),
        }
    }
}

/// Whether `edit` may supersede `parent` in the chain rooted at `root`.
///
/// The owner may publish anything. Anyone else may only publish an action
/// of their own: marked with themselves as actor, and changing nothing but
/// their membership in the marked category.
fn admit<R: Resource>(
    root: &Classified,
    parent: &Classified,
    edit: &Classified,
) -> Result<(), FaultKind> {
    if edit.author == root.author {
        return Ok(());
    }
    let marker = edit
        .content
        .action()
        .filter(|marker| marker.actor == edit.author)
        .ok_or(FaultKind::Unauthorized)?;

    let body = decode::<R>(edit).map_err(|_| FaultKind::Undecodable)?;
    let expected = decode::<R>(parent)
        .ok()
        .and_then(|before| before.acted_on(&marker.category, marker.actor))
        .ok_or(FaultKind::Unauthorized)?;

    match (encode_body(&expected), encode_body(&body)) {
        (Ok(expected), Ok(body)) if expected == body => Ok(()),
        _ => Err(FaultKind::Unauthorized),
    }
}

fn decode<R: Resource>(node: &Classified) -> Result<R, ViewError> {
    let body = node
        .content
        .body()
        .ok_or_else(|| ViewError::Decode("entry has no body".into()))?;
    decode_body(body).map_err(|e| ViewError::Decode(e.to_string()))
}

/// Build the live set of `R` from the raw log.
///
/// Pure: the result depends only on the set of entries given, not on their
/// order or on duplicates.
pub fn build_live_set<R: Resource>(entries: &[LogEntry]) -> LiveSet<R> {
    let classified = Classifier::for_types([R::TYPE]).classify_all(entries);
    build_from_classified(&classified)
}

/// Build the live set of `R` from already classified entries.
pub fn build_from_classified<R: Resource>(classified: &[Classified]) -> LiveSet<R> {
    let compaction = Compaction::new::<R>(classified);
    let mut records = BTreeMap::new();
    let mut hidden = BTreeSet::new();
    let mut faults = compaction.resolution.faults.clone();

    for chain in &compaction.resolution.chains {
        let root = compaction.nodes[&chain.root];
        if compaction.tracker.hides(chain, R::POLICY, &root.author) {
            hidden.insert(chain.root);
            continue;
        }

        let link = chain.tip();
        let tip = compaction.nodes[&link.key];
        let body = match decode::<R>(tip) {
            Ok(body) => body,
            Err(e) => {
                debug!(root = %chain.root, error = %e, "tip does not decode");
                faults.push(ChainFault {
                    key: chain.root,
                    kind: FaultKind::Undecodable,
                });
                continue;
            }
        };

        records.insert(
            chain.root,
            CurrentRecord {
                id: chain.root,
                tip: link.key,
                owner: root.author,
                last_editor: tip.author,
                created_at: root.timestamp,
                updated_at: tip.timestamp,
                version: link.depth,
                revisions: chain.links.len(),
                status: body.stored_status(),
                body,
            },
        );
    }

    faults.sort();
    for fault in &faults {
        warn!(resource_type = R::TYPE, %fault, "excluding malformed chain");
    }
    debug!(
        resource_type = R::TYPE,
        live = records.len(),
        hidden = hidden.len(),
        faults = faults.len(),
        "built live set"
    );

    LiveSet {
        records,
        hidden,
        faults,
    }
}

/// Every link of the chain rooted at `root`, oldest first.
///
/// Hidden chains are included; this is an audit view. `None` if no chain
/// of type `R` has this root.
pub fn chain_history<R: Resource>(
    entries: &[LogEntry],
    root: &RootId,
) -> Option<Vec<Revision<R>>> {
    let classified = Classifier::for_types([R::TYPE]).classify_all(entries);
    let compaction = Compaction::new::<R>(&classified);
    let chain = compaction
        .resolution
        .chains
        .iter()
        .find(|chain| &chain.root == root)?;
    let tip = chain.tip().key;

    let revisions = chain
        .links
        .iter()
        .map(|link| {
            let node = compaction.nodes[&link.key];
            Revision {
                key: link.key,
                author: node.author,
                timestamp: node.timestamp,
                version: link.depth,
                kind: node.kind,
                action: node.content.action().cloned(),
                tombstoned: compaction.tracker.is_tombstoned(&link.key),
                is_tip: link.key == tip,
                body: decode::<R>(node).ok(),
            }
        })
        .collect();

    Some(revisions)
}
