//! Chain resolver: groups Creations and Edits into per-resource chains.
//!
//! Every Edit points at the entry it supersedes. Walking those pointers
//! backward from any link reaches the Creation (the root); walking the
//! inverse edges forward from the root reaches every link. Links that no
//! root reaches are malformed and reported as faults.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use palimpsest_core::{EntryKey, RootId};

use crate::classify::Envelope;
use crate::error::{ChainFault, FaultKind};

/// One link of a resolved chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub key: EntryKey,
    /// Distance from the Creation. The Creation is depth 0.
    pub depth: u64,
    pub timestamp: i64,
    /// No other link supersedes this one.
    pub is_leaf: bool,
}

impl Link {
    /// Ordering used to pick the tip among leaves.
    fn rank(&self) -> (u64, i64, EntryKey) {
        (self.depth, self.timestamp, self.key)
    }
}

/// A resolved chain: a tree of links rooted at one Creation.
///
/// Well-formed histories are linear. Concurrent edits of the same link
/// fork the tree; the tip is then the greatest leaf by
/// `(depth, timestamp, key)`, which does not depend on arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub root: RootId,
    /// Links ordered by `(depth, timestamp, key)`; the Creation is first.
    pub links: Vec<Link>,
}

impl Chain {
    pub fn leaves(&self) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(|link| link.is_leaf)
    }

    pub fn tip(&self) -> &Link {
        // A chain always has its Creation, and a finite tree has a leaf.
        self.leaves()
            .max_by_key(|link| link.rank())
            .unwrap_or(&self.links[0])
    }

    pub fn contains(&self, key: &EntryKey) -> bool {
        self.links.iter().any(|link| &link.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &EntryKey> {
        self.links.iter().map(|link| &link.key)
    }
}

/// Output of [`ChainResolver::resolve`].
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Chains ordered by root key.
    pub chains: Vec<Chain>,
    pub faults: Vec<ChainFault>,
}

/// Builds chains from the Creations and Edits of one resource type.
pub struct ChainResolver<'a, N: Envelope> {
    nodes: BTreeMap<EntryKey, &'a N>,
}

impl<'a, N: Envelope> Default for ChainResolver<'a, N> {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }
}

impl<'a, N: Envelope> ChainResolver<'a, N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a Creation or Edit. Tombstones are ignored.
    pub fn insert(&mut self, node: &'a N) {
        if node.tombstone_target().is_none() {
            self.nodes.insert(node.key(), node);
        }
    }

    pub fn extend(&mut self, nodes: impl IntoIterator<Item = &'a N>) {
        for node in nodes {
            self.insert(node);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walk `supersedes` pointers back from `key` to its Creation.
    pub fn root_of(&self, key: &EntryKey) -> Result<RootId, ChainFault> {
        let mut seen = BTreeSet::new();
        let mut current = *key;

        loop {
            if !seen.insert(current) {
                return Err(ChainFault {
                    key: *key,
                    kind: FaultKind::Cycle,
                });
            }
            let node = self.nodes.get(&current).ok_or(ChainFault {
                key: *key,
                kind: FaultKind::Dangling,
            })?;
            match node.supersedes() {
                Some(parent) => current = *parent,
                None => return Ok(current),
            }
        }
    }

    /// Resolve every chain reachable from a Creation and report the rest.
    pub fn resolve(&self) -> Resolution {
        self.resolve_with(|_, _, _| Ok(()))
    }

    /// Resolve, keeping an Edit only if `admit(root, parent, edit)` accepts
    /// it.
    ///
    /// A rejected Edit is reported with the kind `admit` returned. Links
    /// that build on it are unreachable and reported `Dangling`; the rest
    /// of the chain, and its tip selection, proceed without them.
    pub fn resolve_with<F>(&self, mut admit: F) -> Resolution
    where
        F: FnMut(&N, &N, &N) -> Result<(), FaultKind>,
    {
        let mut superseded_by: BTreeMap<EntryKey, Vec<EntryKey>> = BTreeMap::new();
        for (key, node) in &self.nodes {
            if let Some(parent) = node.supersedes() {
                if self.nodes.contains_key(parent) {
                    superseded_by.entry(*parent).or_default().push(*key);
                }
            }
        }

        let mut reached = BTreeSet::new();
        let mut rejected = BTreeMap::new();
        let mut chains = Vec::new();

        for (root, root_node) in self.nodes.iter().filter(|(_, n)| n.supersedes().is_none()) {
            let mut links = Vec::new();
            let mut queue = VecDeque::from([(*root, 0u64)]);

            while let Some((key, depth)) = queue.pop_front() {
                if !reached.insert(key) {
                    continue;
                }
                let node = self.nodes[&key];
                let children = superseded_by.get(&key).map(Vec::as_slice).unwrap_or(&[]);
                let mut admitted = Vec::with_capacity(children.len());
                for child in children {
                    match admit(*root_node, node, self.nodes[child]) {
                        Ok(()) => admitted.push(*child),
                        Err(kind) => {
                            rejected.insert(*child, kind);
                        }
                    }
                }

                links.push(Link {
                    key,
                    depth,
                    timestamp: node.timestamp(),
                    is_leaf: admitted.is_empty(),
                });
                queue.extend(admitted.into_iter().map(|child| (child, depth + 1)));
            }

            links.sort_by_key(|link| link.rank());
            chains.push(Chain { root: *root, links });
        }

        let mut faults: Vec<ChainFault> = self
            .nodes
            .keys()
            .filter(|key| !reached.contains(*key))
            .map(|key| match rejected.get(key) {
                Some(&kind) => ChainFault { key: *key, kind },
                None => self.root_of(key).err().unwrap_or(ChainFault {
                    key: *key,
                    kind: FaultKind::Dangling,
                }),
            })
            .collect();
        faults.sort();

        Resolution { chains, faults }
    }
}
