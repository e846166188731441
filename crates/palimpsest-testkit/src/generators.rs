//! Proptest strategies for random edit histories.
//!
//! A history is a list of [`Step`]s replayed by [`build_history`] into a
//! signed, feed-contiguous log. Edits pick an arbitrary earlier link as
//! their predecessor, so forks are common; tombstones pick any earlier
//! entry and any author, so foreign and misdirected tombstones show up too.

use palimpsest_core::{Content, EntryBuilder, EntryKey, Keypair, LogEntry};
use palimpsest_view::{Resource, TombstonePolicy};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Number of distinct authors a generated history draws from.
pub const AUTHORS: u8 = 3;

/// Timestamp of the first generated entry.
pub const BASE_TIME: i64 = 1_700_000_000_000;

/// A tip-only resource type for generated histories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub text: String,
}

impl Resource for Note {
    const TYPE: &'static str = "note";
}

/// A whole-chain resource type for generated histories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub text: String,
}

impl Resource for Notice {
    const TYPE: &'static str = "notice";
    const POLICY: TombstonePolicy = TombstonePolicy::WholeChain;
}

/// One generated write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A new Note (or Notice, when `whole_chain`).
    Create { author: u8, whole_chain: bool },
    /// An edit superseding the `pick`-th link written so far.
    Edit { author: u8, pick: usize },
    /// A tombstone targeting the `pick`-th entry written so far.
    Tombstone { author: u8, pick: usize },
    /// An edit whose predecessor was never written.
    Stray { author: u8, target: [u8; 32] },
    /// A Note creation whose body is not a Note.
    Garbled { author: u8 },
}

impl Step {
    fn author(&self) -> u8 {
        match *self {
            Step::Create { author, .. }
            | Step::Edit { author, .. }
            | Step::Tombstone { author, .. }
            | Step::Stray { author, .. }
            | Step::Garbled { author } => author,
        }
    }
}

/// The keypair behind author index `n`.
pub fn author(n: u8) -> Keypair {
    Keypair::from_seed(&[n % AUTHORS + 1; 32])
}

/// Strategy for a single step, weighted toward creates and edits.
pub fn step() -> impl Strategy<Value = Step> {
    let author = 0..AUTHORS;
    prop_oneof![
        4 => (author.clone(), any::<bool>())
            .prop_map(|(author, whole_chain)| Step::Create { author, whole_chain }),
        6 => (author.clone(), any::<usize>()).prop_map(|(author, pick)| Step::Edit { author, pick }),
        3 => (author.clone(), any::<usize>())
            .prop_map(|(author, pick)| Step::Tombstone { author, pick }),
        1 => (author.clone(), any::<[u8; 32]>())
            .prop_map(|(author, target)| Step::Stray { author, target }),
        1 => author.prop_map(|author| Step::Garbled { author }),
    ]
}

/// Strategy for a signed history of at most `max_steps` entries.
pub fn history(max_steps: usize) -> impl Strategy<Value = Vec<LogEntry>> {
    prop::collection::vec(step(), 1..=max_steps).prop_map(|steps| build_history(&steps))
}

/// Strategy for a history together with a permutation of it.
pub fn shuffled_history(
    max_steps: usize,
) -> impl Strategy<Value = (Vec<LogEntry>, Vec<LogEntry>)> {
    history(max_steps).prop_flat_map(|log| (Just(log.clone()), Just(log).prop_shuffle()))
}

/// `count` steps drawn from a seeded RNG, for benchmarks.
pub fn random_steps(count: usize, seed: u64) -> Vec<Step> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let author = rng.gen_range(0..AUTHORS);
            match rng.gen_range(0..20) {
                0..=5 => Step::Create {
                    author,
                    whole_chain: rng.gen_bool(0.3),
                },
                6..=16 => Step::Edit {
                    author,
                    pick: rng.gen(),
                },
                17..=18 => Step::Tombstone {
                    author,
                    pick: rng.gen(),
                },
                _ => Step::Stray {
                    author,
                    target: rng.gen(),
                },
            }
        })
        .collect()
}

/// Replay `steps` into a signed log.
///
/// Steps that have nothing to point at yet are skipped. Timestamps advance
/// every second entry, so equal timestamps are common.
pub fn build_history(steps: &[Step]) -> Vec<LogEntry> {
    let keypairs: Vec<Keypair> = (0..AUTHORS).map(author).collect();
    let mut heads: Vec<Option<(u64, EntryKey)>> = vec![None; usize::from(AUTHORS)];
    // (key, type, depth) of every Creation and Edit written so far.
    let mut links: Vec<(EntryKey, &'static str, u64)> = Vec::new();
    let mut log: Vec<LogEntry> = Vec::new();

    for (i, step) in steps.iter().enumerate() {
        let timestamp = BASE_TIME + (i as i64 / 2) * 1_000;
        let text = format!("revision {i}");

        let (content, link) = match *step {
            Step::Create { whole_chain, .. } => {
                let ty = if whole_chain { Notice::TYPE } else { Note::TYPE };
                (body(Content::creation(ty, &Note { text })), Some((ty, 0)))
            }
            Step::Edit { pick, .. } => {
                if links.is_empty() {
                    continue;
                }
                let (target, ty, depth) = links[pick % links.len()];
                let edit = Content::edit(ty, target, depth + 1, &Note { text });
                (body(edit), Some((ty, depth + 1)))
            }
            Step::Tombstone { pick, .. } => {
                if log.is_empty() {
                    continue;
                }
                let target = log[pick % log.len()].key();
                (Content::tombstone(target, timestamp), None)
            }
            Step::Stray { target, .. } => {
                let missing = EntryKey::from_bytes(target);
                (body(Content::edit(Note::TYPE, missing, 1, &Note { text })), None)
            }
            Step::Garbled { .. } => (body(Content::creation(Note::TYPE, &i)), None),
        };

        let index = usize::from(step.author());
        let signer = &keypairs[index];
        let builder = match heads[index] {
            Some((seq, prev)) => EntryBuilder::new(signer.author_id(), seq + 1).prev(prev),
            None => EntryBuilder::new(signer.author_id(), 1),
        };
        let entry = body(builder.timestamp(timestamp).content(&content)).sign(signer);

        heads[index] = Some((entry.seq(), entry.key()));
        if let Some((ty, depth)) = link {
            links.push((entry.key(), ty, depth));
        }
        log.push(entry);
    }

    log
}

/// Generated bodies are plain structs and integers; encoding them cannot fail.
fn body<T, E: std::fmt::Debug>(result: Result<T, E>) -> T {
    result.expect("generated content encodes")
}
