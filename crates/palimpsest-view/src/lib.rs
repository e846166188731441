//! # Palimpsest View
//!
//! Pure, synchronous log compaction. Given the raw merged log, this crate
//! reconstructs the current state of every resource of a type: which entry
//! is each chain's tip, which chains are hidden by tombstones, and which
//! chains are malformed.
//!
//! Nothing here performs I/O or reads a clock. The same entries always
//! produce the same live set, regardless of the order they arrive in.
//!
//! ## Pipeline
//!
//! ```text
//! LogEntry[] -> Classifier -> ChainResolver + TombstoneTracker -> LiveSet<R>
//!                                                                  |
//!                                       derive_status / Reducer <--+
//! ```
//!
//! ## Key Types
//!
//! - [`Resource`] - A declared resource type and its tombstone policy
//! - [`LiveSet`] - Current record per live root, plus faulted chains
//! - [`ActionLedger`] - Per-category actor sets for idempotent actions
//! - [`Reducer`] - Cross-type merge with dedupe, filter, and ordering

pub mod actions;
pub mod chain;
pub mod classify;
pub mod error;
pub mod live_set;
pub mod reduce;
pub mod resource;
pub mod status;
pub mod tombstone;

pub use actions::{toggled, ActionLedger, ActionScope, Actionable};
pub use chain::{Chain, ChainResolver, Link, Resolution};
pub use classify::{Classified, Classifier, Envelope};
pub use error::{ChainFault, FaultKind, Result, ViewError};
pub use live_set::{
    build_from_classified, build_live_set, chain_history, CurrentRecord, LiveSet, Revision,
};
pub use reduce::{Reducible, Reducer};
pub use resource::{Resource, TombstonePolicy};
pub use status::{derive_status, Status};
pub use tombstone::TombstoneTracker;
