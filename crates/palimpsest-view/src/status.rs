//! Time-derived status.
//!
//! Status that depends on the clock is never written back. Readers compute
//! it from the stored status, the deadline, and the caller's `now`.

use serde::{Deserialize, Serialize};

use crate::resource::Resource;

/// Lifecycle of status-bearing resources.
///
/// `Open -> Closed` by time expiry or explicit edit, optionally through
/// `InProgress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    Open,
    InProgress,
    Closed,
}

impl Status {
    /// Terminal statuses reject further updates and actions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Closed)
    }
}

/// The effective status of `resource` at `now`.
///
/// A stored `Open` whose deadline has passed reads as `Closed`. Everything
/// else reads as stored. Types without a stored status return `None`.
pub fn derive_status<R: Resource>(resource: &R, now: i64) -> Option<Status> {
    let stored = resource.stored_status()?;
    match (stored, resource.deadline()) {
        (Status::Open, Some(deadline)) if deadline < now => Some(Status::Closed),
        _ => Some(stored),
    }
}
