//! The explicit caller context passed to every engine operation.

use std::time::SystemTime;

use palimpsest_core::{unix_millis, AuthorId, Keypair};

/// Who is acting, and when.
///
/// The engine keeps no ambient "current user": each call names its actor
/// and clock reading, so the same engine serves many identities and tests
/// can freeze time.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    /// Signs every entry the call appends.
    pub actor: &'a Keypair,
    /// Unix milliseconds. Stamped on appends and used for derived status.
    pub now: i64,
}

impl<'a> Context<'a> {
    pub fn new(actor: &'a Keypair, now: i64) -> Self {
        Self { actor, now }
    }

    /// A context stamped with the system clock. A clock set before 1970
    /// yields a negative `now`.
    pub fn system(actor: &'a Keypair) -> Self {
        Self::new(actor, unix_millis(SystemTime::now()))
    }

    /// The same actor at another instant.
    pub fn at(self, now: i64) -> Self {
        Self { now, ..self }
    }

    pub fn actor_id(&self) -> AuthorId {
        self.actor.author_id()
    }
}
