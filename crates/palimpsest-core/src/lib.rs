//! # Palimpsest Core
//!
//! Pure primitives for Palimpsest: signed log entries, the content payload
//! union, and canonical encoding.
//!
//! This crate performs no I/O. It defines what an entry in an author's
//! append-only feed looks like, how it is addressed, and how it is signed.
//!
//! ## Key Types
//!
//! - [`LogEntry`] - One immutable, signed record in an author's feed
//! - [`EntryKey`] - Content address of an entry (Blake3 hash)
//! - [`Content`] - What an entry says: `Creation`, `Edit`, or `Tombstone`
//! - [`AuthorId`] - The Ed25519 identity that owns a feed
//!
//! ## Canonicalization
//!
//! Entry headers are encoded with deterministic CBOR. See [`canonical`].

pub mod canonical;
pub mod content;
pub mod crypto;
pub mod entry;
pub mod error;
pub mod types;
pub mod validation;

pub use canonical::{canonical_bytes, canonical_header_bytes, decode_entry};
pub use content::{decode_body, encode_body, ActionMarker, Content, EntryKind};
pub use crypto::{AuthorId, ContentHash, Keypair, Signature};
pub use entry::{EntryBuilder, EntryHeader, LogEntry, ENTRY_VERSION};
pub use error::{CoreError, ValidationError};
pub use types::{unix_millis, EntryKey, RootId};
pub use validation::{validate_entry, validate_entry_structure};
