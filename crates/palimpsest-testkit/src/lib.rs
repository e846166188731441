//! # Palimpsest Testkit
//!
//! Testing utilities for Palimpsest.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: an engine over an in-memory feed, named participants with
//!   deterministic keys, and a frozen clock
//! - **Generators**: proptest strategies for random edit histories with
//!   forks, stray pointers, and tombstones from any author
//! - **Store doubles**: [`FlakyFeed`], a feed that can be made unreachable
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use palimpsest_testkit::generators::{history, Note};
//! use palimpsest_view::build_live_set;
//!
//! proptest! {
//!     #[test]
//!     fn live_set_is_pure(log in history(32)) {
//!         let a = build_live_set::<Note>(&log).into_records();
//!         let b = build_live_set::<Note>(&log).into_records();
//!         prop_assert_eq!(a, b);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use palimpsest::resources::Task;
//! use palimpsest_testkit::TestFixture;
//!
//! # async fn example() -> palimpsest::Result<()> {
//! let fixture = TestFixture::new();
//! let tasks = fixture.engine.collection::<Task>();
//! let entry = tasks.create(&fixture.ctx(&fixture.alice), Task::new("sweep")).await?;
//!
//! fixture.advance(60_000);
//! let record = tasks.get_by_id(&fixture.ctx(&fixture.bob), &entry.key()).await?;
//! assert_eq!(record.body.title, "sweep");
//! # Ok(())
//! # }
//! ```

pub mod fixtures;
pub mod flaky;
pub mod generators;

pub use fixtures::{init_tracing, participants, FrozenClock, Participant, TestFixture};
pub use flaky::FlakyFeed;
pub use generators::{build_history, history, random_steps, Note, Notice, Step};
