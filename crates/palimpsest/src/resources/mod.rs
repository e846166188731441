//! Built-in resource types.
//!
//! Each type exercises a different combination of the view layer's knobs:
//! tombstone policy, action scope, deadlines, and dedupe keys.

pub mod bookmark;
pub mod market;
pub mod poll;
pub mod post;
pub mod report;
pub mod task;

pub use bookmark::Bookmark;
pub use market::{MarketItem, MarketState};
pub use poll::Poll;
pub use post::Post;
pub use report::Report;
pub use task::Task;

/// Fails with `what` when `value` is blank.
pub(crate) fn require(value: &str, what: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{what} must not be empty"));
    }
    Ok(())
}
