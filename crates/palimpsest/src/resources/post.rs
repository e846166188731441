//! Posts: short text with one opinion per reader.

use palimpsest_core::AuthorId;
use palimpsest_view::{toggled, ActionLedger, ActionScope, Actionable, Resource};
use serde::{Deserialize, Serialize};

use super::require;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub text: String,
    #[serde(default)]
    pub opinions: ActionLedger,
}

impl Post {
    pub const AGREE: &'static str = "agree";
    pub const DISAGREE: &'static str = "disagree";
    pub const UNSURE: &'static str = "unsure";

    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            opinions: ActionLedger::new(),
        }
    }
}

impl Resource for Post {
    const TYPE: &'static str = "post";

    fn validate(&self) -> Result<(), String> {
        require(&self.text, "text")
    }

    fn carry_over(&mut self, previous: &Self) {
        self.opinions = previous.opinions.clone();
    }

    fn acted_on(&self, category: &str, actor: AuthorId) -> Option<Self> {
        toggled(self, category, actor)
    }

    fn title(&self) -> &str {
        self.text.lines().next().unwrap_or_default()
    }
}

impl Actionable for Post {
    const SCOPE: ActionScope = ActionScope::Exclusive;
    const CATEGORIES: &'static [&'static str] = &[Post::AGREE, Post::DISAGREE, Post::UNSURE];

    fn ledger(&self) -> &ActionLedger {
        &self.opinions
    }

    fn ledger_mut(&mut self) -> &mut ActionLedger {
        &mut self.opinions
    }
}
