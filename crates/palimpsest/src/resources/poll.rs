//! Polls: one vote per actor across the declared options.

use std::collections::BTreeSet;

use palimpsest_core::AuthorId;
use palimpsest_view::{toggled, ActionLedger, ActionScope, Actionable, Resource, Status};
use serde::{Deserialize, Serialize};

use super::require;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub question: String,
    pub options: Vec<String>,
    /// Voting closes after this instant.
    #[serde(default)]
    pub closes_at: Option<i64>,
    pub status: Status,
    /// One category per option.
    #[serde(default)]
    pub votes: ActionLedger,
}

impl Poll {
    pub fn new<I, O>(question: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<String>,
    {
        Self {
            question: question.into(),
            options: options.into_iter().map(Into::into).collect(),
            closes_at: None,
            status: Status::Open,
            votes: ActionLedger::new(),
        }
    }

    pub fn closing_at(mut self, at: i64) -> Self {
        self.closes_at = Some(at);
        self
    }

    /// Votes per option, declared order, zeros included.
    pub fn results(&self) -> Vec<(&str, usize)> {
        self.options
            .iter()
            .map(|option| (option.as_str(), self.votes.count(option)))
            .collect()
    }
}

impl Resource for Poll {
    const TYPE: &'static str = "poll";

    fn validate(&self) -> Result<(), String> {
        require(&self.question, "question")?;
        if self.options.len() < 2 {
            return Err("a poll needs at least two options".into());
        }
        let unique: BTreeSet<&str> = self.options.iter().map(String::as_str).collect();
        if unique.len() != self.options.len() {
            return Err("poll options must be unique".into());
        }
        self.options.iter().try_for_each(|option| require(option, "option"))
    }

    fn carry_over(&mut self, previous: &Self) {
        self.votes = previous.votes.clone();
    }

    fn stored_status(&self) -> Option<Status> {
        Some(self.status)
    }

    fn deadline(&self) -> Option<i64> {
        self.closes_at
    }

    fn acted_on(&self, category: &str, actor: AuthorId) -> Option<Self> {
        toggled(self, category, actor)
    }

    fn title(&self) -> &str {
        &self.question
    }
}

impl Actionable for Poll {
    const SCOPE: ActionScope = ActionScope::Exclusive;

    fn ledger(&self) -> &ActionLedger {
        &self.votes
    }

    fn ledger_mut(&mut self) -> &mut ActionLedger {
        &mut self.votes
    }

    fn accepts(&self, category: &str) -> bool {
        self.options.iter().any(|option| option == category)
    }
}
