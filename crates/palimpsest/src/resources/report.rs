//! Reports: community-confirmed issues. Any tombstone by the reporter on
//! any revision withdraws the report.

use palimpsest_core::AuthorId;
use palimpsest_view::{
    toggled, ActionLedger, ActionScope, Actionable, Resource, Status, TombstonePolicy,
};
use serde::{Deserialize, Serialize};

use super::require;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: Status,
    #[serde(default)]
    pub confirmations: ActionLedger,
}

impl Report {
    pub const CONFIRM: &'static str = "confirm";
    pub const DISPUTE: &'static str = "dispute";

    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: Status::Open,
            confirmations: ActionLedger::new(),
        }
    }
}

impl Resource for Report {
    const TYPE: &'static str = "report";
    const POLICY: TombstonePolicy = TombstonePolicy::WholeChain;

    fn validate(&self) -> Result<(), String> {
        require(&self.title, "title")
    }

    fn carry_over(&mut self, previous: &Self) {
        self.confirmations = previous.confirmations.clone();
    }

    fn stored_status(&self) -> Option<Status> {
        Some(self.status)
    }

    fn acted_on(&self, category: &str, actor: AuthorId) -> Option<Self> {
        toggled(self, category, actor)
    }

    fn title(&self) -> &str {
        &self.title
    }
}

impl Actionable for Report {
    const SCOPE: ActionScope = ActionScope::PerCategory;
    const CATEGORIES: &'static [&'static str] = &[Report::CONFIRM, Report::DISPUTE];

    fn ledger(&self) -> &ActionLedger {
        &self.confirmations
    }

    fn ledger_mut(&mut self) -> &mut ActionLedger {
        &mut self.confirmations
    }
}
