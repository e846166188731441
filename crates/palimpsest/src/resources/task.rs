//! Tasks: a status machine with an optional deadline and assignee toggles.

use palimpsest_core::AuthorId;
use palimpsest_view::{toggled, ActionLedger, ActionScope, Actionable, Resource, Status};
use serde::{Deserialize, Serialize};

use super::require;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: Status,
    /// Unix ms after which an open task reads as closed.
    #[serde(default)]
    pub deadline: Option<i64>,
    /// Category `assignee`: actors who took the task on.
    #[serde(default)]
    pub assignees: ActionLedger,
}

impl Task {
    pub const ASSIGNEE: &'static str = "assignee";

    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            status: Status::Open,
            deadline: None,
            assignees: ActionLedger::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_deadline(mut self, deadline: i64) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }
}

impl Resource for Task {
    const TYPE: &'static str = "task";

    fn validate(&self) -> Result<(), String> {
        require(&self.title, "title")
    }

    fn carry_over(&mut self, previous: &Self) {
        self.assignees = previous.assignees.clone();
    }

    fn stored_status(&self) -> Option<Status> {
        Some(self.status)
    }

    fn deadline(&self) -> Option<i64> {
        self.deadline
    }

    fn acted_on(&self, category: &str, actor: AuthorId) -> Option<Self> {
        toggled(self, category, actor)
    }

    fn title(&self) -> &str {
        &self.title
    }
}

impl Actionable for Task {
    const SCOPE: ActionScope = ActionScope::PerCategory;
    const CATEGORIES: &'static [&'static str] = &[Task::ASSIGNEE];

    fn ledger(&self) -> &ActionLedger {
        &self.assignees
    }

    fn ledger_mut(&mut self) -> &mut ActionLedger {
        &mut self.assignees
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_title_is_rejected() {
        assert!(Task::new("  ").validate().is_err());
        assert!(Task::new("water the plants").validate().is_ok());
    }

    #[test]
    fn test_only_assignee_category() {
        let task = Task::new("t");
        assert!(task.accepts("assignee"));
        assert!(!task.accepts("watcher"));
    }
}
