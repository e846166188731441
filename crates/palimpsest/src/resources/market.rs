//! Market items: listings that move from for-sale to reserved to sold, with
//! an optional auction deadline.

use palimpsest_core::AuthorId;
use palimpsest_view::{toggled, ActionLedger, ActionScope, Actionable, Resource, Status};
use serde::{Deserialize, Serialize};

use super::require;

/// Listing state. Maps onto the shared lifecycle for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketState {
    ForSale,
    Reserved,
    Sold,
}

impl From<MarketState> for Status {
    fn from(state: MarketState) -> Self {
        match state {
            MarketState::ForSale => Status::Open,
            MarketState::Reserved => Status::InProgress,
            MarketState::Sold => Status::Closed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketItem {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Smallest currency unit.
    pub price: u64,
    pub state: MarketState,
    /// Auction end. An unsold listing reads as closed afterwards.
    #[serde(default)]
    pub deadline: Option<i64>,
    /// Categories `watch` and `bid`.
    #[serde(default)]
    pub interest: ActionLedger,
}

impl MarketItem {
    pub const WATCH: &'static str = "watch";
    pub const BID: &'static str = "bid";

    pub fn new(title: impl Into<String>, price: u64) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            price,
            state: MarketState::ForSale,
            deadline: None,
            interest: ActionLedger::new(),
        }
    }

    pub fn with_deadline(mut self, deadline: i64) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

impl Resource for MarketItem {
    const TYPE: &'static str = "market";

    fn validate(&self) -> Result<(), String> {
        require(&self.title, "title")
    }

    fn carry_over(&mut self, previous: &Self) {
        self.interest = previous.interest.clone();
    }

    fn stored_status(&self) -> Option<Status> {
        Some(self.state.into())
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

impl Actionable for MarketItem {
    const SCOPE: ActionScope = ActionScope::PerCategory;
    const CATEGORIES: &'static [&'static str] = &[MarketItem::WATCH, MarketItem::BID];

    fn ledger(&self) -> &ActionLedger {
        &self.interest
    }

    fn ledger_mut(&mut self) -> &mut ActionLedger {
        &mut self.interest
    }
}
