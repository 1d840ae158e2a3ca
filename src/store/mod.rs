//! Persistence seam
//!
//! [`MarketStore`] is the only way state machines touch storage. Every
//! mutating method is a guarded write: it re-checks the expected source state
//! at write time (compare-and-set for single rows, a locked transaction for
//! multi-row operations) and reports what it found instead of overwriting.
//!
//! Implementations:
//! - [`PgMarketStore`]: PostgreSQL via sqlx
//! - [`MemoryStore`]: one `tokio::sync::Mutex` over all tables, same guarantees

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::account::{Group, User};
use crate::core_types::{GroupId, HireId, ListingId, TradeId, UserId, WantedId};
use crate::error::MarketError;
use crate::hire::{HireFilter, HireRequest, HireStatus, HireUpdate, NewHire};
use crate::listing::{Listing, ListingFilter, ListingKind, ListingStatus, NewListing};
use crate::trade::{ApprovedTrade, NewTrade, TradeRequest, TradeStatus};
use crate::wanted::{FulfillPlan, Fulfillment, NewWanted, RequestedItem, WantedFilter, WantedStatus};

pub use memory::MemoryStore;
pub use postgres::PgMarketStore;

/// Outcome of a guarded write
#[derive(Debug, Clone, PartialEq)]
pub enum Transition<T, S> {
    /// Precondition held; the row as written
    Applied(T),
    /// The row exists but was not in the expected state
    Conflict(S),
    /// No such row
    Missing,
}

impl<T, S> Transition<T, S> {
    pub fn applied(self) -> Option<T> {
        match self {
            Transition::Applied(v) => Some(v),
            _ => None,
        }
    }
}

#[async_trait]
pub trait MarketStore: Send + Sync {
    // === Accounts ===
    async fn get_user(&self, id: UserId) -> Result<Option<User>, MarketError>;
    async fn get_group(&self, id: GroupId) -> Result<Option<Group>, MarketError>;
    async fn list_groups(&self) -> Result<Vec<Group>, MarketError>;
    /// Duplicate names are a validation error
    async fn create_group(&self, name: &str) -> Result<Group, MarketError>;
    /// Overwrite the self-editable profile fields; `None` for an unknown user
    async fn update_user_details(
        &self,
        id: UserId,
        name: &str,
        contact_details: &str,
    ) -> Result<Option<User>, MarketError>;

    // === Listings ===
    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, MarketError>;
    async fn get_listing(
        &self,
        kind: ListingKind,
        id: ListingId,
    ) -> Result<Option<Listing>, MarketError>;
    /// Newest first
    async fn list_listings(
        &self,
        kind: ListingKind,
        filter: &ListingFilter,
    ) -> Result<Vec<Listing>, MarketError>;
    /// Compare-and-set `from -> to`
    async fn transition_listing(
        &self,
        kind: ListingKind,
        id: ListingId,
        from: ListingStatus,
        to: ListingStatus,
    ) -> Result<Transition<Listing, ListingStatus>, MarketError>;
    /// Pending listings created strictly before `cutoff`, oldest first
    async fn find_stale_pending(
        &self,
        kind: ListingKind,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Listing>, MarketError>;

    // === Transaction requests ===
    async fn insert_trade(&self, trade: NewTrade) -> Result<TradeRequest, MarketError>;
    async fn get_trade(&self, id: TradeId) -> Result<Option<TradeRequest>, MarketError>;
    /// Requests where the user is buyer or seller, newest first
    async fn list_trades_for_user(&self, user_id: UserId)
    -> Result<Vec<TradeRequest>, MarketError>;
    /// Atomically: re-check pending, decrement the item, flip to approved.
    ///
    /// Inventory failures are returned as `Err` with nothing written.
    async fn approve_trade(
        &self,
        id: TradeId,
    ) -> Result<Transition<ApprovedTrade, TradeStatus>, MarketError>;
    async fn transition_trade(
        &self,
        id: TradeId,
        from: TradeStatus,
        to: TradeStatus,
    ) -> Result<Transition<TradeRequest, TradeStatus>, MarketError>;

    // === Want-ads ===
    async fn insert_wanted(&self, wanted: NewWanted) -> Result<RequestedItem, MarketError>;
    async fn get_wanted(&self, id: WantedId) -> Result<Option<RequestedItem>, MarketError>;
    async fn list_wanted(&self, filter: &WantedFilter) -> Result<Vec<RequestedItem>, MarketError>;
    async fn transition_wanted(
        &self,
        id: WantedId,
        from: WantedStatus,
        to: WantedStatus,
    ) -> Result<Transition<RequestedItem, WantedStatus>, MarketError>;
    /// Atomically: re-check open, insert item and pending trade, mark fulfilled
    async fn fulfill_wanted(
        &self,
        plan: FulfillPlan,
    ) -> Result<Transition<Fulfillment, WantedStatus>, MarketError>;

    // === Service requests ===
    async fn insert_hire(&self, hire: NewHire) -> Result<HireRequest, MarketError>;
    async fn get_hire(&self, id: HireId) -> Result<Option<HireRequest>, MarketError>;
    async fn list_hires(&self, filter: &HireFilter) -> Result<Vec<HireRequest>, MarketError>;
    /// Compare-and-set from `from` to `update.status`
    async fn update_hire(
        &self,
        id: HireId,
        from: HireStatus,
        update: HireUpdate,
    ) -> Result<Transition<HireRequest, HireStatus>, MarketError>;
}
