//! In-memory store
//!
//! All tables sit behind a single `tokio::sync::Mutex`, so every method is
//! serialized and multi-row operations are trivially all-or-nothing: each one
//! validates everything before touching any row.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{MarketStore, Transition};
use crate::account::{Group, NewUser, User};
use crate::clock::{Clock, SystemClock};
use crate::core_types::{GroupId, HireId, ListingId, TradeId, UserId, WantedId};
use crate::error::MarketError;
use crate::hire::{HireFilter, HireRequest, HireStatus, HireUpdate, NewHire};
use crate::lifecycle::Lifecycle;
use crate::listing::{
    Listing, ListingFilter, ListingKind, ListingStatus, NewListing, decrement_stock,
};
use crate::trade::{ApprovedTrade, NewTrade, TradeRequest, TradeStatus, TradeType};
use crate::wanted::{FulfillPlan, Fulfillment, NewWanted, RequestedItem, WantedFilter, WantedStatus};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<UserId, User>,
    groups: BTreeMap<GroupId, Group>,
    items: BTreeMap<ListingId, Listing>,
    services: BTreeMap<ListingId, Listing>,
    trades: BTreeMap<TradeId, TradeRequest>,
    wanted: BTreeMap<WantedId, RequestedItem>,
    hires: BTreeMap<HireId, HireRequest>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn listings(&self, kind: ListingKind) -> &BTreeMap<ListingId, Listing> {
        match kind {
            ListingKind::Item => &self.items,
            ListingKind::Service => &self.services,
        }
    }

    fn listings_mut(&mut self, kind: ListingKind) -> &mut BTreeMap<ListingId, Listing> {
        match kind {
            ListingKind::Item => &mut self.items,
            ListingKind::Service => &mut self.services,
        }
    }

    fn build_listing(&mut self, new: NewListing, now: DateTime<Utc>) -> Listing {
        Listing {
            id: self.next_id(),
            kind: new.kind,
            owner_id: new.owner_id,
            group_id: new.group_id,
            title: new.title,
            description: new.description,
            price: new.price,
            image: new.image,
            listing_type: new.listing_type,
            status: new.status,
            quantity: if new.kind.has_inventory() {
                new.quantity
            } else {
                None
            },
            created_at: now,
            updated_at: now,
        }
    }

    fn build_trade(&mut self, new: NewTrade, now: DateTime<Utc>) -> TradeRequest {
        TradeRequest {
            id: self.next_id(),
            buyer_id: new.buyer_id,
            seller_id: new.seller_id,
            item_id: new.item_id,
            offered_item_id: new.offered_item_id,
            trade_type: new.trade_type,
            quantity: new.quantity,
            status: TradeStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Newest first, ties broken by id
fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, i64)) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

/// Check a compare-and-set precondition against the current row
fn cas<S: Lifecycle>(current: S, from: S, to: S) -> Result<(), S> {
    if current == from && from.can_transition(to) {
        Ok(())
    } else {
        Err(current)
    }
}

pub struct MemoryStore {
    tables: Mutex<Tables>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Row timestamps come from `clock`, so sweeps can be driven in tests
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            clock,
        }
    }

    /// Seed an account
    pub async fn add_user(&self, new: NewUser) -> User {
        let mut t = self.tables.lock().await;
        let user = User {
            id: t.next_id(),
            name: new.name,
            email: new.email,
            contact_details: new.contact_details,
            role: new.role,
            group_id: new.group_id,
            created_at: self.clock.now(),
        };
        t.users.insert(user.id, user.clone());
        user
    }

    /// Drop an account while leaving rows that reference it
    #[cfg(test)]
    pub(crate) async fn remove_user(&self, user_id: UserId) -> Option<User> {
        self.tables.lock().await.users.remove(&user_id)
    }
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn get_user(&self, id: UserId) -> Result<Option<User>, MarketError> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn update_user_details(
        &self,
        id: UserId,
        name: &str,
        contact_details: &str,
    ) -> Result<Option<User>, MarketError> {
        let mut t = self.tables.lock().await;
        let Some(user) = t.users.get_mut(&id) else {
            return Ok(None);
        };
        user.name = name.to_string();
        user.contact_details = contact_details.to_string();
        Ok(Some(user.clone()))
    }

    async fn get_group(&self, id: GroupId) -> Result<Option<Group>, MarketError> {
        Ok(self.tables.lock().await.groups.get(&id).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>, MarketError> {
        let t = self.tables.lock().await;
        let mut groups: Vec<Group> = t.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn create_group(&self, name: &str) -> Result<Group, MarketError> {
        let mut t = self.tables.lock().await;
        if t.groups.values().any(|g| g.name == name) {
            return Err(MarketError::Validation(format!(
                "group '{}' already exists",
                name
            )));
        }
        let group = Group {
            id: t.next_id(),
            name: name.to_string(),
            created_at: self.clock.now(),
        };
        t.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, MarketError> {
        let mut t = self.tables.lock().await;
        let row = t.build_listing(listing, self.clock.now());
        t.listings_mut(row.kind).insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_listing(
        &self,
        kind: ListingKind,
        id: ListingId,
    ) -> Result<Option<Listing>, MarketError> {
        Ok(self.tables.lock().await.listings(kind).get(&id).cloned())
    }

    async fn list_listings(
        &self,
        kind: ListingKind,
        filter: &ListingFilter,
    ) -> Result<Vec<Listing>, MarketError> {
        let t = self.tables.lock().await;
        let mut rows: Vec<Listing> = t
            .listings(kind)
            .values()
            .filter(|l| filter.matches(l))
            .cloned()
            .collect();
        newest_first(&mut rows, |l| (l.created_at, l.id));
        Ok(rows)
    }

    async fn transition_listing(
        &self,
        kind: ListingKind,
        id: ListingId,
        from: ListingStatus,
        to: ListingStatus,
    ) -> Result<Transition<Listing, ListingStatus>, MarketError> {
        let now = self.clock.now();
        let mut t = self.tables.lock().await;
        let Some(row) = t.listings_mut(kind).get_mut(&id) else {
            return Ok(Transition::Missing);
        };
        if let Err(current) = cas(row.status, from, to) {
            return Ok(Transition::Conflict(current));
        }
        row.status = to;
        row.updated_at = now;
        Ok(Transition::Applied(row.clone()))
    }

    async fn find_stale_pending(
        &self,
        kind: ListingKind,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Listing>, MarketError> {
        let t = self.tables.lock().await;
        let mut rows: Vec<Listing> = t
            .listings(kind)
            .values()
            .filter(|l| l.status == ListingStatus::Pending && l.created_at < cutoff)
            .cloned()
            .collect();
        rows.sort_by_key(|l| (l.created_at, l.id));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn insert_trade(&self, trade: NewTrade) -> Result<TradeRequest, MarketError> {
        if trade.buyer_id == trade.seller_id {
            return Err(MarketError::InvalidRequest(
                "buyer and seller must differ".to_string(),
            ));
        }
        let mut t = self.tables.lock().await;
        let row = t.build_trade(trade, self.clock.now());
        t.trades.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_trade(&self, id: TradeId) -> Result<Option<TradeRequest>, MarketError> {
        Ok(self.tables.lock().await.trades.get(&id).cloned())
    }

    async fn list_trades_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<TradeRequest>, MarketError> {
        let t = self.tables.lock().await;
        let mut rows: Vec<TradeRequest> = t
            .trades
            .values()
            .filter(|r| r.involves(user_id))
            .cloned()
            .collect();
        newest_first(&mut rows, |r| (r.created_at, r.id));
        Ok(rows)
    }

    async fn approve_trade(
        &self,
        id: TradeId,
    ) -> Result<Transition<ApprovedTrade, TradeStatus>, MarketError> {
        let now = self.clock.now();
        let mut t = self.tables.lock().await;

        let Some(trade) = t.trades.get(&id) else {
            return Ok(Transition::Missing);
        };
        if let Err(current) = cas(trade.status, TradeStatus::Pending, TradeStatus::Approved) {
            return Ok(Transition::Conflict(current));
        }
        let (item_id, amount) = (trade.item_id, trade.quantity);

        let item = t.items.get(&item_id).ok_or(MarketError::NotFound("item"))?;
        // Validate before writing anything
        let change = decrement_stock(item.status, item.quantity.unwrap_or(0), amount)?;

        let listing = {
            let item = t
                .items
                .get_mut(&item_id)
                .ok_or(MarketError::NotFound("item"))?;
            item.quantity = Some(change.quantity);
            item.status = change.status;
            item.updated_at = now;
            item.clone()
        };
        let trade = {
            let trade = t
                .trades
                .get_mut(&id)
                .ok_or(MarketError::NotFound("transaction request"))?;
            trade.status = TradeStatus::Approved;
            trade.updated_at = now;
            trade.clone()
        };

        Ok(Transition::Applied(ApprovedTrade { trade, listing }))
    }

    async fn transition_trade(
        &self,
        id: TradeId,
        from: TradeStatus,
        to: TradeStatus,
    ) -> Result<Transition<TradeRequest, TradeStatus>, MarketError> {
        let now = self.clock.now();
        let mut t = self.tables.lock().await;
        let Some(row) = t.trades.get_mut(&id) else {
            return Ok(Transition::Missing);
        };
        if let Err(current) = cas(row.status, from, to) {
            return Ok(Transition::Conflict(current));
        }
        row.status = to;
        row.updated_at = now;
        Ok(Transition::Applied(row.clone()))
    }

    async fn insert_wanted(&self, wanted: NewWanted) -> Result<RequestedItem, MarketError> {
        let now = self.clock.now();
        let mut t = self.tables.lock().await;
        let row = RequestedItem {
            id: t.next_id(),
            requester_id: wanted.requester_id,
            group_id: wanted.group_id,
            title: wanted.title,
            description: wanted.description,
            max_price: wanted.max_price,
            status: WantedStatus::Open,
            created_at: now,
            updated_at: now,
        };
        t.wanted.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_wanted(&self, id: WantedId) -> Result<Option<RequestedItem>, MarketError> {
        Ok(self.tables.lock().await.wanted.get(&id).cloned())
    }

    async fn list_wanted(&self, filter: &WantedFilter) -> Result<Vec<RequestedItem>, MarketError> {
        let t = self.tables.lock().await;
        let mut rows: Vec<RequestedItem> = t
            .wanted
            .values()
            .filter(|w| filter.matches(w))
            .cloned()
            .collect();
        newest_first(&mut rows, |w| (w.created_at, w.id));
        Ok(rows)
    }

    async fn transition_wanted(
        &self,
        id: WantedId,
        from: WantedStatus,
        to: WantedStatus,
    ) -> Result<Transition<RequestedItem, WantedStatus>, MarketError> {
        let now = self.clock.now();
        let mut t = self.tables.lock().await;
        let Some(row) = t.wanted.get_mut(&id) else {
            return Ok(Transition::Missing);
        };
        if let Err(current) = cas(row.status, from, to) {
            return Ok(Transition::Conflict(current));
        }
        row.status = to;
        row.updated_at = now;
        Ok(Transition::Applied(row.clone()))
    }

    async fn fulfill_wanted(
        &self,
        plan: FulfillPlan,
    ) -> Result<Transition<Fulfillment, WantedStatus>, MarketError> {
        let now = self.clock.now();
        let mut t = self.tables.lock().await;

        let Some(wanted) = t.wanted.get(&plan.wanted_id) else {
            return Ok(Transition::Missing);
        };
        if let Err(current) = cas(wanted.status, WantedStatus::Open, WantedStatus::Fulfilled) {
            return Ok(Transition::Conflict(current));
        }
        if plan.requester_id == plan.provider_id {
            return Err(MarketError::SelfFulfillment);
        }

        let item = t.build_listing(plan.listing, now);
        t.items.insert(item.id, item.clone());

        let trade = t.build_trade(
            NewTrade {
                buyer_id: plan.requester_id,
                seller_id: plan.provider_id,
                item_id: item.id,
                offered_item_id: None,
                trade_type: TradeType::Buy,
                quantity: plan.quantity,
            },
            now,
        );
        t.trades.insert(trade.id, trade.clone());

        let requested_item = {
            let wanted = t
                .wanted
                .get_mut(&plan.wanted_id)
                .ok_or(MarketError::NotFound("requested item"))?;
            wanted.status = WantedStatus::Fulfilled;
            wanted.updated_at = now;
            wanted.clone()
        };

        Ok(Transition::Applied(Fulfillment {
            item,
            request: trade,
            requested_item,
        }))
    }

    async fn insert_hire(&self, hire: NewHire) -> Result<HireRequest, MarketError> {
        let now = self.clock.now();
        let mut t = self.tables.lock().await;
        let row = HireRequest {
            id: t.next_id(),
            requester_id: hire.requester_id,
            group_id: hire.group_id,
            title: hire.title,
            description: hire.description,
            budget: hire.budget,
            category: hire.category,
            status: HireStatus::Open,
            provider_id: None,
            accepted_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        t.hires.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_hire(&self, id: HireId) -> Result<Option<HireRequest>, MarketError> {
        Ok(self.tables.lock().await.hires.get(&id).cloned())
    }

    async fn list_hires(&self, filter: &HireFilter) -> Result<Vec<HireRequest>, MarketError> {
        let t = self.tables.lock().await;
        let mut rows: Vec<HireRequest> = t
            .hires
            .values()
            .filter(|h| filter.matches(h))
            .cloned()
            .collect();
        newest_first(&mut rows, |h| (h.created_at, h.id));
        Ok(rows)
    }

    async fn update_hire(
        &self,
        id: HireId,
        from: HireStatus,
        update: HireUpdate,
    ) -> Result<Transition<HireRequest, HireStatus>, MarketError> {
        let now = self.clock.now();
        let mut t = self.tables.lock().await;
        let Some(row) = t.hires.get_mut(&id) else {
            return Ok(Transition::Missing);
        };
        if let Err(current) = cas(row.status, from, update.status) {
            return Ok(Transition::Conflict(current));
        }
        update.apply(row, now);
        Ok(Transition::Applied(row.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Role;
    use rust_decimal::Decimal;

    fn item(owner_id: UserId, status: ListingStatus, quantity: i32) -> NewListing {
        NewListing {
            kind: ListingKind::Item,
            owner_id,
            group_id: 1,
            title: "Kettle".into(),
            description: "1.5L".into(),
            price: Decimal::new(800, 0),
            image: None,
            listing_type: "sell".into(),
            status,
            quantity: Some(quantity),
        }
    }

    async fn seed_user(store: &MemoryStore, name: &str) -> User {
        store
            .add_user(NewUser {
                name: name.into(),
                email: format!("{}@campus.edu", name),
                contact_details: "99999 00000".into(),
                role: Role::User,
                group_id: None,
            })
            .await
    }

    #[tokio::test]
    async fn test_listing_cas() {
        let store = MemoryStore::new();
        let l = store
            .insert_listing(item(1, ListingStatus::Pending, 1))
            .await
            .unwrap();

        let first = store
            .transition_listing(ListingKind::Item, l.id, ListingStatus::Pending, ListingStatus::Approved)
            .await
            .unwrap();
        assert!(matches!(first, Transition::Applied(_)));

        let second = store
            .transition_listing(ListingKind::Item, l.id, ListingStatus::Pending, ListingStatus::Rejected)
            .await
            .unwrap();
        assert_eq!(second.applied().map(|l| l.id), None);

        let missing = store
            .transition_listing(ListingKind::Service, l.id, ListingStatus::Pending, ListingStatus::Approved)
            .await
            .unwrap();
        assert!(matches!(missing, Transition::Missing));
    }

    #[tokio::test]
    async fn test_approve_trade_rolls_back_on_insufficient() {
        let store = MemoryStore::new();
        let seller = seed_user(&store, "seller").await;
        let buyer = seed_user(&store, "buyer").await;
        let l = store
            .insert_listing(item(seller.id, ListingStatus::Approved, 2))
            .await
            .unwrap();
        let trade = store
            .insert_trade(NewTrade {
                buyer_id: buyer.id,
                seller_id: seller.id,
                item_id: l.id,
                offered_item_id: None,
                trade_type: TradeType::Buy,
                quantity: 3,
            })
            .await
            .unwrap();

        let err = store.approve_trade(trade.id).await.unwrap_err();
        assert!(matches!(err, MarketError::InsufficientQuantity { .. }));

        let trade = store.get_trade(trade.id).await.unwrap().unwrap();
        assert_eq!(trade.status, TradeStatus::Pending);
        let l = store.get_listing(ListingKind::Item, l.id).await.unwrap().unwrap();
        assert_eq!(l.quantity, Some(2));
    }

    #[tokio::test]
    async fn test_insert_trade_rejects_self_dealing() {
        let store = MemoryStore::new();
        let err = store
            .insert_trade(NewTrade {
                buyer_id: 5,
                seller_id: 5,
                item_id: 1,
                offered_item_id: None,
                trade_type: TradeType::Buy,
                quantity: 1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_duplicate_group_name() {
        let store = MemoryStore::new();
        store.create_group("North Hostel").await.unwrap();
        assert!(store.create_group("North Hostel").await.is_err());
        assert_eq!(store.list_groups().await.unwrap().len(), 1);
    }
}
