//! Transaction request operations

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use super::state::{TradeStatus, TradeType};
use super::types::{
    ApprovedTrade, ListingSummary, NewTrade, PartyView, TradeApproval, TradeDraft, TradeRequest,
    TradeRole, TradeView,
};
use crate::account::User;
use crate::core_types::{TradeId, UserId};
use crate::error::MarketError;
use crate::listing::{Listing, ListingKind, ListingStatus};
use crate::notify::{Notifier, templates};
use crate::store::{MarketStore, Transition};

#[derive(Clone)]
pub struct TradeService {
    store: Arc<dyn MarketStore>,
    notifier: Notifier,
}

impl TradeService {
    pub fn new(store: Arc<dyn MarketStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    /// Open a pending buy / exchange request against an approved item
    pub async fn create(&self, buyer: &User, draft: TradeDraft) -> Result<TradeRequest, MarketError> {
        if !buyer.has_phone_contact() {
            return Err(MarketError::ContactDetailsIncomplete);
        }
        draft.validate()?;

        let item = self
            .store
            .get_listing(ListingKind::Item, draft.item_id)
            .await?
            .ok_or(MarketError::NotFound("item"))?;
        if item.status != ListingStatus::Approved {
            return Err(MarketError::InvalidRequest(
                "item is not available".to_string(),
            ));
        }
        if item.owner_id == buyer.id {
            return Err(MarketError::InvalidRequest(
                "you cannot request your own item".to_string(),
            ));
        }

        if let Some(offered_id) = draft.offered_item_id {
            if draft.trade_type != TradeType::Exchange {
                return Err(MarketError::Validation(
                    "an offered item is only allowed for exchange requests".to_string(),
                ));
            }
            let offered = self
                .store
                .get_listing(ListingKind::Item, offered_id)
                .await?
                .ok_or_else(|| {
                    MarketError::Validation(format!("offered item {} does not exist", offered_id))
                })?;
            if offered.owner_id != buyer.id {
                return Err(MarketError::InvalidRequest(
                    "the offered item must be your own".to_string(),
                ));
            }
        }

        let trade = self
            .store
            .insert_trade(NewTrade {
                buyer_id: buyer.id,
                seller_id: item.owner_id,
                item_id: item.id,
                offered_item_id: draft.offered_item_id,
                trade_type: draft.trade_type,
                quantity: draft.quantity,
            })
            .await?;

        info!(
            request_id = trade.id,
            item_id = item.id,
            buyer_id = buyer.id,
            seller_id = item.owner_id,
            quantity = trade.quantity,
            "Transaction request created"
        );
        self.notifier.notify_user(
            trade.seller_id,
            templates::trade_requested(&item, &trade, &buyer.name),
        );
        Ok(trade)
    }

    /// Load a request the actor may decide
    async fn load_for_seller(
        &self,
        actor: &User,
        id: TradeId,
    ) -> Result<TradeRequest, MarketError> {
        let trade = self
            .store
            .get_trade(id)
            .await?
            .ok_or(MarketError::NotFound("transaction request"))?;
        if trade.seller_id != actor.id {
            return Err(MarketError::Forbidden(
                "only the seller can decide this request".to_string(),
            ));
        }
        if trade.status != TradeStatus::Pending {
            return Err(MarketError::AlreadyProcessed);
        }
        Ok(trade)
    }

    /// Approve, decrementing inventory and releasing contact cards
    pub async fn approve(&self, actor: &User, id: TradeId) -> Result<TradeApproval, MarketError> {
        let pending = self.load_for_seller(actor, id).await?;

        let ApprovedTrade { trade, listing } = match self.store.approve_trade(id).await {
            Ok(Transition::Applied(approved)) => approved,
            Ok(Transition::Conflict(_)) => return Err(MarketError::AlreadyProcessed),
            Ok(Transition::Missing) => return Err(MarketError::NotFound("transaction request")),
            Err(e) => {
                warn!(request_id = id, item_id = pending.item_id, error = %e, "Trade approval failed");
                return Err(e);
            }
        };

        // Committed; a failed lookup only costs the buyer's card
        let buyer = match self.store.get_user(trade.buyer_id).await {
            Ok(Some(buyer)) => Some(buyer),
            Ok(None) => {
                warn!(request_id = id, buyer_id = trade.buyer_id, "Buyer account not found after approval");
                None
            }
            Err(e) => {
                warn!(request_id = id, buyer_id = trade.buyer_id, error = %e, "Buyer lookup failed after approval");
                None
            }
        };
        let seller_card = actor.contact_card();

        info!(
            request_id = id,
            item_id = listing.id,
            remaining = listing.quantity.unwrap_or(0),
            item_status = %listing.status,
            "Transaction request approved"
        );
        self.notifier.notify_user(
            trade.buyer_id,
            templates::trade_approved(&listing, &trade, &seller_card),
        );

        Ok(TradeApproval {
            item: ListingSummary::from(&listing),
            request: trade,
            buyer: buyer.map(|b| b.contact_card()),
            seller: seller_card,
        })
    }

    pub async fn reject(&self, actor: &User, id: TradeId) -> Result<TradeRequest, MarketError> {
        self.load_for_seller(actor, id).await?;

        match self
            .store
            .transition_trade(id, TradeStatus::Pending, TradeStatus::Rejected)
            .await?
        {
            Transition::Applied(trade) => {
                info!(request_id = id, "Transaction request rejected");
                Ok(trade)
            }
            Transition::Conflict(_) => Err(MarketError::AlreadyProcessed),
            Transition::Missing => Err(MarketError::NotFound("transaction request")),
        }
    }

    /// Requests where `user` is buyer or seller, enriched for display
    pub async fn list_for_user(&self, user: &User) -> Result<Vec<TradeView>, MarketError> {
        let trades = self.store.list_trades_for_user(user.id).await?;

        let mut users: HashMap<UserId, Option<User>> = HashMap::new();
        let mut listings: HashMap<i64, Option<Listing>> = HashMap::new();
        let mut views = Vec::with_capacity(trades.len());

        for trade in trades {
            for party in [trade.buyer_id, trade.seller_id] {
                if !users.contains_key(&party) {
                    users.insert(party, self.store.get_user(party).await?);
                }
            }
            for item_id in std::iter::once(trade.item_id).chain(trade.offered_item_id) {
                if !listings.contains_key(&item_id) {
                    listings.insert(
                        item_id,
                        self.store.get_listing(ListingKind::Item, item_id).await?,
                    );
                }
            }

            // Contact details only once the deal is approved
            let reveal = trade.status == TradeStatus::Approved;
            let party = |id: UserId| match users.get(&id).and_then(Option::as_ref) {
                Some(u) => PartyView::of(u, reveal),
                None => PartyView {
                    user_id: id,
                    name: String::new(),
                    contact: None,
                },
            };
            let summary = |id: i64| {
                listings
                    .get(&id)
                    .and_then(Option::as_ref)
                    .map(ListingSummary::from)
            };

            views.push(TradeView {
                id: trade.id,
                trade_type: trade.trade_type,
                quantity: trade.quantity,
                status: trade.status,
                role: if trade.buyer_id == user.id {
                    TradeRole::Buyer
                } else {
                    TradeRole::Seller
                },
                item: summary(trade.item_id),
                offered_item: trade.offered_item_id.and_then(summary),
                buyer: party(trade.buyer_id),
                seller: party(trade.seller_id),
                created_at: trade.created_at,
            });
        }

        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{NewUser, Role};
    use crate::listing::NewListing;
    use crate::notify::RecordingMailer;
    use crate::store::MemoryStore;
    use rust_decimal::Decimal;

    async fn user(store: &MemoryStore, name: &str) -> User {
        store
            .add_user(NewUser {
                name: name.into(),
                email: format!("{}@campus.edu", name),
                contact_details: "90000 77777".into(),
                role: Role::User,
                group_id: Some(1),
            })
            .await
    }

    #[tokio::test]
    async fn test_approval_survives_missing_buyer_account() {
        let store = Arc::new(MemoryStore::new());
        let seller = user(&store, "seller").await;
        let buyer = user(&store, "buyer").await;
        let item = store
            .insert_listing(NewListing {
                kind: ListingKind::Item,
                owner_id: seller.id,
                group_id: 1,
                title: "Geometry box".into(),
                description: "Complete set".into(),
                price: Decimal::new(90, 0),
                image: None,
                listing_type: "sell".into(),
                status: ListingStatus::Approved,
                quantity: Some(2),
            })
            .await
            .unwrap();
        let notifier = Notifier::new(store.clone(), Arc::new(RecordingMailer::default()));
        let service = TradeService::new(store.clone(), notifier);
        let request = service
            .create(
                &buyer,
                TradeDraft {
                    item_id: item.id,
                    trade_type: TradeType::Buy,
                    quantity: 1,
                    offered_item_id: None,
                },
            )
            .await
            .unwrap();

        store.remove_user(buyer.id).await.unwrap();
        let approval = service.approve(&seller, request.id).await.unwrap();
        assert_eq!(approval.request.status, TradeStatus::Approved);
        assert_eq!(approval.item.quantity, Some(1));
        assert!(approval.buyer.is_none());
        assert_eq!(approval.seller.user_id, seller.id);
    }
}
