//! Trade request data types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::state::{TradeStatus, TradeType};
use crate::account::{ContactCard, User};
use crate::core_types::{ListingId, TradeId, UserId};
use crate::listing::{Listing, ListingStatus};

/// A persisted transaction request
#[derive(Debug, Clone, Serialize)]
pub struct TradeRequest {
    pub id: TradeId,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub item_id: ListingId,
    pub offered_item_id: Option<ListingId>,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub quantity: i32,
    pub status: TradeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TradeRequest {
    pub fn involves(&self, user_id: UserId) -> bool {
        self.buyer_id == user_id || self.seller_id == user_id
    }
}

/// Row to insert (always pending)
#[derive(Debug, Clone)]
pub struct NewTrade {
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub item_id: ListingId,
    pub offered_item_id: Option<ListingId>,
    pub trade_type: TradeType,
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

/// Buy / exchange request payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TradeDraft {
    pub item_id: ListingId,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    #[serde(default)]
    pub offered_item_id: Option<ListingId>,
}

/// Store result of an atomic approval
#[derive(Debug, Clone)]
pub struct ApprovedTrade {
    pub trade: TradeRequest,
    pub listing: Listing,
}

/// Approval result returned to the seller: both contact cards are released
#[derive(Debug, Clone, Serialize)]
pub struct TradeApproval {
    pub request: TradeRequest,
    pub item: ListingSummary,
    /// Absent when the buyer's account could not be read after commit
    pub buyer: Option<ContactCard>,
    pub seller: ContactCard,
}

/// Compact listing shape embedded in trade views
#[derive(Debug, Clone, Serialize)]
pub struct ListingSummary {
    pub id: ListingId,
    pub title: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub status: ListingStatus,
    pub quantity: Option<i32>,
}

impl From<&Listing> for ListingSummary {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id,
            title: listing.title.clone(),
            price: listing.price,
            image: listing.image.clone(),
            status: listing.status,
            quantity: listing.quantity,
        }
    }
}

/// One side of a trade as seen by a participant
#[derive(Debug, Clone, Serialize)]
pub struct PartyView {
    pub user_id: UserId,
    pub name: String,
    /// Released only once the request is approved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactCard>,
}

impl PartyView {
    pub fn of(user: &User, reveal: bool) -> Self {
        Self {
            user_id: user.id,
            name: user.name.clone(),
            contact: reveal.then(|| user.contact_card()),
        }
    }
}

/// Which side of a trade the viewer is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeRole {
    Buyer,
    Seller,
}

/// Enriched request for the "my requests" listing
#[derive(Debug, Clone, Serialize)]
pub struct TradeView {
    pub id: TradeId,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub quantity: i32,
    pub status: TradeStatus,
    pub role: TradeRole,
    pub item: Option<ListingSummary>,
    pub offered_item: Option<ListingSummary>,
    pub buyer: PartyView,
    pub seller: PartyView,
    pub created_at: DateTime<Utc>,
}
