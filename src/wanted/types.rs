//! Want-ad data types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::state::WantedStatus;
use crate::core_types::{GroupId, UserId, WantedId};
use crate::listing::{Listing, NewListing};
use crate::trade::TradeRequest;

/// A want-ad: "looking for X, up to this price"
#[derive(Debug, Clone, Serialize)]
pub struct RequestedItem {
    pub id: WantedId,
    pub requester_id: UserId,
    pub group_id: GroupId,
    pub title: String,
    pub description: String,
    /// Zero means no price ceiling
    pub max_price: Decimal,
    pub status: WantedStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewWanted {
    pub requester_id: UserId,
    pub group_id: GroupId,
    pub title: String,
    pub description: String,
    pub max_price: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WantedDraft {
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[serde(default)]
    pub max_price: Decimal,
}

/// Offer to fulfill an open want-ad
#[derive(Debug, Clone, Deserialize)]
pub struct FulfillDraft {
    pub requested_item_id: WantedId,
    pub price: Decimal,
    #[serde(default)]
    pub quantity: Option<i32>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Everything the store writes in one fulfillment transaction
#[derive(Debug, Clone)]
pub struct FulfillPlan {
    pub wanted_id: WantedId,
    pub requester_id: UserId,
    pub provider_id: UserId,
    pub listing: NewListing,
    pub quantity: i32,
}

/// Rows produced by a committed fulfillment
#[derive(Debug, Clone, Serialize)]
pub struct Fulfillment {
    pub item: Listing,
    pub request: TradeRequest,
    pub requested_item: RequestedItem,
}

#[derive(Debug, Clone, Default)]
pub struct WantedFilter {
    pub status: Option<WantedStatus>,
    pub requester_id: Option<UserId>,
}

impl WantedFilter {
    pub fn matches(&self, wanted: &RequestedItem) -> bool {
        self.status.is_none_or(|s| wanted.status == s)
            && self.requester_id.is_none_or(|r| wanted.requester_id == r)
    }
}
