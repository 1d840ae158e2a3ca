//! Listing data types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::state::{ListingKind, ListingStatus};
use crate::core_types::{GroupId, ListingId, UserId};

/// A persisted item or service listing
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub id: ListingId,
    pub kind: ListingKind,
    pub owner_id: UserId,
    pub group_id: GroupId,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub image: Option<String>,
    /// `sell` / `exchange` for items, free-form category for services
    #[serde(rename = "type")]
    pub listing_type: String,
    pub status: ListingStatus,
    /// Items only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// `status = sold <=> quantity = 0` (items only)
    pub fn stock_consistent(&self) -> bool {
        match self.quantity {
            Some(q) => (self.status == ListingStatus::Sold) == (q == 0) && q >= 0,
            None => self.status != ListingStatus::Sold,
        }
    }

    /// Image reference usable for moderation (empty strings count as none)
    pub fn image_ref(&self) -> Option<&str> {
        self.image.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Row to insert; the store assigns id and timestamps
#[derive(Debug, Clone)]
pub struct NewListing {
    pub kind: ListingKind,
    pub owner_id: UserId,
    pub group_id: GroupId,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub listing_type: String,
    pub status: ListingStatus,
    pub quantity: Option<i32>,
}

/// Submission payload for a new listing
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ListingDraft {
    pub group_id: Option<GroupId>,
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "type is required"))]
    pub listing_type: String,
    #[serde(default)]
    pub quantity: Option<i32>,
}

/// Query filter for listing reads
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub status: Option<ListingStatus>,
    pub owner_id: Option<UserId>,
    pub group_id: Option<GroupId>,
}

impl ListingFilter {
    pub fn with_status(status: ListingStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn owned_by(owner_id: UserId) -> Self {
        Self {
            owner_id: Some(owner_id),
            ..Default::default()
        }
    }

    pub fn in_group(mut self, group_id: Option<GroupId>) -> Self {
        self.group_id = group_id;
        self
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        self.status.is_none_or(|s| listing.status == s)
            && self.owner_id.is_none_or(|o| listing.owner_id == o)
            && self.group_id.is_none_or(|g| listing.group_id == g)
    }
}
