//! Listing State Definitions
//!
//! ```text
//! PENDING ──approve──▶ APPROVED ──stock hits 0──▶ SOLD   (items only)
//!    │
//!    └──reject──▶ REJECTED
//! ```
//!
//! Terminal states: REJECTED, SOLD

use std::fmt;

use serde::Serialize;

use crate::error::MarketError;
use crate::lifecycle::{Lifecycle, transition_error};

/// The two listing variants sharing one lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Item,
    Service,
}

impl ListingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingKind::Item => "item",
            ListingKind::Service => "service",
        }
    }

    /// Items carry inventory, services do not
    #[inline]
    pub fn has_inventory(&self) -> bool {
        matches!(self, ListingKind::Item)
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Listing moderation / inventory state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Pending,
    Approved,
    Rejected,
    Sold,
}

impl Lifecycle for ListingStatus {
    const ENTITY: &'static str = "listing";

    fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (ListingStatus::Pending, ListingStatus::Approved)
                | (ListingStatus::Pending, ListingStatus::Rejected)
                | (ListingStatus::Approved, ListingStatus::Sold)
        )
    }

    fn is_terminal(self) -> bool {
        matches!(self, ListingStatus::Rejected | ListingStatus::Sold)
    }

    fn as_str(self) -> &'static str {
        match self {
            ListingStatus::Pending => "pending",
            ListingStatus::Approved => "approved",
            ListingStatus::Rejected => "rejected",
            ListingStatus::Sold => "sold",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ListingStatus::Pending),
            "approved" => Some(ListingStatus::Approved),
            "rejected" => Some(ListingStatus::Rejected),
            "sold" => Some(ListingStatus::Sold),
            _ => None,
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Item listing type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    Sell,
    Exchange,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Sell => "sell",
            ItemType::Exchange => "exchange",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sell" => Some(ItemType::Sell),
            "exchange" => Some(ItemType::Exchange),
            _ => None,
        }
    }
}

/// Result of taking stock out of an approved item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockChange {
    pub quantity: i32,
    pub status: ListingStatus,
}

/// Default a submitted item quantity: unset or non-positive means one unit
#[inline]
pub fn normalize_quantity(quantity: Option<i32>) -> i32 {
    match quantity {
        Some(q) if q > 0 => q,
        _ => 1,
    }
}

/// Decrement inventory of an item.
///
/// Only approved items can be decremented. Reaching zero moves the item to
/// SOLD, which keeps `status = sold <=> quantity = 0`.
pub fn decrement_stock(
    status: ListingStatus,
    quantity: i32,
    amount: i32,
) -> Result<StockChange, MarketError> {
    if amount < 1 {
        return Err(MarketError::Validation(
            "quantity must be at least 1".to_string(),
        ));
    }

    match status {
        ListingStatus::Approved => {}
        ListingStatus::Sold => {
            return Err(MarketError::InsufficientQuantity {
                requested: amount,
                available: 0,
            });
        }
        other => return Err(transition_error(other, ListingStatus::Sold)),
    }

    if amount > quantity {
        return Err(MarketError::InsufficientQuantity {
            requested: amount,
            available: quantity,
        });
    }

    let remaining = quantity - amount;
    let status = if remaining == 0 {
        ListingStatus::Sold
    } else {
        ListingStatus::Approved
    };

    Ok(StockChange {
        quantity: remaining,
        status,
    })
}
