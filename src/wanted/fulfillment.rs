//! Fulfillment preconditions
//!
//! Checked once against the loaded want-ad before the store transaction; the
//! store re-checks `open` under the row lock.

use rust_decimal::Decimal;

use super::state::WantedStatus;
use super::types::{FulfillDraft, FulfillPlan, RequestedItem};
use crate::account::User;
use crate::error::MarketError;
use crate::listing::{ItemType, ListingKind, ListingStatus, NewListing, normalize_quantity};

/// Largest quantity a single fulfillment may offer
pub const MAX_FULFILL_QUANTITY: i32 = 100;

/// Unset or non-positive means one unit; above the cap is rejected
pub fn fulfilled_quantity(quantity: Option<i32>) -> Result<i32, MarketError> {
    let quantity = normalize_quantity(quantity);
    if quantity > MAX_FULFILL_QUANTITY {
        return Err(MarketError::QuantityOutOfRange {
            max: MAX_FULFILL_QUANTITY,
        });
    }
    Ok(quantity)
}

/// Validate an offer and build the rows to write
pub fn plan_fulfillment(
    wanted: &RequestedItem,
    provider: &User,
    draft: FulfillDraft,
) -> Result<FulfillPlan, MarketError> {
    if wanted.status != WantedStatus::Open {
        return Err(MarketError::RequestClosed);
    }
    if provider.id == wanted.requester_id {
        return Err(MarketError::SelfFulfillment);
    }
    if draft.price < Decimal::ZERO {
        return Err(MarketError::Validation(
            "price must not be negative".to_string(),
        ));
    }
    // Zero max price means no ceiling
    if wanted.max_price > Decimal::ZERO && draft.price > wanted.max_price {
        return Err(MarketError::PriceExceedsLimit);
    }
    let quantity = fulfilled_quantity(draft.quantity)?;

    Ok(FulfillPlan {
        wanted_id: wanted.id,
        requester_id: wanted.requester_id,
        provider_id: provider.id,
        listing: NewListing {
            kind: ListingKind::Item,
            owner_id: provider.id,
            group_id: provider.group_id.unwrap_or(wanted.group_id),
            title: wanted.title.clone(),
            description: wanted.description.clone(),
            price: draft.price,
            image: draft.image.filter(|s| !s.trim().is_empty()),
            listing_type: ItemType::Sell.as_str().to_string(),
            status: ListingStatus::Approved,
            quantity: Some(quantity),
        },
        quantity,
    })
}
