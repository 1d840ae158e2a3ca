//! Want-ad operations

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;
use validator::Validate;

use super::fulfillment::plan_fulfillment;
use super::state::WantedStatus;
use super::types::{FulfillDraft, Fulfillment, NewWanted, RequestedItem, WantedDraft, WantedFilter};
use crate::account::User;
use crate::core_types::WantedId;
use crate::error::MarketError;
use crate::lifecycle::transition_error;
use crate::notify::{Notifier, templates};
use crate::store::{MarketStore, Transition};

#[derive(Clone)]
pub struct WantedService {
    store: Arc<dyn MarketStore>,
    notifier: Notifier,
}

impl WantedService {
    pub fn new(store: Arc<dyn MarketStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn create(
        &self,
        requester: &User,
        draft: WantedDraft,
    ) -> Result<RequestedItem, MarketError> {
        draft.validate()?;
        let title = draft.title.trim().to_string();
        let description = draft.description.trim().to_string();
        if title.is_empty() || description.is_empty() {
            return Err(MarketError::Validation(
                "title and description are required".to_string(),
            ));
        }
        if draft.max_price < Decimal::ZERO {
            return Err(MarketError::Validation(
                "max price must not be negative".to_string(),
            ));
        }
        let group_id = requester.group_id.ok_or_else(|| {
            MarketError::Validation("join a group before posting a request".to_string())
        })?;

        let wanted = self
            .store
            .insert_wanted(NewWanted {
                requester_id: requester.id,
                group_id,
                title,
                description,
                max_price: draft.max_price,
            })
            .await?;
        info!(requested_item_id = wanted.id, requester_id = requester.id, "Want-ad opened");
        Ok(wanted)
    }

    pub async fn list_open(&self) -> Result<Vec<RequestedItem>, MarketError> {
        self.store
            .list_wanted(&WantedFilter {
                status: Some(WantedStatus::Open),
                ..Default::default()
            })
            .await
    }

    pub async fn list_mine(&self, user: &User) -> Result<Vec<RequestedItem>, MarketError> {
        self.store
            .list_wanted(&WantedFilter {
                requester_id: Some(user.id),
                ..Default::default()
            })
            .await
    }

    /// Withdraw an open want-ad (owner only)
    pub async fn close(&self, actor: &User, id: WantedId) -> Result<RequestedItem, MarketError> {
        let wanted = self
            .store
            .get_wanted(id)
            .await?
            .ok_or(MarketError::NotFound("requested item"))?;
        if wanted.requester_id != actor.id {
            return Err(MarketError::Forbidden(
                "only the requester can close this request".to_string(),
            ));
        }

        match self
            .store
            .transition_wanted(id, WantedStatus::Open, WantedStatus::Closed)
            .await?
        {
            Transition::Applied(wanted) => {
                info!(requested_item_id = id, "Want-ad closed");
                Ok(wanted)
            }
            Transition::Conflict(current) => Err(transition_error(current, WantedStatus::Closed)),
            Transition::Missing => Err(MarketError::NotFound("requested item")),
        }
    }

    /// Offer an item against an open want-ad.
    ///
    /// Creates an approved item owned by the provider and a pending buy
    /// request from the requester for the offered quantity, and marks the
    /// want-ad fulfilled, all in one store transaction.
    pub async fn fulfill(
        &self,
        provider: &User,
        draft: FulfillDraft,
    ) -> Result<Fulfillment, MarketError> {
        let id = draft.requested_item_id;
        let wanted = self
            .store
            .get_wanted(id)
            .await?
            .ok_or(MarketError::NotFound("requested item"))?;

        let plan = plan_fulfillment(&wanted, provider, draft)?;

        let fulfillment = match self.store.fulfill_wanted(plan).await? {
            Transition::Applied(f) => f,
            // Someone else fulfilled or the owner closed it in between
            Transition::Conflict(_) => return Err(MarketError::RequestClosed),
            Transition::Missing => return Err(MarketError::NotFound("requested item")),
        };

        info!(
            requested_item_id = id,
            item_id = fulfillment.item.id,
            request_id = fulfillment.request.id,
            provider_id = provider.id,
            quantity = fulfillment.request.quantity,
            "Want-ad fulfilled"
        );
        self.notifier.notify_user(
            wanted.requester_id,
            templates::wanted_fulfilled(&fulfillment.requested_item, &fulfillment.item, &provider.name),
        );
        Ok(fulfillment)
    }
}
