//! Service request operations

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};
use validator::Validate;

use super::state::HireStatus;
use super::types::{HireAcceptance, HireDraft, HireFilter, HireRequest, HireUpdate, NewHire};
use crate::account::User;
use crate::clock::Clock;
use crate::core_types::HireId;
use crate::error::MarketError;
use crate::lifecycle::transition_error;
use crate::notify::{Notifier, templates};
use crate::store::{MarketStore, Transition};

#[derive(Clone)]
pub struct HireService {
    store: Arc<dyn MarketStore>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
}

impl HireService {
    pub fn new(store: Arc<dyn MarketStore>, notifier: Notifier, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            notifier,
            clock,
        }
    }

    /// Open a request in the requester's group
    pub async fn create(&self, requester: &User, draft: HireDraft) -> Result<HireRequest, MarketError> {
        draft.validate()?;
        let title = draft.title.trim().to_string();
        let description = draft.description.trim().to_string();
        let category = draft.category.trim().to_string();
        if title.is_empty() || description.is_empty() || category.is_empty() {
            return Err(MarketError::Validation(
                "title, description and category are required".to_string(),
            ));
        }
        if draft.budget < Decimal::ZERO {
            return Err(MarketError::Validation(
                "budget must not be negative".to_string(),
            ));
        }
        let group_id = requester.group_id.ok_or_else(|| {
            MarketError::Validation("join a group before posting a service request".to_string())
        })?;

        let hire = self
            .store
            .insert_hire(NewHire {
                requester_id: requester.id,
                group_id,
                title,
                description,
                budget: draft.budget,
                category,
            })
            .await?;

        info!(
            service_request_id = hire.id,
            requester_id = requester.id,
            "Service request opened"
        );
        Ok(hire)
    }

    async fn load(&self, id: HireId) -> Result<HireRequest, MarketError> {
        self.store
            .get_hire(id)
            .await?
            .ok_or(MarketError::NotFound("service request"))
    }

    async fn apply(
        &self,
        id: HireId,
        from: HireStatus,
        update: HireUpdate,
    ) -> Result<HireRequest, MarketError> {
        let to = update.status;
        match self.store.update_hire(id, from, update).await? {
            Transition::Applied(hire) => Ok(hire),
            Transition::Conflict(current) => Err(transition_error(current, to)),
            Transition::Missing => Err(MarketError::NotFound("service request")),
        }
    }

    /// Take an open request; both parties receive each other's contact card
    pub async fn accept(&self, provider: &User, id: HireId) -> Result<HireAcceptance, MarketError> {
        let hire = self.load(id).await?;
        if hire.requester_id == provider.id {
            return Err(MarketError::InvalidRequest(
                "you cannot accept your own service request".to_string(),
            ));
        }

        let hire = self
            .apply(
                id,
                HireStatus::Open,
                HireUpdate {
                    status: HireStatus::InProgress,
                    provider_id: Some(provider.id),
                    accepted_at: Some(self.clock.now()),
                    completed_at: None,
                },
            )
            .await?;

        // Committed; a failed lookup only costs the requester's card
        let requester = match self.store.get_user(hire.requester_id).await {
            Ok(Some(requester)) => Some(requester),
            Ok(None) => {
                warn!(service_request_id = id, requester_id = hire.requester_id, "Requester account not found after acceptance");
                None
            }
            Err(e) => {
                warn!(service_request_id = id, requester_id = hire.requester_id, error = %e, "Requester lookup failed after acceptance");
                None
            }
        };
        let provider_card = provider.contact_card();

        info!(service_request_id = id, provider_id = provider.id, "Service request accepted");
        self.notifier.notify_user(
            hire.requester_id,
            templates::hire_accepted(&hire, &provider_card),
        );

        Ok(HireAcceptance {
            request: hire,
            requester: requester.map(|r| r.contact_card()),
            provider: provider_card,
        })
    }

    async fn load_for_requester(&self, actor: &User, id: HireId) -> Result<HireRequest, MarketError> {
        let hire = self.load(id).await?;
        if hire.requester_id != actor.id {
            return Err(MarketError::Forbidden(
                "only the requester can change this service request".to_string(),
            ));
        }
        Ok(hire)
    }

    pub async fn complete(&self, actor: &User, id: HireId) -> Result<HireRequest, MarketError> {
        self.load_for_requester(actor, id).await?;
        let hire = self
            .apply(
                id,
                HireStatus::InProgress,
                HireUpdate {
                    status: HireStatus::Completed,
                    provider_id: None,
                    accepted_at: None,
                    completed_at: Some(self.clock.now()),
                },
            )
            .await?;
        info!(service_request_id = id, "Service request completed");
        Ok(hire)
    }

    pub async fn cancel(&self, actor: &User, id: HireId) -> Result<HireRequest, MarketError> {
        self.load_for_requester(actor, id).await?;
        let hire = self
            .apply(
                id,
                HireStatus::Open,
                HireUpdate {
                    status: HireStatus::Cancelled,
                    provider_id: None,
                    accepted_at: None,
                    completed_at: None,
                },
            )
            .await?;
        info!(service_request_id = id, "Service request cancelled");
        Ok(hire)
    }

    pub async fn list_open(&self) -> Result<Vec<HireRequest>, MarketError> {
        self.store
            .list_hires(&HireFilter {
                status: Some(HireStatus::Open),
                ..Default::default()
            })
            .await
    }

    pub async fn list_mine(&self, user: &User) -> Result<Vec<HireRequest>, MarketError> {
        self.store
            .list_hires(&HireFilter {
                requester_id: Some(user.id),
                ..Default::default()
            })
            .await
    }

    /// Requests the user accepted as provider
    pub async fn list_taken(&self, user: &User) -> Result<Vec<HireRequest>, MarketError> {
        self.store
            .list_hires(&HireFilter {
                provider_id: Some(user.id),
                ..Default::default()
            })
            .await
    }
}
