//! Profile reads and self-service edits

use std::sync::Arc;

use tracing::info;
use validator::Validate;

use super::models::{DetailsDraft, User, UserProfile};
use crate::error::MarketError;
use crate::store::MarketStore;

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn MarketStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    async fn with_group(&self, user: User) -> Result<UserProfile, MarketError> {
        let group = match user.group_id {
            Some(id) => self.store.get_group(id).await?,
            None => None,
        };
        Ok(UserProfile::new(user, group))
    }

    /// Re-read the caller so the profile reflects the latest edit
    pub async fn profile(&self, user: &User) -> Result<UserProfile, MarketError> {
        let current = self
            .store
            .get_user(user.id)
            .await?
            .ok_or(MarketError::NotFound("user"))?;
        self.with_group(current).await
    }

    /// Replace name and contact details. Contact details stay free text;
    /// the phone rule is enforced where a contact card is about to be shared.
    pub async fn update_details(
        &self,
        user: &User,
        draft: DetailsDraft,
    ) -> Result<UserProfile, MarketError> {
        draft.validate()?;
        let name = draft.name.trim();
        let contact = draft.contact_details.trim();
        if name.is_empty() || contact.is_empty() {
            return Err(MarketError::Validation(
                "name and contact details are required".to_string(),
            ));
        }

        let updated = self
            .store
            .update_user_details(user.id, name, contact)
            .await?
            .ok_or(MarketError::NotFound("user"))?;

        info!(
            user_id = updated.id,
            phone_contact = updated.has_phone_contact(),
            "Profile updated"
        );
        self.with_group(updated).await
    }
}
