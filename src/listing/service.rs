//! Listing lifecycle operations
//!
//! Administrators and the sweep worker decide pending listings through the
//! same [`ListingService::approve`] / [`ListingService::reject`] calls. The
//! store performs the `pending -> decided` move as a compare-and-set, so when
//! both race on one listing exactly one wins and the other gets
//! `InvalidStateTransition`.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;
use validator::Validate;

use super::state::{ItemType, ListingKind, ListingStatus, normalize_quantity};
use super::types::{Listing, ListingDraft, ListingFilter, NewListing};
use crate::account::{Actor, User};
use crate::core_types::{GroupId, ListingId, UserId};
use crate::error::MarketError;
use crate::lifecycle::transition_error;
use crate::notify::{Notifier, templates};
use crate::store::{MarketStore, Transition};

#[derive(Clone)]
pub struct ListingService {
    store: Arc<dyn MarketStore>,
    notifier: Notifier,
}

impl ListingService {
    pub fn new(store: Arc<dyn MarketStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    /// Create a pending listing owned by `owner`
    pub async fn submit(
        &self,
        owner: &User,
        kind: ListingKind,
        draft: ListingDraft,
    ) -> Result<Listing, MarketError> {
        draft.validate()?;

        let title = draft.title.trim().to_string();
        let description = draft.description.trim().to_string();
        if title.is_empty() || description.is_empty() {
            return Err(MarketError::Validation(
                "title and description are required".to_string(),
            ));
        }
        if draft.price < Decimal::ZERO {
            return Err(MarketError::Validation(
                "price must not be negative".to_string(),
            ));
        }

        let listing_type = match kind {
            ListingKind::Item => ItemType::parse(&draft.listing_type)
                .ok_or_else(|| {
                    MarketError::Validation("item type must be sell or exchange".to_string())
                })?
                .as_str()
                .to_string(),
            ListingKind::Service => {
                let category = draft.listing_type.trim();
                if category.is_empty() {
                    return Err(MarketError::Validation("category is required".to_string()));
                }
                category.to_string()
            }
        };

        let group_id = self.resolve_group(draft.group_id, owner).await?;

        let listing = self
            .store
            .insert_listing(NewListing {
                kind,
                owner_id: owner.id,
                group_id,
                title,
                description,
                price: draft.price,
                image: draft.image.filter(|s| !s.trim().is_empty()),
                listing_type,
                status: ListingStatus::Pending,
                quantity: kind
                    .has_inventory()
                    .then(|| normalize_quantity(draft.quantity)),
            })
            .await?;

        info!(
            kind = %kind,
            listing_id = listing.id,
            owner_id = owner.id,
            group_id,
            "Listing submitted for moderation"
        );
        Ok(listing)
    }

    /// Explicit group, else the owner's own group; must exist
    async fn resolve_group(
        &self,
        requested: Option<GroupId>,
        owner: &User,
    ) -> Result<GroupId, MarketError> {
        let group_id = requested
            .or(owner.group_id)
            .ok_or_else(|| MarketError::Validation("group is required".to_string()))?;
        if self.store.get_group(group_id).await?.is_none() {
            return Err(MarketError::Validation(format!(
                "group {} does not exist",
                group_id
            )));
        }
        Ok(group_id)
    }

    pub async fn approve(
        &self,
        actor: &Actor,
        kind: ListingKind,
        id: ListingId,
    ) -> Result<Listing, MarketError> {
        self.decide(actor, kind, id, ListingStatus::Approved).await
    }

    pub async fn reject(
        &self,
        actor: &Actor,
        kind: ListingKind,
        id: ListingId,
    ) -> Result<Listing, MarketError> {
        self.decide(actor, kind, id, ListingStatus::Rejected).await
    }

    async fn decide(
        &self,
        actor: &Actor,
        kind: ListingKind,
        id: ListingId,
        to: ListingStatus,
    ) -> Result<Listing, MarketError> {
        if !actor.can_moderate() {
            return Err(MarketError::Forbidden(
                "only administrators can moderate listings".to_string(),
            ));
        }

        match self
            .store
            .transition_listing(kind, id, ListingStatus::Pending, to)
            .await?
        {
            Transition::Applied(listing) => {
                info!(
                    kind = %kind,
                    listing_id = id,
                    status = %to,
                    actor = %actor.label(),
                    "Listing decided"
                );
                self.notifier
                    .notify_user(listing.owner_id, templates::listing_decided(&listing));
                Ok(listing)
            }
            Transition::Conflict(current) => Err(transition_error(current, to)),
            Transition::Missing => Err(MarketError::NotFound(kind.as_str())),
        }
    }

    pub async fn get(&self, kind: ListingKind, id: ListingId) -> Result<Listing, MarketError> {
        self.store
            .get_listing(kind, id)
            .await?
            .ok_or(MarketError::NotFound(kind.as_str()))
    }

    /// Browsable listings, optionally limited to one group
    pub async fn list_approved(
        &self,
        kind: ListingKind,
        group_id: Option<GroupId>,
    ) -> Result<Vec<Listing>, MarketError> {
        let filter = ListingFilter::with_status(ListingStatus::Approved).in_group(group_id);
        self.store.list_listings(kind, &filter).await
    }

    /// Moderation queue
    pub async fn list_pending(&self, kind: ListingKind) -> Result<Vec<Listing>, MarketError> {
        let filter = ListingFilter::with_status(ListingStatus::Pending);
        self.store.list_listings(kind, &filter).await
    }

    pub async fn list_owned(
        &self,
        owner_id: UserId,
        kind: ListingKind,
    ) -> Result<Vec<Listing>, MarketError> {
        self.store
            .list_listings(kind, &ListingFilter::owned_by(owner_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{NewUser, Role};
    use crate::notify::RecordingMailer;
    use crate::store::MemoryStore;

    struct Fixture {
        store: Arc<MemoryStore>,
        service: ListingService,
        owner: User,
        admin: User,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let group = store.create_group("East Hostel").await.unwrap();
        let owner = store
            .add_user(NewUser {
                name: "Owner".into(),
                email: "owner@campus.edu".into(),
                contact_details: "12345".into(),
                role: Role::User,
                group_id: Some(group.id),
            })
            .await;
        let admin = store
            .add_user(NewUser {
                name: "Admin".into(),
                email: "admin@campus.edu".into(),
                contact_details: "54321".into(),
                role: Role::Admin,
                group_id: None,
            })
            .await;
        let notifier = Notifier::new(store.clone(), Arc::new(RecordingMailer::default()));
        let service = ListingService::new(store.clone(), notifier);
        Fixture {
            store,
            service,
            owner,
            admin,
        }
    }

    fn draft(listing_type: &str, quantity: Option<i32>) -> ListingDraft {
        ListingDraft {
            group_id: None,
            title: "Study table".into(),
            description: "Teak, sturdy".into(),
            price: Decimal::new(2500, 0),
            image: None,
            listing_type: listing_type.into(),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_submit_defaults() {
        let f = fixture().await;
        let item = f
            .service
            .submit(&f.owner, ListingKind::Item, draft("sell", Some(0)))
            .await
            .unwrap();
        assert_eq!(item.status, ListingStatus::Pending);
        assert_eq!(item.quantity, Some(1));
        assert_eq!(Some(item.group_id), f.owner.group_id);

        let service = f
            .service
            .submit(&f.owner, ListingKind::Service, draft("tutoring", Some(5)))
            .await
            .unwrap();
        assert_eq!(service.quantity, None);
        assert_eq!(service.listing_type, "tutoring");
    }

    #[tokio::test]
    async fn test_submit_validation() {
        let f = fixture().await;
        let err = f
            .service
            .submit(&f.owner, ListingKind::Item, draft("rent", None))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Validation(_)));

        let mut bad_group = draft("sell", None);
        bad_group.group_id = Some(9999);
        let err = f
            .service
            .submit(&f.owner, ListingKind::Item, bad_group)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Validation(_)));

        let mut negative = draft("sell", None);
        negative.price = Decimal::new(-1, 0);
        assert!(
            f.service
                .submit(&f.owner, ListingKind::Item, negative)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_non_admin_cannot_moderate() {
        let f = fixture().await;
        let item = f
            .service
            .submit(&f.owner, ListingKind::Item, draft("sell", None))
            .await
            .unwrap();
        let err = f
            .service
            .approve(&Actor::Member(f.owner.clone()), ListingKind::Item, item.id)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_double_decision_is_rejected() {
        let f = fixture().await;
        let item = f
            .service
            .submit(&f.owner, ListingKind::Item, draft("sell", None))
            .await
            .unwrap();
        let admin = Actor::Member(f.admin.clone());

        f.service
            .approve(&admin, ListingKind::Item, item.id)
            .await
            .unwrap();
        let err = f
            .service
            .reject(&Actor::Sweep, ListingKind::Item, item.id)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            MarketError::InvalidStateTransition {
                entity: "listing",
                from: "approved",
                to: "rejected"
            }
        );

        let err = f
            .service
            .approve(&admin, ListingKind::Service, item.id)
            .await
            .unwrap_err();
        assert_eq!(err, MarketError::NotFound("service"));
    }

    #[tokio::test]
    async fn test_reads() {
        let f = fixture().await;
        let a = f
            .service
            .submit(&f.owner, ListingKind::Item, draft("sell", None))
            .await
            .unwrap();
        f.service
            .submit(&f.owner, ListingKind::Item, draft("exchange", None))
            .await
            .unwrap();
        f.service
            .approve(&Actor::Sweep, ListingKind::Item, a.id)
            .await
            .unwrap();

        assert_eq!(f.service.list_pending(ListingKind::Item).await.unwrap().len(), 1);
        let approved = f
            .service
            .list_approved(ListingKind::Item, f.owner.group_id)
            .await
            .unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id, a.id);
        assert_eq!(
            f.service
                .list_owned(f.owner.id, ListingKind::Item)
                .await
                .unwrap()
                .len(),
            2
        );
        assert!(f.store.get_listing(ListingKind::Item, a.id).await.unwrap().is_some());
    }
}
