//! Service request data types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::state::HireStatus;
use crate::account::ContactCard;
use crate::core_types::{GroupId, HireId, UserId};

/// A request to hire someone for a service
#[derive(Debug, Clone, Serialize)]
pub struct HireRequest {
    pub id: HireId,
    pub requester_id: UserId,
    pub group_id: GroupId,
    pub title: String,
    pub description: String,
    pub budget: Decimal,
    pub category: String,
    pub status: HireStatus,
    pub provider_id: Option<UserId>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewHire {
    pub requester_id: UserId,
    pub group_id: GroupId,
    pub title: String,
    pub description: String,
    pub budget: Decimal,
    pub category: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HireDraft {
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    pub budget: Decimal,
    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,
}

/// Columns written by a guarded hire transition
#[derive(Debug, Clone)]
pub struct HireUpdate {
    pub status: HireStatus,
    pub provider_id: Option<UserId>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl HireUpdate {
    /// Apply to a row; unset optional columns keep their value
    pub fn apply(&self, hire: &mut HireRequest, now: DateTime<Utc>) {
        hire.status = self.status;
        if let Some(provider) = self.provider_id {
            hire.provider_id = Some(provider);
        }
        if let Some(at) = self.accepted_at {
            hire.accepted_at = Some(at);
        }
        if let Some(at) = self.completed_at {
            hire.completed_at = Some(at);
        }
        hire.updated_at = now;
    }
}

#[derive(Debug, Clone, Default)]
pub struct HireFilter {
    pub status: Option<HireStatus>,
    pub requester_id: Option<UserId>,
    pub provider_id: Option<UserId>,
}

impl HireFilter {
    pub fn matches(&self, hire: &HireRequest) -> bool {
        self.status.is_none_or(|s| hire.status == s)
            && self.requester_id.is_none_or(|r| hire.requester_id == r)
            && self.provider_id.is_none_or(|p| hire.provider_id == Some(p))
    }
}

/// Acceptance result: both parties get each other's contact card
#[derive(Debug, Clone, Serialize)]
pub struct HireAcceptance {
    pub request: HireRequest,
    /// Absent when the requester's account could not be read after commit
    pub requester: Option<ContactCard>,
    pub provider: ContactCard,
}
