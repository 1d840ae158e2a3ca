//! Data models for users and campus groups

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core_types::{GroupId, UserId};

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Unknown roles degrade to the least privileged one
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

/// Campus group (hostel / location)
#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// User account
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub contact_details: String,
    pub role: Role,
    pub group_id: Option<GroupId>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Contact details must be a phone-like string, not an e-mail address
    pub fn has_phone_contact(&self) -> bool {
        let contact = self.contact_details.trim();
        !contact.is_empty() && !contact.contains('@')
    }

    pub fn contact_card(&self) -> ContactCard {
        ContactCard {
            user_id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.contact_details.clone(),
            group_id: self.group_id,
        }
    }
}

/// Account row to seed (accounts are normally provisioned by the identity service)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub contact_details: String,
    pub role: Role,
    pub group_id: Option<GroupId>,
}

/// Self-service profile edit; both fields are required
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DetailsDraft {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "contact details are required"))]
    pub contact_details: String,
}

/// The caller's own account, contact details included
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub contact_details: String,
    pub role: Role,
    pub group: Option<Group>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(user: User, group: Option<Group>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            contact_details: user.contact_details,
            role: user.role,
            group,
            created_at: user.created_at,
        }
    }
}

/// Contact information exchanged between two parties once a deal is approved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactCard {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub group_id: Option<GroupId>,
}

/// Who is driving a listing decision
#[derive(Debug, Clone)]
pub enum Actor {
    /// An authenticated user (possibly an administrator)
    Member(User),
    /// The auto-approval sweep worker
    Sweep,
}

impl Actor {
    /// Administrators and the sweep worker may decide pending listings
    pub fn can_moderate(&self) -> bool {
        match self {
            Actor::Member(user) => user.is_admin(),
            Actor::Sweep => true,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Actor::Member(user) => format!("user:{}", user.id),
            Actor::Sweep => "sweep".to_string(),
        }
    }
}
