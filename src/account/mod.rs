//! Account module
//!
//! Users, campus groups and contact cards. Account creation and credentials
//! are owned by the identity service; users may only edit their own name and
//! contact details here.

pub mod models;
pub mod service;

pub use models::{
    Actor, ContactCard, DetailsDraft, Group, NewUser, Role, User, UserProfile,
};
pub use service::AccountService;
