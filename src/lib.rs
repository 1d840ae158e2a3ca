//! Campus Exchange - peer-to-peer marketplace backend
//!
//! Students list items and services inside campus groups, send buy or
//! exchange requests, post want-ads and hire each other. Administrators, or
//! the auto-approval sweep, moderate every listing before it goes live.
//!
//! # Modules
//!
//! - [`core_types`] - Id aliases
//! - [`lifecycle`] - Guarded status transitions shared by every entity
//! - [`listing`] - Item and service listings, inventory decrement
//! - [`trade`] - Buy / exchange transaction requests
//! - [`wanted`] - Want-ads and fulfillment
//! - [`hire`] - Service requests (hire a fellow student)
//! - [`moderation`] - Keyword screen + image-safety scoring
//! - [`sweep`] - Background auto-approval of stale pending listings
//! - [`store`] - Persistence seam (PostgreSQL and in-memory)
//! - [`notify`] - Fire-and-forget email notifications
//! - [`gateway`] - axum HTTP API

// Core types - must be first!
pub mod core_types;

pub mod clock;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logging;

// Domain
pub mod account;
pub mod hire;
pub mod listing;
pub mod trade;
pub mod wanted;

// Moderation
pub mod moderation;
pub mod sweep;

// Infrastructure
pub mod app;
pub mod db;
pub mod gateway;
pub mod notify;
pub mod store;

// Convenient re-exports at crate root
pub use core_types::{GroupId, HireId, ListingId, TradeId, UserId, WantedId};
pub use error::MarketError;
pub use store::{MarketStore, MemoryStore, PgMarketStore, Transition};
