//! Core types used throughout the system
//!
//! Identifier aliases shared by every module. All identifiers map to
//! PostgreSQL `BIGSERIAL` primary keys.

/// User ID - primary key of `users_tb`, immutable after assignment.
pub type UserId = i64;

/// Group ID - a campus hostel/location that listings and requests belong to.
pub type GroupId = i64;

/// Listing ID - unique within its kind (items and services have separate sequences).
pub type ListingId = i64;

/// Transaction request ID (buy/exchange request against an item).
pub type TradeId = i64;

/// Service request ID (a hire request answered by a provider).
pub type HireId = i64;

/// Requested item ID (a want-ad).
pub type WantedId = i64;
