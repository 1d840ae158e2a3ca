//! Listing state machine (items and services)

pub mod service;
pub mod state;
pub mod types;

pub use service::ListingService;
pub use state::{ItemType, ListingKind, ListingStatus, StockChange, decrement_stock, normalize_quantity};
pub use types::{Listing, ListingDraft, ListingFilter, NewListing};
