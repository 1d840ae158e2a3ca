//! Want-ads and the fulfillment workflow

pub mod fulfillment;
pub mod service;
pub mod state;
pub mod types;

pub use fulfillment::{MAX_FULFILL_QUANTITY, fulfilled_quantity, plan_fulfillment};
pub use service::WantedService;
pub use state::WantedStatus;
pub use types::{
    FulfillDraft, FulfillPlan, Fulfillment, NewWanted, RequestedItem, WantedDraft, WantedFilter,
};
