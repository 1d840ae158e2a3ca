//! Service request (hire) state machine

pub mod service;
pub mod state;
pub mod types;

pub use service::HireService;
pub use state::HireStatus;
pub use types::{HireAcceptance, HireDraft, HireFilter, HireRequest, HireUpdate, NewHire};
