//! Transaction request state machine
//!
//! A buyer asks a seller for some quantity of an approved item, optionally
//! offering one of their own items in exchange. The seller's approval
//! decrements inventory and releases both parties' contact details in one
//! atomic step.

pub mod service;
pub mod state;
pub mod types;

pub use service::TradeService;
pub use state::{TradeStatus, TradeType};
pub use types::{
    ApprovedTrade, ListingSummary, NewTrade, PartyView, TradeApproval, TradeDraft, TradeRequest,
    TradeRole, TradeView,
};
