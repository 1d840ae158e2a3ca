//! Trade Request State Definitions
//!
//! ```text
//! PENDING ──seller approves (stock decremented)──▶ APPROVED
//!    │
//!    └──seller rejects──▶ REJECTED
//! ```

use std::fmt;

use serde::Serialize;

use crate::lifecycle::Lifecycle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Pending,
    Approved,
    Rejected,
}

impl Lifecycle for TradeStatus {
    const ENTITY: &'static str = "transaction request";

    fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (TradeStatus::Pending, TradeStatus::Approved)
                | (TradeStatus::Pending, TradeStatus::Rejected)
        )
    }

    fn is_terminal(self) -> bool {
        !matches!(self, TradeStatus::Pending)
    }

    fn as_str(self) -> &'static str {
        match self {
            TradeStatus::Pending => "pending",
            TradeStatus::Approved => "approved",
            TradeStatus::Rejected => "rejected",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(TradeStatus::Pending),
            "approved" => Some(TradeStatus::Approved),
            "rejected" => Some(TradeStatus::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trade request type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeType {
    Buy,
    Exchange,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Buy => "buy",
            TradeType::Exchange => "exchange",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "buy" => Some(TradeType::Buy),
            "exchange" => Some(TradeType::Exchange),
            _ => None,
        }
    }
}
