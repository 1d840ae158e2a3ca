//! Want-ad State Definitions
//!
//! ```text
//! OPEN ──fulfilled by a provider──▶ FULFILLED
//!   │
//!   └──closed by the requester──▶ CLOSED
//! ```
//!
//! Neither terminal state is ever reopened.

use std::fmt;

use serde::Serialize;

use crate::lifecycle::Lifecycle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WantedStatus {
    Open,
    Fulfilled,
    Closed,
}

impl Lifecycle for WantedStatus {
    const ENTITY: &'static str = "requested item";

    fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (WantedStatus::Open, WantedStatus::Fulfilled) | (WantedStatus::Open, WantedStatus::Closed)
        )
    }

    fn is_terminal(self) -> bool {
        !matches!(self, WantedStatus::Open)
    }

    fn as_str(self) -> &'static str {
        match self {
            WantedStatus::Open => "open",
            WantedStatus::Fulfilled => "fulfilled",
            WantedStatus::Closed => "closed",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(WantedStatus::Open),
            "fulfilled" => Some(WantedStatus::Fulfilled),
            "closed" => Some(WantedStatus::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for WantedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
