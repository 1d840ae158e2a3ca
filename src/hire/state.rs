//! Service Request State Definitions
//!
//! ```text
//! OPEN ──provider accepts──▶ IN-PROGRESS ──requester completes──▶ COMPLETED
//!   │
//!   └──requester cancels──▶ CANCELLED
//! ```

use std::fmt;

use serde::Serialize;

use crate::lifecycle::Lifecycle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HireStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl Lifecycle for HireStatus {
    const ENTITY: &'static str = "service request";

    fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (HireStatus::Open, HireStatus::InProgress)
                | (HireStatus::InProgress, HireStatus::Completed)
                | (HireStatus::Open, HireStatus::Cancelled)
        )
    }

    fn is_terminal(self) -> bool {
        matches!(self, HireStatus::Completed | HireStatus::Cancelled)
    }

    fn as_str(self) -> &'static str {
        match self {
            HireStatus::Open => "open",
            HireStatus::InProgress => "in-progress",
            HireStatus::Completed => "completed",
            HireStatus::Cancelled => "cancelled",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(HireStatus::Open),
            "in-progress" => Some(HireStatus::InProgress),
            "completed" => Some(HireStatus::Completed),
            "cancelled" => Some(HireStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for HireStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
