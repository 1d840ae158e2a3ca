//! Lifecycle transition tables
//!
//! Every persisted status enum (listings, trade requests, service requests,
//! want-ads) implements [`Lifecycle`]. The transition table lives on the enum;
//! [`guard`] is the single place that turns a disallowed move into
//! [`MarketError::InvalidStateTransition`].
//!
//! Stores use the same table when re-checking a precondition inside a
//! transaction, so a transition is validated identically whether it comes from
//! a user request, an administrator or the sweep worker.

use std::fmt::Debug;

use crate::error::MarketError;

/// A status enum with an explicit transition table
pub trait Lifecycle: Copy + Eq + Debug + Send + Sync + 'static {
    /// Entity name used in error messages (e.g. `"item"`)
    const ENTITY: &'static str;

    /// Whether `self -> to` is an edge of the transition graph
    fn can_transition(self, to: Self) -> bool;

    /// Terminal states have no outgoing edges
    fn is_terminal(self) -> bool;

    /// Storage / wire representation
    fn as_str(self) -> &'static str;

    /// Parse the storage representation
    fn parse(value: &str) -> Option<Self>;
}

/// Check that `current -> to` is allowed.
pub fn guard<S: Lifecycle>(current: S, to: S) -> Result<(), MarketError> {
    if current.can_transition(to) {
        Ok(())
    } else {
        Err(transition_error(current, to))
    }
}

/// Check that the entity is still in `expected` and that `expected -> to` is allowed.
///
/// Used for compare-and-set updates: a caller that observed `expected` may only
/// write `to` if nobody moved the entity in between.
pub fn guard_from<S: Lifecycle>(current: S, expected: S, to: S) -> Result<(), MarketError> {
    if current != expected {
        return Err(transition_error(current, to));
    }
    guard(current, to)
}

/// Build the error for a rejected transition
pub fn transition_error<S: Lifecycle>(from: S, to: S) -> MarketError {
    MarketError::InvalidStateTransition {
        entity: S::ENTITY,
        from: from.as_str(),
        to: to.as_str(),
    }
}

/// Parse a status column, mapping garbage to a dependency failure
pub fn parse_status<S: Lifecycle>(value: &str) -> Result<S, MarketError> {
    S::parse(value).ok_or_else(|| {
        MarketError::DependencyFailure(format!("invalid {} status: {}", S::ENTITY, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Door {
        Open,
        Shut,
        Gone,
    }

    impl Lifecycle for Door {
        const ENTITY: &'static str = "door";

        fn can_transition(self, to: Self) -> bool {
            matches!((self, to), (Door::Open, Door::Shut) | (Door::Shut, Door::Gone))
        }

        fn is_terminal(self) -> bool {
            self == Door::Gone
        }

        fn as_str(self) -> &'static str {
            match self {
                Door::Open => "open",
                Door::Shut => "shut",
                Door::Gone => "gone",
            }
        }

        fn parse(value: &str) -> Option<Self> {
            match value {
                "open" => Some(Door::Open),
                "shut" => Some(Door::Shut),
                "gone" => Some(Door::Gone),
                _ => None,
            }
        }
    }

    #[test]
    fn test_guard_allows_table_edges() {
        assert!(guard(Door::Open, Door::Shut).is_ok());
        assert!(guard(Door::Shut, Door::Gone).is_ok());
    }

    #[test]
    fn test_guard_rejects_missing_edges() {
        let err = guard(Door::Open, Door::Gone).unwrap_err();
        assert_eq!(
            err,
            MarketError::InvalidStateTransition {
                entity: "door",
                from: "open",
                to: "gone"
            }
        );
    }

    #[test]
    fn test_guard_from_detects_concurrent_move() {
        // Someone shut the door after we looked at it
        let err = guard_from(Door::Shut, Door::Open, Door::Shut).unwrap_err();
        assert!(err.is_state_conflict());
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status::<Door>("gone").unwrap(), Door::Gone);
        assert!(matches!(
            parse_status::<Door>("ajar"),
            Err(MarketError::DependencyFailure(_))
        ));
    }
}
