//! Marketplace Error Types
//!
//! One taxonomy shared by every state machine. Each variant carries a stable
//! string code and an HTTP status suggestion for the gateway.

use thiserror::Error;

/// Marketplace error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    // === Input Errors ===
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Please update your phone number in contact details before making a transaction")]
    ContactDetailsIncomplete,

    // === Authorization ===
    #[error("Forbidden: {0}")]
    Forbidden(String),

    // === State Errors ===
    #[error("Invalid state transition for {entity}: {from} -> {to}")]
    InvalidStateTransition {
        entity: &'static str,
        from: &'static str,
        to: &'static str,
    },

    #[error("Request is already processed")]
    AlreadyProcessed,

    #[error("Insufficient quantity: requested {requested}, available {available}")]
    InsufficientQuantity { requested: i32, available: i32 },

    // === Fulfillment Errors ===
    #[error("Requested item is not open")]
    RequestClosed,

    #[error("You cannot fulfill your own request")]
    SelfFulfillment,

    #[error("Price exceeds the requested maximum price")]
    PriceExceedsLimit,

    #[error("Quantity must be between 1 and {max}")]
    QuantityOutOfRange { max: i32 },

    // === Lookup ===
    #[error("{0} not found")]
    NotFound(&'static str),

    // === System Errors ===
    #[error("Dependency failure: {0}")]
    DependencyFailure(String),
}

impl MarketError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            MarketError::Validation(_) => "VALIDATION_ERROR",
            MarketError::InvalidRequest(_) => "INVALID_REQUEST",
            MarketError::ContactDetailsIncomplete => "CONTACT_DETAILS_INCOMPLETE",
            MarketError::Forbidden(_) => "FORBIDDEN",
            MarketError::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            MarketError::AlreadyProcessed => "ALREADY_PROCESSED",
            MarketError::InsufficientQuantity { .. } => "INSUFFICIENT_QUANTITY",
            MarketError::RequestClosed => "REQUEST_CLOSED",
            MarketError::SelfFulfillment => "SELF_FULFILLMENT",
            MarketError::PriceExceedsLimit => "PRICE_EXCEEDS_LIMIT",
            MarketError::QuantityOutOfRange { .. } => "QUANTITY_OUT_OF_RANGE",
            MarketError::NotFound(_) => "NOT_FOUND",
            MarketError::DependencyFailure(_) => "DEPENDENCY_FAILURE",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            MarketError::Validation(_)
            | MarketError::InvalidRequest(_)
            | MarketError::ContactDetailsIncomplete
            | MarketError::SelfFulfillment
            | MarketError::PriceExceedsLimit
            | MarketError::QuantityOutOfRange { .. } => 400,
            MarketError::Forbidden(_) => 403,
            MarketError::NotFound(_) => 404,
            MarketError::InvalidStateTransition { .. }
            | MarketError::AlreadyProcessed
            | MarketError::RequestClosed => 409,
            MarketError::InsufficientQuantity { .. } => 422,
            MarketError::DependencyFailure(_) => 503,
        }
    }

    /// True for the guard failure raised when an entity already left its source state
    #[inline]
    pub fn is_state_conflict(&self) -> bool {
        matches!(
            self,
            MarketError::InvalidStateTransition { .. } | MarketError::AlreadyProcessed
        )
    }
}

impl From<sqlx::Error> for MarketError {
    fn from(e: sqlx::Error) -> Self {
        MarketError::DependencyFailure(format!("database: {}", e))
    }
}

impl From<validator::ValidationErrors> for MarketError {
    fn from(e: validator::ValidationErrors) -> Self {
        MarketError::Validation(e.to_string())
    }
}
