//! API response envelope and error mapping
//!
//! - `ApiResponse<T>`: unified response wrapper
//! - `ApiError`: HTTP status + numeric code + message
//! - `error_codes`: numeric code constants

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::MarketError;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: payload on success, absent on error
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// 200 with payload
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::success(data))))
}

/// 201 with payload
pub fn created<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER, msg)
    }

    pub fn missing_auth() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            error_codes::MISSING_AUTH,
            "Missing Authorization header",
        )
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, error_codes::AUTH_FAILED, msg)
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, error_codes::FORBIDDEN, msg)
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            error_codes::SERVICE_UNAVAILABLE,
            msg,
        )
    }

    pub fn into_err<T>(self) -> ApiResult<T> {
        Err(self)
    }
}

impl From<MarketError> for ApiError {
    fn from(e: MarketError) -> Self {
        let status =
            StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let code = error_codes::for_market_error(&e);
        match e {
            // Storage and relay details stay in the log
            MarketError::DependencyFailure(detail) => {
                tracing::error!(error = %detail, "Dependency failure while serving request");
                Self::new(status, code, "service temporarily unavailable")
            }
            other => Self::new(status, code, other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::error(self.code, self.msg))).into_response()
    }
}

// ============================================================================
// Error Codes
// ============================================================================

pub mod error_codes {
    use crate::error::MarketError;

    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const INVALID_REQUEST: i32 = 1002;
    pub const CONTACT_DETAILS_INCOMPLETE: i32 = 1003;
    pub const SELF_FULFILLMENT: i32 = 1004;
    pub const PRICE_EXCEEDS_LIMIT: i32 = 1005;
    pub const QUANTITY_OUT_OF_RANGE: i32 = 1006;
    pub const INSUFFICIENT_QUANTITY: i32 = 1007;

    // Auth errors (2xxx)
    pub const MISSING_AUTH: i32 = 2001;
    pub const AUTH_FAILED: i32 = 2002;
    pub const FORBIDDEN: i32 = 2003;

    // Resource errors (4xxx)
    pub const NOT_FOUND: i32 = 4001;
    pub const INVALID_STATE_TRANSITION: i32 = 4091;
    pub const ALREADY_PROCESSED: i32 = 4092;
    pub const REQUEST_CLOSED: i32 = 4093;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5001;

    pub fn for_market_error(e: &MarketError) -> i32 {
        match e {
            MarketError::Validation(_) => INVALID_PARAMETER,
            MarketError::InvalidRequest(_) => INVALID_REQUEST,
            MarketError::ContactDetailsIncomplete => CONTACT_DETAILS_INCOMPLETE,
            MarketError::SelfFulfillment => SELF_FULFILLMENT,
            MarketError::PriceExceedsLimit => PRICE_EXCEEDS_LIMIT,
            MarketError::QuantityOutOfRange { .. } => QUANTITY_OUT_OF_RANGE,
            MarketError::InsufficientQuantity { .. } => INSUFFICIENT_QUANTITY,
            MarketError::Forbidden(_) => FORBIDDEN,
            MarketError::NotFound(_) => NOT_FOUND,
            MarketError::InvalidStateTransition { .. } => INVALID_STATE_TRANSITION,
            MarketError::AlreadyProcessed => ALREADY_PROCESSED,
            MarketError::RequestClosed => REQUEST_CLOSED,
            MarketError::DependencyFailure(_) => SERVICE_UNAVAILABLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(ApiResponse::success(7)).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["msg"], "ok");
        assert_eq!(json["data"], 7);
    }

    #[test]
    fn test_error_envelope_omits_data() {
        let json = serde_json::to_value(ApiResponse::<()>::error(2001, "nope")).unwrap();
        assert_eq!(json["code"], 2001);
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_market_error_mapping() {
        let e = ApiError::from(MarketError::InvalidStateTransition {
            entity: "listing",
            from: "approved",
            to: "rejected",
        });
        assert_eq!(e.status, StatusCode::CONFLICT);
        assert_eq!(e.code, error_codes::INVALID_STATE_TRANSITION);

        let e = ApiError::from(MarketError::InsufficientQuantity {
            requested: 5,
            available: 2,
        });
        assert_eq!(e.status, StatusCode::UNPROCESSABLE_ENTITY);

        let e = ApiError::from(MarketError::DependencyFailure("connection reset".into()));
        assert_eq!(e.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!e.msg.contains("connection reset"));
    }
}
