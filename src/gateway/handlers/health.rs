//! Health check handler

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::Serialize;

use super::super::state::AppState;
use super::super::types::{ApiResponse, error_codes};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    pub timestamp_ms: i64,
    pub version: &'static str,
    /// `postgres` or `memory`
    pub storage: &'static str,
}

/// - Healthy: 200 OK + {code: 0, data: {...}}
/// - Database unreachable: 503 + {code: 5001, msg: "unavailable"}
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let storage = match &state.pg_db {
        Some(db) => {
            if let Err(e) = db.health_check().await {
                tracing::error!("[HEALTH] PostgreSQL ping failed: {}", e);
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(ApiResponse {
                        code: error_codes::SERVICE_UNAVAILABLE,
                        msg: "unavailable".to_string(),
                        data: None,
                    }),
                );
            }
            "postgres"
        }
        None => "memory",
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(HealthResponse {
            timestamp_ms: Utc::now().timestamp_millis(),
            version: env!("GIT_HASH"),
            storage,
        })),
    )
}
