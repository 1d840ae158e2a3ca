//! Transaction request handlers

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use super::super::auth::AuthenticatedUser;
use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, created, ok};
use crate::core_types::TradeId;
use crate::trade::{TradeApproval, TradeDraft, TradeRequest, TradeView};

pub async fn create_request(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(draft): Json<TradeDraft>,
) -> ApiResult<TradeRequest> {
    created(state.trades.create(&user, draft).await?)
}

pub async fn list_requests(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<TradeView>> {
    ok(state.trades.list_for_user(&user).await?)
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    /// `approved` or `rejected`
    pub status: String,
}

/// Seller's answer; the approved variant carries both contact cards
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DecisionResponse {
    Approved(TradeApproval),
    Rejected(TradeRequest),
}

pub async fn decide_request(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<TradeId>,
    Json(req): Json<DecisionRequest>,
) -> ApiResult<DecisionResponse> {
    match req.status.trim().to_ascii_lowercase().as_str() {
        "approved" => ok(DecisionResponse::Approved(
            state.trades.approve(&user, id).await?,
        )),
        "rejected" => ok(DecisionResponse::Rejected(
            state.trades.reject(&user, id).await?,
        )),
        other => ApiError::bad_request(format!(
            "status must be approved or rejected, got '{}'",
            other
        ))
        .into_err(),
    }
}
