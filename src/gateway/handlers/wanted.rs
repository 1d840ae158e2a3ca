//! Want-ad handlers

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use super::super::auth::AuthenticatedUser;
use super::super::state::AppState;
use super::super::types::{ApiResult, created, ok};
use crate::core_types::WantedId;
use crate::wanted::{FulfillDraft, Fulfillment, RequestedItem, WantedDraft};

pub async fn list_wanted(State(state): State<Arc<AppState>>) -> ApiResult<Vec<RequestedItem>> {
    ok(state.wanted.list_open().await?)
}

pub async fn create_wanted(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(draft): Json<WantedDraft>,
) -> ApiResult<RequestedItem> {
    created(state.wanted.create(&user, draft).await?)
}

pub async fn fulfill_wanted(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(draft): Json<FulfillDraft>,
) -> ApiResult<Fulfillment> {
    created(state.wanted.fulfill(&user, draft).await?)
}

pub async fn my_wanted(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<RequestedItem>> {
    ok(state.wanted.list_mine(&user).await?)
}

pub async fn close_wanted(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<WantedId>,
) -> ApiResult<RequestedItem> {
    ok(state.wanted.close(&user, id).await?)
}
