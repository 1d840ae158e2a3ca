//! Service request (hire) handlers

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use super::super::auth::AuthenticatedUser;
use super::super::state::AppState;
use super::super::types::{ApiResult, created, ok};
use crate::core_types::HireId;
use crate::hire::{HireAcceptance, HireDraft, HireRequest};

pub async fn list_hires(State(state): State<Arc<AppState>>) -> ApiResult<Vec<HireRequest>> {
    ok(state.hires.list_open().await?)
}

pub async fn create_hire(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(draft): Json<HireDraft>,
) -> ApiResult<HireRequest> {
    created(state.hires.create(&user, draft).await?)
}

pub async fn my_hires(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<HireRequest>> {
    ok(state.hires.list_mine(&user).await?)
}

pub async fn taken_hires(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<HireRequest>> {
    ok(state.hires.list_taken(&user).await?)
}

pub async fn accept_hire(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<HireId>,
) -> ApiResult<HireAcceptance> {
    ok(state.hires.accept(&user, id).await?)
}

pub async fn complete_hire(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<HireId>,
) -> ApiResult<HireRequest> {
    ok(state.hires.complete(&user, id).await?)
}

pub async fn cancel_hire(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<HireId>,
) -> ApiResult<HireRequest> {
    ok(state.hires.cancel(&user, id).await?)
}
