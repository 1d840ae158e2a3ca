//! Caller profile handlers

use std::sync::Arc;

use axum::{Extension, Json, extract::State};

use super::super::auth::AuthenticatedUser;
use super::super::state::AppState;
use super::super::types::{ApiResult, ok};
use crate::account::{DetailsDraft, UserProfile};

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> ApiResult<UserProfile> {
    ok(state.accounts.profile(&user).await?)
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(draft): Json<DetailsDraft>,
) -> ApiResult<UserProfile> {
    ok(state.accounts.update_details(&user, draft).await?)
}
