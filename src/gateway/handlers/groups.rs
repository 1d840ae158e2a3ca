//! Group handlers

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Deserialize;

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, created, ok};
use crate::account::Group;

pub async fn list_groups(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Group>> {
    ok(state.store.list_groups().await?)
}

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
}

/// Admin only
pub async fn create_group(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateGroupRequest>,
) -> ApiResult<Group> {
    let name = req.name.trim();
    if name.is_empty() {
        return ApiError::bad_request("group name is required").into_err();
    }
    let group = state.store.create_group(name).await?;
    tracing::info!(group_id = group.id, name = %group.name, "Group created");
    created(group)
}
