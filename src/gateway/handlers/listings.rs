//! Item and service listing handlers

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use super::super::auth::AuthenticatedUser;
use super::super::state::AppState;
use super::super::types::{ApiResult, created, ok};
use crate::core_types::{GroupId, ListingId};
use crate::error::MarketError;
use crate::listing::{Listing, ListingDraft, ListingKind, ListingStatus};

#[derive(Debug, Deserialize, Default)]
pub struct GroupQuery {
    pub group_id: Option<GroupId>,
}

// === Items ===

pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(q): Query<GroupQuery>,
) -> ApiResult<Vec<Listing>> {
    ok(state.listings.list_approved(ListingKind::Item, q.group_id).await?)
}

pub async fn list_group_items(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<GroupId>,
) -> ApiResult<Vec<Listing>> {
    state
        .store
        .get_group(group_id)
        .await?
        .ok_or(MarketError::NotFound("group"))?;
    ok(state
        .listings
        .list_approved(ListingKind::Item, Some(group_id))
        .await?)
}

pub async fn create_item(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(draft): Json<ListingDraft>,
) -> ApiResult<Listing> {
    created(state.listings.submit(&user, ListingKind::Item, draft).await?)
}

/// Approved items are visible to everyone; others only to the owner or an admin
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<ListingId>,
) -> ApiResult<Listing> {
    let item = state.listings.get(ListingKind::Item, id).await?;
    let visible = matches!(item.status, ListingStatus::Approved | ListingStatus::Sold)
        || item.owner_id == user.id
        || user.is_admin();
    if !visible {
        return Err(MarketError::NotFound("item").into());
    }
    ok(item)
}

pub async fn my_items(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<Listing>> {
    ok(state.listings.list_owned(user.id, ListingKind::Item).await?)
}

// === Services ===

pub async fn list_services(
    State(state): State<Arc<AppState>>,
    Query(q): Query<GroupQuery>,
) -> ApiResult<Vec<Listing>> {
    ok(state
        .listings
        .list_approved(ListingKind::Service, q.group_id)
        .await?)
}

pub async fn create_service(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(draft): Json<ListingDraft>,
) -> ApiResult<Listing> {
    created(
        state
            .listings
            .submit(&user, ListingKind::Service, draft)
            .await?,
    )
}

pub async fn my_services(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<Listing>> {
    ok(state
        .listings
        .list_owned(user.id, ListingKind::Service)
        .await?)
}
