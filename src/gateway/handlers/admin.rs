//! Administrator handlers (behind `require_admin`)

use std::sync::Arc;

use axum::{
    Extension,
    extract::{Path, State},
};

use super::super::auth::AuthenticatedUser;
use super::super::state::AppState;
use super::super::types::{ApiResult, ok};
use crate::account::Actor;
use crate::core_types::ListingId;
use crate::listing::{Listing, ListingKind};
use crate::sweep::SweepReport;

pub async fn pending_items(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Listing>> {
    ok(state.listings.list_pending(ListingKind::Item).await?)
}

pub async fn pending_services(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Listing>> {
    ok(state.listings.list_pending(ListingKind::Service).await?)
}

pub async fn approve_item(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(admin)): Extension<AuthenticatedUser>,
    Path(id): Path<ListingId>,
) -> ApiResult<Listing> {
    ok(state
        .listings
        .approve(&Actor::Member(admin), ListingKind::Item, id)
        .await?)
}

pub async fn reject_item(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(admin)): Extension<AuthenticatedUser>,
    Path(id): Path<ListingId>,
) -> ApiResult<Listing> {
    ok(state
        .listings
        .reject(&Actor::Member(admin), ListingKind::Item, id)
        .await?)
}

pub async fn approve_service(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(admin)): Extension<AuthenticatedUser>,
    Path(id): Path<ListingId>,
) -> ApiResult<Listing> {
    ok(state
        .listings
        .approve(&Actor::Member(admin), ListingKind::Service, id)
        .await?)
}

pub async fn reject_service(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(admin)): Extension<AuthenticatedUser>,
    Path(id): Path<ListingId>,
) -> ApiResult<Listing> {
    ok(state
        .listings
        .reject(&Actor::Member(admin), ListingKind::Service, id)
        .await?)
}

/// Run one sweep now instead of waiting for the next tick
pub async fn run_sweep(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(admin)): Extension<AuthenticatedUser>,
) -> ApiResult<SweepReport> {
    tracing::info!(admin_id = admin.id, "Manual sweep requested");
    ok(state.sweep.sweep_once().await)
}
