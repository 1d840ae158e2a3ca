pub mod auth;
pub mod handlers;
pub mod state;
pub mod types;

use std::future::Future;
use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
};
use tokio::net::TcpListener;

use auth::{require_admin, require_user};
use state::AppState;

/// Assemble the `/api/v1` router
pub fn build_router(state: Arc<AppState>) -> Router {
    // ==========================================================================
    // Public Routes (no auth required)
    // ==========================================================================
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/groups", get(handlers::list_groups))
        .route("/items", get(handlers::list_items))
        .route("/groups/{id}/items", get(handlers::list_group_items))
        .route("/services", get(handlers::list_services))
        .route("/requested-items", get(handlers::list_wanted))
        .route("/service-requests", get(handlers::list_hires));

    // ==========================================================================
    // User Routes (bearer token required)
    // ==========================================================================
    let user_routes = Router::new()
        // Own profile
        .route(
            "/user",
            get(handlers::get_profile).patch(handlers::update_profile),
        )
        // Listings
        .route("/items", post(handlers::create_item))
        .route("/items/{id}", get(handlers::get_item))
        .route("/my-items", get(handlers::my_items))
        .route("/services", post(handlers::create_service))
        .route("/my-services", get(handlers::my_services))
        // Transaction requests
        .route(
            "/requests",
            post(handlers::create_request).get(handlers::list_requests),
        )
        .route("/requests/{id}/approve", patch(handlers::decide_request))
        // Want-ads
        .route("/requested-items", post(handlers::create_wanted))
        .route("/requested-items/fulfill", post(handlers::fulfill_wanted))
        .route("/my-requested-items", get(handlers::my_wanted))
        .route("/requested-items/{id}/close", patch(handlers::close_wanted))
        // Service requests
        .route("/service-requests", post(handlers::create_hire))
        .route("/my-service-requests", get(handlers::my_hires))
        .route("/service-requests/taken", get(handlers::taken_hires))
        .route("/service-requests/{id}/accept", patch(handlers::accept_hire))
        .route(
            "/service-requests/{id}/complete",
            patch(handlers::complete_hire),
        )
        .route("/service-requests/{id}/cancel", patch(handlers::cancel_hire))
        .layer(from_fn_with_state(state.clone(), require_user));

    // ==========================================================================
    // Admin Routes (token + admin role)
    // ==========================================================================
    let admin_routes = Router::new()
        .route("/items", get(handlers::pending_items))
        .route("/items/{id}/approve", patch(handlers::approve_item))
        .route("/items/{id}/reject", patch(handlers::reject_item))
        .route("/services", get(handlers::pending_services))
        .route("/services/{id}/approve", patch(handlers::approve_service))
        .route("/services/{id}/reject", patch(handlers::reject_service))
        .route("/groups", post(handlers::create_group))
        .route("/sweep", post(handlers::run_sweep))
        // Outer layer runs first
        .layer(from_fn(require_admin))
        .layer(from_fn_with_state(state.clone(), require_user));

    let api = Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .nest("/admin", admin_routes);

    Router::new().nest("/api/v1", api).with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn run_server(
    host: &str,
    port: u16,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await.inspect_err(|e| {
        tracing::error!(
            "Failed to bind to {}: {} (port {} may already be in use)",
            addr,
            e,
            port
        );
    })?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("Public API: /api/v1/*, admin API: /api/v1/admin/*");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
