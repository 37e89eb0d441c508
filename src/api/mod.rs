use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::{admin_auth, request_id, security_headers};
use crate::AppState;

pub mod handlers;

/// Routes under `/api`. The verification link and health checks are public;
/// issuance and the pending list need the admin key.
pub fn api_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let admin = Router::new()
        .route("/approval/request", post(handlers::request_approval))
        .route("/approval/pending", get(handlers::list_pending))
        .route_layer(middleware::from_fn_with_state(state, admin_auth));

    Router::new()
        .route("/approval/verify/:token", get(handlers::verify_approval))
        .route("/health", get(handlers::health))
        .route("/test-db", get(handlers::test_db))
        .merge(admin)
        .fallback(fallback_404)
}

/// The full application without transport concerns (CORS, connect info).
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .nest("/api", api_router(state.clone()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(security_headers))
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}
