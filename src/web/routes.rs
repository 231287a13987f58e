//! # Web API Route Definitions

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::web::handlers;
use crate::web::middleware::webhook_auth::require_webhook_secret;
use crate::web::state::AppState;

/// Outreach routes. Only the sender webhook is behind the shared secret.
pub fn outreach_routes(state: AppState) -> Router<AppState> {
    let webhook_routes = Router::new()
        .route(
            "/outreach/webhook",
            post(handlers::webhook::receive_event).put(handlers::webhook::report_reply),
        )
        .route_layer(middleware::from_fn_with_state(state, require_webhook_secret));

    Router::new()
        .route(
            "/outreach/trigger",
            post(handlers::trigger::trigger_dispatch).get(handlers::trigger::campaign_status),
        )
        .route(
            "/outreach/forwarding/failures",
            get(handlers::forwarding::list_failures),
        )
        .merge(webhook_routes)
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::basic_health))
        .route("/ready", get(handlers::health::readiness_check))
}
