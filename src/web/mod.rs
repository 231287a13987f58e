//! # Web API Module
//!
//! Axum HTTP surface for the outreach dispatch core.
//!
//! ## Core Components
//!
//! - [`routes`] - Route table
//! - [`handlers`] - Trigger, webhook, forwarding and health handlers
//! - [`middleware`] - Request IDs and the inbound webhook secret check
//! - [`extractors`] - JSON extractor that reports bad bodies as `400`
//! - [`errors`] - `ApiError` and the `{success: false, error}` body
//! - [`state`] - Shared application state

pub mod errors;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use errors::{ApiError, ApiResult};
pub use state::AppState;

/// Create the Axum application with all routes and middleware
pub fn create_app(app_state: AppState) -> Router {
    let request_timeout = app_state.web_config.request_timeout();

    Router::new()
        .merge(routes::health_routes())
        .merge(routes::outreach_routes(app_state.clone()))
        .layer(axum::middleware::from_fn(
            middleware::request_id::add_request_id,
        ))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
