//! # Health Check Handlers
//!
//! `/health` answers as long as the process serves requests. `/ready` also
//! checks the store and the forward queue, for load balancers and orchestrators.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, error};

use crate::database::OutreachStore;
use crate::forwarding::ForwardQueue;
use crate::web::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
    pub uptime_seconds: i64,
}

#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub duration_ms: u64,
}

impl HealthCheck {
    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub checks: BTreeMap<&'static str, HealthCheck>,
}

/// Basic health check endpoint: GET /health
pub async fn basic_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let now = Utc::now();
    Json(HealthResponse {
        status: "healthy",
        timestamp: now.to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: (now - state.started_at).num_seconds(),
    })
}

/// Readiness check: GET /ready
///
/// 200 when every check passes, 503 with the same body otherwise.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    debug!("Performing readiness check");

    let mut checks = BTreeMap::new();
    checks.insert("store", check_store_health(state.services.store.as_ref()).await);
    checks.insert(
        "forward_queue",
        check_forward_queue(&state.services.forward_queue),
    );

    let ready = checks.values().all(HealthCheck::is_healthy);
    let response = ReadinessResponse {
        status: if ready { "ready" } else { "not_ready" },
        timestamp: Utc::now().to_rfc3339(),
        checks,
    };
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

async fn check_store_health(store: &dyn OutreachStore) -> HealthCheck {
    let start = Instant::now();
    match store.health_check().await {
        Ok(()) => HealthCheck {
            status: "healthy",
            message: None,
            duration_ms: start.elapsed().as_millis() as u64,
        },
        Err(e) => {
            error!(error = %e, "Store health check failed");
            HealthCheck {
                status: "unhealthy",
                message: Some("Store unavailable".to_string()),
                duration_ms: start.elapsed().as_millis() as u64,
            }
        }
    }
}

fn check_forward_queue(queue: &ForwardQueue) -> HealthCheck {
    if queue.is_closed() {
        error!("Forward worker has stopped; batches cannot be forwarded");
        return HealthCheck {
            status: "unhealthy",
            message: Some("Forward worker stopped".to_string()),
            duration_ms: 0,
        };
    }
    HealthCheck {
        status: "healthy",
        message: None,
        duration_ms: 0,
    }
}
