use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::forwarding::ForwardFailure;
use crate::web::state::AppState;

#[derive(Debug, Serialize)]
pub struct ForwardFailuresResponse {
    pub success: bool,
    /// Including failures evicted from the bounded log
    pub total_recorded: u64,
    pub failures: Vec<ForwardFailure>,
}

/// Batches the forwarder gave up on: GET /outreach/forwarding/failures
pub async fn list_failures(State(state): State<AppState>) -> Json<ForwardFailuresResponse> {
    let log = state.services.forward_queue.failure_log();
    Json(ForwardFailuresResponse {
        success: true,
        total_recorded: log.total_recorded(),
        failures: log.recent(),
    })
}
