//! # Sender Webhook Handlers
//!
//! `POST /outreach/webhook` ingests delivery events from the sending system.
//! `PUT /outreach/webhook` records replies and conversions.
//! Unknown event types and refused transitions still answer `200`.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::models::{DeliveryEvent, ReplyReport};
use crate::outreach::TransitionOutcome;
use crate::web::errors::ApiResult;
use crate::web::extractors::ApiJson;
use crate::web::state::AppState;

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: TransitionOutcome,
}

impl From<TransitionOutcome> for WebhookResponse {
    fn from(outcome: TransitionOutcome) -> Self {
        Self {
            success: true,
            outcome,
        }
    }
}

/// Delivery event: POST /outreach/webhook
pub async fn receive_event(
    State(state): State<AppState>,
    ApiJson(event): ApiJson<DeliveryEvent>,
) -> ApiResult<Json<WebhookResponse>> {
    let outcome = state.services.ingester.ingest(event).await?;
    Ok(Json(outcome.into()))
}

/// Reply or conversion: PUT /outreach/webhook
pub async fn report_reply(
    State(state): State<AppState>,
    ApiJson(report): ApiJson<ReplyReport>,
) -> ApiResult<Json<WebhookResponse>> {
    let outcome = state.services.reply_handler.report_reply(report).await?;
    Ok(Json(outcome.into()))
}
