//! # Dispatch Trigger Handlers
//!
//! `POST /outreach/trigger` dispatches the next batch of a campaign.
//! `GET /outreach/trigger` reports on one campaign or lists campaigns.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::models::Campaign;
use crate::outreach::TrackingAssignment;
use crate::web::errors::{ApiError, ApiResult};
use crate::web::extractors::ApiJson;
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TriggerRequest {
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub batch_size: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub success: bool,
    pub campaign_id: String,
    pub queued_count: usize,
    pub contacts: Vec<TrackingAssignment>,
    pub failed_contact_ids: Vec<String>,
    pub forward_enqueued: bool,
}

#[derive(Debug, Deserialize)]
pub struct CampaignQuery {
    pub campaign_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CampaignStatusResponse {
    pub success: bool,
    pub campaign: Campaign,
    pub status_counts: BTreeMap<String, i64>,
}

#[derive(Debug, Serialize)]
pub struct CampaignListResponse {
    pub success: bool,
    pub campaigns: Vec<Campaign>,
}

/// Dispatch a batch: POST /outreach/trigger
pub async fn trigger_dispatch(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TriggerRequest>,
) -> ApiResult<Json<TriggerResponse>> {
    let campaign_id = request
        .campaign_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("campaign_id is required"))?;

    info!(campaign_id = %campaign_id, batch_size = ?request.batch_size, "Dispatch trigger received");
    let outcome = state
        .services
        .dispatcher
        .trigger(campaign_id, request.batch_size)
        .await?;

    Ok(Json(TriggerResponse {
        success: true,
        queued_count: outcome.queued_count(),
        campaign_id: outcome.campaign_id,
        contacts: outcome.queued,
        failed_contact_ids: outcome.failed_contact_ids,
        forward_enqueued: outcome.forward_enqueued,
    }))
}

/// Campaign status: GET /outreach/trigger[?campaign_id=]
pub async fn campaign_status(
    State(state): State<AppState>,
    Query(query): Query<CampaignQuery>,
) -> ApiResult<Response> {
    let reporter = &state.services.reporter;
    match query.campaign_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        Some(campaign_id) => {
            let overview = reporter.overview(campaign_id).await?;
            Ok(Json(CampaignStatusResponse {
                success: true,
                campaign: overview.campaign,
                status_counts: overview.status_counts,
            })
            .into_response())
        }
        None => {
            let campaigns = reporter.list_campaigns().await?;
            Ok(Json(CampaignListResponse {
                success: true,
                campaigns,
            })
            .into_response())
        }
    }
}
