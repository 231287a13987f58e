//! # Web API Error Types
//!
//! Every failure leaves the service as `{"success": false, "error": "..."}`.
//! Store and forwarding details are logged here and never sent to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::error::OutreachError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("Invalid webhook secret")]
    Unauthorized,

    #[error("Internal server error")]
    Internal,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "error": self.to_string(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<OutreachError> for ApiError {
    fn from(err: OutreachError) -> Self {
        match err {
            OutreachError::Validation(message) => Self::BadRequest { message },
            OutreachError::CampaignNotActive { .. } => Self::bad_request(err.to_string()),
            OutreachError::CampaignNotFound(_) | OutreachError::ContactNotFound(_) => {
                Self::not_found(err.to_string())
            }
            OutreachError::Persistence(_)
            | OutreachError::UpstreamForward(_)
            | OutreachError::Configuration(_) => {
                error!(error = %err, "Request failed with an internal error");
                Self::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::StoreError;

    #[test]
    fn test_domain_errors_map_to_status_codes() {
        let cases = [
            (OutreachError::validation("type is required"), StatusCode::BAD_REQUEST),
            (
                OutreachError::CampaignNotActive {
                    campaign_id: "c1".into(),
                    status: "paused".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (OutreachError::CampaignNotFound("c1".into()), StatusCode::NOT_FOUND),
            (OutreachError::ContactNotFound("ct1".into()), StatusCode::NOT_FOUND),
            (
                OutreachError::Persistence(StoreError::Injected("disk".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status_code(), expected);
        }
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let api_error = ApiError::from(OutreachError::Persistence(StoreError::Injected(
            "connection refused to 10.0.0.5".into(),
        )));
        assert_eq!(api_error.to_string(), "Internal server error");
    }

    #[test]
    fn test_validation_message_passes_through() {
        let api_error = ApiError::from(OutreachError::validation("contact_id is required"));
        assert_eq!(api_error.to_string(), "contact_id is required");
    }
}
