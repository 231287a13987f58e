//! Error types for the outreach dispatch core.

use thiserror::Error;

use crate::database::StoreError;
use crate::forwarding::ForwardError;

#[derive(Debug, Error)]
pub enum OutreachError {
    /// Missing or malformed required input.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Campaign not found: {0}")]
    CampaignNotFound(String),

    #[error("Contact not found: {0}")]
    ContactNotFound(String),

    /// The campaign exists but is not eligible for dispatch.
    #[error("Campaign {campaign_id} is not active (status: {status})")]
    CampaignNotActive { campaign_id: String, status: String },

    /// Failure handing a batch to the external sender. Never fatal to the triggering request.
    #[error("Upstream forward error: {0}")]
    UpstreamForward(#[from] ForwardError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl OutreachError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Errors the caller caused, as opposed to failures inside the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::CampaignNotFound(_)
                | Self::ContactNotFound(_)
                | Self::CampaignNotActive { .. }
        )
    }
}

impl From<::config::ConfigError> for OutreachError {
    fn from(err: ::config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

pub type OutreachResult<T> = std::result::Result<T, OutreachError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(OutreachError::validation("contact_id is required").is_client_error());
        assert!(OutreachError::CampaignNotFound("c1".into()).is_client_error());
        assert!(OutreachError::CampaignNotActive {
            campaign_id: "c1".into(),
            status: "paused".into(),
        }
        .is_client_error());
        assert!(!OutreachError::Persistence(StoreError::Injected("boom".into())).is_client_error());
        assert!(!OutreachError::Configuration("bad".into()).is_client_error());
    }

    #[test]
    fn test_not_active_message() {
        let err = OutreachError::CampaignNotActive {
            campaign_id: "c1".into(),
            status: "draft".into(),
        };
        assert_eq!(err.to_string(), "Campaign c1 is not active (status: draft)");
    }
}
