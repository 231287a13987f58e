use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{OutreachError, OutreachResult};

/// Delivery notification reported by the external sending system.
///
/// `event_type` and `contact_id` default to empty so that a body missing them
/// still deserializes and is rejected by [`DeliveryEvent::validate`] with a
/// validation error rather than a decoding error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryEvent {
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub contact_id: String,
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub tracking_id: Option<String>,
    /// When the sender observed the event; ingestion falls back to receipt time
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl DeliveryEvent {
    pub fn new(event_type: impl Into<String>, contact_id: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            contact_id: contact_id.into(),
            campaign_id: None,
            tracking_id: None,
            timestamp: None,
            metadata: None,
        }
    }

    pub fn with_campaign(mut self, campaign_id: impl Into<String>) -> Self {
        self.campaign_id = Some(campaign_id.into());
        self
    }

    pub fn with_tracking_id(mut self, tracking_id: impl Into<String>) -> Self {
        self.tracking_id = Some(tracking_id.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Require the fields every event must carry
    pub fn validate(&self) -> OutreachResult<()> {
        if self.event_type.trim().is_empty() {
            return Err(OutreachError::validation("type is required"));
        }
        if self.contact_id.trim().is_empty() {
            return Err(OutreachError::validation("contact_id is required"));
        }
        Ok(())
    }

    /// `metadata.subject`, when present as a string
    pub fn subject(&self) -> Option<&str> {
        self.metadata_str("subject")
    }

    /// `metadata.body`, when present as a string
    pub fn body(&self) -> Option<&str> {
        self.metadata_str("body")
    }

    fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.as_ref()?.get(key)?.as_str()
    }
}

/// Reply or conversion reported manually or semi-automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyReport {
    #[serde(default)]
    pub contact_id: String,
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub backlink_url: Option<String>,
    #[serde(default)]
    pub backlink_anchor: Option<String>,
}

impl ReplyReport {
    pub fn reply(contact_id: impl Into<String>) -> Self {
        Self {
            contact_id: contact_id.into(),
            campaign_id: None,
            backlink_url: None,
            backlink_anchor: None,
        }
    }

    pub fn conversion(
        contact_id: impl Into<String>,
        backlink_url: impl Into<String>,
        backlink_anchor: Option<String>,
    ) -> Self {
        Self {
            contact_id: contact_id.into(),
            campaign_id: None,
            backlink_url: Some(backlink_url.into()),
            backlink_anchor,
        }
    }

    pub fn with_campaign(mut self, campaign_id: impl Into<String>) -> Self {
        self.campaign_id = Some(campaign_id.into());
        self
    }

    pub fn validate(&self) -> OutreachResult<()> {
        if self.contact_id.trim().is_empty() {
            return Err(OutreachError::validation("contact_id is required"));
        }
        Ok(())
    }

    /// A report carrying a non-blank backlink URL is a conversion
    pub fn backlink_url(&self) -> Option<&str> {
        self.backlink_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
