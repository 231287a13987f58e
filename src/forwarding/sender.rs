use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::errors::ForwardError;
use crate::config::ForwardingConfig;
use crate::models::{Campaign, Contact};

/// Contact as handed to the external sender, with the tracking ID it must echo back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchedContact {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub website: Option<String>,
    pub tracking_id: String,
}

impl DispatchedContact {
    pub fn from_contact(contact: &Contact, tracking_id: impl Into<String>) -> Self {
        Self {
            id: contact.id.clone(),
            email: contact.email.clone(),
            name: contact.name.clone(),
            website: contact.website.clone(),
            tracking_id: tracking_id.into(),
        }
    }
}

/// Body POSTed to the sending system for one dispatch batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchPayload {
    pub campaign: Campaign,
    pub contacts: Vec<DispatchedContact>,
    pub dispatched_at: DateTime<Utc>,
}

impl DispatchPayload {
    pub fn new(campaign: Campaign, contacts: Vec<DispatchedContact>) -> Self {
        Self {
            campaign,
            contacts,
            dispatched_at: Utc::now(),
        }
    }

    pub fn contact_ids(&self) -> Vec<String> {
        self.contacts.iter().map(|c| c.id.clone()).collect()
    }
}

/// Delivers one dispatch batch to the external sending system.
#[async_trait]
pub trait BatchSender: Send + Sync {
    async fn send(&self, payload: &DispatchPayload) -> Result<(), ForwardError>;

    /// Short label for logs
    fn name(&self) -> &'static str;
}

/// POSTs batches as JSON to the configured webhook URL.
#[derive(Debug, Clone)]
pub struct HttpBatchSender {
    client: reqwest::Client,
    webhook_url: String,
}

impl HttpBatchSender {
    pub fn new(webhook_url: impl Into<String>, timeout: Duration) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ForwardError::Client(e.to_string()))?;
        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
        })
    }

    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }
}

#[async_trait]
impl BatchSender for HttpBatchSender {
    async fn send(&self, payload: &DispatchPayload) -> Result<(), ForwardError> {
        debug!(
            campaign_id = %payload.campaign.id,
            contacts = payload.contacts.len(),
            url = %self.webhook_url,
            "Forwarding dispatch batch"
        );
        self.client
            .post(&self.webhook_url)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Stand-in when no webhook URL is configured. Every batch fails permanently
/// so it shows up in the failure log instead of vanishing.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredSender;

#[async_trait]
impl BatchSender for UnconfiguredSender {
    async fn send(&self, _payload: &DispatchPayload) -> Result<(), ForwardError> {
        Err(ForwardError::NotConfigured)
    }

    fn name(&self) -> &'static str {
        "unconfigured"
    }
}

/// Pick the sender implied by the forwarding configuration
pub fn sender_from_config(config: &ForwardingConfig) -> Result<Arc<dyn BatchSender>, ForwardError> {
    match config.webhook_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => {
            info!(url = %url, "Forwarding dispatch batches over HTTP");
            Ok(Arc::new(HttpBatchSender::new(url, config.request_timeout())?))
        }
        _ => {
            info!("No forwarding webhook URL configured; dispatch batches will be recorded as failures");
            Ok(Arc::new(UnconfiguredSender))
        }
    }
}
