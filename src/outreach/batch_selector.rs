//! # Batch Selector
//!
//! Read-only selection of the next contacts to dispatch for a campaign.

use std::sync::Arc;
use tracing::debug;

use crate::config::DispatchConfig;
use crate::database::OutreachStore;
use crate::error::{OutreachError, OutreachResult};
use crate::models::{Campaign, Contact};

/// An active campaign and the pending contacts chosen from it
#[derive(Debug, Clone)]
pub struct SelectedBatch {
    pub campaign: Campaign,
    pub contacts: Vec<Contact>,
}

#[derive(Clone)]
pub struct BatchSelector {
    store: Arc<dyn OutreachStore>,
    default_batch_size: usize,
    max_batch_size: usize,
}

impl BatchSelector {
    pub fn new(store: Arc<dyn OutreachStore>, config: &DispatchConfig) -> Self {
        Self {
            store,
            default_batch_size: config.default_batch_size,
            max_batch_size: config.max_batch_size,
        }
    }

    /// Requested size, or the configured default when none was given
    pub fn resolve_batch_size(&self, requested: Option<usize>) -> OutreachResult<usize> {
        match requested {
            None => Ok(self.default_batch_size),
            Some(0) => Err(OutreachError::validation("batch_size must be positive")),
            Some(size) if size > self.max_batch_size => Err(OutreachError::validation(format!(
                "batch_size must not exceed {}",
                self.max_batch_size
            ))),
            Some(size) => Ok(size),
        }
    }

    /// Load a campaign and require it to be dispatchable
    pub async fn active_campaign(&self, campaign_id: &str) -> OutreachResult<Campaign> {
        let campaign = self
            .store
            .find_campaign(campaign_id)
            .await?
            .ok_or_else(|| OutreachError::CampaignNotFound(campaign_id.to_string()))?;

        if !campaign.status.is_dispatchable() {
            return Err(OutreachError::CampaignNotActive {
                campaign_id: campaign.id,
                status: campaign.status.to_string(),
            });
        }
        Ok(campaign)
    }

    /// Up to `batch_size` pending contacts, highest priority first
    pub async fn select(
        &self,
        campaign_id: &str,
        batch_size: Option<usize>,
    ) -> OutreachResult<SelectedBatch> {
        if campaign_id.trim().is_empty() {
            return Err(OutreachError::validation("campaign_id is required"));
        }
        let limit = self.resolve_batch_size(batch_size)?;
        let campaign = self.active_campaign(campaign_id).await?;
        let contacts = self.store.pending_contacts(&campaign.id, limit).await?;

        debug!(
            campaign_id = %campaign.id,
            limit,
            selected = contacts.len(),
            "Selected dispatch batch"
        );
        Ok(SelectedBatch { campaign, contacts })
    }
}
