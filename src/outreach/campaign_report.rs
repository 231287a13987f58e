use std::collections::BTreeMap;
use std::sync::Arc;

use super::types::CampaignOverview;
use crate::database::OutreachStore;
use crate::error::{OutreachError, OutreachResult};
use crate::models::Campaign;
use crate::state_machine::ContactStatus;

/// Read-side views of campaigns for operators.
#[derive(Clone)]
pub struct CampaignReporter {
    store: Arc<dyn OutreachStore>,
}

impl CampaignReporter {
    pub fn new(store: Arc<dyn OutreachStore>) -> Self {
        Self { store }
    }

    /// Campaign with a count for every contact status, zeros included
    pub async fn overview(&self, campaign_id: &str) -> OutreachResult<CampaignOverview> {
        let campaign = self
            .store
            .find_campaign(campaign_id)
            .await?
            .ok_or_else(|| OutreachError::CampaignNotFound(campaign_id.to_string()))?;

        let breakdown = self.store.status_breakdown(&campaign.id).await?;
        let status_counts: BTreeMap<String, i64> = ContactStatus::ALL
            .iter()
            .map(|status| {
                let count = breakdown.get(status).copied().unwrap_or(0);
                (status.as_str().to_string(), count)
            })
            .collect();

        Ok(CampaignOverview {
            campaign,
            status_counts,
        })
    }

    /// Every campaign that has not been archived, newest first
    pub async fn list_campaigns(&self) -> OutreachResult<Vec<Campaign>> {
        Ok(self.store.list_campaigns(false).await?)
    }
}
