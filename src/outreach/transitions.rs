//! Shared write path for event ingestion and reply reporting.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use super::counter_aggregator::CounterAggregator;
use super::types::TransitionOutcome;
use crate::database::OutreachStore;
use crate::error::{OutreachError, OutreachResult};
use crate::models::{Backlink, Contact, ContactTransition};
use crate::state_machine::{ContactStatus, StatusGuard};

#[derive(Clone)]
pub(crate) struct ContactTransitioner {
    store: Arc<dyn OutreachStore>,
    counters: CounterAggregator,
}

impl ContactTransitioner {
    pub(crate) fn new(store: Arc<dyn OutreachStore>, counters: CounterAggregator) -> Self {
        Self { store, counters }
    }

    /// Load a contact, checking it belongs to `campaign_id` when one is given
    pub(crate) async fn resolve_contact(
        &self,
        contact_id: &str,
        campaign_id: Option<&str>,
    ) -> OutreachResult<Contact> {
        let contact = self
            .store
            .find_contact(contact_id)
            .await?
            .ok_or_else(|| OutreachError::ContactNotFound(contact_id.to_string()))?;

        match campaign_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(campaign_id) if campaign_id != contact.campaign_id => {
                Err(OutreachError::ContactNotFound(format!(
                    "{contact_id} in campaign {campaign_id}"
                )))
            }
            _ => Ok(contact),
        }
    }

    /// Apply a guarded transition; the store bumps the matching counter in the
    /// same write
    pub(crate) async fn transition(
        &self,
        contact: &Contact,
        to: ContactStatus,
        at: DateTime<Utc>,
        backlink: Option<Backlink>,
    ) -> OutreachResult<TransitionOutcome> {
        let from = contact.status;
        if let Err(reason) = StatusGuard::check(from, to) {
            debug!(
                contact_id = %contact.id,
                from = %from,
                to = %to,
                reason = %reason,
                "Transition refused by guard"
            );
            return Ok(TransitionOutcome::Skipped {
                current: from,
                incoming: to,
            });
        }

        let mut transition = self.counters.counted(ContactTransition::new(
            &contact.id,
            to,
            StatusGuard::allowed_predecessors(to),
            at,
        ));
        if let Some(backlink) = backlink {
            transition = transition.with_backlink(backlink);
        }

        if !self.store.apply_transition(&transition).await? {
            // A concurrent writer moved the contact first
            let current = self
                .store
                .find_contact(&contact.id)
                .await?
                .map_or(from, |c| c.status);
            debug!(
                contact_id = %contact.id,
                current = %current,
                to = %to,
                "Transition lost to a concurrent update"
            );
            return Ok(TransitionOutcome::Skipped {
                current,
                incoming: to,
            });
        }

        info!(
            contact_id = %contact.id,
            campaign_id = %contact.campaign_id,
            from = %from,
            to = %to,
            counter = transition.counter.map(|c| c.column()),
            "Contact status updated"
        );
        Ok(TransitionOutcome::Applied { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{CampaignStore, ContactStore, InMemoryOutreachStore};
    use crate::models::{NewCampaign, NewContact};
    use crate::state_machine::CampaignStatus;

    async fn setup() -> (Arc<InMemoryOutreachStore>, ContactTransitioner) {
        let store = Arc::new(InMemoryOutreachStore::new());
        store.insert_campaign(NewCampaign::new("c1", "Links", CampaignStatus::Active));
        store.insert_contact(NewContact::new("ct1", "c1", "a@x.io"));
        store.mark_queued("ct1", "trk-1").await.unwrap();
        let transitioner = ContactTransitioner::new(store.clone(), CounterAggregator::new());
        (store, transitioner)
    }

    #[tokio::test]
    async fn test_stale_contact_loses_to_earlier_write() {
        let (store, transitioner) = setup().await;
        let stale = store.find_contact("ct1").await.unwrap().unwrap();

        let fresh = store.find_contact("ct1").await.unwrap().unwrap();
        transitioner
            .transition(&fresh, ContactStatus::Sent, Utc::now(), None)
            .await
            .unwrap();
        transitioner
            .transition(
                &store.find_contact("ct1").await.unwrap().unwrap(),
                ContactStatus::Delivered,
                Utc::now(),
                None,
            )
            .await
            .unwrap();

        // The stale snapshot still says queued, so the guard lets `sent` through
        // and only the conditional write can refuse it
        assert_eq!(stale.status, ContactStatus::Queued);
        let outcome = transitioner
            .transition(&stale, ContactStatus::Sent, Utc::now(), None)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            TransitionOutcome::Skipped {
                current: ContactStatus::Delivered,
                incoming: ContactStatus::Sent
            }
        );

        let campaign = store.find_campaign("c1").await.unwrap().unwrap();
        assert_eq!(campaign.sent_count, 1);
    }

    #[tokio::test]
    async fn test_failed_counter_is_recounted_on_replay() {
        let (store, transitioner) = setup().await;
        store.fail_counters_for("c1");

        let contact = store.find_contact("ct1").await.unwrap().unwrap();
        let result = transitioner
            .transition(&contact, ContactStatus::Sent, Utc::now(), None)
            .await;
        assert!(matches!(result, Err(OutreachError::Persistence(_))));

        // The sender retries the webhook once the store recovers
        store.clear_failures();
        let contact = store.find_contact("ct1").await.unwrap().unwrap();
        assert_eq!(contact.status, ContactStatus::Queued);
        let outcome = transitioner
            .transition(&contact, ContactStatus::Sent, Utc::now(), None)
            .await
            .unwrap();
        assert!(outcome.is_applied());

        let campaign = store.find_campaign("c1").await.unwrap().unwrap();
        assert_eq!(campaign.sent_count, 1);
        let contact = store.find_contact("ct1").await.unwrap().unwrap();
        assert_eq!(contact.status, ContactStatus::Sent);
    }
}
