//! # Event Ingester
//!
//! Reconciles delivery events reported by the external sender into contact
//! status, campaign counters and the delivery log.
//!
//! Webhook delivery is at-least-once. Replays are harmless because the guard
//! only lets each forward transition happen once, and a counter is bumped in
//! the same store write as the transition it belongs to.

use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::transitions::ContactTransitioner;
use super::types::TransitionOutcome;
use crate::database::OutreachStore;
use crate::error::{OutreachError, OutreachResult};
use crate::models::{Contact, DeliveryEvent, DeliveryLogRecord};
use crate::state_machine::DeliveryEventKind;

#[derive(Clone)]
pub struct EventIngester {
    store: Arc<dyn OutreachStore>,
    transitioner: ContactTransitioner,
}

impl EventIngester {
    pub(crate) fn new(store: Arc<dyn OutreachStore>, transitioner: ContactTransitioner) -> Self {
        Self {
            store,
            transitioner,
        }
    }

    pub async fn ingest(&self, event: DeliveryEvent) -> OutreachResult<TransitionOutcome> {
        event.validate()?;

        let Some(kind) = DeliveryEventKind::parse(&event.event_type) else {
            info!(
                event_type = %event.event_type,
                contact_id = %event.contact_id,
                "Ignoring unknown delivery event type"
            );
            return Ok(TransitionOutcome::Ignored {
                event_type: event.event_type,
            });
        };

        let contact = self
            .transitioner
            .resolve_contact(&event.contact_id, event.campaign_id.as_deref())
            .await?;
        check_tracking_id(&contact, &event)?;

        let at = event.timestamp.unwrap_or_else(Utc::now);
        let outcome = self
            .transitioner
            .transition(&contact, kind.target_status(), at, None)
            .await?;

        if kind == DeliveryEventKind::Sent && outcome.is_applied() {
            self.append_delivery_log(&contact, &event, at).await;
        }

        info!(
            event_type = kind.event_type(),
            contact_id = %contact.id,
            campaign_id = %contact.campaign_id,
            outcome = ?outcome,
            "Delivery event ingested"
        );
        Ok(outcome)
    }

    /// Audit what was sent. The status change is already committed, so a
    /// failure here is logged rather than surfaced.
    async fn append_delivery_log(
        &self,
        contact: &Contact,
        event: &DeliveryEvent,
        sent_at: chrono::DateTime<Utc>,
    ) {
        let (subject, body) = (event.subject(), event.body());
        if subject.is_none() && body.is_none() {
            return;
        }

        let record = DeliveryLogRecord::new(
            &contact.id,
            &contact.campaign_id,
            subject.map(str::to_string),
            body.map(str::to_string),
            sent_at,
        );
        if let Err(err) = self.store.append_delivery_log(&record).await {
            error!(
                contact_id = %contact.id,
                campaign_id = %contact.campaign_id,
                error = %err,
                "Failed to append delivery log record"
            );
        }
    }
}

fn check_tracking_id(contact: &Contact, event: &DeliveryEvent) -> OutreachResult<()> {
    let incoming = event
        .tracking_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    match (incoming, contact.tracking_id.as_deref()) {
        (Some(incoming), Some(persisted)) if incoming != persisted => {
            warn!(
                contact_id = %contact.id,
                tracking_id = %incoming,
                "Delivery event tracking_id does not match the contact"
            );
            Err(OutreachError::validation(format!(
                "tracking_id does not match contact {}",
                contact.id
            )))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{CampaignStore, ContactStore, InMemoryOutreachStore};
    use crate::models::{NewCampaign, NewContact};
    use crate::outreach::counter_aggregator::CounterAggregator;
    use crate::state_machine::{CampaignStatus, ContactStatus};
    use serde_json::json;

    async fn setup() -> (Arc<InMemoryOutreachStore>, EventIngester) {
        let store = Arc::new(InMemoryOutreachStore::new());
        store.insert_campaign(NewCampaign::new("c1", "Links", CampaignStatus::Active));
        store.insert_contact(NewContact::new("ct1", "c1", "a@x.io"));
        store.mark_queued("ct1", "trk-1").await.unwrap();

        let transitioner =
            ContactTransitioner::new(store.clone(), CounterAggregator::new());
        let ingester = EventIngester::new(store.clone(), transitioner);
        (store, ingester)
    }

    #[tokio::test]
    async fn test_sent_is_counted_once_and_logged() {
        let (store, ingester) = setup().await;
        let sent = DeliveryEvent::new("email.sent", "ct1")
            .with_campaign("c1")
            .with_metadata(json!({"subject": "Hello", "body": "Loved your post"}));

        assert!(ingester.ingest(sent.clone()).await.unwrap().is_applied());
        assert!(!ingester.ingest(sent).await.unwrap().is_applied());

        let campaign = store.find_campaign("c1").await.unwrap().unwrap();
        assert_eq!(campaign.sent_count, 1);
        let logs = store.delivery_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].subject.as_deref(), Some("Hello"));
    }

    #[tokio::test]
    async fn test_event_timestamp_is_stamped() {
        let (store, ingester) = setup().await;
        let at = chrono::DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        ingester
            .ingest(DeliveryEvent::new("email.sent", "ct1").with_timestamp(at))
            .await
            .unwrap();
        let contact = store.find_contact("ct1").await.unwrap().unwrap();
        assert_eq!(contact.sent_at, Some(at));
    }

    #[tokio::test]
    async fn test_unknown_type_is_ignored_even_for_unknown_contact() {
        let (_store, ingester) = setup().await;
        let outcome = ingester
            .ingest(DeliveryEvent::new("email.complained", "nobody"))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            TransitionOutcome::Ignored {
                event_type: "email.complained".into()
            }
        );
    }

    #[tokio::test]
    async fn test_opened_before_sent_is_skipped() {
        let (store, ingester) = setup().await;
        let outcome = ingester
            .ingest(DeliveryEvent::new("email.opened", "ct1"))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            TransitionOutcome::Skipped {
                current: ContactStatus::Queued,
                incoming: ContactStatus::Opened
            }
        );
        assert_eq!(store.find_campaign("c1").await.unwrap().unwrap().opened_count, 0);
    }

    #[tokio::test]
    async fn test_mismatched_identifiers_are_rejected() {
        let (_store, ingester) = setup().await;
        assert!(matches!(
            ingester
                .ingest(DeliveryEvent::new("email.sent", "ct1").with_tracking_id("other"))
                .await,
            Err(OutreachError::Validation(_))
        ));
        assert!(matches!(
            ingester
                .ingest(DeliveryEvent::new("email.sent", "ct1").with_campaign("c2"))
                .await,
            Err(OutreachError::ContactNotFound(_))
        ));
        assert!(matches!(
            ingester.ingest(DeliveryEvent::new("email.sent", "ghost")).await,
            Err(OutreachError::ContactNotFound(_))
        ));
        assert!(ingester
            .ingest(DeliveryEvent::new("email.sent", "ct1").with_tracking_id("trk-1"))
            .await
            .unwrap()
            .is_applied());
    }

    #[tokio::test]
    async fn test_bounce_is_terminal() {
        let (store, ingester) = setup().await;
        ingester.ingest(DeliveryEvent::new("email.sent", "ct1")).await.unwrap();
        assert!(ingester
            .ingest(DeliveryEvent::new("email.bounced", "ct1"))
            .await
            .unwrap()
            .is_applied());
        assert!(!ingester
            .ingest(DeliveryEvent::new("email.delivered", "ct1"))
            .await
            .unwrap()
            .is_applied());
        let contact = store.find_contact("ct1").await.unwrap().unwrap();
        assert_eq!(contact.status, ContactStatus::Bounced);
    }
}
