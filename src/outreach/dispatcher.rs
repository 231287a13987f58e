//! # Dispatcher
//!
//! Turns a trigger request into queued contacts and a forwarded batch.
//!
//! Each selected contact is moved `pending -> queued` with a fresh tracking ID
//! in its own conditional write. One contact failing does not affect its
//! siblings; only contacts whose write succeeded are reported and forwarded.
//! Forwarding goes through the [`ForwardQueue`] and never fails the trigger.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::batch_selector::BatchSelector;
use super::types::{DispatchOutcome, TrackingAssignment};
use crate::database::OutreachStore;
use crate::error::OutreachResult;
use crate::forwarding::{DispatchPayload, DispatchedContact, ForwardQueue};

#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn OutreachStore>,
    selector: BatchSelector,
    queue: ForwardQueue,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn OutreachStore>, selector: BatchSelector, queue: ForwardQueue) -> Self {
        Self {
            store,
            selector,
            queue,
        }
    }

    pub async fn trigger(
        &self,
        campaign_id: &str,
        batch_size: Option<usize>,
    ) -> OutreachResult<DispatchOutcome> {
        let batch = self.selector.select(campaign_id, batch_size).await?;
        let mut outcome = DispatchOutcome::empty(&batch.campaign.id);

        if batch.contacts.is_empty() {
            info!(campaign_id = %batch.campaign.id, "No pending contacts to dispatch");
            return Ok(outcome);
        }

        let attempts = batch.contacts.iter().map(|contact| async move {
            let tracking_id = Uuid::new_v4().to_string();
            let result = self.store.mark_queued(&contact.id, &tracking_id).await;
            (contact, tracking_id, result)
        });

        let mut dispatched = Vec::with_capacity(batch.contacts.len());
        for (contact, tracking_id, result) in join_all(attempts).await {
            match result {
                Ok(true) => {
                    debug!(
                        contact_id = %contact.id,
                        tracking_id = %tracking_id,
                        "Contact queued"
                    );
                    dispatched.push(DispatchedContact::from_contact(contact, &tracking_id));
                    outcome.queued.push(TrackingAssignment {
                        contact_id: contact.id.clone(),
                        tracking_id,
                    });
                }
                Ok(false) => {
                    debug!(
                        contact_id = %contact.id,
                        "Contact left pending before it could be queued"
                    );
                }
                Err(err) => {
                    error!(
                        campaign_id = %batch.campaign.id,
                        contact_id = %contact.id,
                        error = %err,
                        "Failed to queue contact"
                    );
                    outcome.failed_contact_ids.push(contact.id.clone());
                }
            }
        }

        if !dispatched.is_empty() {
            let payload = DispatchPayload::new(batch.campaign.clone(), dispatched);
            match self.queue.enqueue(payload) {
                Ok(()) => outcome.forward_enqueued = true,
                Err(err) => warn!(
                    campaign_id = %batch.campaign.id,
                    error = %err,
                    "Queued contacts were not handed to the forwarder"
                ),
            }
        }

        info!(
            campaign_id = %batch.campaign.id,
            queued = outcome.queued_count(),
            failed = outcome.failed_contact_ids.len(),
            forward_enqueued = outcome.forward_enqueued,
            "Dispatch triggered"
        );
        Ok(outcome)
    }
}
