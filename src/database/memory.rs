//! # In-Memory Store
//!
//! Substitutable fake for the relational store. Conditional updates hold the
//! per-entry `DashMap` lock for the whole compare-and-set, which gives the same
//! "losing writer updates zero rows" behavior as the Postgres adapter. A
//! counted transition also holds the campaign entry, so status and counter
//! change together. Contact entries are always locked before campaign entries.
//!
//! Writes for selected contacts, counter updates for selected campaigns and
//! health checks can be made to fail, to exercise the failure paths.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use super::store::{
    CampaignStore, ContactStore, DeliveryLogStore, OutreachStore, StoreError, StoreResult,
};
use crate::models::{
    Campaign, Contact, ContactTransition, DeliveryLogRecord, NewCampaign, NewContact,
};
use crate::state_machine::{CampaignStatus, ContactStatus};

#[derive(Debug, Clone)]
struct StoredContact {
    seq: u64,
    contact: Contact,
}

#[derive(Debug, Default)]
pub struct InMemoryOutreachStore {
    campaigns: DashMap<String, Campaign>,
    contacts: DashMap<String, StoredContact>,
    delivery_logs: Mutex<Vec<DeliveryLogRecord>>,
    failing_contacts: DashSet<String>,
    failing_counters: DashSet<String>,
    unhealthy: AtomicBool,
    next_seq: AtomicU64,
}

impl InMemoryOutreachStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_campaign(&self, new_campaign: NewCampaign) -> Campaign {
        let campaign = Campaign::from_new(new_campaign, Utc::now());
        self.campaigns.insert(campaign.id.clone(), campaign.clone());
        campaign
    }

    pub fn insert_contact(&self, new_contact: NewContact) -> Contact {
        let contact = Contact::from_new(new_contact, Utc::now());
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.contacts.insert(
            contact.id.clone(),
            StoredContact {
                seq,
                contact: contact.clone(),
            },
        );
        contact
    }

    /// Stands in for the authoring flow, which owns campaign status
    pub fn set_campaign_status(&self, campaign_id: &str, status: CampaignStatus) -> bool {
        match self.campaigns.get_mut(campaign_id) {
            Some(mut campaign) => {
                campaign.status = status;
                true
            }
            None => false,
        }
    }

    pub fn archive_campaign(&self, campaign_id: &str) -> bool {
        match self.campaigns.get_mut(campaign_id) {
            Some(mut campaign) => {
                campaign.archived = true;
                true
            }
            None => false,
        }
    }

    /// Make every subsequent status write for `contact_id` fail
    pub fn fail_writes_for(&self, contact_id: impl Into<String>) {
        self.failing_contacts.insert(contact_id.into());
    }

    /// Make every counted transition for contacts of `campaign_id` fail
    pub fn fail_counters_for(&self, campaign_id: impl Into<String>) {
        self.failing_counters.insert(campaign_id.into());
    }

    pub fn set_unhealthy(&self, unhealthy: bool) {
        self.unhealthy.store(unhealthy, Ordering::SeqCst);
    }

    pub fn clear_failures(&self) {
        self.failing_contacts.clear();
        self.failing_counters.clear();
        self.set_unhealthy(false);
    }

    pub fn delivery_logs(&self) -> Vec<DeliveryLogRecord> {
        self.delivery_logs.lock().clone()
    }

    fn check_injected_failure(&self, contact_id: &str) -> StoreResult<()> {
        if self.failing_contacts.contains(contact_id) {
            return Err(StoreError::Injected(format!(
                "write rejected for contact {contact_id}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CampaignStore for InMemoryOutreachStore {
    async fn find_campaign(&self, campaign_id: &str) -> StoreResult<Option<Campaign>> {
        Ok(self.campaigns.get(campaign_id).map(|c| c.value().clone()))
    }

    async fn list_campaigns(&self, include_archived: bool) -> StoreResult<Vec<Campaign>> {
        let mut campaigns: Vec<Campaign> = self
            .campaigns
            .iter()
            .filter(|c| include_archived || !c.archived)
            .map(|c| c.value().clone())
            .collect();
        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(campaigns)
    }
}

#[async_trait]
impl ContactStore for InMemoryOutreachStore {
    async fn find_contact(&self, contact_id: &str) -> StoreResult<Option<Contact>> {
        Ok(self.contacts.get(contact_id).map(|s| s.contact.clone()))
    }

    async fn pending_contacts(&self, campaign_id: &str, limit: usize) -> StoreResult<Vec<Contact>> {
        let mut pending: Vec<StoredContact> = self
            .contacts
            .iter()
            .filter(|s| {
                s.contact.campaign_id == campaign_id && s.contact.status == ContactStatus::Pending
            })
            .map(|s| s.value().clone())
            .collect();

        pending.sort_by(|a, b| {
            let by_priority = match (a.contact.priority_score, b.contact.priority_score) {
                (Some(x), Some(y)) => y.total_cmp(&x),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            };
            by_priority.then(a.seq.cmp(&b.seq))
        });

        Ok(pending
            .into_iter()
            .take(limit)
            .map(|s| s.contact)
            .collect())
    }

    async fn mark_queued(&self, contact_id: &str, tracking_id: &str) -> StoreResult<bool> {
        self.check_injected_failure(contact_id)?;
        let Some(mut stored) = self.contacts.get_mut(contact_id) else {
            return Ok(false);
        };
        if stored.contact.status != ContactStatus::Pending {
            return Ok(false);
        }
        stored.contact.status = ContactStatus::Queued;
        stored.contact.tracking_id = Some(tracking_id.to_string());
        Ok(true)
    }

    async fn apply_transition(&self, transition: &ContactTransition) -> StoreResult<bool> {
        self.check_injected_failure(&transition.contact_id)?;
        let Some(mut stored) = self.contacts.get_mut(&transition.contact_id) else {
            return Ok(false);
        };
        if !transition.expected_from.contains(&stored.contact.status) {
            return Ok(false);
        }

        // Everything that can fail happens before the contact is touched
        let mut campaign = match transition.counter {
            Some(_) => {
                let campaign_id = &stored.contact.campaign_id;
                if self.failing_counters.contains(campaign_id) {
                    return Err(StoreError::Injected(format!(
                        "counter rejected for campaign {campaign_id}"
                    )));
                }
                let campaign =
                    self.campaigns
                        .get_mut(campaign_id)
                        .ok_or_else(|| StoreError::MissingRow {
                            entity: "campaign",
                            id: campaign_id.clone(),
                        })?;
                Some(campaign)
            }
            None => None,
        };

        let contact = &mut stored.contact;
        contact.status = transition.to;
        if let Some(slot) = contact.timestamp_slot(transition.to) {
            slot.get_or_insert(transition.at);
        }
        if let Some(backlink) = &transition.backlink {
            contact.backlink_url = Some(backlink.url.clone());
            if backlink.anchor.is_some() {
                contact.backlink_anchor = backlink.anchor.clone();
            }
        }
        if let (Some(campaign), Some(counter)) = (campaign.as_mut(), transition.counter) {
            *campaign.counter_mut(counter) += 1;
        }
        Ok(true)
    }

    async fn status_breakdown(
        &self,
        campaign_id: &str,
    ) -> StoreResult<HashMap<ContactStatus, i64>> {
        let mut counts = HashMap::new();
        for stored in self.contacts.iter() {
            if stored.contact.campaign_id == campaign_id {
                *counts.entry(stored.contact.status).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl DeliveryLogStore for InMemoryOutreachStore {
    async fn append_delivery_log(&self, record: &DeliveryLogRecord) -> StoreResult<()> {
        self.delivery_logs.lock().push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl OutreachStore for InMemoryOutreachStore {
    async fn health_check(&self) -> StoreResult<()> {
        if self.unhealthy.load(Ordering::SeqCst) {
            return Err(StoreError::Injected("store marked unhealthy".to_string()));
        }
        Ok(())
    }
}
