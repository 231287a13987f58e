use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::campaign::CampaignCounter;
use crate::state_machine::ContactStatus;

/// Contact is a single outreach recipient within a campaign.
/// Maps to the `outreach_contacts` table.
///
/// Lifecycle timestamps are set once and never cleared. `tracking_id` is
/// assigned when the contact is queued and correlates inbound events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub campaign_id: String,
    pub email: String,
    pub name: Option<String>,
    pub website: Option<String>,
    pub status: ContactStatus,
    /// Ordering signal for batch selection only
    pub priority_score: Option<f64>,
    pub tracking_id: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub opened_at: Option<DateTime<Utc>>,
    pub clicked_at: Option<DateTime<Utc>>,
    pub replied_at: Option<DateTime<Utc>>,
    pub converted_at: Option<DateTime<Utc>>,
    pub backlink_url: Option<String>,
    pub backlink_anchor: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// New Contact for creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContact {
    pub id: String,
    pub campaign_id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub priority_score: Option<f64>,
}

impl NewContact {
    pub fn new(
        id: impl Into<String>,
        campaign_id: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            campaign_id: campaign_id.into(),
            email: email.into(),
            name: None,
            website: None,
            priority_score: None,
        }
    }

    pub fn with_priority(mut self, priority_score: Option<f64>) -> Self {
        self.priority_score = priority_score;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Contact {
    pub fn from_new(new_contact: NewContact, created_at: DateTime<Utc>) -> Self {
        Self {
            id: new_contact.id,
            campaign_id: new_contact.campaign_id,
            email: new_contact.email,
            name: new_contact.name,
            website: new_contact.website,
            status: ContactStatus::Pending,
            priority_score: new_contact.priority_score,
            tracking_id: None,
            sent_at: None,
            delivered_at: None,
            opened_at: None,
            clicked_at: None,
            replied_at: None,
            converted_at: None,
            backlink_url: None,
            backlink_anchor: None,
            created_at,
        }
    }

    /// Timestamp stamped when the contact reaches `status`, if any
    pub fn timestamp_for(&self, status: ContactStatus) -> Option<DateTime<Utc>> {
        match status {
            ContactStatus::Sent => self.sent_at,
            ContactStatus::Delivered => self.delivered_at,
            ContactStatus::Opened => self.opened_at,
            ContactStatus::Clicked => self.clicked_at,
            ContactStatus::Replied => self.replied_at,
            ContactStatus::Converted => self.converted_at,
            ContactStatus::Pending | ContactStatus::Queued | ContactStatus::Bounced => None,
        }
    }

    pub(crate) fn timestamp_slot(
        &mut self,
        status: ContactStatus,
    ) -> Option<&mut Option<DateTime<Utc>>> {
        match status {
            ContactStatus::Sent => Some(&mut self.sent_at),
            ContactStatus::Delivered => Some(&mut self.delivered_at),
            ContactStatus::Opened => Some(&mut self.opened_at),
            ContactStatus::Clicked => Some(&mut self.clicked_at),
            ContactStatus::Replied => Some(&mut self.replied_at),
            ContactStatus::Converted => Some(&mut self.converted_at),
            ContactStatus::Pending | ContactStatus::Queued | ContactStatus::Bounced => None,
        }
    }
}

/// Column stamped when a contact reaches `status`
pub(crate) fn timestamp_column(status: ContactStatus) -> Option<&'static str> {
    match status {
        ContactStatus::Sent => Some("sent_at"),
        ContactStatus::Delivered => Some("delivered_at"),
        ContactStatus::Opened => Some("opened_at"),
        ContactStatus::Clicked => Some("clicked_at"),
        ContactStatus::Replied => Some("replied_at"),
        ContactStatus::Converted => Some("converted_at"),
        ContactStatus::Pending | ContactStatus::Queued | ContactStatus::Bounced => None,
    }
}

/// Backlink earned by a converted contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backlink {
    pub url: String,
    pub anchor: Option<String>,
}

/// A guarded status change to persist for one contact.
///
/// The store applies it only when the contact's current status is one of
/// `expected_from`; the target's timestamp is stamped with set-once semantics.
/// When `counter` is set, the owning campaign's counter is incremented in the
/// same atomic write, or not at all.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactTransition {
    pub contact_id: String,
    pub to: ContactStatus,
    pub expected_from: Vec<ContactStatus>,
    pub at: DateTime<Utc>,
    pub backlink: Option<Backlink>,
    pub counter: Option<CampaignCounter>,
}

impl ContactTransition {
    pub fn new(
        contact_id: impl Into<String>,
        to: ContactStatus,
        expected_from: &[ContactStatus],
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            contact_id: contact_id.into(),
            to,
            expected_from: expected_from.to_vec(),
            at,
            backlink: None,
            counter: None,
        }
    }

    pub fn with_backlink(mut self, backlink: Backlink) -> Self {
        self.backlink = Some(backlink);
        self
    }

    pub fn with_counter(mut self, counter: Option<CampaignCounter>) -> Self {
        self.counter = counter;
        self
    }
}
