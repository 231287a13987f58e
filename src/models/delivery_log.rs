use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Append-only audit record of what was sent to a contact.
/// Maps to the `outreach_delivery_logs` table; rows are never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryLogRecord {
    pub id: Uuid,
    pub contact_id: String,
    pub campaign_id: String,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub sent_at: DateTime<Utc>,
}

impl DeliveryLogRecord {
    pub fn new(
        contact_id: impl Into<String>,
        campaign_id: impl Into<String>,
        subject: Option<String>,
        body: Option<String>,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            contact_id: contact_id.into(),
            campaign_id: campaign_id.into(),
            subject,
            body,
            sent_at,
        }
    }
}
