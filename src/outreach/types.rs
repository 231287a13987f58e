use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::Campaign;
use crate::state_machine::ContactStatus;

/// What happened to a contact as a result of one event or report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransitionOutcome {
    /// The contact moved and the matching counter (if any) was incremented
    Applied {
        from: ContactStatus,
        to: ContactStatus,
    },
    /// The guard refused the move; nothing was written
    Skipped {
        current: ContactStatus,
        incoming: ContactStatus,
    },
    /// Unknown event type, accepted without any state change
    Ignored { event_type: String },
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Tracking ID minted for a contact when it was queued
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingAssignment {
    #[serde(rename = "id")]
    pub contact_id: String,
    pub tracking_id: String,
}

/// Result of one dispatch trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub campaign_id: String,
    /// Contacts persisted as `queued`, in batch order
    pub queued: Vec<TrackingAssignment>,
    /// Contacts whose queue transition could not be persisted; still `pending`
    pub failed_contact_ids: Vec<String>,
    /// Whether the batch was accepted by the forward queue
    pub forward_enqueued: bool,
}

impl DispatchOutcome {
    pub fn empty(campaign_id: impl Into<String>) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            queued: Vec::new(),
            failed_contact_ids: Vec::new(),
            forward_enqueued: false,
        }
    }

    pub fn queued_count(&self) -> usize {
        self.queued.len()
    }
}

/// A campaign together with how many of its contacts sit in each status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignOverview {
    pub campaign: Campaign,
    pub status_counts: BTreeMap<String, i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_wire_shape() {
        let outcome = TransitionOutcome::Applied {
            from: ContactStatus::Sent,
            to: ContactStatus::Opened,
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"outcome": "applied", "from": "sent", "to": "opened"})
        );
        assert!(outcome.is_applied());
        assert!(!TransitionOutcome::Ignored {
            event_type: "email.complained".into()
        }
        .is_applied());
    }

    #[test]
    fn test_assignment_uses_contact_id_as_id() {
        let assignment = TrackingAssignment {
            contact_id: "ct1".into(),
            tracking_id: "trk".into(),
        };
        assert_eq!(
            serde_json::to_value(&assignment).unwrap(),
            json!({"id": "ct1", "tracking_id": "trk"})
        );
    }
}
