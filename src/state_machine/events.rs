use serde::{Deserialize, Serialize};

use super::states::ContactStatus;
use crate::constants::events as names;

/// Delivery events the external sending system reports back.
///
/// Anything outside this vocabulary is tolerated and ignored so the sender can
/// grow new event types without breaking ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryEventKind {
    #[serde(rename = "email.sent")]
    Sent,
    #[serde(rename = "email.delivered")]
    Delivered,
    #[serde(rename = "email.bounced")]
    Bounced,
    #[serde(rename = "email.opened")]
    Opened,
    #[serde(rename = "email.clicked")]
    Clicked,
}

impl DeliveryEventKind {
    /// Parse a wire event type, returning `None` for unknown types
    pub fn parse(event_type: &str) -> Option<Self> {
        match event_type {
            names::EMAIL_SENT => Some(Self::Sent),
            names::EMAIL_DELIVERED => Some(Self::Delivered),
            names::EMAIL_BOUNCED => Some(Self::Bounced),
            names::EMAIL_OPENED => Some(Self::Opened),
            names::EMAIL_CLICKED => Some(Self::Clicked),
            _ => None,
        }
    }

    /// Get the wire name of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Sent => names::EMAIL_SENT,
            Self::Delivered => names::EMAIL_DELIVERED,
            Self::Bounced => names::EMAIL_BOUNCED,
            Self::Opened => names::EMAIL_OPENED,
            Self::Clicked => names::EMAIL_CLICKED,
        }
    }

    /// Contact status this event moves the contact to
    pub fn target_status(&self) -> ContactStatus {
        match self {
            Self::Sent => ContactStatus::Sent,
            Self::Delivered => ContactStatus::Delivered,
            Self::Bounced => ContactStatus::Bounced,
            Self::Opened => ContactStatus::Opened,
            Self::Clicked => ContactStatus::Clicked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_and_unknown() {
        assert_eq!(
            DeliveryEventKind::parse("email.opened"),
            Some(DeliveryEventKind::Opened)
        );
        assert_eq!(DeliveryEventKind::parse("email.complained"), None);
        assert_eq!(DeliveryEventKind::parse("EMAIL.SENT"), None);
    }

    #[test]
    fn test_event_type_matches_wire_name() {
        for kind in [
            DeliveryEventKind::Sent,
            DeliveryEventKind::Delivered,
            DeliveryEventKind::Bounced,
            DeliveryEventKind::Opened,
            DeliveryEventKind::Clicked,
        ] {
            assert_eq!(DeliveryEventKind::parse(kind.event_type()), Some(kind));
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.event_type()));
        }
    }

    #[test]
    fn test_bounce_targets_terminal_state() {
        assert!(DeliveryEventKind::Bounced.target_status().is_terminal());
        assert!(!DeliveryEventKind::Clicked.target_status().is_terminal());
    }
}
