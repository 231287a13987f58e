use serde::{Deserialize, Serialize};
use std::fmt;

/// Campaign lifecycle states. Only `Active` campaigns are eligible for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    /// Being authored, not yet sending
    Draft,
    /// Eligible for dispatch
    Active,
    /// Temporarily halted by an operator
    Paused,
    /// Finished, never dispatched again
    Completed,
}

impl CampaignStatus {
    /// Check if batches may be dispatched for a campaign in this state
    pub fn is_dispatchable(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("Invalid campaign status: {s}")),
        }
    }
}

impl Default for CampaignStatus {
    fn default() -> Self {
        Self::Draft
    }
}

/// Contact delivery lifecycle states.
///
/// The progression is `pending -> queued -> sent -> delivered -> opened -> clicked`,
/// with `replied` reachable once the message went out and two terminal states,
/// `bounced` and `converted`. Which moves are legal is decided by
/// [`StatusGuard`](super::guards::StatusGuard); this type only knows its own rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    /// Created by campaign authoring, waiting for dispatch
    Pending,
    /// Tracking ID assigned and handed to the sender
    Queued,
    Sent,
    Delivered,
    Bounced,
    Opened,
    Clicked,
    Replied,
    Converted,
}

impl ContactStatus {
    pub const ALL: [ContactStatus; 9] = [
        Self::Pending,
        Self::Queued,
        Self::Sent,
        Self::Delivered,
        Self::Bounced,
        Self::Opened,
        Self::Clicked,
        Self::Replied,
        Self::Converted,
    ];

    /// Check if this is a terminal state (never overwritten by further events)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Bounced | Self::Converted)
    }

    /// Position in the forward progression. Terminal states sit at the top.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Queued => 1,
            Self::Sent => 2,
            Self::Delivered => 3,
            Self::Opened => 4,
            Self::Clicked => 5,
            Self::Replied => 6,
            Self::Bounced | Self::Converted => 7,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Queued => "queued",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Bounced => "bounced",
            Self::Opened => "opened",
            Self::Clicked => "clicked",
            Self::Replied => "replied",
            Self::Converted => "converted",
        }
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContactStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "queued" => Ok(Self::Queued),
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            "bounced" => Ok(Self::Bounced),
            "opened" => Ok(Self::Opened),
            "clicked" => Ok(Self::Clicked),
            "replied" => Ok(Self::Replied),
            "converted" => Ok(Self::Converted),
            _ => Err(format!("Invalid contact status: {s}")),
        }
    }
}

/// Default state for new contacts
impl Default for ContactStatus {
    fn default() -> Self {
        Self::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_terminal_check() {
        assert!(ContactStatus::Bounced.is_terminal());
        assert!(ContactStatus::Converted.is_terminal());
        assert!(!ContactStatus::Replied.is_terminal());
        assert!(!ContactStatus::Pending.is_terminal());
        assert!(!ContactStatus::Clicked.is_terminal());
    }

    #[test]
    fn test_campaign_dispatchable() {
        assert!(CampaignStatus::Active.is_dispatchable());
        assert!(!CampaignStatus::Draft.is_dispatchable());
        assert!(!CampaignStatus::Paused.is_dispatchable());
        assert!(!CampaignStatus::Completed.is_dispatchable());
    }

    #[test]
    fn test_state_string_conversion() {
        for status in ContactStatus::ALL {
            assert_eq!(status.to_string().parse::<ContactStatus>().unwrap(), status);
        }
        assert_eq!("paused".parse::<CampaignStatus>().unwrap(), CampaignStatus::Paused);
        assert!("archived".parse::<CampaignStatus>().is_err());
        assert!("unsubscribed".parse::<ContactStatus>().is_err());
    }

    #[test]
    fn test_state_serde() {
        let json = serde_json::to_string(&ContactStatus::Delivered).unwrap();
        assert_eq!(json, "\"delivered\"");

        let parsed: CampaignStatus = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(parsed, CampaignStatus::Active);
    }
}
