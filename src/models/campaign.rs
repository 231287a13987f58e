use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state_machine::CampaignStatus;

/// Campaign represents one outreach effort and its aggregate delivery counters.
/// Maps to the `outreach_campaigns` table.
///
/// Counters only ever grow; they are changed exclusively through
/// store-side atomic increments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub status: CampaignStatus,
    /// Archived campaigns are hidden from listings but keep their data
    pub archived: bool,
    /// Subject template handed to the sender untouched
    pub subject_template: Option<String>,
    /// Body template handed to the sender untouched
    pub body_template: Option<String>,
    pub sent_count: i64,
    pub opened_count: i64,
    pub clicked_count: i64,
    pub replied_count: i64,
    pub converted_count: i64,
    pub created_at: DateTime<Utc>,
}

/// New Campaign for creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCampaign {
    pub id: String,
    pub name: String,
    pub status: CampaignStatus,
    #[serde(default)]
    pub subject_template: Option<String>,
    #[serde(default)]
    pub body_template: Option<String>,
}

impl NewCampaign {
    pub fn new(id: impl Into<String>, name: impl Into<String>, status: CampaignStatus) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status,
            subject_template: None,
            body_template: None,
        }
    }

    pub fn with_templates(mut self, subject: impl Into<String>, body: impl Into<String>) -> Self {
        self.subject_template = Some(subject.into());
        self.body_template = Some(body.into());
        self
    }
}

/// Campaign-level counters owned by the dispatch core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignCounter {
    Sent,
    Opened,
    Clicked,
    Replied,
    Converted,
}

impl CampaignCounter {
    /// Column backing this counter in `outreach_campaigns`
    pub fn column(&self) -> &'static str {
        match self {
            Self::Sent => "sent_count",
            Self::Opened => "opened_count",
            Self::Clicked => "clicked_count",
            Self::Replied => "replied_count",
            Self::Converted => "converted_count",
        }
    }
}

impl Campaign {
    pub fn from_new(new_campaign: NewCampaign, created_at: DateTime<Utc>) -> Self {
        Self {
            id: new_campaign.id,
            name: new_campaign.name,
            status: new_campaign.status,
            archived: false,
            subject_template: new_campaign.subject_template,
            body_template: new_campaign.body_template,
            sent_count: 0,
            opened_count: 0,
            clicked_count: 0,
            replied_count: 0,
            converted_count: 0,
            created_at,
        }
    }

    pub fn counter(&self, counter: CampaignCounter) -> i64 {
        match counter {
            CampaignCounter::Sent => self.sent_count,
            CampaignCounter::Opened => self.opened_count,
            CampaignCounter::Clicked => self.clicked_count,
            CampaignCounter::Replied => self.replied_count,
            CampaignCounter::Converted => self.converted_count,
        }
    }

    pub(crate) fn counter_mut(&mut self, counter: CampaignCounter) -> &mut i64 {
        match counter {
            CampaignCounter::Sent => &mut self.sent_count,
            CampaignCounter::Opened => &mut self.opened_count,
            CampaignCounter::Clicked => &mut self.clicked_count,
            CampaignCounter::Replied => &mut self.replied_count,
            CampaignCounter::Converted => &mut self.converted_count,
        }
    }
}
