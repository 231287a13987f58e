use chrono::Utc;
use tracing::info;

use super::transitions::ContactTransitioner;
use super::types::TransitionOutcome;
use crate::error::OutreachResult;
use crate::models::{Backlink, ReplyReport};
use crate::state_machine::ContactStatus;

/// Records replies and conversions reported by an operator or a reply parser.
///
/// A report with a backlink URL converts the contact directly, without
/// passing through (or counting) `replied`.
#[derive(Clone)]
pub struct ReplyHandler {
    transitioner: ContactTransitioner,
}

impl ReplyHandler {
    pub(crate) fn new(transitioner: ContactTransitioner) -> Self {
        Self { transitioner }
    }

    pub async fn report_reply(&self, report: ReplyReport) -> OutreachResult<TransitionOutcome> {
        report.validate()?;

        let contact = self
            .transitioner
            .resolve_contact(&report.contact_id, report.campaign_id.as_deref())
            .await?;

        let (target, backlink) = match report.backlink_url() {
            Some(url) => (
                ContactStatus::Converted,
                Some(Backlink {
                    url: url.to_string(),
                    anchor: report
                        .backlink_anchor
                        .as_deref()
                        .map(str::trim)
                        .filter(|anchor| !anchor.is_empty())
                        .map(str::to_string),
                }),
            ),
            None => (ContactStatus::Replied, None),
        };

        let outcome = self
            .transitioner
            .transition(&contact, target, Utc::now(), backlink)
            .await?;

        info!(
            contact_id = %contact.id,
            campaign_id = %contact.campaign_id,
            target = %target,
            outcome = ?outcome,
            "Reply reported"
        );
        Ok(outcome)
    }
}
