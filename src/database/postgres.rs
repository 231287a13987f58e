//! # Postgres Store
//!
//! SQLx-backed implementation of the store traits. Statuses are stored as
//! text. A guarded transition is an `UPDATE ... WHERE status = ANY($n)` and its
//! counter a `col = col + 1` update, both in one transaction, so no
//! read-modify-write happens in process and a count is never lost.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use tracing::debug;

use super::store::{
    CampaignStore, ContactStore, DeliveryLogStore, OutreachStore, StoreError, StoreResult,
};
use crate::models::contact::timestamp_column;
use crate::models::{
    Campaign, Contact, ContactTransition, DeliveryLogRecord, NewCampaign, NewContact,
};
use crate::state_machine::{CampaignStatus, ContactStatus};

const CAMPAIGN_COLUMNS: &str = "id, name, status, archived, subject_template, body_template, \
     sent_count, opened_count, clicked_count, replied_count, converted_count, created_at";

const CONTACT_COLUMNS: &str = "id, campaign_id, email, name, website, status, priority_score, \
     tracking_id, sent_at, delivered_at, opened_at, clicked_at, replied_at, converted_at, \
     backlink_url, backlink_anchor, created_at";

#[derive(Debug, FromRow)]
struct CampaignRow {
    id: String,
    name: String,
    status: String,
    archived: bool,
    subject_template: Option<String>,
    body_template: Option<String>,
    sent_count: i64,
    opened_count: i64,
    clicked_count: i64,
    replied_count: i64,
    converted_count: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<CampaignRow> for Campaign {
    type Error = StoreError;

    fn try_from(row: CampaignRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<CampaignStatus>()
            .map_err(|reason| StoreError::CorruptRow {
                table: "outreach_campaigns",
                id: row.id.clone(),
                reason,
            })?;
        Ok(Campaign {
            id: row.id,
            name: row.name,
            status,
            archived: row.archived,
            subject_template: row.subject_template,
            body_template: row.body_template,
            sent_count: row.sent_count,
            opened_count: row.opened_count,
            clicked_count: row.clicked_count,
            replied_count: row.replied_count,
            converted_count: row.converted_count,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ContactRow {
    id: String,
    campaign_id: String,
    email: String,
    name: Option<String>,
    website: Option<String>,
    status: String,
    priority_score: Option<f64>,
    tracking_id: Option<String>,
    sent_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    opened_at: Option<DateTime<Utc>>,
    clicked_at: Option<DateTime<Utc>>,
    replied_at: Option<DateTime<Utc>>,
    converted_at: Option<DateTime<Utc>>,
    backlink_url: Option<String>,
    backlink_anchor: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ContactRow> for Contact {
    type Error = StoreError;

    fn try_from(row: ContactRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<ContactStatus>()
            .map_err(|reason| StoreError::CorruptRow {
                table: "outreach_contacts",
                id: row.id.clone(),
                reason,
            })?;
        Ok(Contact {
            id: row.id,
            campaign_id: row.campaign_id,
            email: row.email,
            name: row.name,
            website: row.website,
            status,
            priority_score: row.priority_score,
            tracking_id: row.tracking_id,
            sent_at: row.sent_at,
            delivered_at: row.delivered_at,
            opened_at: row.opened_at,
            clicked_at: row.clicked_at,
            replied_at: row.replied_at,
            converted_at: row.converted_at,
            backlink_url: row.backlink_url,
            backlink_anchor: row.backlink_anchor,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct StatusCountRow {
    status: String,
    count: i64,
}

/// Store handle over a shared connection pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PgOutreachStore {
    pool: PgPool,
}

impl PgOutreachStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert a campaign; used by seeding and tests, authoring lives elsewhere
    pub async fn create_campaign(&self, new_campaign: &NewCampaign) -> StoreResult<Campaign> {
        let sql = format!(
            "INSERT INTO outreach_campaigns (id, name, status, subject_template, body_template) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {CAMPAIGN_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CampaignRow>(&sql)
            .bind(&new_campaign.id)
            .bind(&new_campaign.name)
            .bind(new_campaign.status.as_str())
            .bind(&new_campaign.subject_template)
            .bind(&new_campaign.body_template)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    /// Insert a pending contact; used by seeding and tests
    pub async fn create_contact(&self, new_contact: &NewContact) -> StoreResult<Contact> {
        let sql = format!(
            "INSERT INTO outreach_contacts (id, campaign_id, email, name, website, priority_score) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {CONTACT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ContactRow>(&sql)
            .bind(&new_contact.id)
            .bind(&new_contact.campaign_id)
            .bind(&new_contact.email)
            .bind(&new_contact.name)
            .bind(&new_contact.website)
            .bind(new_contact.priority_score)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    pub async fn set_campaign_status(
        &self,
        campaign_id: &str,
        status: CampaignStatus,
    ) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE outreach_campaigns SET status = $2 WHERE id = $1")
            .bind(campaign_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl CampaignStore for PgOutreachStore {
    async fn find_campaign(&self, campaign_id: &str) -> StoreResult<Option<Campaign>> {
        let sql = format!("SELECT {CAMPAIGN_COLUMNS} FROM outreach_campaigns WHERE id = $1");
        sqlx::query_as::<_, CampaignRow>(&sql)
            .bind(campaign_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Campaign::try_from)
            .transpose()
    }

    async fn list_campaigns(&self, include_archived: bool) -> StoreResult<Vec<Campaign>> {
        let sql = format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM outreach_campaigns \
             WHERE $1 OR NOT archived ORDER BY created_at DESC, id ASC"
        );
        sqlx::query_as::<_, CampaignRow>(&sql)
            .bind(include_archived)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Campaign::try_from)
            .collect()
    }
}

#[async_trait]
impl ContactStore for PgOutreachStore {
    async fn find_contact(&self, contact_id: &str) -> StoreResult<Option<Contact>> {
        let sql = format!("SELECT {CONTACT_COLUMNS} FROM outreach_contacts WHERE id = $1");
        sqlx::query_as::<_, ContactRow>(&sql)
            .bind(contact_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Contact::try_from)
            .transpose()
    }

    async fn pending_contacts(&self, campaign_id: &str, limit: usize) -> StoreResult<Vec<Contact>> {
        let sql = format!(
            "SELECT {CONTACT_COLUMNS} FROM outreach_contacts \
             WHERE campaign_id = $1 AND status = 'pending' \
             ORDER BY priority_score DESC NULLS LAST, seq ASC \
             LIMIT $2"
        );
        sqlx::query_as::<_, ContactRow>(&sql)
            .bind(campaign_id)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Contact::try_from)
            .collect()
    }

    async fn mark_queued(&self, contact_id: &str, tracking_id: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE outreach_contacts \
             SET status = 'queued', tracking_id = $2, updated_at = NOW() \
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(contact_id)
        .bind(tracking_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn apply_transition(&self, transition: &ContactTransition) -> StoreResult<bool> {
        let expected: Vec<String> = transition
            .expected_from
            .iter()
            .map(|status| status.as_str().to_string())
            .collect();
        let stamp = timestamp_column(transition.to)
            .map(|column| format!(", {column} = COALESCE({column}, $3)"))
            .unwrap_or_default();
        let sql = format!(
            "UPDATE outreach_contacts \
             SET status = $2, updated_at = NOW(){stamp}, \
                 backlink_url = COALESCE($4, backlink_url), \
                 backlink_anchor = COALESCE($5, backlink_anchor) \
             WHERE id = $1 AND status = ANY($6) \
             RETURNING campaign_id"
        );
        let backlink_url = transition.backlink.as_ref().map(|b| b.url.as_str());
        let backlink_anchor = transition
            .backlink
            .as_ref()
            .and_then(|b| b.anchor.as_deref());

        let mut tx = self.pool.begin().await?;

        let moved = sqlx::query_scalar::<_, String>(&sql)
            .bind(&transition.contact_id)
            .bind(transition.to.as_str())
            .bind(transition.at)
            .bind(backlink_url)
            .bind(backlink_anchor)
            .bind(&expected)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(campaign_id) = moved else {
            tx.rollback().await?;
            debug!(
                contact_id = %transition.contact_id,
                to = %transition.to,
                "Conditional contact transition matched no row"
            );
            return Ok(false);
        };

        if let Some(counter) = transition.counter {
            let column = counter.column();
            let sql =
                format!("UPDATE outreach_campaigns SET {column} = {column} + 1 WHERE id = $1");
            let result = sqlx::query(&sql)
                .bind(&campaign_id)
                .execute(&mut *tx)
                .await?;
            // Dropping the transaction rolls back the status change
            if result.rows_affected() == 0 {
                return Err(StoreError::MissingRow {
                    entity: "campaign",
                    id: campaign_id,
                });
            }
        }

        tx.commit().await?;
        debug!(
            contact_id = %transition.contact_id,
            campaign_id = %campaign_id,
            to = %transition.to,
            counter = transition.counter.map(|c| c.column()),
            "Applied conditional contact transition"
        );
        Ok(true)
    }

    async fn status_breakdown(
        &self,
        campaign_id: &str,
    ) -> StoreResult<HashMap<ContactStatus, i64>> {
        let rows = sqlx::query_as::<_, StatusCountRow>(
            "SELECT status, COUNT(*) AS count FROM outreach_contacts \
             WHERE campaign_id = $1 GROUP BY status",
        )
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let status = row.status.parse::<ContactStatus>().map_err(|reason| {
                    StoreError::CorruptRow {
                        table: "outreach_contacts",
                        id: format!("campaign {campaign_id}"),
                        reason,
                    }
                })?;
                Ok((status, row.count))
            })
            .collect()
    }
}

#[async_trait]
impl DeliveryLogStore for PgOutreachStore {
    async fn append_delivery_log(&self, record: &DeliveryLogRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO outreach_delivery_logs (id, contact_id, campaign_id, subject, body, sent_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(record.id)
        .bind(&record.contact_id)
        .bind(&record.campaign_id)
        .bind(&record.subject)
        .bind(&record.body)
        .bind(record.sent_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl OutreachStore for PgOutreachStore {
    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
