//! # Store Interfaces
//!
//! Durable storage for campaigns and contacts lives outside the dispatch core.
//! These traits are the seam: every component receives an
//! `Arc<dyn OutreachStore>` at construction time.
//!
//! Every status write is conditional. Implementations must apply a
//! [`ContactTransition`] only when the contact's current status is one of
//! `expected_from`, and report whether a row changed. The campaign counter a
//! transition carries is incremented in the same atomic write. Together these
//! keep concurrent or replayed webhook deliveries from regressing a contact,
//! double-counting a counter, or losing a count.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use crate::models::{Campaign, Contact, ContactTransition, DeliveryLogRecord};
use crate::state_machine::ContactStatus;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Corrupt {table} row {id}: {reason}")]
    CorruptRow {
        table: &'static str,
        id: String,
        reason: String,
    },

    #[error("{entity} {id} does not exist")]
    MissingRow { entity: &'static str, id: String },

    /// Failure injected by the in-memory store for tests
    #[error("Injected failure: {0}")]
    Injected(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn find_campaign(&self, campaign_id: &str) -> StoreResult<Option<Campaign>>;

    /// All campaigns, newest first; archived ones only when asked for
    async fn list_campaigns(&self, include_archived: bool) -> StoreResult<Vec<Campaign>>;
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn find_contact(&self, contact_id: &str) -> StoreResult<Option<Contact>>;

    /// Up to `limit` pending contacts of a campaign, highest priority first,
    /// contacts without a priority last, ties in insertion order
    async fn pending_contacts(&self, campaign_id: &str, limit: usize) -> StoreResult<Vec<Contact>>;

    /// Move a contact from `pending` to `queued` and persist its tracking ID
    /// in the same write. Returns `false` when the contact was no longer pending.
    async fn mark_queued(&self, contact_id: &str, tracking_id: &str) -> StoreResult<bool>;

    /// Apply a guarded transition together with its campaign counter
    /// increment. Returns `false`, writing nothing, when the contact's current
    /// status was not one of the expected predecessors. An error means neither
    /// the status nor the counter changed.
    async fn apply_transition(&self, transition: &ContactTransition) -> StoreResult<bool>;

    /// Number of contacts per status for one campaign
    async fn status_breakdown(&self, campaign_id: &str)
        -> StoreResult<HashMap<ContactStatus, i64>>;
}

#[async_trait]
pub trait DeliveryLogStore: Send + Sync {
    async fn append_delivery_log(&self, record: &DeliveryLogRecord) -> StoreResult<()>;
}

/// Everything the dispatch core needs from storage.
#[async_trait]
pub trait OutreachStore: CampaignStore + ContactStore + DeliveryLogStore {
    /// Round trip proving the backing store answers
    async fn health_check(&self) -> StoreResult<()>;
}
