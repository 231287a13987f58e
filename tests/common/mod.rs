//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use outreach_dispatch::config::{DispatchConfig, ForwardingConfig, OutreachConfig};
use outreach_dispatch::database::InMemoryOutreachStore;
use outreach_dispatch::forwarding::{BatchSender, ForwardQueue, UnconfiguredSender};
use outreach_dispatch::models::{NewCampaign, NewContact};
use outreach_dispatch::outreach::OutreachServices;
use outreach_dispatch::state_machine::CampaignStatus;
use outreach_dispatch::web::{create_app, AppState};

pub const CAMPAIGN_ID: &str = "campaign-links";

/// Store, services and the forward worker handle for one test
pub struct TestHarness {
    pub store: Arc<InMemoryOutreachStore>,
    pub services: OutreachServices,
    pub worker: tokio::task::JoinHandle<()>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_sender(Arc::new(UnconfiguredSender))
    }

    pub fn with_sender(sender: Arc<dyn BatchSender>) -> Self {
        let store = Arc::new(InMemoryOutreachStore::new());
        let (queue, worker) = ForwardQueue::spawn(sender, &fast_forwarding());
        let services = OutreachServices::new(store.clone(), queue, &DispatchConfig::default());
        Self {
            store,
            services,
            worker,
        }
    }

    /// Active campaign with `count` pending contacts `ct-00`, `ct-01`, ...
    pub fn seed_active_campaign(&self, count: usize) {
        self.store
            .insert_campaign(NewCampaign::new(CAMPAIGN_ID, "Link building", CampaignStatus::Active));
        for i in 0..count {
            self.store.insert_contact(NewContact::new(
                contact_id(i),
                CAMPAIGN_ID,
                format!("editor{i}@example.com"),
            ));
        }
    }
}

pub fn contact_id(i: usize) -> String {
    format!("ct-{i:02}")
}

pub fn fast_forwarding() -> ForwardingConfig {
    ForwardingConfig {
        max_attempts: 2,
        backoff_base_ms: 1,
        backoff_max_ms: 2,
        ..ForwardingConfig::default()
    }
}

/// Router over an in-memory store, optionally guarded by a webhook secret
pub fn test_app(harness: &TestHarness, webhook_secret: Option<&str>) -> axum::Router {
    let mut config = OutreachConfig::default();
    config.web.webhook_secret = webhook_secret.map(str::to_string);
    create_app(AppState::new(harness.services.clone(), config.web))
}
