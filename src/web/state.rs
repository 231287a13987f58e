//! # Web API Application State

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::WebConfig;
use crate::outreach::OutreachServices;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<OutreachServices>,
    pub web_config: Arc<WebConfig>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(services: OutreachServices, web_config: WebConfig) -> Self {
        Self {
            services: Arc::new(services),
            web_config: Arc::new(web_config),
            started_at: Utc::now(),
        }
    }
}
