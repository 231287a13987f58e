//! # Outreach Constants
//!
//! Wire names and defaults shared by the dispatch core, the HTTP layer and the
//! configuration defaults.

/// Inbound delivery event type names sent by the external sending system.
pub mod events {
    pub const EMAIL_SENT: &str = "email.sent";
    pub const EMAIL_DELIVERED: &str = "email.delivered";
    pub const EMAIL_BOUNCED: &str = "email.bounced";
    pub const EMAIL_OPENED: &str = "email.opened";
    pub const EMAIL_CLICKED: &str = "email.clicked";
}

/// Dispatch defaults
pub mod dispatch {
    pub const DEFAULT_BATCH_SIZE: usize = 10;
    pub const MAX_BATCH_SIZE: usize = 500;
}

/// Outbound forwarding defaults
pub mod forwarding {
    pub const QUEUE_CAPACITY: usize = 256;
    pub const MAX_ATTEMPTS: u32 = 5;
    pub const BACKOFF_BASE_MS: u64 = 500;
    pub const BACKOFF_MAX_MS: u64 = 30_000;
    pub const BACKOFF_MULTIPLIER: f64 = 2.0;
    pub const REQUEST_TIMEOUT_MS: u64 = 10_000;
    pub const FAILURE_LOG_CAPACITY: usize = 100;
    pub const MAX_CONCURRENT_DELIVERIES: usize = 4;
}

/// HTTP defaults
pub mod web {
    pub const BIND_ADDRESS: &str = "0.0.0.0:8080";
    pub const REQUEST_TIMEOUT_MS: u64 = 30_000;
    pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";
    pub const REQUEST_ID_HEADER: &str = "x-request-id";
}
