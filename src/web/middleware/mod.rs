//! # Web API Middleware
//!
//! - [`request_id`] - `x-request-id` propagation
//! - [`webhook_auth`] - Shared-secret check for inbound sender webhooks

pub mod request_id;
pub mod webhook_auth;
