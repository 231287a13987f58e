#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Outreach Dispatch
//!
//! Campaign dispatch and delivery-event state machine for outreach campaigns.
//!
//! ## Overview
//!
//! The crate selects the next batch of outreach contacts for an active campaign,
//! marks them as in-flight with a fresh tracking identifier, hands the batch to an
//! external sending system, and reconciles the asynchronous delivery events that
//! come back (sent, delivered, bounced, opened, clicked, replied, converted) into
//! contact status and campaign counters.
//!
//! ## Module Organization
//!
//! - [`models`] - Campaign, contact, inbound event and delivery-log records
//! - [`state_machine`] - Contact/campaign states and the transition guard
//! - [`database`] - Store traits plus Postgres and in-memory adapters
//! - [`outreach`] - Batch selection, dispatch, event ingestion, reply handling, counters
//! - [`forwarding`] - Outbound queue that delivers dispatch batches to the sender
//! - [`web`] - Axum HTTP surface
//! - [`config`] - Layered configuration
//! - [`error`] - Structured error handling
//! - [`logging`] - Tracing subscriber setup
//!
//! ## Concurrency
//!
//! There is no in-process locking around contacts. Every status change is a
//! conditional update against the store ("set status = X where status is one of
//! the allowed predecessors"), so a losing concurrent writer updates zero rows.
//! Campaign counters are store-side increments committed together with the
//! status change they count.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use outreach_dispatch::config::OutreachConfig;
//! use outreach_dispatch::database::InMemoryOutreachStore;
//! use outreach_dispatch::forwarding::{ForwardQueue, UnconfiguredSender};
//! use outreach_dispatch::outreach::OutreachServices;
//!
//! # tokio_test::block_on(async {
//! let config = OutreachConfig::default();
//! let store = Arc::new(InMemoryOutreachStore::new());
//! let (queue, _worker) = ForwardQueue::spawn(Arc::new(UnconfiguredSender), &config.forwarding);
//! let services = OutreachServices::new(store, queue, &config.dispatch);
//!
//! let outcome = services.dispatcher.trigger("campaign-1", None).await?;
//! println!("queued {} contacts", outcome.queued_count());
//! # Ok::<(), outreach_dispatch::OutreachError>(())
//! # }).unwrap();
//! ```

pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod forwarding;
pub mod logging;
pub mod models;
pub mod outreach;
pub mod state_machine;
pub mod web;

pub use error::{OutreachError, OutreachResult};
pub use models::{Campaign, Contact, DeliveryEvent};
pub use state_machine::{CampaignStatus, ContactStatus, StatusGuard};
