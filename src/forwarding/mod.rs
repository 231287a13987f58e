//! # Outbound Forwarding
//!
//! Delivers dispatch batches to the external sending system without blocking
//! the request that produced them.
//!
//! - [`sender`] - `BatchSender` trait, HTTP implementation, payload types
//! - [`queue`] - Bounded queue and retrying worker
//! - [`failure_log`] - Bounded log of batches that could not be delivered
//! - [`errors`] - `ForwardError`

pub mod errors;
pub mod failure_log;
pub mod queue;
pub mod sender;

pub use errors::ForwardError;
pub use failure_log::{ForwardFailure, ForwardFailureLog};
pub use queue::ForwardQueue;
pub use sender::{
    sender_from_config, BatchSender, DispatchPayload, DispatchedContact, HttpBatchSender,
    UnconfiguredSender,
};
