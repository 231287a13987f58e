//! # Forward Queue
//!
//! Bounded in-process channel between the dispatcher and the external sender.
//! Requests enqueue without waiting. A worker task drains the channel and
//! spawns one delivery per batch, bounded by a semaphore, so a batch stuck in
//! timeouts and backoff holds only its own slot. Each delivery retries
//! retryable failures with exponential backoff and records the batch when it
//! finally gives up.

use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use super::errors::ForwardError;
use super::failure_log::{ForwardFailure, ForwardFailureLog};
use super::sender::{BatchSender, DispatchPayload};
use crate::config::ForwardingConfig;

/// Handle used to submit dispatch batches for forwarding.
///
/// Cloning is cheap. The worker stops once every handle has been dropped, the
/// remaining batches are drained and in-flight deliveries have finished.
#[derive(Debug, Clone)]
pub struct ForwardQueue {
    tx: mpsc::Sender<DispatchPayload>,
    failures: Arc<ForwardFailureLog>,
    capacity: usize,
}

impl ForwardQueue {
    /// Create the queue and spawn its worker on the current tokio runtime
    pub fn spawn(
        sender: Arc<dyn BatchSender>,
        config: &ForwardingConfig,
    ) -> (Self, JoinHandle<()>) {
        let (queue, rx) = Self::channel(config);
        let worker = ForwardWorker {
            rx,
            permits: Arc::new(Semaphore::new(config.max_concurrent_deliveries.max(1))),
            delivery: Arc::new(Delivery {
                sender,
                failures: Arc::clone(&queue.failures),
                config: config.clone(),
            }),
        };
        let handle = tokio::spawn(worker.run());
        (queue, handle)
    }

    fn channel(config: &ForwardingConfig) -> (Self, mpsc::Receiver<DispatchPayload>) {
        let capacity = config.queue_capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        let queue = Self {
            tx,
            failures: Arc::new(ForwardFailureLog::new(config.failure_log_capacity)),
            capacity,
        };
        (queue, rx)
    }

    /// Submit a batch without waiting. A full or closed queue is recorded as a
    /// failure and returned to the caller.
    pub fn enqueue(&self, payload: DispatchPayload) -> Result<(), ForwardError> {
        let (payload, err) = match self.tx.try_send(payload) {
            Ok(()) => return Ok(()),
            Err(TrySendError::Full(payload)) => (
                payload,
                ForwardError::QueueFull {
                    capacity: self.capacity,
                },
            ),
            Err(TrySendError::Closed(payload)) => (payload, ForwardError::QueueClosed),
        };

        warn!(
            campaign_id = %payload.campaign.id,
            contacts = payload.contacts.len(),
            error = %err,
            "Dispatch batch could not be enqueued for forwarding"
        );
        self.failures.record(ForwardFailure::new(&payload, 0, &err));
        Err(err)
    }

    /// True once the worker has stopped receiving batches
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub fn failure_log(&self) -> &Arc<ForwardFailureLog> {
        &self.failures
    }

    /// Recorded forward failures, newest first
    pub fn failures(&self) -> Vec<ForwardFailure> {
        self.failures.recent()
    }
}

struct ForwardWorker {
    rx: mpsc::Receiver<DispatchPayload>,
    permits: Arc<Semaphore>,
    delivery: Arc<Delivery>,
}

impl ForwardWorker {
    async fn run(mut self) {
        info!(
            sender = self.delivery.sender.name(),
            max_concurrent = self.permits.available_permits(),
            "Forward worker started"
        );
        let mut in_flight = JoinSet::new();

        while let Some(payload) = self.rx.recv().await {
            // Waiting for a slot leaves later batches in the bounded channel
            let Ok(permit) = Arc::clone(&self.permits).acquire_owned().await else {
                self.delivery.give_up(&payload, 0, &ForwardError::QueueClosed);
                break;
            };
            let delivery = Arc::clone(&self.delivery);
            in_flight.spawn(async move {
                delivery.deliver(payload).await;
                drop(permit);
            });

            while let Some(result) = in_flight.try_join_next() {
                log_join_result(result);
            }
        }

        debug!(in_flight = in_flight.len(), "Forward queue closed, draining deliveries");
        while let Some(result) = in_flight.join_next().await {
            log_join_result(result);
        }
        info!("Forward worker stopped");
    }
}

fn log_join_result(result: Result<(), JoinError>) {
    if let Err(err) = result {
        error!(error = %err, "Forward delivery task failed");
    }
}

/// Everything one delivery task needs, shared across tasks
struct Delivery {
    sender: Arc<dyn BatchSender>,
    failures: Arc<ForwardFailureLog>,
    config: ForwardingConfig,
}

impl Delivery {
    async fn deliver(&self, payload: DispatchPayload) {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.sender.send(&payload).await {
                Ok(()) => {
                    info!(
                        campaign_id = %payload.campaign.id,
                        contacts = payload.contacts.len(),
                        attempt,
                        "Dispatch batch forwarded"
                    );
                    return;
                }
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    let delay = self.config.backoff_delay(attempt);
                    warn!(
                        campaign_id = %payload.campaign.id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Forward attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    self.give_up(&payload, attempt, &err);
                    return;
                }
            }
        }
    }

    fn give_up(&self, payload: &DispatchPayload, attempts: u32, err: &ForwardError) {
        error!(
            campaign_id = %payload.campaign.id,
            contact_ids = ?payload.contact_ids(),
            attempts,
            error = %err,
            "Giving up on dispatch batch; contacts remain queued"
        );
        self.failures
            .record(ForwardFailure::new(payload, attempts, err));
    }
}
