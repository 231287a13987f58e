//! Bounded record of batches that could not be forwarded.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use super::errors::ForwardError;
use super::sender::DispatchPayload;

/// A dispatch batch the sender never acknowledged. Its contacts stay `queued`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardFailure {
    pub campaign_id: String,
    pub contact_ids: Vec<String>,
    pub attempts: u32,
    pub last_error: String,
    pub failed_at: DateTime<Utc>,
}

impl ForwardFailure {
    pub fn new(payload: &DispatchPayload, attempts: u32, error: &ForwardError) -> Self {
        Self {
            campaign_id: payload.campaign.id.clone(),
            contact_ids: payload.contact_ids(),
            attempts,
            last_error: error.to_string(),
            failed_at: Utc::now(),
        }
    }
}

/// Keeps the most recent failures; older entries fall off the front.
#[derive(Debug)]
pub struct ForwardFailureLog {
    capacity: usize,
    entries: Mutex<VecDeque<ForwardFailure>>,
    total_recorded: AtomicU64,
}

impl ForwardFailureLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            total_recorded: AtomicU64::new(0),
        }
    }

    pub fn record(&self, failure: ForwardFailure) {
        self.total_recorded.fetch_add(1, Ordering::Relaxed);
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(failure);
    }

    /// Retained failures, newest first
    pub fn recent(&self) -> Vec<ForwardFailure> {
        self.entries.lock().iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Failures recorded since startup, including evicted ones
    pub fn total_recorded(&self) -> u64 {
        self.total_recorded.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(campaign_id: &str) -> ForwardFailure {
        ForwardFailure {
            campaign_id: campaign_id.to_string(),
            contact_ids: vec!["ct1".to_string()],
            attempts: 1,
            last_error: "boom".to_string(),
            failed_at: Utc::now(),
        }
    }

    #[test]
    fn test_oldest_entries_are_evicted() {
        let log = ForwardFailureLog::new(2);
        log.record(failure("a"));
        log.record(failure("b"));
        log.record(failure("c"));

        let campaigns: Vec<String> = log.recent().into_iter().map(|f| f.campaign_id).collect();
        assert_eq!(campaigns, vec!["c", "b"]);
        assert_eq!(log.total_recorded(), 3);
    }

    #[test]
    fn test_zero_capacity_only_counts() {
        let log = ForwardFailureLog::new(0);
        log.record(failure("a"));
        assert!(log.is_empty());
        assert_eq!(log.total_recorded(), 1);
    }
}
