//! # Counter Aggregator
//!
//! The one place that knows which contact transitions bump which campaign
//! counter. The counter rides on the [`ContactTransition`] itself and the store
//! applies both in one atomic write, so a transition is counted exactly once:
//! a replayed event never counts twice and a failed write never loses a count.

use crate::models::{CampaignCounter, ContactTransition};
use crate::state_machine::ContactStatus;

#[derive(Debug, Clone, Copy, Default)]
pub struct CounterAggregator;

impl CounterAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Counter incremented when a contact reaches `status`
    pub fn counter_for(status: ContactStatus) -> Option<CampaignCounter> {
        match status {
            ContactStatus::Sent => Some(CampaignCounter::Sent),
            ContactStatus::Opened => Some(CampaignCounter::Opened),
            ContactStatus::Clicked => Some(CampaignCounter::Clicked),
            ContactStatus::Replied => Some(CampaignCounter::Replied),
            ContactStatus::Converted => Some(CampaignCounter::Converted),
            ContactStatus::Pending
            | ContactStatus::Queued
            | ContactStatus::Delivered
            | ContactStatus::Bounced => None,
        }
    }

    /// Attach the counter the transition's target status bumps
    pub fn counted(&self, transition: ContactTransition) -> ContactTransition {
        let counter = Self::counter_for(transition.to);
        transition.with_counter(counter)
    }
}
