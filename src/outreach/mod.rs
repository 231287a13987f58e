//! # Outreach Services
//!
//! Dispatch and delivery-event reconciliation.
//!
//! ## Components
//!
//! - [`batch_selector`] - Read-only choice of the next pending contacts
//! - [`dispatcher`] - `pending -> queued` with tracking IDs, then forwarding
//! - [`event_ingester`] - Delivery events into status, counters and delivery log
//! - [`reply_handler`] - Manual replies and conversions
//! - [`counter_aggregator`] - Transition to campaign counter mapping
//! - [`campaign_report`] - Campaign listings and status breakdowns
//!
//! Everything is built once by [`OutreachServices::new`] around a single
//! injected store handle.

pub mod batch_selector;
pub mod campaign_report;
pub mod counter_aggregator;
pub mod dispatcher;
pub mod event_ingester;
pub mod reply_handler;
mod transitions;
pub mod types;

use std::sync::Arc;

use crate::config::DispatchConfig;
use crate::database::OutreachStore;
use crate::forwarding::ForwardQueue;
use transitions::ContactTransitioner;

pub use batch_selector::{BatchSelector, SelectedBatch};
pub use campaign_report::CampaignReporter;
pub use counter_aggregator::CounterAggregator;
pub use dispatcher::Dispatcher;
pub use event_ingester::EventIngester;
pub use reply_handler::ReplyHandler;
pub use types::{CampaignOverview, DispatchOutcome, TrackingAssignment, TransitionOutcome};

/// The wired-up service graph handed to the web layer.
#[derive(Clone)]
pub struct OutreachServices {
    pub store: Arc<dyn OutreachStore>,
    pub selector: BatchSelector,
    pub dispatcher: Dispatcher,
    pub ingester: EventIngester,
    pub reply_handler: ReplyHandler,
    pub counters: CounterAggregator,
    pub reporter: CampaignReporter,
    pub forward_queue: ForwardQueue,
}

impl OutreachServices {
    pub fn new(
        store: Arc<dyn OutreachStore>,
        forward_queue: ForwardQueue,
        config: &DispatchConfig,
    ) -> Self {
        let counters = CounterAggregator::new();
        let transitioner = ContactTransitioner::new(Arc::clone(&store), counters);
        let selector = BatchSelector::new(Arc::clone(&store), config);

        Self {
            dispatcher: Dispatcher::new(
                Arc::clone(&store),
                selector.clone(),
                forward_queue.clone(),
            ),
            ingester: EventIngester::new(Arc::clone(&store), transitioner.clone()),
            reply_handler: ReplyHandler::new(transitioner),
            reporter: CampaignReporter::new(Arc::clone(&store)),
            store,
            selector,
            counters,
            forward_queue,
        }
    }
}
