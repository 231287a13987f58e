// State machine module for outreach contacts
//
// Closed enumerations for campaign and contact status, the inbound delivery
// event vocabulary, and the single guard that decides which contact
// transitions are permitted.

pub mod errors;
pub mod events;
pub mod guards;
pub mod states;

// Re-export main types for convenient access
pub use errors::{GuardError, GuardResult};
pub use events::DeliveryEventKind;
pub use guards::StatusGuard;
pub use states::{CampaignStatus, ContactStatus};
