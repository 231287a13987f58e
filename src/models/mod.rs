pub mod campaign;
pub mod contact;
pub mod delivery_event;
pub mod delivery_log;

// Re-export core models for easy access
pub use campaign::{Campaign, CampaignCounter, NewCampaign};
pub use contact::{Backlink, Contact, ContactTransition, NewContact};
pub use delivery_event::{DeliveryEvent, ReplyReport};
pub use delivery_log::DeliveryLogRecord;
