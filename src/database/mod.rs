//! # Database Operations
//!
//! Storage seam for the dispatch core.
//!
//! ## Key Components
//!
//! - [`store`] - `CampaignStore`, `ContactStore`, `DeliveryLogStore` traits
//! - [`postgres`] - SQLx/PostgreSQL implementation used in production
//! - [`memory`] - In-memory implementation with failure injection
//! - [`connection`] - Pool construction from configuration
//! - [`migrations`] - Embedded schema migrations

pub mod connection;
pub mod memory;
pub mod migrations;
pub mod postgres;
pub mod store;

pub use connection::DatabaseConnection;
pub use memory::InMemoryOutreachStore;
pub use migrations::DatabaseMigrations;
pub use postgres::PgOutreachStore;
pub use store::{
    CampaignStore, ContactStore, DeliveryLogStore, OutreachStore, StoreError, StoreResult,
};
