//! One-time copy of locally persisted records into the remote store.
//!
//! Runs only on explicit request: back up, insert products, customers and
//! orders with id remapping, and fall back once to a link-free strategy when
//! the remote store rejects the data on a constraint. Local data is left in
//! place; clearing it is a separate confirmed call.

pub mod error;
pub mod job;
pub mod prepare;
pub mod snapshot;

pub use error::MigrationError;
pub use job::{
    Confirmation, LocalDataSummary, MigrationCounts, MigrationJob, MigrationOutcome,
    MigrationStrategy,
};
pub use snapshot::{CUSTOMERS, NAMESPACES, ORDERS, PRODUCTS, Snapshot};
