//! Store boundaries: the hosted relational database and local persistence.
//!
//! Everything above this crate receives a store as an explicit capability;
//! nothing here is a process-wide handle.

pub mod http;
pub mod in_memory;
pub mod local;
pub mod remote;

pub use http::{HttpRemoteStore, HttpStoreConfig};
pub use in_memory::{InMemoryRemoteStore, Rule};
pub use local::{InMemoryLocalStore, JsonFileLocalStore, LocalStore, LocalStoreError};
pub use remote::{
    ConstraintKind, Direction, ErrorClass, Filter, FilterOp, Query, Record, RemoteStore,
    RemoteStoreError,
};
