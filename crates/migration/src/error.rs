use thiserror::Error;

use shopkeep_core::SinkError;
use shopkeep_store::{LocalStoreError, RemoteStoreError};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("could not read local data: {0}")]
    Local(#[from] LocalStoreError),
    #[error("remote insert failed: {0}")]
    Remote(#[from] RemoteStoreError),
    #[error("could not save backup: {0}")]
    Backup(#[from] SinkError),
    #[error("could not serialize backup: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("clearing local data was not confirmed")]
    NotConfirmed,
}

impl MigrationError {
    /// Whether the remote store rejected the data on a schema constraint.
    pub fn is_constraint(&self) -> bool {
        matches!(self, MigrationError::Remote(err) if err.is_constraint())
    }
}
