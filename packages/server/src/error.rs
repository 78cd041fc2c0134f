//! Errors raised while starting or running the gateway.

use thiserror::Error;

use crate::domain::StorageError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to open message log: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
