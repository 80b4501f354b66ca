//! Error type for metadata store operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChunkStoreError {
    /// Invalid connection configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Connection or query failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
