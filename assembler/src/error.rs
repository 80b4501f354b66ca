//! Error types: the one caller-visible error, and the uniform error every
//! collaborator call resolves to before the policy table recovers it.

use thiserror::Error;

/// The only error [`crate::Assembler::assemble`] can return.
#[derive(Debug, Error)]
pub enum AssembleError {
    /// Missing or blank question. Surfaced to the HTTP layer as 400.
    #[error("{0}")]
    InvalidInput(String),
}

/// Failure of one external collaborator call.
///
/// All variants are recovered locally by the fallback policy; they exist so
/// logs can tell an unconfigured service from a broken one.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The service has no configuration (missing environment variables).
    #[error("{service} is not configured")]
    Unconfigured { service: &'static str },

    /// Network-level failure, including timeouts.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("upstream HTTP {status}: {detail}")]
    UpstreamStatus { status: u16, detail: String },

    /// The response could not be decoded.
    #[error("decode failure: {0}")]
    Decode(String),
}

impl From<llm_service::LlmError> for CollaboratorError {
    fn from(err: llm_service::LlmError) -> Self {
        use llm_service::LlmError;
        match err {
            LlmError::HttpStatus {
                status, snippet, ..
            } => CollaboratorError::UpstreamStatus {
                status: status.as_u16(),
                detail: snippet,
            },
            LlmError::Decode(msg) => CollaboratorError::Decode(msg),
            LlmError::InvalidEndpoint(ep) => {
                CollaboratorError::Transport(format!("invalid endpoint: {ep}"))
            }
            other => CollaboratorError::Transport(other.to_string()),
        }
    }
}

impl From<chunk_store::ChunkStoreError> for CollaboratorError {
    fn from(err: chunk_store::ChunkStoreError) -> Self {
        CollaboratorError::Transport(err.to_string())
    }
}

impl From<vector_store::VectorStoreError> for CollaboratorError {
    fn from(err: vector_store::VectorStoreError) -> Self {
        CollaboratorError::Transport(err.to_string())
    }
}
