use moments_query::QueryError;
use thiserror::Error;

/// Failure reported by a collaborator (storage, record fetch, identity).
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ClientError(pub String);

impl ClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors surfaced by finder operations.
#[derive(Debug, Error)]
pub enum FinderError {
    /// Malformed caller input, detected before any query was issued.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] QueryError),

    /// The moment does not exist or is not visible to the viewer.
    #[error("moment not found: {0}")]
    NotFound(String),

    /// A storage call failed. Not retried.
    #[error("collaborator unavailable: {0}")]
    CollaboratorUnavailable(#[from] ClientError),
}
