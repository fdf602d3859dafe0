use clinic_core::{ClientError, ValidationErrors};
use std::sync::Arc;

/// Why a query fetch or a mutation did not produce data.
#[derive(Clone, Debug, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Client(Arc<ClientError>),
    /// The fetch was aborted because its last subscriber went away.
    #[error("fetch was cancelled")]
    Cancelled,
    #[error("fetch task panicked")]
    Panicked,
}

impl QueryError {
    /// The underlying client error, if any.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            QueryError::Client(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ClientError> for QueryError {
    fn from(err: ClientError) -> Self {
        QueryError::Client(Arc::new(err))
    }
}

/// Outcome of [`Mutation::submit`](crate::Mutation::submit) when it did not succeed.
#[derive(Clone, Debug, thiserror::Error)]
pub enum SubmitError {
    /// The form failed validation; nothing was sent.
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
    #[error(transparent)]
    Failed(#[from] QueryError),
}

pub type QueryResult<T> = std::result::Result<T, QueryError>;
