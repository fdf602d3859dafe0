use std::path::PathBuf;

/// Failures surfaced by the resource clients.
///
/// Clients never swallow these: every variant reaches the adapter layer untouched, with the
/// backend's status and message preserved where the backend supplied them.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("not found: {message}")]
    NotFound { message: String },
    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("transport failure: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),
    #[error("failed to encode request: {0}")]
    Encode(String),
    #[error("response schema mismatch at {path}: {message}")]
    Decode { path: String, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to read attachment {path}: {source}", path = path.display())]
    AttachmentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    /// HTTP status reported by the backend, if the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::NotFound { .. } => Some(404),
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
