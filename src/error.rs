//! Error taxonomy shared by the credential store, the Gateway and the auth flows.

use thiserror::Error;

/// Outcome of any call that reaches (or would reach) the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No usable access token. Callers redirect to login instead of showing an alert.
    #[error("no active session, login required")]
    Unauthenticated,

    /// The server answered with a non-2xx status.
    #[error("request failed with status {status}")]
    RequestFailed { status: u16 },

    /// The server answered 2xx but the body does not match the expected schema.
    #[error("malformed response from {path}: {reason}")]
    MalformedResponse { path: String, reason: String },

    /// The request never produced a response (connection refused, DNS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The request was rejected locally before being sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The credential store could not be read or written.
    #[error("credential storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl ApiError {
    /// True when the right reaction is sending the viewer back to the login screen.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            ApiError::Unauthenticated | ApiError::RequestFailed { status: 401 }
        )
    }

    /// HTTP status for `RequestFailed`, `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RequestFailed { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

/// Failures of the durable credential store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential store unavailable: {0}")]
    Unavailable(String),

    #[error("credential store is corrupt: {0}")]
    Corrupt(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::StorageUnavailable(err.to_string())
    }
}
