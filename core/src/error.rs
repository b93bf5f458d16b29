//! Error types for the push API client.
//!
//! # Design
//! A non-2xx status is not an error: operations map it to `false` or `None`.
//! Only failures the caller cannot recover from by inspecting a return value
//! land here: bad configuration, transport faults, and JSON that fails to
//! encode or decode.

use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, PushError>;

/// Errors returned by `PushClient` and `Connection`.
#[derive(Debug, Error)]
pub enum PushError {
    /// Invalid base URL or credentials. Raised at construction.
    #[error("configuration error: {0}")]
    Config(String),

    /// DNS, TLS, connect or timeout failure from the HTTP stack.
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// The request payload could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// A 2xx response carried a body that is not valid JSON.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The feedback timestamp could not be rendered as ISO-8601.
    #[error("timestamp formatting failed: {0}")]
    Timestamp(#[from] time::error::Format),
}

impl PushError {
    /// True when the failure happened while talking to the server, as opposed
    /// to a problem with the data exchanged.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
