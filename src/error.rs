//! Error types for the session viewer

use thiserror::Error;

/// Main error type for the session viewer
///
/// Mirrors the failure taxonomy of the connection manager: transport
/// failures are retried, malformed frames are dropped, and invalid local
/// operations are no-ops. None of these escape background tasks; they
/// surface either through the event channel or a logged diagnostic.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// Transport layer failure (connection refused, network drop)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Inbound frame that could not be decoded
    #[error("Malformed frame: {message}")]
    MalformedFrame {
        /// Error message
        message: String,
        /// Raw frame payload that failed to decode
        data: Option<serde_json::Value>,
    },

    /// Invalid configuration (empty session id, bad endpoint scheme)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for session viewer operations
pub type Result<T> = std::result::Result<T, ViewerError>;

impl ViewerError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a malformed frame error
    pub fn malformed_frame(msg: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self::MalformedFrame {
            message: msg.into(),
            data,
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
