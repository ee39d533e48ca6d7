//! Viewer options and configuration
//!
//! This module contains the configuration options for the session viewer,
//! including a builder pattern for easy configuration.

use std::time::Duration;

use super::ChannelMode;
use super::identifiers::SessionId;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Maximum automatic reconnect attempts per connection handle
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Linear backoff step between reconnect attempts (1 second)
pub const DEFAULT_RETRY_STEP: Duration = Duration::from_millis(1000);

/// Window during which a rebroadcast of the operator's own message is
/// suppressed (1 second)
pub const DEFAULT_ECHO_WINDOW: Duration = Duration::from_millis(1000);

// ============================================================================
// Viewer Options
// ============================================================================

/// Main options for the session viewer
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    /// Dashboard origin the channel endpoint hangs off, `ws://` or `wss://`
    pub base_url: String,
    /// Maximum automatic reconnect attempts
    pub max_retries: u32,
    /// Linear backoff step: attempt `n` waits `n * retry_step`
    pub retry_step: Duration,
    /// Echo suppression window for rebroadcast operator messages
    pub echo_window: Duration,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            base_url: "ws://127.0.0.1:8000".to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_step: DEFAULT_RETRY_STEP,
            echo_window: DEFAULT_ECHO_WINDOW,
        }
    }
}

impl ViewerOptions {
    /// Create a new builder for `ViewerOptions`
    #[must_use]
    pub fn builder() -> ViewerOptionsBuilder {
        ViewerOptionsBuilder::default()
    }

    /// Full channel endpoint for a `(mode, session_id)` pair:
    /// `{base_url}/ws/{mode}/{session_id}`
    #[must_use]
    pub fn endpoint_url(&self, mode: ChannelMode, session_id: &SessionId) -> String {
        format!(
            "{}/ws/{}/{}",
            self.base_url.trim_end_matches('/'),
            mode.path_segment(),
            session_id.as_str()
        )
    }
}

// ============================================================================
// Builder for ViewerOptions
// ============================================================================

/// Builder for `ViewerOptions`
#[derive(Debug, Default)]
pub struct ViewerOptionsBuilder {
    options: ViewerOptions,
}

impl ViewerOptionsBuilder {
    /// Set the dashboard origin (`ws://host:port` or `wss://host`)
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.options.base_url = url.into();
        self
    }

    /// Set the maximum automatic reconnect attempts
    #[must_use]
    pub fn max_retries(mut self, max: u32) -> Self {
        self.options.max_retries = max;
        self
    }

    /// Set the linear backoff step
    #[must_use]
    pub fn retry_step(mut self, step: Duration) -> Self {
        self.options.retry_step = step;
        self
    }

    /// Set the echo suppression window
    #[must_use]
    pub fn echo_window(mut self, window: Duration) -> Self {
        self.options.echo_window = window;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> ViewerOptions {
        self.options
    }
}
