//! Core type definitions for the session viewer
//!
//! This module contains the data model shared across the crate: identifiers,
//! message and frame types, channel enums, and configuration options.

pub mod identifiers;
pub mod messages;
pub mod options;

use serde::{Deserialize, Serialize};

/// Access level of a realtime channel
///
/// Observe is read-only; Control additionally allows sending operator
/// messages and triggering handover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelMode {
    /// Read-only access to a session
    Observe,
    /// Read-write access: operator messages and handover are permitted
    Control,
}

impl ChannelMode {
    /// Path segment used in the channel endpoint `/ws/{mode}/{session_id}`
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Observe => "view",
            Self::Control => "control",
        }
    }
}

/// Lifecycle state of a connection handle
///
/// Exactly one handle may be `Connecting` or `Open` at a time per dashboard
/// instance; the session switcher enforces that invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    /// Handle created, no dial attempted yet
    Idle = 0,
    /// Dial in progress
    Connecting = 1,
    /// Channel established
    Open = 2,
    /// Channel down (explicitly closed, or awaiting/denied reconnect)
    Closed = 3,
}

impl ConnectionState {
    pub(crate) const fn as_u8(self) -> u8 {
        self as u8
    }

    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Connecting,
            2 => Self::Open,
            _ => Self::Closed,
        }
    }
}

pub use identifiers::SessionId;
pub use messages::{ChatMessage, InboundFrame, OutboundFrame, Role};
pub use options::{ViewerOptions, ViewerOptionsBuilder};
