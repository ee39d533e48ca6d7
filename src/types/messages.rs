//! Message and frame type definitions
//!
//! This module contains the wire types exchanged over a session channel:
//! chat messages, the inbound frame union, and the outbound control frames.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Message Types
// ============================================================================

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The lead on the other end of the session
    User,
    /// The automated assistant
    Bot,
    /// A human operator
    Admin,
    /// Synthetic status messages (handover notices)
    System,
}

/// A single transcript entry
///
/// Messages are transient view state: rendered, then discarded. Nothing in
/// this layer persists them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message author
    pub role: Role,
    /// Message text
    pub content: String,
    /// Server timestamp; defaults to now when the frame omits it
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Display name of the sender, when the server provides one
    #[serde(default, alias = "sender_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Detected mood of the lead, attached to bot messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    /// Detected interest of the lead, attached to bot messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest: Option<String>,
}

impl ChatMessage {
    /// Build the local echo of an operator message
    pub fn admin_local(content: impl Into<String>) -> Self {
        Self {
            role: Role::Admin,
            content: content.into(),
            timestamp: Utc::now(),
            name: Some("Admin".to_string()),
            mood: None,
            interest: None,
        }
    }

    /// Build the system-role message synthesized from a handover frame
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            timestamp: Utc::now(),
            name: None,
            mood: None,
            interest: None,
        }
    }
}

// ============================================================================
// Frame Types
// ============================================================================

/// Inbound frame (server to client), tagged by `type`
///
/// Frames with an unrecognized tag never reach this type; the classifier
/// drops them before decoding, as a tolerance policy for server-added kinds.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InboundFrame {
    /// Full transcript replacement; always the first frame after open
    History {
        /// Ordered messages, oldest first
        #[serde(default)]
        messages: Vec<ChatMessage>,
    },
    /// Single new message appended to the transcript
    Message {
        /// The message payload, flattened into the frame
        #[serde(flatten)]
        message: ChatMessage,
    },
    /// Control of the session returned to automated handling
    Handover {
        /// Notice text, displayed as a system message
        content: String,
    },
}

/// Outbound frame (client to server), only valid in control mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundFrame {
    /// Operator message
    Message {
        /// Message text
        content: String,
    },
    /// End human control of the session
    Handover,
}
