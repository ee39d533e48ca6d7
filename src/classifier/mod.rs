//! Inbound event classification
//!
//! Maps decoded frames to a fixed set of event kinds. Frames that cannot be
//! decoded, or carry a `type` the viewer does not know, are dropped rather
//! than surfaced as errors; the server is allowed to grow new frame kinds
//! without breaking older dashboards.
//!
//! The classifier also owns the echo-suppression state: when the operator
//! sends a message, its content is remembered for a short window so that a
//! server rebroadcast of the same admin message is not rendered twice. This
//! is a fixed-window content-equality heuristic, not a correlation-id based
//! de-duplication.

use std::time::{Duration, Instant};

use crate::types::messages::{ChatMessage, InboundFrame, Role};

/// Outcome of classifying one inbound frame
#[derive(Debug, Clone)]
pub enum Classified {
    /// `history` frame: replace the whole transcript with these messages
    History(Vec<ChatMessage>),
    /// `message` frame: append to the transcript
    Append(ChatMessage),
    /// `handover` frame, synthesized into a system-role message
    Handover(ChatMessage),
    /// Frame dropped; never fatal, never surfaced to the caller
    Dropped(DropReason),
}

/// Why a frame was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Payload could not be decoded into the expected shape
    Malformed,
    /// Unrecognized `type` discriminator (forward-compatibility tolerance)
    UnknownKind,
    /// Rebroadcast of the operator's own message inside the echo window
    EchoSuppressed,
}

/// Classifies inbound frames and tracks the local echo window
#[derive(Debug)]
pub struct EventClassifier {
    echo_window: Duration,
    last_sent: Option<(String, Instant)>,
}

impl EventClassifier {
    /// Create a classifier with the given echo suppression window
    #[must_use]
    pub fn new(echo_window: Duration) -> Self {
        Self {
            echo_window,
            last_sent: None,
        }
    }

    /// Record the content of a just-sent operator message
    ///
    /// A subsequent inbound admin message with identical content is dropped
    /// until the window elapses.
    pub fn note_sent(&mut self, content: impl Into<String>) {
        self.last_sent = Some((content.into(), Instant::now()));
    }

    /// Classify one decoded frame, in arrival order
    pub fn classify(&mut self, frame: serde_json::Value) -> Classified {
        let Some(kind) = frame.get("type").and_then(serde_json::Value::as_str) else {
            log::debug!("dropping frame without type discriminator");
            return Classified::Dropped(DropReason::Malformed);
        };

        match kind {
            "history" | "message" | "handover" => {}
            other => {
                log::debug!("ignoring unrecognized frame kind: {other}");
                return Classified::Dropped(DropReason::UnknownKind);
            }
        }

        let kind = kind.to_owned();
        let frame = match serde_json::from_value::<InboundFrame>(frame) {
            Ok(frame) => frame,
            Err(e) => {
                log::debug!("dropping undecodable {kind} frame: {e}");
                return Classified::Dropped(DropReason::Malformed);
            }
        };

        match frame {
            InboundFrame::History { messages } => Classified::History(messages),
            InboundFrame::Message { message } => {
                if message.role == Role::Admin && self.is_echo(&message.content) {
                    log::debug!("suppressing echoed admin message");
                    Classified::Dropped(DropReason::EchoSuppressed)
                } else {
                    Classified::Append(message)
                }
            }
            InboundFrame::Handover { content } => Classified::Handover(ChatMessage::system(content)),
        }
    }

    fn is_echo(&self, content: &str) -> bool {
        self.last_sent
            .as_ref()
            .is_some_and(|(sent, at)| sent == content && at.elapsed() <= self.echo_window)
    }
}
