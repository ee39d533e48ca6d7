//! Connection handle for one realtime session channel
//!
//! `SessionClient` owns exactly one duplex channel for a `(session_id, mode)`
//! pair. It dials the channel, classifies inbound frames, and recovers from
//! unexpected disconnects with bounded linear backoff.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                   SessionClient                       │
//! │                                                       │
//! │  ┌────────────────────┐      ┌──────────────────┐     │
//! │  │  Channel Task      │      │  send()/close()  │     │
//! │  │  (background)      │      │  (caller side)   │     │
//! │  │                    │      │                  │     │
//! │  │ • dial + read loop │      │ • locks per-write│     │
//! │  │ • classify frames  │      │ • no-op outside  │     │
//! │  │ • bounded retries  │      │   Control/Open   │     │
//! │  └─────────┬──────────┘      └────────┬─────────┘     │
//! │            │                          │               │
//! │            │    ┌──────────────┐      │               │
//! │            └───→│  WsTransport │←─────┘               │
//! │                 │  (Arc<Mutex>)│                      │
//! │                 └──────────────┘                      │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! **Key design points:**
//! - The retry counter lives on the handle, not in shared module state, so
//!   successive handles can never corrupt each other's counters.
//! - A scheduled retry re-checks the handle's closed flag after waking; a
//!   stale timer can never resurrect a superseded connection.
//! - Failures inside the channel task never propagate as errors to the
//!   caller; the only caller-visible signal is the connection state.
//!
//! # Example
//!
//! ```no_run
//! use leadview::{ChannelMode, SessionClient, ViewerEvent, ViewerOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = ViewerOptions::builder()
//!     .base_url("ws://dashboard.internal:8000")
//!     .build();
//!
//! let mut client = SessionClient::open("session-42", ChannelMode::Control, options)?;
//!
//! while let Some(event) = client.next_event().await {
//!     match event {
//!         ViewerEvent::HistoryReplaced(messages) => log::info!("{} messages", messages.len()),
//!         ViewerEvent::MessageAppended(msg) => log::info!("{:?}: {}", msg.role, msg.content),
//!         _ => {}
//!     }
//! }
//!
//! client.close().await;
//! # Ok(())
//! # }
//! ```

mod client_impl;
pub mod reconnect;
mod tasks;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::classifier::EventClassifier;
use crate::transport::WsTransport;
use crate::types::messages::ChatMessage;
use crate::types::{ChannelMode, ConnectionState, SessionId};
use reconnect::ReconnectPolicy;

/// Event delivered to the caller, in strict frame-arrival order
#[derive(Debug, Clone)]
pub enum ViewerEvent {
    /// Connection state transition
    StateChanged(ConnectionState),
    /// `history` frame: the transcript is replaced wholesale
    HistoryReplaced(Vec<ChatMessage>),
    /// `message` frame: one message appended
    MessageAppended(ChatMessage),
    /// `handover` frame, already synthesized into a system-role message.
    /// Disabling the input box and relabeling the mode indicator is the
    /// caller's responsibility.
    HandoverReceived(ChatMessage),
}

/// State shared between the handle and its channel task
pub(crate) struct HandleShared {
    state: AtomicU8,
    closed: AtomicBool,
}

impl HandleShared {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(ConnectionState::Idle.as_u8()),
            closed: AtomicBool::new(false),
        }
    }

    pub(crate) fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub(crate) fn set_state(&self, state: ConnectionState) {
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }

    /// Whether the handle was explicitly closed or superseded
    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Mark the handle closed; returns the previous value
    pub(crate) fn mark_closed(&self) -> bool {
        self.closed.swap(true, Ordering::SeqCst)
    }
}

/// Handle owning one realtime channel for a `(session_id, mode)` pair
pub struct SessionClient {
    /// Session this handle is bound to
    session_id: SessionId,
    /// Access level of the channel
    mode: ChannelMode,
    /// Transport layer
    transport: Arc<tokio::sync::Mutex<WsTransport>>,
    /// State shared with the channel task
    shared: Arc<HandleShared>,
    /// Per-handle retry counter
    retry: Arc<ReconnectPolicy>,
    /// Echo-suppression state shared with the channel task
    classifier: Arc<parking_lot::Mutex<EventClassifier>>,
    /// Event receiver (if not yet taken by the caller)
    event_rx: Option<mpsc::UnboundedReceiver<ViewerEvent>>,
    /// Channel task handle, aborted on drop
    channel_task: Option<JoinHandle<()>>,
}
