//! The session switch controller

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::client::{SessionClient, ViewerEvent};
use crate::error::Result;
use crate::transcript::Transcript;
use crate::types::options::ViewerOptions;
use crate::types::{ChannelMode, ChatMessage, ConnectionState, SessionId};

use super::details::LeadDetails;

/// Enforces at-most-one active connection handle per dashboard instance
///
/// The switcher owns the single active handle reference, the transcript the
/// handle's events fold into, and the cached lead details the dashboard
/// modals read. Switching sessions closes the previous handle synchronously
/// before the new dial begins, so two handles are never connecting at once,
/// and a superseded handle's pending reconnect timer can never fire into a
/// live channel.
pub struct SessionSwitcher {
    options: ViewerOptions,
    active: Option<SessionClient>,
    transcript: Arc<Mutex<Transcript>>,
    details: Arc<Mutex<Option<LeadDetails>>>,
    /// True while the operator holds control of the session; flipped off by
    /// an inbound handover (the "View Mode" relabel contract)
    control_active: Arc<AtomicBool>,
}

impl SessionSwitcher {
    /// Create a switcher with the given options
    #[must_use]
    pub fn new(options: ViewerOptions) -> Self {
        Self {
            options,
            active: None,
            transcript: Arc::new(Mutex::new(Transcript::new())),
            details: Arc::new(Mutex::new(None)),
            control_active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Open a session, replacing whichever one was active
    ///
    /// Closes the previous handle first - exhausting its retry policy so any
    /// pending reconnect becomes a no-op - then opens the new channel and
    /// spawns the apply task that folds its events into the transcript.
    ///
    /// # Errors
    /// Returns error if the session id is empty or the base URL is invalid
    pub async fn switch_to(
        &mut self,
        session_id: impl Into<SessionId>,
        mode: ChannelMode,
        details: LeadDetails,
    ) -> Result<()> {
        if let Some(mut previous) = self.active.take() {
            log::debug!("closing session {} before switch", previous.session_id());
            previous.close().await;
        }

        // Fresh state per activation: a superseded handle's apply task may
        // still drain queued events, and must not touch the new session's
        // transcript or control flag
        self.transcript = Arc::new(Mutex::new(Transcript::new()));
        self.control_active = Arc::new(AtomicBool::new(mode == ChannelMode::Control));
        *self.details.lock() = Some(details);

        let mut client = SessionClient::open(session_id, mode, self.options.clone())?;

        if let Some(events) = client.take_event_receiver() {
            tokio::spawn(Self::apply_events(
                events,
                Arc::clone(&self.transcript),
                Arc::clone(&self.control_active),
            ));
        }

        log::info!("session {} open in {:?} mode", client.session_id(), mode);
        self.active = Some(client);
        Ok(())
    }

    /// Close the active session, if any, and clear all per-session state
    pub async fn close_current(&mut self) {
        if let Some(mut client) = self.active.take() {
            log::debug!("closing session {}", client.session_id());
            client.close().await;
        }

        self.transcript = Arc::new(Mutex::new(Transcript::new()));
        self.control_active = Arc::new(AtomicBool::new(false));
        *self.details.lock() = None;
    }

    /// Send an operator message over the active session
    ///
    /// No-op unless a control-mode session is open and the operator still
    /// holds control. The local echo is appended to the transcript only when
    /// the frame was actually sent.
    pub async fn send_message(&self, content: impl Into<String>) -> bool {
        if !self.control_active.load(Ordering::SeqCst) {
            return false;
        }
        let Some(client) = self.active.as_ref() else {
            return false;
        };

        let content = content.into();
        if client.send(content.clone()).await {
            self.transcript.lock().append(ChatMessage::admin_local(content));
            true
        } else {
            false
        }
    }

    /// Hand the active session back to automated handling
    ///
    /// Control is released locally as soon as the frame is sent; the server's
    /// own handover notice arrives as a system message.
    pub async fn handover(&self) -> bool {
        let Some(client) = self.active.as_ref() else {
            return false;
        };

        if client.handover().await {
            self.control_active.store(false, Ordering::SeqCst);
            true
        } else {
            false
        }
    }

    /// The `(session_id, mode)` of the active handle, if any
    #[must_use]
    pub fn active_session(&self) -> Option<(&SessionId, ChannelMode)> {
        self.active
            .as_ref()
            .map(|client| (client.session_id(), client.mode()))
    }

    /// Connection state of the active handle; `Idle` when none is active
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.active
            .as_ref()
            .map_or(ConnectionState::Idle, SessionClient::state)
    }

    /// Snapshot of the current transcript
    #[must_use]
    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.transcript.lock().messages().to_vec()
    }

    /// Cached lead details for the active session
    #[must_use]
    pub fn details(&self) -> Option<LeadDetails> {
        self.details.lock().clone()
    }

    /// Whether the operator currently holds control
    #[must_use]
    pub fn is_control_active(&self) -> bool {
        self.control_active.load(Ordering::SeqCst)
    }

    /// Apply task - folds one handle's events into the shared transcript
    async fn apply_events(
        mut events: mpsc::UnboundedReceiver<ViewerEvent>,
        transcript: Arc<Mutex<Transcript>>,
        control_active: Arc<AtomicBool>,
    ) {
        while let Some(event) = events.recv().await {
            match event {
                ViewerEvent::HistoryReplaced(messages) => {
                    transcript.lock().replace(messages);
                }
                ViewerEvent::MessageAppended(message) => {
                    transcript.lock().append(message);
                }
                ViewerEvent::HandoverReceived(message) => {
                    transcript.lock().append(message);
                    control_active.store(false, Ordering::SeqCst);
                }
                ViewerEvent::StateChanged(state) => {
                    log::debug!("connection state: {state:?}");
                }
            }
        }
    }
}
