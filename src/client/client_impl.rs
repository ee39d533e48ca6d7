//! `SessionClient` implementation
//!
//! This module contains the constructor and public API methods for
//! `SessionClient`.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::classifier::EventClassifier;
use crate::error::{Result, ViewerError};
use crate::transport::{Transport, WsTransport};
use crate::types::messages::OutboundFrame;
use crate::types::options::ViewerOptions;
use crate::types::{ChannelMode, ConnectionState, SessionId};

use super::reconnect::ReconnectPolicy;
use super::{HandleShared, ViewerEvent};

impl super::SessionClient {
    /// Open a channel for a `(session_id, mode)` pair
    ///
    /// Validates the inputs, then spawns the channel task which performs the
    /// dial. A failed first dial does not surface here; per the failure
    /// contract it is logged and handed to the reconnect policy, and the
    /// caller observes it only through `StateChanged` events.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// Returns error if the session id is empty or the base URL scheme is
    /// not `ws://`/`wss://`
    pub fn open(
        session_id: impl Into<SessionId>,
        mode: ChannelMode,
        options: ViewerOptions,
    ) -> Result<super::SessionClient> {
        let session_id = session_id.into();
        if session_id.is_empty() {
            return Err(ViewerError::invalid_config("session id must be non-empty"));
        }

        let url = options.endpoint_url(mode, &session_id);
        let transport = Arc::new(tokio::sync::Mutex::new(WsTransport::new(url)?));

        let shared = Arc::new(HandleShared::new());
        let retry = Arc::new(ReconnectPolicy::new(options.max_retries, options.retry_step));
        let classifier = Arc::new(parking_lot::Mutex::new(EventClassifier::new(
            options.echo_window,
        )));

        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let channel_task = tokio::spawn(super::SessionClient::channel_task(
            Arc::clone(&transport),
            Arc::clone(&shared),
            Arc::clone(&retry),
            Arc::clone(&classifier),
            event_tx,
        ));

        Ok(super::SessionClient {
            session_id,
            mode,
            transport,
            shared,
            retry,
            classifier,
            event_rx: Some(event_rx),
            channel_task: Some(channel_task),
        })
    }

    /// Send an operator message
    ///
    /// Permitted only in control mode while the channel is open; anything
    /// else is a no-op, not an error - the UI simply disables input outside
    /// control mode. Returns whether the message was actually sent, so the
    /// caller knows whether to render the local echo.
    pub async fn send(&self, content: impl Into<String>) -> bool {
        if self.mode != ChannelMode::Control || self.state() != ConnectionState::Open {
            return false;
        }

        let content = content.into();
        let frame = OutboundFrame::Message {
            content: content.clone(),
        };
        let Ok(text) = serde_json::to_string(&frame) else {
            return false;
        };

        // Remember the echo before the write so a fast rebroadcast is
        // already covered by the suppression window
        self.classifier.lock().note_sent(content);

        let mut transport = self.transport.lock().await;
        if let Err(e) = transport.send_text(&text).await {
            log::warn!("failed to send operator message: {e}");
            return false;
        }
        true
    }

    /// Return the session to automated handling
    ///
    /// No-op outside control mode or when the channel is not open. Returns
    /// whether the handover frame was sent.
    pub async fn handover(&self) -> bool {
        if self.mode != ChannelMode::Control || self.state() != ConnectionState::Open {
            return false;
        }

        let Ok(text) = serde_json::to_string(&OutboundFrame::Handover) else {
            return false;
        };

        let mut transport = self.transport.lock().await;
        if let Err(e) = transport.send_text(&text).await {
            log::warn!("failed to send handover: {e}");
            return false;
        }
        true
    }

    /// Close the handle; idempotent
    ///
    /// Exhausts the retry counter first, so a pending scheduled retry
    /// becomes a no-op when its timer fires, then closes the transport.
    pub async fn close(&mut self) {
        if self.shared.mark_closed() {
            return;
        }

        self.retry.exhaust();
        self.shared.set_state(ConnectionState::Closed);

        let mut transport = self.transport.lock().await;
        if let Err(e) = transport.close().await {
            log::debug!("transport close: {e}");
        }
    }

    /// Current connection state
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// Session this handle is bound to
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Access level of the channel
    #[must_use]
    pub const fn mode(&self) -> ChannelMode {
        self.mode
    }

    /// Reconnect attempts claimed by the current handle
    #[must_use]
    pub fn retry_attempts(&self) -> u32 {
        self.retry.attempts()
    }

    /// Get the next event from the channel
    ///
    /// Returns `None` when the channel task has finished and all events have
    /// been drained, or when the receiver was taken.
    pub async fn next_event(&mut self) -> Option<ViewerEvent> {
        self.event_rx.as_mut()?.recv().await
    }

    /// Take the event receiver
    ///
    /// This allows the caller to consume events independently of the handle,
    /// e.g. from a dedicated apply task.
    pub fn take_event_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<ViewerEvent>> {
        self.event_rx.take()
    }
}

impl Drop for super::SessionClient {
    fn drop(&mut self) {
        // The channel task exits on its own once the handle is closed; abort
        // covers handles dropped without an explicit close
        if let Some(task) = self.channel_task.take() {
            task.abort();
        }
    }
}
