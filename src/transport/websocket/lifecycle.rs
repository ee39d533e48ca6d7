//! Lifecycle management for the WebSocket transport (connect, close)

use std::sync::atomic::Ordering;

use futures::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use crate::error::{Result, ViewerError};
use crate::transport::Transport;

use super::transport::WsTransport;

impl WsTransport {
    /// Dial the channel endpoint and split the stream for concurrent I/O
    ///
    /// Safe to call again after the channel drops; a ready transport is left
    /// untouched.
    ///
    /// # Errors
    /// Returns error if the handshake fails
    pub(super) async fn connect_impl(&mut self) -> Result<()> {
        if self.is_ready() {
            return Ok(());
        }

        let (ws, _response) = connect_async(&self.url)
            .await
            .map_err(|e| ViewerError::transport(format!("Failed to dial {}: {e}", self.url)))?;

        let (sink, stream) = ws.split();
        self.sink = Some(sink);
        self.stream = Some(stream);
        self.ready.store(true, Ordering::SeqCst);

        log::debug!("channel open: {}", self.url);
        Ok(())
    }

    /// Close the channel and clean up resources; idempotent
    pub(super) async fn close_impl(&mut self) -> Result<()> {
        self.ready.store(false, Ordering::SeqCst);

        if let Some(mut sink) = self.sink.take() {
            // Best-effort close handshake; the channel may already be gone
            let _ = sink.send(WsMessage::Close(None)).await;
            let _ = sink.close().await;
        }

        if let Some(task) = self.reader_task.take() {
            task.abort();
        }

        self.stream = None;
        Ok(())
    }

    /// Handle Drop cleanup
    pub(super) fn drop_impl(&mut self) {
        self.ready.store(false, Ordering::SeqCst);

        if let Some(task) = self.reader_task.take() {
            task.abort();
        }
    }
}
