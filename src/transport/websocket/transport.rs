//! WebSocket transport for the session channel

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::SinkExt;
use futures::stream::{SplitSink, SplitStream};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::Transport;
use crate::error::{Result, ViewerError};

pub(super) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport bound to one channel endpoint URL
pub struct WsTransport {
    pub(super) url: String,
    pub(super) sink: Option<SplitSink<WsStream, WsMessage>>,
    pub(super) stream: Option<SplitStream<WsStream>>,
    pub(super) ready: Arc<AtomicBool>,
    pub(super) reader_task: Option<JoinHandle<()>>,
}

impl WsTransport {
    /// Create a new transport for the given endpoint URL
    ///
    /// # Errors
    /// Returns error if the URL scheme is not `ws://` or `wss://`
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if !url.starts_with("ws://") && !url.starts_with("wss://") {
            return Err(ViewerError::invalid_config(format!(
                "channel endpoint must be ws:// or wss://, got: {url}"
            )));
        }

        Ok(Self {
            url,
            sink: None,
            stream: None,
            ready: Arc::new(AtomicBool::new(false)),
            reader_task: None,
        })
    }

    /// The endpoint URL this transport dials
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for WsTransport {
    async fn connect(&mut self) -> Result<()> {
        self.connect_impl().await
    }

    async fn send_text(&mut self, data: &str) -> Result<()> {
        if !self.is_ready() {
            return Err(ViewerError::transport("Channel is not ready for writing"));
        }

        let sink = self
            .sink
            .as_mut()
            .ok_or_else(|| ViewerError::transport("sink not available"))?;

        sink.send(WsMessage::Text(data.to_string()))
            .await
            .map_err(|e| ViewerError::transport(format!("Failed to send frame: {e}")))?;

        Ok(())
    }

    fn read_frames(&mut self) -> mpsc::UnboundedReceiver<Result<serde_json::Value>> {
        self.read_frames_impl()
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn close(&mut self) -> Result<()> {
        self.close_impl().await
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.drop_impl();
    }
}
