//! Frame reading logic for the WebSocket transport

use std::sync::Arc;
use std::sync::atomic::Ordering;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use crate::error::{Result, ViewerError};

use super::transport::WsTransport;

impl WsTransport {
    /// Read frames from the channel
    ///
    /// Spawns a background task that decodes inbound text frames into JSON
    /// values. The receiver closes when the channel ends, whether by a close
    /// frame, a transport error, or the stream simply finishing; that closure
    /// is what the reconnect policy observes.
    pub(super) fn read_frames_impl(&mut self) -> mpsc::UnboundedReceiver<Result<serde_json::Value>> {
        let (tx, rx) = mpsc::unbounded_channel();

        let stream = self.stream.take();
        let ready = Arc::clone(&self.ready);

        let task = tokio::spawn(async move {
            let Some(mut stream) = stream else {
                let _ = tx.send(Err(ViewerError::transport(
                    "Not connected - stream not available",
                )));
                return;
            };

            while let Some(item) = stream.next().await {
                match item {
                    Ok(WsMessage::Text(text)) => match serde_json::from_str::<serde_json::Value>(&text) {
                        Ok(value) => {
                            if tx.send(Ok(value)).is_err() {
                                // Receiver dropped, stop reading
                                break;
                            }
                        }
                        Err(e) => {
                            let _ = tx.send(Err(ViewerError::malformed_frame(
                                format!("undecodable text frame: {e}"),
                                None,
                            )));
                        }
                    },
                    Ok(WsMessage::Close(_)) => break,
                    Ok(_) => {} // Binary/Ping/Pong - ignore
                    Err(e) => {
                        let _ = tx.send(Err(ViewerError::transport(format!("channel error: {e}"))));
                        break;
                    }
                }
            }

            ready.store(false, Ordering::SeqCst);
        });

        // Store task handle for cleanup
        self.reader_task = Some(task);

        rx
    }
}
