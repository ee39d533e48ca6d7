//! Transport layer for the realtime session channel
//!
//! This module provides the transport abstraction and the WebSocket
//! implementation used to reach the dashboard's `/ws/{mode}/{session_id}`
//! endpoint.

pub mod websocket;

use tokio::sync::mpsc;

use crate::error::Result;

/// Transport trait for a duplex session channel
///
/// This trait defines the interface for sending and receiving frames on one
/// realtime channel.
pub trait Transport: Send + Sync {
    /// Dial the channel endpoint
    ///
    /// # Errors
    /// Returns error if the dial fails
    fn connect(&mut self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Write one text frame to the channel
    ///
    /// # Arguments
    /// * `data` - Frame payload (JSON text)
    ///
    /// # Errors
    /// Returns error if the write fails or the channel is not ready
    fn send_text(&mut self, data: &str) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Read frames from the channel
    ///
    /// Returns a receiver that yields JSON values decoded from inbound text
    /// frames. This method spawns a background task to read frames, allowing
    /// concurrent writes. The receiver is closed when the channel ends; that
    /// closure is the unexpected-disconnect signal the reconnect policy
    /// reacts to.
    fn read_frames(&mut self) -> mpsc::UnboundedReceiver<Result<serde_json::Value>>;

    /// Check if the channel is ready for communication
    fn is_ready(&self) -> bool;

    /// Close the channel and clean up resources; idempotent
    ///
    /// # Errors
    /// Returns error if cleanup fails
    fn close(&mut self) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub use websocket::WsTransport;
