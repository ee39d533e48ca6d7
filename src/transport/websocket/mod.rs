//! WebSocket transport implementation

mod lifecycle;
mod reader;
mod transport;

pub use transport::WsTransport;
