//! # LeadView realtime session viewer
//!
//! Client library for the lead-management dashboard's realtime session
//! viewer. It owns the one piece of the dashboard with an actual state
//! machine: establishing a per-session duplex channel, classifying inbound
//! events, and recovering from disconnection with bounded backoff retries.
//!
//! ## Quick Start
//!
//! Open a session and consume its events:
//!
//! ```no_run
//! use leadview::{ChannelMode, SessionClient, ViewerEvent, ViewerOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = ViewerOptions::builder()
//!         .base_url("ws://dashboard.internal:8000")
//!         .build();
//!
//!     let mut client = SessionClient::open("session-42", ChannelMode::Observe, options)?;
//!
//!     while let Some(event) = client.next_event().await {
//!         match event {
//!             ViewerEvent::MessageAppended(msg) => {
//!                 log::info!("{:?}: {}", msg.role, msg.content);
//!             }
//!             _ => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! For a whole dashboard instance, use [`SessionSwitcher`]: it guarantees at
//! most one active connection, folds events into a [`Transcript`], and
//! caches the per-session [`LeadDetails`] the modals read:
//!
//! ```no_run
//! # use leadview::{ChannelMode, LeadDetails, SessionSwitcher, ViewerOptions};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut switcher = SessionSwitcher::new(ViewerOptions::default());
//!
//! switcher
//!     .switch_to("session-42", ChannelMode::Control, LeadDetails::named("Ada"))
//!     .await?;
//! switcher.send_message("Hello, I'm taking over this chat.").await;
//! switcher.handover().await;
//! switcher.close_current().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`types`]: identifiers, message/frame types, options builder
//! - [`transport`]: the WebSocket channel to `/ws/{mode}/{session_id}`
//! - [`classifier`]: inbound frame classification and echo suppression
//! - [`client`]: connection handle with per-handle reconnect policy
//! - [`manager`]: session switching and per-session dashboard state
//! - [`transcript`]: the message list behind the rendered view
//! - [`error`]: error types and handling
//!
//! ## Failure contract
//!
//! Nothing in this crate throws past its boundary once a channel is open:
//! transport failures are retried up to the configured budget, malformed and
//! unknown frames are dropped, and invalid local operations (sending outside
//! control mode) are no-ops. The only caller-visible signal is the
//! [`ConnectionState`], polled from the handle or observed through
//! [`ViewerEvent::StateChanged`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classifier;
pub mod client;
pub mod error;
pub mod manager;
pub mod transcript;
pub mod transport;
pub mod types;

// Re-export commonly used types for external API
pub use classifier::{Classified, DropReason, EventClassifier};
pub use client::reconnect::ReconnectPolicy;
pub use client::{SessionClient, ViewerEvent};
pub use error::{Result, ViewerError};
pub use manager::{LeadDetails, SessionSwitcher};
pub use transcript::Transcript;
pub use transport::{Transport, WsTransport};
pub use types::identifiers::SessionId;
pub use types::messages::{ChatMessage, InboundFrame, OutboundFrame, Role};
pub use types::options::{ViewerOptions, ViewerOptionsBuilder};
pub use types::{ChannelMode, ConnectionState};

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
