//! Session switching and per-session dashboard state
//!
//! The switcher enforces the core invariant of the viewer: at most one
//! connection handle is active per dashboard instance. Opening a session
//! tears the previous handle down - and disarms its reconnect policy -
//! before the new dial begins.

mod details;
mod switcher;

pub use details::LeadDetails;
pub use switcher::SessionSwitcher;
