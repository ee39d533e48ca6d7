//! Bounded linear backoff for channel reconnection
//!
//! After an unexpected disconnect the channel task asks the policy for the
//! next delay: attempt `n` waits `n * retry_step` (1s, 2s, ... up to the
//! configured maximum; a 0ms retry is never issued). Once the counter
//! reaches the maximum no further reopen is attempted - the channel stays
//! closed until the operator explicitly reopens a session.
//!
//! The counter is carried per handle and shared with the channel task via
//! `Arc`. Explicit close exhausts it, which turns any already-scheduled
//! retry into a no-op when the timer fires.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Per-handle retry counter with bounded linear backoff
#[derive(Debug)]
pub struct ReconnectPolicy {
    attempts: AtomicU32,
    max_retries: u32,
    retry_step: Duration,
}

impl ReconnectPolicy {
    /// Create a policy allowing `max_retries` attempts spaced by multiples
    /// of `retry_step`
    #[must_use]
    pub fn new(max_retries: u32, retry_step: Duration) -> Self {
        Self {
            attempts: AtomicU32::new(0),
            max_retries,
            retry_step,
        }
    }

    /// Claim the next reconnect attempt
    ///
    /// Returns the delay to wait before dialing, or `None` once the budget
    /// is exhausted. The first claimed attempt waits one full step; delays
    /// then grow linearly (1s, 2s, 3s, ...).
    pub fn next_delay(&self) -> Option<Duration> {
        let attempt = self
            .attempts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.max_retries).then_some(n + 1)
            })
            .ok()?;
        Some(self.retry_step * (attempt + 1))
    }

    /// Reset the counter after a successful open
    pub fn reset(&self) {
        self.attempts.store(0, Ordering::SeqCst);
    }

    /// Force the counter to the maximum so no further retry is claimed
    pub fn exhaust(&self) {
        self.attempts.store(self.max_retries, Ordering::SeqCst);
    }

    /// Whether the retry budget is spent
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.attempts.load(Ordering::SeqCst) >= self.max_retries
    }

    /// Attempts claimed so far
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Maximum number of attempts
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}
