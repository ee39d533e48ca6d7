//! Background channel task for `SessionClient`
//!
//! One task per handle: it dials the channel, classifies inbound frames in
//! arrival order, and drives the bounded-backoff reconnect loop after an
//! unexpected disconnect.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::classifier::{Classified, EventClassifier};
use crate::transport::{Transport, WsTransport};
use crate::types::ConnectionState;

use super::reconnect::ReconnectPolicy;
use super::{HandleShared, ViewerEvent};

impl super::SessionClient {
    /// Channel task - dials, reads and classifies frames, reconnects
    pub(super) async fn channel_task(
        transport: Arc<tokio::sync::Mutex<WsTransport>>,
        shared: Arc<HandleShared>,
        retry: Arc<ReconnectPolicy>,
        classifier: Arc<parking_lot::Mutex<EventClassifier>>,
        event_tx: mpsc::UnboundedSender<ViewerEvent>,
    ) {
        // Initial dial; a failure here goes straight to the retry loop
        Self::dial(&transport, &shared, &retry, &event_tx).await;

        loop {
            if shared.state() == ConnectionState::Open {
                let mut frames = {
                    let mut transport_guard = transport.lock().await;
                    transport_guard.read_frames()
                };

                while let Some(result) = frames.recv().await {
                    match result {
                        Ok(value) => {
                            let classified = classifier.lock().classify(value);
                            let event = match classified {
                                Classified::History(messages) => {
                                    ViewerEvent::HistoryReplaced(messages)
                                }
                                Classified::Append(message) => {
                                    ViewerEvent::MessageAppended(message)
                                }
                                Classified::Handover(message) => {
                                    ViewerEvent::HandoverReceived(message)
                                }
                                Classified::Dropped(reason) => {
                                    log::debug!("frame dropped: {reason:?}");
                                    continue;
                                }
                            };
                            if event_tx.send(event).is_err() {
                                // Caller gone, nothing left to deliver to
                                return;
                            }
                        }
                        Err(e) => {
                            // Malformed frames are dropped; transport errors
                            // end the stream and land in the retry loop below
                            log::debug!("frame error: {e}");
                        }
                    }
                }

                // Stream ended
                shared.set_state(ConnectionState::Closed);
                let _ = event_tx.send(ViewerEvent::StateChanged(ConnectionState::Closed));

                if shared.is_closed() {
                    return;
                }
            }

            let Some(delay) = retry.next_delay() else {
                log::info!(
                    "reconnect budget exhausted after {} attempts; channel stays closed",
                    retry.attempts()
                );
                return;
            };

            log::info!(
                "reconnecting in {:?} (attempt {}/{})",
                delay,
                retry.attempts(),
                retry.max_retries()
            );
            tokio::time::sleep(delay).await;

            // Stale-timer guard: the handle may have been closed or
            // superseded while this retry was pending
            if shared.is_closed() {
                return;
            }

            Self::dial(&transport, &shared, &retry, &event_tx).await;
        }
    }

    /// One dial attempt: Connecting, then Open on success or Closed on failure
    async fn dial(
        transport: &Arc<tokio::sync::Mutex<WsTransport>>,
        shared: &Arc<HandleShared>,
        retry: &Arc<ReconnectPolicy>,
        event_tx: &mpsc::UnboundedSender<ViewerEvent>,
    ) -> bool {
        shared.set_state(ConnectionState::Connecting);
        let _ = event_tx.send(ViewerEvent::StateChanged(ConnectionState::Connecting));

        let result = {
            let mut transport_guard = transport.lock().await;
            // Re-check under the lock: close() may have won the race since
            // the sleep ended
            if shared.is_closed() {
                return false;
            }
            transport_guard.connect().await
        };

        match result {
            Ok(()) => {
                if shared.is_closed() {
                    // Superseded while the handshake was in flight; tear the
                    // fresh channel down instead of resurrecting the handle
                    let mut transport_guard = transport.lock().await;
                    let _ = transport_guard.close().await;
                    return false;
                }
                retry.reset();
                shared.set_state(ConnectionState::Open);
                let _ = event_tx.send(ViewerEvent::StateChanged(ConnectionState::Open));
                true
            }
            Err(e) => {
                log::warn!("dial failed: {e}");
                shared.set_state(ConnectionState::Closed);
                let _ = event_tx.send(ViewerEvent::StateChanged(ConnectionState::Closed));
                false
            }
        }
    }
}
