//! Integration tests for the session switch controller
//!
//! A loopback WebSocket server records which endpoint path every connection
//! arrived on, so the tests can prove the single-active-connection guarantee:
//! after switching away from a session, no handle ever dials it again.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::json;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};

use leadview::{
    ChannelMode, ConnectionState, LeadDetails, Role, SessionSwitcher, ViewerOptions,
};

/// Records every connection's request path. Each connection gets a history
/// frame on open; message frames are echoed back as admin messages and
/// handover frames are answered with a handover notice, the way the
/// dashboard backend behaves.
async fn spawn_recording_server() -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let paths = Arc::new(Mutex::new(Vec::new()));

    let server_paths = Arc::clone(&paths);
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let paths = Arc::clone(&server_paths);
            tokio::spawn(async move {
                let mut path = String::new();
                let callback = |req: &Request, resp: Response| {
                    path = req.uri().path().to_string();
                    Ok(resp)
                };
                let Ok(mut ws) = tokio_tungstenite::accept_hdr_async(stream, callback).await
                else {
                    return;
                };
                paths.lock().push(path);

                let history = json!({
                    "type": "history",
                    "messages": [{
                        "role": "user",
                        "content": "hello?",
                        "timestamp": "2025-06-01T09:00:00Z"
                    }]
                });
                if ws.send(WsMessage::Text(history.to_string())).await.is_err() {
                    return;
                }

                while let Some(Ok(message)) = ws.next().await {
                    let WsMessage::Text(text) = message else {
                        continue;
                    };
                    let Ok(frame) = serde_json::from_str::<serde_json::Value>(&text) else {
                        continue;
                    };
                    let reply = match frame["type"].as_str() {
                        Some("message") => json!({
                            "type": "message",
                            "role": "admin",
                            "content": frame["content"],
                            "timestamp": "2025-06-01T09:00:05Z"
                        }),
                        Some("handover") => json!({
                            "type": "handover",
                            "content": "AI assistant has taken over the conversation"
                        }),
                        _ => continue,
                    };
                    if ws.send(WsMessage::Text(reply.to_string())).await.is_err() {
                        return;
                    }
                }
            });
        }
    });

    (addr, paths)
}

fn options_for(addr: SocketAddr) -> ViewerOptions {
    ViewerOptions::builder()
        .base_url(format!("ws://{addr}"))
        .retry_step(Duration::from_millis(25))
        .build()
}

async fn wait_until(mut condition: impl FnMut() -> bool, what: &str) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {what}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn switching_leaves_exactly_one_live_connection() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (addr, paths) = spawn_recording_server().await;
    let mut switcher = SessionSwitcher::new(options_for(addr));

    switcher
        .switch_to("lead-a", ChannelMode::Observe, LeadDetails::named("Ada"))
        .await
        .unwrap();
    wait_until(
        || switcher.connection_state() == ConnectionState::Open,
        "session A to open",
    )
    .await;

    switcher
        .switch_to("lead-b", ChannelMode::Observe, LeadDetails::named("Ben"))
        .await
        .unwrap();
    wait_until(
        || switcher.connection_state() == ConnectionState::Open,
        "session B to open",
    )
    .await;

    let (active, mode) = switcher.active_session().expect("a session is active");
    assert_eq!(active.as_str(), "lead-b");
    assert_eq!(mode, ChannelMode::Observe);

    // Long enough for any stale retry timer from the A handle to have fired
    tokio::time::sleep(Duration::from_millis(400)).await;

    let seen = paths.lock().clone();
    assert_eq!(
        seen,
        vec!["/ws/view/lead-a".to_string(), "/ws/view/lead-b".to_string()],
        "the superseded handle must never dial again"
    );

    switcher.close_current().await;
}

#[tokio::test]
async fn switch_resets_transcript_to_the_new_session() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (addr, _paths) = spawn_recording_server().await;
    let mut switcher = SessionSwitcher::new(options_for(addr));

    switcher
        .switch_to("lead-a", ChannelMode::Observe, LeadDetails::named("Ada"))
        .await
        .unwrap();
    wait_until(|| !switcher.transcript().is_empty(), "history from A").await;

    switcher
        .switch_to("lead-b", ChannelMode::Observe, LeadDetails::named("Ben"))
        .await
        .unwrap();
    wait_until(|| !switcher.transcript().is_empty(), "history from B").await;

    // Only B's history frame, never A's leftovers
    assert_eq!(switcher.transcript().len(), 1);
    assert_eq!(switcher.details(), Some(LeadDetails::named("Ben")));

    switcher.close_current().await;
}

#[tokio::test]
async fn close_current_clears_all_per_session_state() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (addr, _paths) = spawn_recording_server().await;
    let mut switcher = SessionSwitcher::new(options_for(addr));

    switcher
        .switch_to("lead-a", ChannelMode::Control, LeadDetails::named("Ada"))
        .await
        .unwrap();
    wait_until(
        || switcher.connection_state() == ConnectionState::Open,
        "session to open",
    )
    .await;
    assert!(switcher.is_control_active());

    switcher.close_current().await;

    assert!(switcher.active_session().is_none());
    assert_eq!(switcher.connection_state(), ConnectionState::Idle);
    assert!(switcher.transcript().is_empty());
    assert_eq!(switcher.details(), None);
    assert!(!switcher.is_control_active());
}

#[tokio::test]
async fn sent_message_renders_once_despite_server_echo() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (addr, _paths) = spawn_recording_server().await;
    let mut switcher = SessionSwitcher::new(options_for(addr));

    switcher
        .switch_to("lead-a", ChannelMode::Control, LeadDetails::named("Ada"))
        .await
        .unwrap();
    // Wait for the history frame too, so its replace cannot race the local
    // echo we are about to append
    wait_until(|| !switcher.transcript().is_empty(), "history to arrive").await;

    assert!(switcher.send_message("I'm taking over this chat").await);

    // The server echoes the admin message straight back; give it time to
    // arrive and (correctly) be suppressed
    tokio::time::sleep(Duration::from_millis(200)).await;

    let copies = switcher
        .transcript()
        .iter()
        .filter(|m| m.content == "I'm taking over this chat")
        .count();
    assert_eq!(copies, 1, "local echo plus suppression renders exactly once");

    switcher.close_current().await;
}

#[tokio::test]
async fn observe_mode_cannot_send() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (addr, _paths) = spawn_recording_server().await;
    let mut switcher = SessionSwitcher::new(options_for(addr));

    switcher
        .switch_to("lead-a", ChannelMode::Observe, LeadDetails::named("Ada"))
        .await
        .unwrap();
    wait_until(
        || switcher.connection_state() == ConnectionState::Open,
        "session to open",
    )
    .await;

    assert!(!switcher.is_control_active());
    assert!(!switcher.send_message("should go nowhere").await);
    assert!(
        !switcher.transcript().iter().any(|m| m.role == Role::Admin),
        "no local echo for a message that was never sent"
    );

    switcher.close_current().await;
}

#[tokio::test]
async fn handover_releases_control_and_appends_notice() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (addr, _paths) = spawn_recording_server().await;
    let mut switcher = SessionSwitcher::new(options_for(addr));

    switcher
        .switch_to("lead-a", ChannelMode::Control, LeadDetails::named("Ada"))
        .await
        .unwrap();
    wait_until(
        || switcher.connection_state() == ConnectionState::Open,
        "session to open",
    )
    .await;

    assert!(switcher.handover().await);
    assert!(!switcher.is_control_active());

    wait_until(
        || switcher.transcript().iter().any(|m| m.role == Role::System),
        "server handover notice",
    )
    .await;
    let notice = switcher
        .transcript()
        .into_iter()
        .find(|m| m.role == Role::System)
        .unwrap();
    assert_eq!(notice.content, "AI assistant has taken over the conversation");

    // Control does not come back; further sends are no-ops
    assert!(!switcher.send_message("too late").await);

    switcher.close_current().await;
}

#[tokio::test]
async fn sessions_open_in_control_mode_use_the_control_path() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (addr, paths) = spawn_recording_server().await;
    let mut switcher = SessionSwitcher::new(options_for(addr));

    switcher
        .switch_to("lead-a", ChannelMode::Control, LeadDetails::default())
        .await
        .unwrap();
    wait_until(
        || switcher.connection_state() == ConnectionState::Open,
        "session to open",
    )
    .await;

    assert_eq!(paths.lock().clone(), vec!["/ws/control/lead-a".to_string()]);

    switcher.close_current().await;
}
