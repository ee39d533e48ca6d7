//! Integration tests for the WebSocket transport
//!
//! Each test stands up a real WebSocket server on a loopback port and drives
//! `WsTransport` against it: connect, frame delivery order, writes, close
//! semantics, and the unexpected-disconnect signal.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use leadview::{Transport, ViewerError, WsTransport};

/// One-connection server: completes the handshake, sends the scripted frames
/// in order, forwards anything it receives on the returned channel, then
/// waits for the client to go away.
async fn spawn_script_server(
    frames: Vec<serde_json::Value>,
) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        for frame in &frames {
            ws.send(WsMessage::Text(frame.to_string())).await.unwrap();
        }

        while let Some(Ok(message)) = ws.next().await {
            if let WsMessage::Text(text) = message {
                let _ = inbound_tx.send(text.to_string());
            }
        }
    });

    (addr, inbound_rx)
}

async fn recv_frame(
    frames: &mut mpsc::UnboundedReceiver<leadview::Result<serde_json::Value>>,
) -> serde_json::Value {
    tokio::time::timeout(Duration::from_secs(2), frames.recv())
        .await
        .expect("timed out waiting for frame")
        .expect("frame stream ended early")
        .expect("frame carried an error")
}

#[tokio::test]
async fn connects_and_delivers_frames_in_order() {
    let _ = env_logger::builder().is_test(true).try_init();

    let history = json!({"type": "history", "messages": []});
    let message = json!({
        "type": "message",
        "role": "user",
        "content": "hi",
        "timestamp": "2025-06-01T09:00:00Z"
    });
    let (addr, _inbound) = spawn_script_server(vec![history.clone(), message.clone()]).await;

    let mut transport = WsTransport::new(format!("ws://{addr}/ws/view/lead-1")).unwrap();
    transport.connect().await.unwrap();
    assert!(transport.is_ready());

    let mut frames = transport.read_frames();
    assert_eq!(recv_frame(&mut frames).await, history);
    assert_eq!(recv_frame(&mut frames).await, message);

    transport.close().await.unwrap();
}

#[tokio::test]
async fn send_text_reaches_the_server() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (addr, mut inbound) = spawn_script_server(vec![]).await;

    let mut transport = WsTransport::new(format!("ws://{addr}/ws/control/lead-1")).unwrap();
    transport.connect().await.unwrap();

    transport
        .send_text(r#"{"type":"message","content":"hello"}"#)
        .await
        .unwrap();

    let received = tokio::time::timeout(Duration::from_secs(2), inbound.recv())
        .await
        .expect("timed out waiting for server receive")
        .expect("server saw no frame");
    assert_eq!(received, r#"{"type":"message","content":"hello"}"#);

    transport.close().await.unwrap();
}

#[tokio::test]
async fn undecodable_text_surfaces_as_frame_error_not_stream_end() {
    let _ = env_logger::builder().is_test(true).try_init();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(WsMessage::Text("{not json".into())).await.unwrap();
        ws.send(WsMessage::Text(json!({"type": "handover", "content": "ok"}).to_string()))
            .await
            .unwrap();
        while let Some(Ok(_)) = ws.next().await {}
    });

    let mut transport = WsTransport::new(format!("ws://{addr}/ws/view/lead-1")).unwrap();
    transport.connect().await.unwrap();
    let mut frames = transport.read_frames();

    let first = tokio::time::timeout(Duration::from_secs(2), frames.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(first, Err(ViewerError::MalformedFrame { .. })));

    // The stream survives the bad frame
    let second = recv_frame(&mut frames).await;
    assert_eq!(second["type"], "handover");

    transport.close().await.unwrap();
}

#[tokio::test]
async fn server_close_ends_the_frame_stream() {
    let _ = env_logger::builder().is_test(true).try_init();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(WsMessage::Text(json!({"type": "history"}).to_string()))
            .await
            .unwrap();
        ws.close(None).await.unwrap();
    });

    let mut transport = WsTransport::new(format!("ws://{addr}/ws/view/lead-1")).unwrap();
    transport.connect().await.unwrap();
    let mut frames = transport.read_frames();

    recv_frame(&mut frames).await;

    // Close frame ends the stream; the receiver simply finishes
    let end = tokio::time::timeout(Duration::from_secs(2), frames.recv())
        .await
        .expect("timed out waiting for stream end");
    assert!(end.is_none());
    assert!(!transport.is_ready());
}

#[tokio::test]
async fn send_before_connect_is_an_error() {
    let mut transport = WsTransport::new("ws://127.0.0.1:9/ws/view/lead-1").unwrap();
    let result = transport.send_text("{}").await;
    assert!(matches!(result, Err(ViewerError::Transport(_))));
}

#[tokio::test]
async fn dial_failure_is_a_transport_error() {
    let _ = env_logger::builder().is_test(true).try_init();

    // Bind then drop, so the port is very likely unoccupied
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut transport = WsTransport::new(format!("ws://{addr}/ws/view/lead-1")).unwrap();
    let result = transport.connect().await;
    assert!(result.is_err());
    assert!(!transport.is_ready());
}

#[tokio::test]
async fn close_is_idempotent_and_safe_before_connect() {
    let mut transport = WsTransport::new("ws://127.0.0.1:9/ws/view/lead-1").unwrap();
    transport.close().await.unwrap();
    transport.close().await.unwrap();
}

#[test]
fn rejects_non_websocket_schemes() {
    assert!(matches!(
        WsTransport::new("http://127.0.0.1:8000/ws/view/lead-1"),
        Err(ViewerError::InvalidConfig(_))
    ));
    assert!(WsTransport::new("wss://dashboard.internal/ws/view/lead-1").is_ok());
}
