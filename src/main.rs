// leadview-tail: follow one dashboard session from the terminal.
//
// Connects to a session in observe or control mode and logs classified
// events as they arrive. In control mode, lines read from stdin are sent
// as operator messages; a line of just "/handover" returns the session
// to automated handling.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use leadview::{ChannelMode, SessionClient, ViewerEvent, ViewerOptions};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let base_url =
        std::env::var("LEADVIEW_URL").unwrap_or_else(|_| "ws://127.0.0.1:8000".to_string());
    let session = std::env::var("LEADVIEW_SESSION")
        .context("LEADVIEW_SESSION must name the session to follow")?;
    let mode = match std::env::var("LEADVIEW_MODE").as_deref() {
        Ok("control") => ChannelMode::Control,
        _ => ChannelMode::Observe,
    };

    let options = ViewerOptions::builder().base_url(base_url).build();
    let mut client = SessionClient::open(session.as_str(), mode, options)?;
    let mut events = client
        .take_event_receiver()
        .context("event receiver already taken")?;

    log::info!("following session {session} in {mode:?} mode");

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = mode == ChannelMode::Control;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    log::info!("channel finished; exiting");
                    break;
                };
                match event {
                    ViewerEvent::StateChanged(state) => log::info!("state: {state:?}"),
                    ViewerEvent::HistoryReplaced(messages) => {
                        log::info!("history: {} messages", messages.len());
                        for msg in &messages {
                            println!("[{}] {:?}: {}", msg.timestamp, msg.role, msg.content);
                        }
                    }
                    ViewerEvent::MessageAppended(msg) => {
                        println!("[{}] {:?}: {}", msg.timestamp, msg.role, msg.content);
                    }
                    ViewerEvent::HandoverReceived(msg) => {
                        println!("[{}] {:?}: {}", msg.timestamp, msg.role, msg.content);
                        log::info!("session handed back to automated handling");
                    }
                }
            }
            line = stdin.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) if line.trim() == "/handover" => {
                        if client.handover().await {
                            log::info!("handover sent");
                        }
                    }
                    Ok(Some(line)) if !line.trim().is_empty() => {
                        if !client.send(line.trim()).await {
                            log::warn!("message not sent (channel not open)");
                        }
                    }
                    Ok(Some(_)) => {}
                    Ok(None) | Err(_) => stdin_open = false,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("interrupted; closing session");
                break;
            }
        }
    }

    client.close().await;
    Ok(())
}
