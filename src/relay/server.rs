use axum::extract::ws::{Message, WebSocket};
use chrono::Utc;
use futures::stream::StreamExt;
use futures::SinkExt;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::protocol::{ClientEvent, ServerEvent};
use super::session::{SessionOptions, StreamingSession};
use crate::http::{AppState, SessionInfo};
use crate::upstream::{system_instructions, LiveSessionConfig};

const CHANNEL_CAPACITY: usize = 256;

/// Serve one relay client connection end to end.
///
/// Three channels of traffic meet here: client audio and control text flow
/// into the session task, AI audio flows back out through the writer task.
/// Whatever ends the connection, the session task tears down exactly once.
pub async fn handle_connection(socket: WebSocket, state: AppState) {
    info!("Relay client connected");

    let (outbound_tx, mut outbound_rx) = mpsc::channel::<ServerEvent>(CHANNEL_CAPACITY);
    let (client_tx, client_rx) = mpsc::channel::<ClientEvent>(CHANNEL_CAPACITY);

    let live_config = LiveSessionConfig {
        model: state.config.upstream.model.clone(),
        voice: state.config.upstream.voice.clone(),
        system_instructions: system_instructions(),
        input_sample_rate: state.config.audio.capture_sample_rate,
    };
    let options = SessionOptions {
        recordings_dir: state.config.audio.recordings_path.clone().into(),
        capture_sample_rate: state.config.audio.capture_sample_rate,
        default_ai_sample_rate: state.config.audio.playback_sample_rate,
    };

    let (mut ws_tx, mut ws_rx) = socket.split();

    // Upstream session creation is the one failure that aborts a connection.
    let session = match StreamingSession::open(
        state.connector.as_ref(),
        &live_config,
        outbound_tx.clone(),
        state.blob_store.clone(),
        options,
    )
    .await
    {
        Ok(session) => session,
        Err(e) => {
            error!("Rejecting connection, upstream session failed: {}", e);
            let event = ServerEvent::SessionClosed {
                reason: Some(format!("upstream unavailable: {}", e)),
            };
            if let Ok(json) = serde_json::to_string(&event) {
                let _ = ws_tx.send(Message::Text(json)).await;
            }
            let _ = ws_tx.close().await;
            return;
        }
    };

    let session_id = session.id();
    state.sessions.write().await.insert(
        session_id,
        SessionInfo {
            started_at: Utc::now(),
        },
    );

    // Writer task: relays session output to the client until the session
    // announces closure or the socket goes away.
    let writer = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            let done = matches!(event, ServerEvent::SessionClosed { .. });
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if ws_tx.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!("Failed to serialize server event: {}", e),
            }
            if done {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    let session_task = tokio::spawn(session.run(client_rx));

    // Read loop: parse client events and feed the session. A malformed
    // frame is reported and skipped, not fatal.
    while let Some(message) = ws_rx.next().await {
        let message = match message {
            Ok(m) => m,
            Err(e) => {
                warn!("Relay socket error: {}", e);
                break;
            }
        };

        match message {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => {
                    let ending = matches!(event, ClientEvent::EndStream);
                    if client_tx.send(event).await.is_err() {
                        break;
                    }
                    if ending {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Dropping malformed client event: {}", e);
                    let _ = outbound_tx
                        .send(ServerEvent::Error {
                            message: format!("malformed event: {}", e),
                        })
                        .await;
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    // Dropping the client channel is the disconnect signal for the session.
    drop(client_tx);
    drop(outbound_tx);

    if let Err(e) = session_task.await {
        error!("Session {} task panicked: {}", session_id, e);
    }
    if let Err(e) = writer.await {
        error!("Session {} writer task panicked: {}", session_id, e);
    }

    state.sessions.write().await.remove(&session_id);
    info!("Relay client disconnected (session {})", session_id);
}
