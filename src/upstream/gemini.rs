use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use futures::stream::{SplitSink, StreamExt};
use futures::SinkExt;
use serde_json::json;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::client::{LiveConnector, LiveHandle, LiveSessionConfig, UpstreamEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Connector for the Gemini Live `BidiGenerateContent` WebSocket API.
pub struct GeminiLiveConnector {
    api_key: String,
    host: String,
}

impl GeminiLiveConnector {
    pub fn new(api_key: String, host: String) -> Self {
        Self { api_key, host }
    }

    fn endpoint(&self) -> String {
        format!(
            "wss://{}/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent?key={}",
            self.host, self.api_key
        )
    }
}

#[async_trait]
impl LiveConnector for GeminiLiveConnector {
    async fn connect(
        &self,
        config: &LiveSessionConfig,
    ) -> Result<(Box<dyn LiveHandle>, mpsc::Receiver<UpstreamEvent>)> {
        info!("Connecting live session to {}", self.host);

        let (ws, _response) = connect_async(self.endpoint())
            .await
            .context("Failed to connect to upstream live API")?;
        let (mut sink, mut stream) = ws.split();

        let setup = json!({
            "setup": {
                "model": format!("models/{}", config.model),
                "generationConfig": {
                    "responseModalities": ["AUDIO"],
                    "speechConfig": {
                        "voiceConfig": {
                            "prebuiltVoiceConfig": { "voiceName": config.voice }
                        }
                    }
                },
                "systemInstruction": {
                    "parts": [{ "text": config.system_instructions }]
                }
            }
        });
        sink.send(Message::Text(setup.to_string()))
            .await
            .context("Failed to send session setup")?;

        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        // Reader task: flatten server messages into the event stream. Exits
        // when the socket closes or the session drops its receiver.
        tokio::spawn(async move {
            while let Some(message) = stream.next().await {
                let text = match message {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Binary(data)) => match String::from_utf8(data) {
                        Ok(text) => text,
                        Err(_) => {
                            debug!("Ignoring non-UTF-8 binary frame from upstream");
                            continue;
                        }
                    },
                    Ok(Message::Close(frame)) => {
                        let reason = frame.map(|f| f.reason.to_string());
                        let _ = event_tx.send(UpstreamEvent::Closed { reason }).await;
                        return;
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        let _ = event_tx.send(UpstreamEvent::Error(e.to_string())).await;
                        let _ = event_tx
                            .send(UpstreamEvent::Closed {
                                reason: Some(e.to_string()),
                            })
                            .await;
                        return;
                    }
                };

                for event in parse_server_message(&text) {
                    if event_tx.send(event).await.is_err() {
                        return;
                    }
                }
            }
            let _ = event_tx.send(UpstreamEvent::Closed { reason: None }).await;
        });

        let handle = GeminiLiveHandle {
            sink,
            input_mime: format!("audio/pcm;rate={}", config.input_sample_rate),
        };

        Ok((Box::new(handle), event_rx))
    }
}

struct GeminiLiveHandle {
    sink: SplitSink<WsStream, Message>,
    input_mime: String,
}

#[async_trait]
impl LiveHandle for GeminiLiveHandle {
    async fn send_audio(&mut self, pcm: &[u8]) -> Result<()> {
        let message = json!({
            "realtimeInput": {
                "mediaChunks": [{
                    "mimeType": self.input_mime,
                    "data": base64::engine::general_purpose::STANDARD.encode(pcm),
                }]
            }
        });
        self.sink
            .send(Message::Text(message.to_string()))
            .await
            .context("Failed to send realtime audio upstream")
    }

    async fn send_control_text(&mut self, text: &str) -> Result<()> {
        let message = json!({
            "clientContent": {
                "turns": [{
                    "role": "user",
                    "parts": [{ "text": format!("<instructions>{}</instructions>", text) }]
                }],
                "turnComplete": true
            }
        });
        self.sink
            .send(Message::Text(message.to_string()))
            .await
            .context("Failed to send control text upstream")
    }

    async fn close(&mut self) -> Result<()> {
        if let Err(e) = self.sink.send(Message::Close(None)).await {
            warn!("Upstream close frame failed: {}", e);
        }
        self.sink.close().await.ok();
        Ok(())
    }
}

/// Parse one server message into zero or more upstream events.
pub fn parse_server_message(text: &str) -> Vec<UpstreamEvent> {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            warn!("Unparseable upstream message: {}", e);
            return Vec::new();
        }
    };

    let mut events = Vec::new();

    if value.get("setupComplete").is_some() {
        events.push(UpstreamEvent::Opened);
    }

    if let Some(server_content) = value.get("serverContent") {
        if let Some(parts) = server_content
            .get("modelTurn")
            .and_then(|t| t.get("parts"))
            .and_then(|p| p.as_array())
        {
            for part in parts {
                let Some(inline) = part.get("inlineData") else {
                    continue;
                };
                let Some(data) = inline.get("data").and_then(|d| d.as_str()) else {
                    continue;
                };
                match base64::engine::general_purpose::STANDARD.decode(data) {
                    Ok(pcm) if pcm.len() % 2 != 0 => {
                        warn!(
                            "Dropping truncated upstream audio chunk ({} bytes)",
                            pcm.len()
                        );
                    }
                    Ok(pcm) => {
                        let sample_rate = inline
                            .get("mimeType")
                            .and_then(|m| m.as_str())
                            .and_then(parse_rate_from_mime);
                        events.push(UpstreamEvent::Audio { pcm, sample_rate });
                    }
                    Err(e) => warn!("Dropping undecodable upstream audio chunk: {}", e),
                }
            }
        }

        if server_content
            .get("turnComplete")
            .and_then(|t| t.as_bool())
            .unwrap_or(false)
        {
            events.push(UpstreamEvent::TurnComplete);
        }
    }

    events
}

/// Extract the rate parameter from a MIME type like `audio/pcm;rate=24000`.
pub fn parse_rate_from_mime(mime: &str) -> Option<u32> {
    mime.split(';')
        .filter_map(|part| part.trim().strip_prefix("rate="))
        .find_map(|rate| rate.parse().ok())
}
