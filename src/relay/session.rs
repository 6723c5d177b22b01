use anyhow::{Context, Result};
use base64::Engine;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::protocol::{ClientEvent, ServerEvent};
use super::recorder::RecordingStream;
use crate::storage::BlobStore;
use crate::upstream::{LiveConnector, LiveHandle, LiveSessionConfig, UpstreamEvent};

/// Lifecycle of one client connection's upstream relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Opening,
    Open,
    Closing,
    Closed,
}

/// Per-session knobs the relay server derives from its config.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Directory receiving both recording streams.
    pub recordings_dir: PathBuf,
    /// Sample rate of client audio (protocol constant, 16 kHz).
    pub capture_sample_rate: u32,
    /// Fallback rate for AI audio when the upstream declares none.
    pub default_ai_sample_rate: u32,
}

/// Bridges one client connection to one upstream live session, teeing both
/// audio directions into recording streams.
///
/// The session owns the upstream handle and both `RecordingStream`s; its
/// event loop is the single writer for each direction, so chunk order on
/// disk matches production order and no locking is needed in the writers.
pub struct StreamingSession {
    id: Uuid,
    state: SessionState,
    upstream: Box<dyn LiveHandle>,
    upstream_events: mpsc::Receiver<UpstreamEvent>,
    outbound: mpsc::Sender<ServerEvent>,
    user_recording: RecordingStream,
    ai_recording: RecordingStream,
    blob_store: Arc<dyn BlobStore>,
    options: SessionOptions,
}

impl StreamingSession {
    /// Request an upstream session and wrap it. Failure here aborts the
    /// connection; it is the only error that does.
    pub async fn open(
        connector: &dyn LiveConnector,
        live_config: &LiveSessionConfig,
        outbound: mpsc::Sender<ServerEvent>,
        blob_store: Arc<dyn BlobStore>,
        options: SessionOptions,
    ) -> Result<Self> {
        let (upstream, upstream_events) = connector
            .connect(live_config)
            .await
            .context("Failed to open upstream live session")?;

        Ok(Self::attach(
            upstream,
            upstream_events,
            outbound,
            blob_store,
            options,
        ))
    }

    /// Wrap an already-connected upstream handle. Used by `open` and by
    /// tests that substitute a mock upstream.
    pub fn attach(
        upstream: Box<dyn LiveHandle>,
        upstream_events: mpsc::Receiver<UpstreamEvent>,
        outbound: mpsc::Sender<ServerEvent>,
        blob_store: Arc<dyn BlobStore>,
        options: SessionOptions,
    ) -> Self {
        let id = Uuid::new_v4();
        info!("Session {} opening", id);

        Self {
            id,
            state: SessionState::Opening,
            upstream,
            upstream_events,
            outbound,
            user_recording: RecordingStream::new(&options.recordings_dir, "recording"),
            ai_recording: RecordingStream::new(&options.recordings_dir, "ai_response"),
            blob_store,
            options,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Drive the session until the client or the upstream ends it, then tear
    /// down exactly once.
    pub async fn run(mut self, mut client_rx: mpsc::Receiver<ClientEvent>) {
        let reason = loop {
            tokio::select! {
                event = client_rx.recv() => match event {
                    Some(ClientEvent::RealtimeAudio { audio }) => self.on_client_audio(&audio).await,
                    Some(ClientEvent::ControlText { text }) => self.on_control_text(&text).await,
                    Some(ClientEvent::EndStream) => break Some("end of stream".to_string()),
                    None => break Some("client disconnected".to_string()),
                },
                event = self.upstream_events.recv() => match event {
                    Some(UpstreamEvent::Opened) => {
                        info!("Session {} open", self.id);
                        self.state = SessionState::Open;
                    }
                    Some(UpstreamEvent::Audio { pcm, sample_rate }) => {
                        self.on_ai_audio(pcm, sample_rate).await;
                    }
                    Some(UpstreamEvent::TurnComplete) => {
                        debug!("Session {} turn complete", self.id);
                    }
                    Some(UpstreamEvent::Error(e)) => {
                        // Mid-session upstream errors are not terminal; the
                        // upstream signals termination with Closed.
                        warn!("Session {} upstream error: {}", self.id, e);
                    }
                    Some(UpstreamEvent::Closed { reason }) => {
                        break reason.or_else(|| Some("upstream closed".to_string()));
                    }
                    None => break Some("upstream event stream ended".to_string()),
                },
            }
        };

        self.close(reason).await;
    }

    /// Forward one client audio chunk upstream and tee it into the user
    /// recording. A malformed chunk is dropped; a transient upstream send
    /// failure is dropped too, favoring stream continuity over redelivery.
    async fn on_client_audio(&mut self, audio_b64: &str) {
        let pcm = match base64::engine::general_purpose::STANDARD.decode(audio_b64) {
            Ok(pcm) => pcm,
            Err(e) => {
                warn!("Session {} dropping malformed audio chunk: {}", self.id, e);
                return;
            }
        };
        if pcm.len() % 2 != 0 {
            // A torn final sample; forwarding or recording it would corrupt
            // every byte after it.
            warn!(
                "Session {} dropping truncated audio chunk ({} bytes)",
                self.id,
                pcm.len()
            );
            return;
        }

        if let Err(e) = self.upstream.send_audio(&pcm).await {
            warn!("Session {} failed to forward audio upstream: {}", self.id, e);
        }

        self.user_recording
            .append(&pcm, self.options.capture_sample_rate);
    }

    async fn on_control_text(&mut self, text: &str) {
        if let Err(e) = self.upstream.send_control_text(text).await {
            warn!("Session {} failed to forward control text: {}", self.id, e);
        }
    }

    /// Relay AI audio to the client and tee it into the AI recording, which
    /// is created lazily at the chunk's declared sample rate.
    async fn on_ai_audio(&mut self, pcm: Vec<u8>, sample_rate: Option<u32>) {
        let rate = sample_rate.unwrap_or(self.options.default_ai_sample_rate);

        let event = ServerEvent::AiAudio {
            audio: base64::engine::general_purpose::STANDARD.encode(&pcm),
            sample_rate,
        };
        if self.outbound.send(event).await.is_err() {
            debug!("Session {} client outbound channel closed", self.id);
        }

        self.ai_recording.append(&pcm, rate);
    }

    /// Finalize both recording streams, release the upstream handle, and
    /// notify the client. Idempotent: repeated teardown signals never reach
    /// an already-finalized stream.
    async fn close(&mut self, reason: Option<String>) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closing;
        info!("Session {} closing: {:?}", self.id, reason);

        let scope = self.id.to_string();
        self.user_recording
            .finalize_and_offload(Arc::clone(&self.blob_store), &scope);
        self.ai_recording
            .finalize_and_offload(Arc::clone(&self.blob_store), &scope);

        if let Err(e) = self.upstream.close().await {
            warn!("Session {} upstream close failed: {}", self.id, e);
        }

        let _ = self.outbound.send(ServerEvent::SessionClosed { reason }).await;
        self.state = SessionState::Closed;
        info!("Session {} closed", self.id);
    }
}
