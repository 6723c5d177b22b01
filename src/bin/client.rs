//! Terminal client for the live relay.
//!
//! Captures microphone audio at 16 kHz mono on a dedicated audio thread,
//! streams it to the relay as base64 PCM16 frames, and plays AI audio back
//! gaplessly at 24 kHz. Press Enter to stop recording; the client then sends
//! end-of-stream and waits for the session to close.

use anyhow::{Context, Result};
use base64::Engine;
use clap::Parser;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use futures::stream::StreamExt;
use futures::SinkExt;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{error, info, warn};
use velmo_live::{CaptureEncoder, ClientEvent, PlaybackScheduler, ScheduledChunk, ServerEvent};

const CAPTURE_SAMPLE_RATE: u32 = 16_000;
const PLAYBACK_SAMPLE_RATE: u32 = 24_000;

#[derive(Parser, Debug)]
#[command(name = "velmo-client", about = "Terminal client for the live relay")]
struct Args {
    /// Relay WebSocket endpoint
    #[arg(long, default_value = "ws://localhost:8080/live")]
    url: String,

    /// Samples per transmitted frame
    #[arg(long, default_value_t = velmo_live::DEFAULT_FRAME_SAMPLES)]
    frame_samples: usize,
}

/// Ordered playout samples with an output-clock position. The cpal output
/// callback drains it; the scheduler writes into it, padding silence up to
/// each chunk's assigned start so resumed playback never jumps into the past.
struct PlayoutBuffer {
    samples: VecDeque<f32>,
    consumed: u64,
}

impl PlayoutBuffer {
    fn new() -> Self {
        Self {
            samples: VecDeque::new(),
            consumed: 0,
        }
    }

    /// Current output clock in seconds.
    fn now(&self) -> f64 {
        self.consumed as f64 / PLAYBACK_SAMPLE_RATE as f64
    }

    fn write_head(&self) -> u64 {
        self.consumed + self.samples.len() as u64
    }

    fn schedule(&mut self, chunk: ScheduledChunk) {
        let start = (chunk.start * PLAYBACK_SAMPLE_RATE as f64).round() as u64;
        let head = self.write_head();
        if start > head {
            self.samples
                .extend(std::iter::repeat(0.0).take((start - head) as usize));
        }
        self.samples.extend(chunk.samples);
    }

    fn fill(&mut self, out: &mut [f32]) {
        for slot in out.iter_mut() {
            *slot = self.samples.pop_front().unwrap_or(0.0);
            self.consumed += 1;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    info!("Connecting to {}", args.url);
    let (ws, _response) = connect_async(&args.url)
        .await
        .context("Failed to connect to relay")?;
    let (mut ws_tx, mut ws_rx) = ws.split();
    info!("Connected. Recording... press Enter to stop.");

    // Capture runs on its own thread; the stream callback only forwards
    // samples over this channel.
    let (sample_tx, mut sample_rx) = mpsc::unbounded_channel::<Vec<f32>>();
    let stop_capture = Arc::new(AtomicBool::new(false));
    let capture_thread = {
        let stop = Arc::clone(&stop_capture);
        std::thread::spawn(move || {
            if let Err(e) = run_capture(sample_tx, stop) {
                error!("Capture failed: {}", e);
            }
        })
    };

    // Playback side: scheduler assigns start slots, the playout buffer and
    // its cpal thread render them.
    let playout = Arc::new(Mutex::new(PlayoutBuffer::new()));
    let stop_playback = Arc::new(AtomicBool::new(false));
    let playback_thread = {
        let playout = Arc::clone(&playout);
        let stop = Arc::clone(&stop_playback);
        std::thread::spawn(move || {
            if let Err(e) = run_playback(playout, stop) {
                error!("Playback failed: {}", e);
            }
        })
    };

    // Sender task: batch samples into fixed-size frames, then flush and
    // signal end-of-stream when capture stops.
    let frame_samples = args.frame_samples;
    let sender = tokio::spawn(async move {
        let mut encoder = CaptureEncoder::new(frame_samples);
        while let Some(samples) = sample_rx.recv().await {
            for frame in encoder.push(&samples) {
                if send_audio(&mut ws_tx, &frame).await.is_err() {
                    return;
                }
            }
        }
        if let Some(frame) = encoder.flush() {
            if send_audio(&mut ws_tx, &frame).await.is_err() {
                return;
            }
        }
        let end = serde_json::to_string(&ClientEvent::EndStream).unwrap_or_default();
        if let Err(e) = ws_tx.send(Message::Text(end)).await {
            warn!("Failed to send end-of-stream: {}", e);
        }
    });

    // Stop capture when the user presses Enter.
    {
        let stop = Arc::clone(&stop_capture);
        tokio::spawn(async move {
            let mut line = String::new();
            let mut reader = tokio::io::BufReader::new(tokio::io::stdin());
            use tokio::io::AsyncBufReadExt;
            let _ = reader.read_line(&mut line).await;
            info!("Stopping capture");
            stop.store(true, Ordering::SeqCst);
        });
    }

    // Reader loop: decode AI audio, enqueue, and drain through the scheduler
    // into the playout buffer.
    let mut scheduler = PlaybackScheduler::new(PLAYBACK_SAMPLE_RATE);
    while let Some(message) = ws_rx.next().await {
        let text = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!("Relay socket error: {}", e);
                break;
            }
        };

        match serde_json::from_str::<ServerEvent>(&text) {
            Ok(ServerEvent::AiAudio { audio, .. }) => {
                let pcm = match base64::engine::general_purpose::STANDARD.decode(&audio) {
                    Ok(pcm) => pcm,
                    Err(e) => {
                        warn!("Dropping malformed AI audio chunk: {}", e);
                        continue;
                    }
                };
                if let Err(e) = scheduler.enqueue_pcm(&pcm) {
                    warn!("Dropping undecodable AI audio chunk: {}", e);
                    continue;
                }
                if scheduler.begin_drain() {
                    match playout.lock() {
                        Ok(mut playout) => {
                            let now = playout.now();
                            while let Some(chunk) = scheduler.next_scheduled(now) {
                                playout.schedule(chunk);
                            }
                        }
                        Err(_) => warn!("Playout buffer lock poisoned; audio stays queued"),
                    }
                    scheduler.finish_drain();
                }
            }
            Ok(ServerEvent::SessionClosed { reason }) => {
                info!("Session closed: {:?}", reason);
                break;
            }
            Ok(ServerEvent::Error { message }) => warn!("Relay error: {}", message),
            Err(e) => warn!("Unparseable server event: {}", e),
        }
    }

    // Let any tail audio play out before shutting the output stream down.
    tokio::time::sleep(Duration::from_millis(500)).await;
    stop_capture.store(true, Ordering::SeqCst);
    stop_playback.store(true, Ordering::SeqCst);
    let _ = sender.await;
    let _ = capture_thread.join();
    let _ = playback_thread.join();

    Ok(())
}

async fn send_audio<S>(ws_tx: &mut S, frame: &[u8]) -> Result<()>
where
    S: futures::Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let event = ClientEvent::RealtimeAudio {
        audio: base64::engine::general_purpose::STANDARD.encode(frame),
    };
    let json = serde_json::to_string(&event).context("Failed to serialize audio event")?;
    ws_tx
        .send(Message::Text(json))
        .await
        .context("Failed to send audio frame")
}

/// Own the cpal input stream for the life of the capture.
fn run_capture(
    sample_tx: mpsc::UnboundedSender<Vec<f32>>,
    stop: Arc<AtomicBool>,
) -> Result<()> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .context("No default input device")?;
    let config = cpal::StreamConfig {
        channels: 1,
        sample_rate: cpal::SampleRate(CAPTURE_SAMPLE_RATE),
        buffer_size: cpal::BufferSize::Default,
    };

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let _ = sample_tx.send(data.to_vec());
            },
            |e| error!("Input stream error: {}", e),
            None,
        )
        .context("Failed to build input stream")?;
    stream.play().context("Failed to start input stream")?;

    while !stop.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(50));
    }
    // Dropping the stream stops the callback and closes the sample channel.
    Ok(())
}

/// Own the cpal output stream, rendering the playout buffer.
fn run_playback(playout: Arc<Mutex<PlayoutBuffer>>, stop: Arc<AtomicBool>) -> Result<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .context("No default output device")?;
    let config = cpal::StreamConfig {
        channels: 1,
        sample_rate: cpal::SampleRate(PLAYBACK_SAMPLE_RATE),
        buffer_size: cpal::BufferSize::Default,
    };

    let stream = device
        .build_output_stream(
            &config,
            move |out: &mut [f32], _: &cpal::OutputCallbackInfo| {
                match playout.lock() {
                    Ok(mut playout) => playout.fill(out),
                    Err(_) => out.fill(0.0),
                }
            },
            |e| error!("Output stream error: {}", e),
            None,
        )
        .context("Failed to build output stream")?;
    stream.play().context("Failed to start output stream")?;

    while !stop.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(50));
    }
    Ok(())
}
