// WAV Capture Demo: replay a recording through the capture pipeline
//
// Reads a WAV file and emits PCM chunks at the live cadence, the same way a
// session would feed the recognition transport. Useful for checking chunk
// sizing and pacing without a microphone or an API key.
//
// Usage: cargo run --example wav_capture -- path/to/recording.wav

use anyhow::{bail, Result};
use live_scribe::{AudioCapture, CaptureConfig, WavCapture};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let Some(path) = std::env::args().nth(1) else {
        bail!("usage: wav_capture <path-to-wav>");
    };

    let mut capture = WavCapture::new(path.into(), CaptureConfig::default());
    let mut rx = capture.start().await?;

    let mut chunks = 0usize;
    let mut bytes = 0usize;

    while let Some(chunk) = rx.recv().await {
        chunks += 1;
        bytes += chunk.pcm.len();
        info!(
            "chunk {} at {}ms: {} bytes",
            chunks, chunk.timestamp_ms, chunk.pcm.len()
        );
    }

    capture.stop().await?;

    info!("done: {} chunks, {} PCM bytes total", chunks, bytes);

    Ok(())
}
