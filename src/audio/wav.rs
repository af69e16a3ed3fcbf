// File-backed capture: replays a WAV recording at the live chunk cadence.
// Used by the demo binary and soak tests in place of a microphone.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hound::WavReader;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::capture::{
    downsample, fold_to_mono, pcm_bytes, AudioCapture, AudioChunk, CaptureConfig, CaptureError,
};

pub struct WavCapture {
    path: PathBuf,
    config: CaptureConfig,
    stop: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
    capturing: bool,
}

impl WavCapture {
    pub fn new(path: PathBuf, config: CaptureConfig) -> Self {
        Self {
            path,
            config,
            stop: Arc::new(AtomicBool::new(false)),
            task: None,
            capturing: false,
        }
    }
}

#[async_trait::async_trait]
impl AudioCapture for WavCapture {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioChunk>, CaptureError> {
        if self.capturing {
            return Err(CaptureError::AlreadyCapturing);
        }

        let reader =
            WavReader::open(&self.path).map_err(|e| CaptureError::Io(e.to_string()))?;
        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<_, _>>()
            .map_err(|e| CaptureError::Io(e.to_string()))?;

        info!(
            path = %self.path.display(),
            rate = spec.sample_rate,
            channels = spec.channels,
            samples = samples.len(),
            "wav capture loaded"
        );

        let mono = if self.config.channels == 1 {
            fold_to_mono(&samples, spec.channels)
        } else {
            samples
        };
        let resampled = downsample(&mono, spec.sample_rate, self.config.sample_rate);

        let interval = self.config.chunk_interval;
        let interval_ms = interval.as_millis() as u64;
        let samples_per_chunk = ((self.config.sample_rate as u64
            * self.config.channels as u64
            * interval_ms)
            / 1000)
            .max(1) as usize;

        self.stop.store(false, Ordering::SeqCst);
        let stop = Arc::clone(&self.stop);

        let (tx, rx) = mpsc::channel(64);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut offset = 0usize;
            let mut timestamp_ms = 0u64;

            while offset < resampled.len() {
                ticker.tick().await;
                if stop.load(Ordering::SeqCst) {
                    break;
                }

                let end = (offset + samples_per_chunk).min(resampled.len());
                let chunk = AudioChunk {
                    pcm: pcm_bytes(&resampled[offset..end]),
                    timestamp_ms,
                };

                if tx.send(chunk).await.is_err() {
                    break;
                }

                offset = end;
                timestamp_ms += interval_ms;
            }

            debug!("wav capture drained");
        });

        self.task = Some(task);
        self.capturing = true;

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        if !self.capturing {
            return Ok(());
        }

        self.stop.store(true, Ordering::SeqCst);

        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }

        self.capturing = false;

        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "wav-file"
    }
}
