// Microphone capture via cpal's default input device.
//
// cpal streams are !Send, so the stream lives on a dedicated thread that
// buffers callback data and flushes one chunk per interval into a tokio
// channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use super::capture::{
    downsample, fold_to_mono, pcm_bytes, AudioCapture, AudioChunk, CaptureConfig, CaptureError,
};

pub struct MicrophoneCapture {
    config: CaptureConfig,
    stop: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<()>>,
    capturing: bool,
}

impl MicrophoneCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            stop: Arc::new(AtomicBool::new(false)),
            worker: None,
            capturing: false,
        }
    }
}

#[async_trait::async_trait]
impl AudioCapture for MicrophoneCapture {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioChunk>, CaptureError> {
        if self.capturing {
            return Err(CaptureError::AlreadyCapturing);
        }

        self.stop.store(false, Ordering::SeqCst);

        let (chunk_tx, chunk_rx) = mpsc::channel(64);
        let (ready_tx, ready_rx) = oneshot::channel();

        let config = self.config.clone();
        let stop = Arc::clone(&self.stop);

        let worker = thread::Builder::new()
            .name("mic-capture".into())
            .spawn(move || run_input_stream(config, chunk_tx, ready_tx, stop))
            .map_err(|e| CaptureError::Io(e.to_string()))?;

        // The thread reports whether the device opened before we claim success.
        match ready_rx.await {
            Ok(Ok(())) => {
                self.worker = Some(worker);
                self.capturing = true;
                Ok(chunk_rx)
            }
            Ok(Err(e)) => {
                let _ = worker.join();
                Err(e)
            }
            Err(_) => {
                let _ = worker.join();
                Err(CaptureError::DeviceAccess(
                    "capture thread exited during startup".into(),
                ))
            }
        }
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        if !self.capturing {
            return Ok(());
        }

        self.stop.store(true, Ordering::SeqCst);

        if let Some(worker) = self.worker.take() {
            let _ = tokio::task::spawn_blocking(move || worker.join()).await;
        }

        self.capturing = false;
        info!("microphone capture stopped");

        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "microphone"
    }
}

fn run_input_stream(
    config: CaptureConfig,
    chunk_tx: mpsc::Sender<AudioChunk>,
    ready_tx: oneshot::Sender<Result<(), CaptureError>>,
    stop: Arc<AtomicBool>,
) {
    let host = cpal::default_host();

    let Some(device) = host.default_input_device() else {
        let _ = ready_tx.send(Err(CaptureError::DeviceAccess(
            "no default input device".into(),
        )));
        return;
    };

    let supported = match device.default_input_config() {
        Ok(c) => c,
        Err(e) => {
            let _ = ready_tx.send(Err(CaptureError::DeviceAccess(e.to_string())));
            return;
        }
    };

    let device_rate = supported.sample_rate().0;
    let device_channels = supported.channels();
    let stream_config: cpal::StreamConfig = supported.config();

    // Callback data accumulates here; the flush loop below drains it.
    let buffer: Arc<Mutex<Vec<i16>>> = Arc::new(Mutex::new(Vec::new()));
    let err_fn = |err: cpal::StreamError| warn!("input stream error: {err}");

    let built = match supported.sample_format() {
        cpal::SampleFormat::I16 => {
            let buffer = Arc::clone(&buffer);
            device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                err_fn,
                None,
            )
        }
        cpal::SampleFormat::F32 => {
            let buffer = Arc::clone(&buffer);
            device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend(
                            data.iter()
                                .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16),
                        );
                    }
                },
                err_fn,
                None,
            )
        }
        cpal::SampleFormat::U16 => {
            let buffer = Arc::clone(&buffer);
            device.build_input_stream(
                &stream_config,
                move |data: &[u16], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend(data.iter().map(|&s| ((s as i32) - 32768) as i16));
                    }
                },
                err_fn,
                None,
            )
        }
        other => {
            let _ = ready_tx.send(Err(CaptureError::DeviceAccess(format!(
                "unsupported sample format: {other:?}"
            ))));
            return;
        }
    };

    let stream = match built {
        Ok(s) => s,
        Err(e) => {
            let _ = ready_tx.send(Err(CaptureError::DeviceAccess(e.to_string())));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(CaptureError::DeviceAccess(e.to_string())));
        return;
    }

    let _ = ready_tx.send(Ok(()));

    info!(
        rate = device_rate,
        channels = device_channels,
        "microphone capture running"
    );

    flush_chunks(
        &config,
        device_rate,
        device_channels,
        &buffer,
        &chunk_tx,
        &stop,
    );

    drop(stream);
}

/// Drain the callback buffer once per interval into timestamped chunks
///
/// Chunks are stamped with the start of their interval, matching the
/// file-backed source: the first chunk is at 0.
fn flush_chunks(
    config: &CaptureConfig,
    device_rate: u32,
    device_channels: u16,
    buffer: &Mutex<Vec<i16>>,
    chunk_tx: &mpsc::Sender<AudioChunk>,
    stop: &AtomicBool,
) {
    let interval_ms = config.chunk_interval.as_millis() as u64;
    let mut timestamp_ms = 0u64;

    while !stop.load(Ordering::SeqCst) {
        thread::sleep(config.chunk_interval);

        let raw: Vec<i16> = match buffer.lock() {
            Ok(mut buf) => buf.drain(..).collect(),
            Err(_) => break,
        };

        let chunk_ts = timestamp_ms;
        timestamp_ms += interval_ms;

        if raw.is_empty() {
            continue;
        }

        let mono = if config.channels == 1 {
            fold_to_mono(&raw, device_channels)
        } else {
            raw
        };
        let samples = downsample(&mono, device_rate, config.sample_rate);

        let chunk = AudioChunk {
            pcm: pcm_bytes(&samples),
            timestamp_ms: chunk_ts,
        };

        // Receiver gone means the session is tearing down.
        if chunk_tx.blocking_send(chunk).is_err() {
            break;
        }
    }
}
