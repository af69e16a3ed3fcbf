// Integration tests for the file-backed capture source
//
// These verify that a WAV recording is converted to the target format and
// emitted as fixed-interval PCM chunks, the same shape a session forwards to
// the recognition transport.

use std::path::PathBuf;
use std::time::Duration;

use live_scribe::{AudioCapture, CaptureConfig, WavCapture};
use tempfile::TempDir;

fn write_wav(dir: &TempDir, name: &str, sample_rate: u32, channels: u16, samples: usize) -> PathBuf {
    let path = dir.path().join(name);
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for i in 0..samples * channels as usize {
        writer.write_sample((i % 128) as i16).unwrap();
    }
    writer.finalize().unwrap();
    path
}

fn fast_config() -> CaptureConfig {
    CaptureConfig {
        sample_rate: 16000,
        channels: 1,
        // Short interval keeps the replay quick in tests.
        chunk_interval: Duration::from_millis(20),
    }
}

#[tokio::test]
async fn wav_capture_emits_fixed_size_chunks() {
    let dir = TempDir::new().unwrap();
    // 0.5s of 16kHz mono: 8000 samples.
    let path = write_wav(&dir, "mono.wav", 16000, 1, 8000);

    let mut capture = WavCapture::new(path, fast_config());
    let mut rx = capture.start().await.unwrap();
    assert!(capture.is_capturing());

    let mut chunks = Vec::new();
    while let Some(chunk) = rx.recv().await {
        chunks.push(chunk);
    }

    // 16000 Hz * 20ms = 320 samples = 640 bytes per chunk; 8000/320 = 25.
    assert_eq!(chunks.len(), 25);
    assert!(chunks.iter().all(|c| c.pcm.len() == 640));

    let total: usize = chunks.iter().map(|c| c.pcm.len()).sum();
    assert_eq!(total, 8000 * 2);

    // Timestamps advance by the chunk interval in capture order.
    assert_eq!(chunks[0].timestamp_ms, 0);
    assert_eq!(chunks[1].timestamp_ms, 20);
    assert_eq!(chunks.last().unwrap().timestamp_ms, 24 * 20);

    capture.stop().await.unwrap();
    assert!(!capture.is_capturing());
}

#[tokio::test]
async fn wav_capture_converts_stereo_and_rate() {
    let dir = TempDir::new().unwrap();
    // 0.25s of 32kHz stereo: downsamples 2:1 and folds to mono.
    let path = write_wav(&dir, "stereo.wav", 32000, 2, 8000);

    let mut capture = WavCapture::new(path, fast_config());
    let mut rx = capture.start().await.unwrap();

    let mut total_bytes = 0usize;
    while let Some(chunk) = rx.recv().await {
        total_bytes += chunk.pcm.len();
    }

    // 8000 stereo frames -> 8000 mono samples -> 4000 at 16kHz -> 8000 bytes.
    assert_eq!(total_bytes, 8000);

    capture.stop().await.unwrap();
}

#[tokio::test]
async fn wav_capture_stop_halts_replay() {
    let dir = TempDir::new().unwrap();
    // 10s of audio so the replay outlives the test unless stopped.
    let path = write_wav(&dir, "long.wav", 16000, 1, 160_000);

    let mut capture = WavCapture::new(path, fast_config());
    let mut rx = capture.start().await.unwrap();

    // Take a couple of chunks, then stop mid-replay.
    let _ = rx.recv().await.unwrap();
    let _ = rx.recv().await.unwrap();
    capture.stop().await.unwrap();

    // The sender task is gone, so the channel drains to completion.
    while rx.recv().await.is_some() {}
    assert!(!capture.is_capturing());
}

#[tokio::test]
async fn wav_capture_missing_file_is_an_error() {
    let mut capture = WavCapture::new(PathBuf::from("/nonexistent/missing.wav"), fast_config());
    assert!(capture.start().await.is_err());
    assert!(!capture.is_capturing());
}

#[tokio::test]
async fn wav_capture_rejects_double_start() {
    let dir = TempDir::new().unwrap();
    let path = write_wav(&dir, "mono.wav", 16000, 1, 1600);

    let mut capture = WavCapture::new(path, fast_config());
    let _rx = capture.start().await.unwrap();
    assert!(capture.start().await.is_err());

    capture.stop().await.unwrap();
}
