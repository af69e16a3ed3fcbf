use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

/// One interval's worth of captured audio (16-bit little-endian PCM)
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Raw PCM bytes (i16 LE, interleaved)
    pub pcm: Vec<u8>,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for an audio capture source
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Target sample rate (will downsample if the device runs faster)
    pub sample_rate: u32,
    /// Target channel count (1 = mono)
    pub channels: u16,
    /// How much audio to buffer before emitting a chunk
    pub chunk_interval: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            chunk_interval: Duration::from_millis(250),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("audio device unavailable: {0}")]
    DeviceAccess(String),

    #[error("audio capture already running")]
    AlreadyCapturing,

    #[error("audio capture failed: {0}")]
    Io(String),
}

/// Audio capture source trait
///
/// Implementations:
/// - Microphone: cpal default input device
/// - WAV file: replays a recording at the chunk cadence (demos/tests)
#[async_trait::async_trait]
pub trait AudioCapture: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive chunks in capture order
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioChunk>, CaptureError>;

    /// Stop capturing and release the device
    async fn stop(&mut self) -> Result<(), CaptureError>;

    /// Check if the source is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get source name for logging
    fn name(&self) -> &str;
}

/// Where captured audio comes from
#[derive(Debug, Clone)]
pub enum CaptureSource {
    /// Default microphone input
    Microphone,
    /// WAV file replayed in real time
    WavFile(PathBuf),
}

/// Builds one capture source per session
///
/// A session constructs a fresh capture for every connect, so the factory is
/// the injection seam: the binary wires in [`DefaultCaptureFactory`], tests
/// supply scripted implementations.
pub trait CaptureFactory: Send + Sync {
    fn create(&self, config: &CaptureConfig) -> Result<Box<dyn AudioCapture>, CaptureError>;
}

pub struct DefaultCaptureFactory {
    source: CaptureSource,
}

impl DefaultCaptureFactory {
    pub fn new(source: CaptureSource) -> Self {
        Self { source }
    }
}

impl CaptureFactory for DefaultCaptureFactory {
    fn create(&self, config: &CaptureConfig) -> Result<Box<dyn AudioCapture>, CaptureError> {
        match &self.source {
            CaptureSource::Microphone => Ok(Box::new(super::mic::MicrophoneCapture::new(
                config.clone(),
            ))),
            CaptureSource::WavFile(path) => Ok(Box::new(super::wav::WavCapture::new(
                path.clone(),
                config.clone(),
            ))),
        }
    }
}

/// Downsample to a lower rate by linear interpolation
///
/// Handles non-integer ratios (44.1kHz devices are common); integer ratios
/// reduce to plain decimation. Never upsamples: a target at or above the
/// source rate passes through unchanged.
pub fn downsample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if to_rate == 0 || to_rate >= from_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = (samples.len() as f64 / ratio) as usize;
    let mut out = Vec::with_capacity(out_len);

    for i in 0..out_len {
        let pos = i as f64 * ratio;
        let idx = pos as usize;
        let frac = pos - idx as f64;
        let a = samples[idx] as f64;
        let b = samples[(idx + 1).min(samples.len() - 1)] as f64;
        out.push((a + (b - a) * frac).round() as i16);
    }

    out
}

/// Fold interleaved multi-channel samples to mono by summing channels
///
/// Summing (not averaging) preserves volume; the result is clamped.
pub fn fold_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }

    let width = channels as usize;
    let mut mono = Vec::with_capacity(samples.len() / width);

    for frame in samples.chunks_exact(width) {
        let sum: i32 = frame.iter().map(|&s| s as i32).sum();
        mono.push(sum.clamp(i16::MIN as i32, i16::MAX as i32) as i16);
    }

    mono
}

/// Serialize samples to little-endian PCM bytes
pub fn pcm_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downsample_halves_at_ratio_two() {
        let samples: Vec<i16> = (0..8).collect();
        let out = downsample(&samples, 32000, 16000);
        assert_eq!(out, vec![0, 2, 4, 6]);
    }

    #[test]
    fn downsample_passes_through_same_rate() {
        let samples = vec![1i16, 2, 3];
        assert_eq!(downsample(&samples, 16000, 16000), samples);
    }

    #[test]
    fn downsample_never_upsamples() {
        let samples = vec![1i16, 2, 3];
        assert_eq!(downsample(&samples, 16000, 48000), samples);
    }

    #[test]
    fn downsample_interpolates_non_integer_ratios() {
        // 10ms of a 44.1kHz ramp down to 16kHz: 441 in, 160 out.
        let samples: Vec<i16> = (0..441).collect();
        let out = downsample(&samples, 44100, 16000);

        assert_eq!(out.len(), 160);
        assert_eq!(out[0], 0);
        // Position 1 lands at 2.75625, between input samples 2 and 3.
        assert_eq!(out[1], 3);
        // Position 159 lands at 438.24.
        assert_eq!(out[159], 438);
    }

    #[test]
    fn fold_to_mono_sums_stereo_pairs() {
        let samples = vec![100i16, 200, -50, 50];
        assert_eq!(fold_to_mono(&samples, 2), vec![300, 0]);
    }

    #[test]
    fn fold_to_mono_clamps_on_overflow() {
        let samples = vec![i16::MAX, i16::MAX];
        assert_eq!(fold_to_mono(&samples, 2), vec![i16::MAX]);
    }

    #[test]
    fn pcm_bytes_are_little_endian() {
        assert_eq!(pcm_bytes(&[0x0102]), vec![0x02, 0x01]);
    }
}
