use anyhow::{bail, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::audio::CaptureSource;
use crate::session::{SessionOptions, TranscriptPolicy};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub transcription: TranscriptionConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptionConfig {
    /// Streaming recognition endpoint (wss URL with query params)
    pub endpoint: String,

    /// Trusted backend route that issues short-lived tokens
    pub key_url: String,

    /// Append interim results too (default: finals only)
    #[serde(default)]
    pub interim_results: bool,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    /// "microphone" or "wav"
    #[serde(default = "default_source")]
    pub source: String,

    /// WAV file to replay when source = "wav"
    pub wav_path: Option<PathBuf>,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_channels")]
    pub channels: u16,

    #[serde(default = "default_chunk_interval_ms")]
    pub chunk_interval_ms: u64,
}

fn default_source() -> String {
    "microphone".to_string()
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_channels() -> u16 {
    1
}

fn default_chunk_interval_ms() -> u64 {
    250
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            endpoint: self.transcription.endpoint.clone(),
            chunk_interval: Duration::from_millis(self.audio.chunk_interval_ms),
            policy: if self.transcription.interim_results {
                TranscriptPolicy::Every
            } else {
                TranscriptPolicy::FinalOnly
            },
            sample_rate: self.audio.sample_rate,
            channels: self.audio.channels,
        }
    }

    pub fn capture_source(&self) -> Result<CaptureSource> {
        match self.audio.source.as_str() {
            "microphone" => Ok(CaptureSource::Microphone),
            "wav" => match &self.audio.wav_path {
                Some(path) => Ok(CaptureSource::WavFile(path.clone())),
                None => bail!("audio.wav_path is required when audio.source = \"wav\""),
            },
            other => bail!("unknown audio source: {other}"),
        }
    }
}
