// Tests for configuration loading and the derived session wiring.

use std::fs;
use std::time::Duration;

use live_scribe::{CaptureSource, Config, TranscriptPolicy};
use tempfile::TempDir;

fn write_config(dir: &TempDir, body: &str) -> String {
    let path = dir.path().join("live-scribe.toml");
    fs::write(&path, body).unwrap();
    dir.path().join("live-scribe").to_str().unwrap().to_string()
}

const BASE: &str = r#"
[service]
name = "live-scribe"

[service.http]
bind = "127.0.0.1"
port = 8787

[transcription]
endpoint = "wss://recognizer.example/v1/listen?encoding=linear16&sample_rate=16000&channels=1"
key_url = "http://localhost:3000/api/transcription/key"
"#;

#[test]
fn loads_config_with_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, &format!("{BASE}\n[audio]\n"));

    let cfg = Config::load(&path).unwrap();

    assert_eq!(cfg.service.name, "live-scribe");
    assert_eq!(cfg.service.http.port, 8787);
    assert_eq!(cfg.audio.source, "microphone");
    assert_eq!(cfg.audio.sample_rate, 16000);
    assert_eq!(cfg.audio.channels, 1);
    assert_eq!(cfg.audio.chunk_interval_ms, 250);
    assert!(!cfg.transcription.interim_results);
}

#[test]
fn session_options_follow_the_config() {
    let dir = TempDir::new().unwrap();
    let body = format!(
        "{BASE}\ninterim_results = true\n\n[audio]\nchunk_interval_ms = 100\n"
    );
    let path = write_config(&dir, &body);

    let cfg = Config::load(&path).unwrap();
    let options = cfg.session_options();

    assert!(options.endpoint.starts_with("wss://recognizer.example"));
    assert_eq!(options.chunk_interval, Duration::from_millis(100));
    assert_eq!(options.policy, TranscriptPolicy::Every);
}

#[test]
fn wav_source_requires_a_path() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, &format!("{BASE}\n[audio]\nsource = \"wav\"\n"));

    let cfg = Config::load(&path).unwrap();
    assert!(cfg.capture_source().is_err());
}

#[test]
fn wav_source_with_path_resolves() {
    let dir = TempDir::new().unwrap();
    let body = format!(
        "{BASE}\n[audio]\nsource = \"wav\"\nwav_path = \"/tmp/sample.wav\"\n"
    );
    let path = write_config(&dir, &body);

    let cfg = Config::load(&path).unwrap();
    match cfg.capture_source().unwrap() {
        CaptureSource::WavFile(p) => assert_eq!(p.to_str().unwrap(), "/tmp/sample.wav"),
        other => panic!("expected wav source, got {other:?}"),
    }
}

#[test]
fn unknown_source_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, &format!("{BASE}\n[audio]\nsource = \"cassette\"\n"));

    let cfg = Config::load(&path).unwrap();
    assert!(cfg.capture_source().is_err());
}
