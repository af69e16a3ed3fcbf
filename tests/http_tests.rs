// Integration tests for the HTTP control API.
//
// The session behind the router uses a capture source that cannot start, so
// connect attempts exercise the error mapping without touching a microphone
// or a live recognition endpoint.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use live_scribe::{
    create_router, AppState, CaptureSource, DefaultCaptureFactory, SessionOptions,
    StaticTokenProvider, TranscriptionSession,
};
use serde_json::Value;

async fn serve_app() -> SocketAddr {
    let session = Arc::new(TranscriptionSession::new(
        SessionOptions::default(),
        Arc::new(StaticTokenProvider::new("test-token")),
        // A missing WAV file makes every capture start fail deterministically.
        Arc::new(DefaultCaptureFactory::new(CaptureSource::WavFile(
            PathBuf::from("/nonexistent/missing.wav"),
        ))),
    ));

    let router = create_router(AppState::new(session));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn health_endpoint_responds() {
    let addr = serve_app().await;

    let response = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn status_reports_closed_session() {
    let addr = serve_app().await;

    let body: Value = reqwest::get(format!("http://{addr}/transcription/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["state"], "closed");
    assert_eq!(body["transcript"], "");
    assert_eq!(body["fragment_count"], 0);
    assert!(body["last_error"].is_null());
}

#[tokio::test]
async fn failed_connect_maps_to_bad_gateway() {
    let addr = serve_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{addr}/transcription/connect"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 502);

    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("audio device"));

    // The failure is visible in the status afterwards.
    let status: Value = client
        .get(format!("http://{addr}/transcription/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["state"], "closed");
    assert!(!status["last_error"].is_null());
}

#[tokio::test]
async fn disconnect_without_session_is_ok() {
    let addr = serve_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{addr}/transcription/disconnect"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "closed");
}

#[tokio::test]
async fn transcript_endpoint_returns_empty_session() {
    let addr = serve_app().await;

    let body: Value = reqwest::get(format!("http://{addr}/transcription/transcript"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["transcript"], "");
    assert_eq!(body["fragments"].as_array().unwrap().len(), 0);
}
