// Integration tests for the short-lived token provider against a local
// stand-in for the trusted key backend.

use axum::{http::StatusCode, routing::get, Json, Router};
use live_scribe::{HttpTokenProvider, StaticTokenProvider, TokenProvider};
use serde_json::json;

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn fetches_key_from_backend() {
    let router = Router::new().route(
        "/api/transcription/key",
        get(|| async { Json(json!({ "key": "short-lived-token" })) }),
    );
    let base = serve(router).await;

    let provider = HttpTokenProvider::new(format!("{base}/api/transcription/key"));
    let token = provider.fetch_token().await.unwrap();
    assert_eq!(token, "short-lived-token");
}

#[tokio::test]
async fn backend_error_status_is_a_token_error() {
    let router = Router::new().route(
        "/api/transcription/key",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base = serve(router).await;

    let provider = HttpTokenProvider::new(format!("{base}/api/transcription/key"));
    let err = provider.fetch_token().await.unwrap_err();
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn empty_key_is_a_token_error() {
    let router = Router::new().route(
        "/api/transcription/key",
        get(|| async { Json(json!({ "key": "" })) }),
    );
    let base = serve(router).await;

    let provider = HttpTokenProvider::new(format!("{base}/api/transcription/key"));
    assert!(provider.fetch_token().await.is_err());
}

#[tokio::test]
async fn unreachable_backend_is_a_token_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let provider = HttpTokenProvider::new(format!("http://{addr}/api/transcription/key"));
    assert!(provider.fetch_token().await.is_err());
}

#[tokio::test]
async fn static_provider_returns_its_token() {
    let provider = StaticTokenProvider::new("dev-token");
    assert_eq!(provider.fetch_token().await.unwrap(), "dev-token");
}
