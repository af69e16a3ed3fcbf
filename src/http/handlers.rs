use super::state::AppState;
use crate::session::{SessionError, SessionSnapshot, TranscriptFragment};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::info;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub session_id: Option<String>,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DisconnectResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub transcript: String,
    pub fragments: Vec<TranscriptFragment>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn status_for(err: &SessionError) -> StatusCode {
    match err {
        SessionError::AlreadyActive | SessionError::Cancelled => StatusCode::CONFLICT,
        SessionError::DeviceAccess(_)
        | SessionError::Credential(_)
        | SessionError::Transport(_) => StatusCode::BAD_GATEWAY,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /transcription/connect
/// Start a new live transcription session
pub async fn connect_session(State(state): State<AppState>) -> impl IntoResponse {
    match state.session.connect().await {
        Ok(()) => {
            let snapshot = state.session.snapshot();
            info!(session_id = ?snapshot.session_id, "transcription session started");
            (
                StatusCode::OK,
                Json(ConnectResponse {
                    session_id: snapshot.session_id,
                    status: snapshot.state.to_string(),
                    message: "Transcription session started".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => (
            status_for(&e),
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// POST /transcription/disconnect
/// Close the current session (no-op when nothing is active)
pub async fn disconnect_session(State(state): State<AppState>) -> impl IntoResponse {
    state.session.disconnect().await;

    (
        StatusCode::OK,
        Json(DisconnectResponse {
            status: state.session.state().to_string(),
            message: "Transcription session closed".to_string(),
        }),
    )
}

/// GET /transcription/status
/// Connection state, transcript length, and last error
pub async fn get_status(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.session.snapshot())
}

/// GET /transcription/transcript
/// Accumulated transcript (joined text plus individual fragments)
pub async fn get_transcript(State(state): State<AppState>) -> Json<TranscriptResponse> {
    Json(TranscriptResponse {
        transcript: state.session.transcript(),
        fragments: state.session.fragments(),
    })
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
