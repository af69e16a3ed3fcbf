//! HTTP API server for external control (editor frontend)
//!
//! This module provides a REST API for driving the transcription session:
//! - POST /transcription/connect - Start a live transcription session
//! - POST /transcription/disconnect - Close the current session
//! - GET /transcription/status - Query session state
//! - GET /transcription/transcript - Get accumulated transcript
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
