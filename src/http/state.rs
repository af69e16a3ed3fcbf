use crate::session::TranscriptionSession;
use std::sync::Arc;

/// Shared application state for HTTP handlers
///
/// One transcription session manager per process; the manager itself enforces
/// the at-most-one-active-session rule.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<TranscriptionSession>,
}

impl AppState {
    pub fn new(session: Arc<TranscriptionSession>) -> Self {
        Self { session }
    }
}
