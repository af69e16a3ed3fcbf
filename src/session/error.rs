use thiserror::Error;

/// Failure taxonomy of the session manager
///
/// Every variant leaves the session `Closed` with the capture device released.
/// None of them are retried automatically; reconnecting is always an explicit
/// caller `connect()`.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// Microphone denied or unavailable. The caller must retry after fixing
    /// device access.
    #[error("audio device unavailable: {0}")]
    DeviceAccess(String),

    /// The trusted backend refused to issue a token. Retryable.
    #[error("credential fetch failed: {0}")]
    Credential(String),

    /// Handshake or mid-stream socket failure. Retryable with a new session.
    #[error("recognition transport failed: {0}")]
    Transport(String),

    /// A session is already connecting or open; concurrent transition
    /// requests are rejected, not queued.
    #[error("a session is already connecting or open")]
    AlreadyActive,

    /// `disconnect()` arrived while this connect was in flight; the attempt
    /// released its resources and gave up without touching newer state.
    #[error("connect cancelled by disconnect")]
    Cancelled,
}
