//! Live transcription session management
//!
//! This module provides the `TranscriptionSession` manager that owns:
//! - Audio capture acquisition and release
//! - Short-lived credential fetch per connect
//! - The streaming transport to the recognition service
//! - Transcript accumulation and the connection-state machine
//! - Watch-channel observables for state, transcript, and errors

mod config;
mod error;
mod manager;
mod state;
mod transcript;

pub use config::{SessionOptions, TranscriptPolicy};
pub use error::SessionError;
pub use manager::{SessionSnapshot, TranscriptionSession};
pub use state::ConnectionState;
pub use transcript::{append_fragment, TranscriptFragment};
