pub mod audio;
pub mod config;
pub mod http;
pub mod session;
pub mod token;
pub mod transport;

pub use audio::{
    AudioCapture, AudioChunk, CaptureConfig, CaptureError, CaptureFactory, CaptureSource,
    DefaultCaptureFactory, MicrophoneCapture, WavCapture,
};
pub use config::Config;
pub use http::{create_router, AppState};
pub use session::{
    ConnectionState, SessionError, SessionOptions, SessionSnapshot, TranscriptFragment,
    TranscriptPolicy, TranscriptionSession,
};
pub use token::{HttpTokenProvider, StaticTokenProvider, TokenProvider};
pub use transport::RecognitionEvent;
