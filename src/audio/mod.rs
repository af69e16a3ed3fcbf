pub mod capture;
pub mod mic;
pub mod wav;

pub use capture::{
    downsample, fold_to_mono, pcm_bytes, AudioCapture, AudioChunk, CaptureConfig, CaptureError,
    CaptureFactory, CaptureSource, DefaultCaptureFactory,
};
pub use mic::MicrophoneCapture;
pub use wav::WavCapture;
