use std::time::Duration;

/// Which recognition results get appended to the transcript
///
/// The service streams interim hypotheses that are later superseded by a
/// final result for the same audio. Appending both duplicates text, so the
/// default keeps finals only; `Every` matches engines that only emit one
/// event per utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptPolicy {
    /// Append every fragment received, interim or final
    Every,
    /// Append only fragments marked final
    FinalOnly,
}

/// Configuration for a transcription session manager
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Streaming recognition endpoint (ws/wss URL, query params included)
    pub endpoint: String,

    /// How much audio to buffer per outgoing chunk
    pub chunk_interval: Duration,

    /// Interim-vs-final append policy
    pub policy: TranscriptPolicy,

    /// Capture sample rate (must match the endpoint's query params)
    pub sample_rate: u32,

    /// Capture channel count
    pub channels: u16,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            endpoint:
                "wss://api.deepgram.com/v1/listen?encoding=linear16&sample_rate=16000&channels=1"
                    .to_string(),
            chunk_interval: Duration::from_millis(250),
            policy: TranscriptPolicy::FinalOnly,
            sample_rate: 16000,
            channels: 1,
        }
    }
}
