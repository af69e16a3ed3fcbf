use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recognized fragment received from the transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptFragment {
    /// Recognized text
    pub text: String,

    /// Whether the service marked this result final
    pub is_final: bool,

    /// Confidence score (0.0 to 1.0), if the service provides one
    pub confidence: Option<f32>,

    /// When this fragment was received
    pub received_at: DateTime<Utc>,
}

/// Append a fragment to the accumulated transcript
///
/// Fragments are joined with a single space and the transcript never starts
/// with a separator; callers filter out empty fragments before appending.
pub fn append_fragment(transcript: &mut String, text: &str) {
    if !transcript.is_empty() {
        transcript.push(' ');
    }
    transcript.push_str(text);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_fragment_has_no_leading_separator() {
        let mut transcript = String::new();
        append_fragment(&mut transcript, "hello");
        assert_eq!(transcript, "hello");
    }

    #[test]
    fn fragments_join_with_single_spaces() {
        let mut transcript = String::new();
        for text in ["hello", "world", "again"] {
            append_fragment(&mut transcript, text);
        }
        assert_eq!(transcript, "hello world again");
    }
}
