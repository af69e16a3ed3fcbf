use serde::Deserialize;

/// One recognition event from the streaming endpoint
///
/// Wire shape: `{ "channel": { "alternatives": [ { "transcript": "..." } ] },
/// "is_final": bool }`. Anything else the service sends (metadata, keepalives)
/// deserializes with `channel: None` and is ignored upstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecognitionEvent {
    #[serde(default)]
    pub channel: Option<Channel>,
    /// Absent on interim results and non-transcript events
    #[serde(default)]
    pub is_final: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Alternative {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl RecognitionEvent {
    /// The top alternative's transcript, if this event carries one
    pub fn fragment(&self) -> Option<&str> {
        let text = self.channel.as_ref()?.alternatives.first()?.transcript.trim();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    pub fn confidence(&self) -> Option<f32> {
        self.channel.as_ref()?.alternatives.first()?.confidence
    }
}
