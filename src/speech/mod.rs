//! Speech service credentials and single-shot speech recognition.

mod recognizer;

pub use recognizer::{
    DEFAULT_CAPTURE_COMMAND, DEFAULT_LANGUAGE, MicrophoneInput, Recognition, Recognizer,
    SpeechInput,
};

use std::fmt;

/// Subscription credentials for the speech service.
///
/// Both parts must be non-empty; the key is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct SpeechConfig {
    key: String,
    region: String,
}

impl SpeechConfig {
    /// Builds a config when both key and region are present and non-empty.
    pub fn from_parts(key: Option<&str>, region: Option<&str>) -> Option<Self> {
        let key = key.map(str::trim).filter(|k| !k.is_empty())?;
        let region = region.map(str::trim).filter(|r| !r.is_empty())?;
        Some(Self {
            key: key.to_string(),
            region: region.to_string(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Base URL of the text-to-speech host for this region.
    pub fn tts_host(&self) -> String {
        format!("https://{}.tts.speech.microsoft.com", self.region)
    }

    /// Base URL of the speech-to-text host for this region.
    pub fn stt_host(&self) -> String {
        format!("https://{}.stt.speech.microsoft.com", self.region)
    }
}

impl fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("key", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

/// Header carrying the subscription key on every speech service request.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Errors from speech recognition.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("Audio capture failed: {0}")]
    Capture(String),

    #[error("Failed to run capture command: {0}")]
    Io(#[from] std::io::Error),

    #[error("Speech request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Speech service error {status}: {body}")]
    Service {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Recognizer already closed")]
    Closed,
}
