use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;

use super::{SUBSCRIPTION_KEY_HEADER, SpeechConfig, SpeechError};

/// Recognition language used when none is configured.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Records five seconds of 16 kHz mono WAV from the default input to stdout.
pub const DEFAULT_CAPTURE_COMMAND: &[&str] = &[
    "arecord", "-q", "-d", "5", "-f", "S16_LE", "-r", "16000", "-c", "1", "-t", "wav", "-",
];

/// Outcome of a single-shot recognition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognition {
    Recognized(String),
    NoMatch,
}

impl Recognition {
    /// Recognized text, `None` when nothing usable was heard.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Recognized(text) if !text.trim().is_empty() => Some(text),
            _ => None,
        }
    }
}

/// A one-shot recognizer. Created per utterance and closed afterwards.
#[async_trait]
pub trait Recognizer: Send {
    async fn recognize_once(&mut self) -> Result<Recognition, SpeechError>;

    fn close(&mut self);
}

/// Source of recognizers bound to the default audio input.
pub trait SpeechInput: Send + Sync {
    fn recognizer(&self, speech: &SpeechConfig) -> Result<Box<dyn Recognizer>, SpeechError>;
}

/// Recognition through a capture command and the short-audio REST endpoint.
#[derive(Debug, Clone)]
pub struct MicrophoneInput {
    http: Client,
    capture: Vec<String>,
    language: String,
    host: Option<String>,
}

impl MicrophoneInput {
    pub fn new(capture: Vec<String>, language: String) -> Self {
        Self {
            http: Client::new(),
            capture,
            language,
            host: None,
        }
    }

    /// Sends recognition requests to `host` instead of the regional endpoint.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }
}

impl SpeechInput for MicrophoneInput {
    fn recognizer(&self, speech: &SpeechConfig) -> Result<Box<dyn Recognizer>, SpeechError> {
        if self.capture.is_empty() {
            return Err(SpeechError::Capture("no capture command configured".to_string()));
        }
        let host = self.host.clone().unwrap_or_else(|| speech.stt_host());
        let url = format!(
            "{}/speech/recognition/conversation/cognitiveservices/v1?language={}&format=simple",
            host.trim_end_matches('/'),
            self.language
        );
        Ok(Box::new(ShortAudioRecognizer {
            http: self.http.clone(),
            key: speech.key().to_string(),
            capture: self.capture.clone(),
            url,
            closed: false,
        }))
    }
}

struct ShortAudioRecognizer {
    http: Client,
    key: String,
    capture: Vec<String>,
    url: String,
    closed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ShortAudioResponse {
    recognition_status: String,
    #[serde(default)]
    display_text: Option<String>,
}

impl ShortAudioRecognizer {
    async fn capture(&self) -> Result<Vec<u8>, SpeechError> {
        let (program, args) = self
            .capture
            .split_first()
            .ok_or_else(|| SpeechError::Capture("no capture command configured".to_string()))?;

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(SpeechError::Capture(format!(
                "{program} exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(output.stdout)
    }

    async fn transcribe(&self, audio: Vec<u8>) -> Result<Recognition, SpeechError> {
        let response = self
            .http
            .post(&self.url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .header(
                "Content-Type",
                "audio/wav; codecs=audio/pcm; samplerate=16000",
            )
            .header("Accept", "application/json")
            .body(audio)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Service { status, body });
        }

        let result: ShortAudioResponse = response.json().await?;
        tracing::debug!(status = %result.recognition_status, "recognition finished");
        Ok(match result.display_text {
            Some(text) if result.recognition_status == "Success" && !text.trim().is_empty() => {
                Recognition::Recognized(text)
            }
            _ => Recognition::NoMatch,
        })
    }
}

#[async_trait]
impl Recognizer for ShortAudioRecognizer {
    async fn recognize_once(&mut self) -> Result<Recognition, SpeechError> {
        if self.closed {
            return Err(SpeechError::Closed);
        }
        let audio = self.capture().await?;
        if audio.is_empty() {
            return Ok(Recognition::NoMatch);
        }
        self.transcribe(audio).await
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
