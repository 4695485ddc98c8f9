//! Production speech platform backed by the Azure Speech REST endpoints.
//!
//! Relay credentials come from the avatar relay token endpoint. Speech is
//! synthesized through the text-to-speech REST endpoint and pushed as WAV
//! frames on the inbound audio track, where [`CommandPlayer`] plays them.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::process::Command;
use tokio::sync::mpsc;

use super::AvatarError;
use super::media::{AudioOutput, FrameSender, PeerConnection, TrackKind};
use super::platform::{AvatarConfig, AvatarSynthesizer, SpeechPlatform, SynthesisResult};
use super::relay::{RelayToken, fetch_relay_token};
use crate::speech::{SUBSCRIPTION_KEY_HEADER, SpeechConfig};

/// Plays a WAV file given as the last argument.
pub const DEFAULT_PLAYER_COMMAND: &[&str] = &["aplay", "-q"];

const SYNTHESIS_PATH: &str = "/cognitiveservices/v1";
const OUTPUT_FORMAT: &str = "riff-24khz-16bit-mono-pcm";

pub struct CognitiveSpeech {
    http: Client,
    host: Option<String>,
    output: Arc<dyn AudioOutput>,
}

impl CognitiveSpeech {
    pub fn new(output: Arc<dyn AudioOutput>) -> Self {
        Self {
            http: Client::new(),
            host: None,
            output,
        }
    }

    /// Sends relay and synthesis requests to `host` instead of the regional
    /// endpoint.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }
}

#[async_trait]
impl SpeechPlatform for CognitiveSpeech {
    async fn relay_token(&self, speech: &SpeechConfig) -> Result<RelayToken, AvatarError> {
        fetch_relay_token(&self.http, speech, self.host.as_deref()).await
    }

    fn synthesizer(
        &self,
        speech: &SpeechConfig,
        voice: &str,
        avatar: &AvatarConfig,
    ) -> Result<Box<dyn AvatarSynthesizer>, AvatarError> {
        let host = self.host.clone().unwrap_or_else(|| speech.tts_host());
        Ok(Box::new(RestSynthesizer {
            http: self.http.clone(),
            url: format!("{}{SYNTHESIS_PATH}", host.trim_end_matches('/')),
            key: speech.key().to_string(),
            voice: voice.to_string(),
            avatar: avatar.clone(),
            audio: None,
        }))
    }

    fn audio_output(&self) -> Arc<dyn AudioOutput> {
        Arc::clone(&self.output)
    }
}

struct RestSynthesizer {
    http: Client,
    url: String,
    key: String,
    voice: String,
    avatar: AvatarConfig,
    audio: Option<FrameSender>,
}

#[async_trait]
impl AvatarSynthesizer for RestSynthesizer {
    async fn start_avatar(&mut self, connection: &mut PeerConnection) -> Result<(), AvatarError> {
        self.audio = Some(connection.open_remote_track(TrackKind::Audio)?);
        tracing::debug!(
            character = %self.avatar.character,
            style = %self.avatar.style,
            voice = %self.voice,
            "speech session started"
        );
        Ok(())
    }

    async fn speak_text(&mut self, text: &str) -> Result<SynthesisResult, AvatarError> {
        let audio = self.audio.as_ref().ok_or(AvatarError::NotInitialized)?;

        let response = self
            .http
            .post(&self.url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", OUTPUT_FORMAT)
            .header("User-Agent", concat!("assess/", env!("CARGO_PKG_VERSION")))
            .body(ssml(&self.voice, text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Ok(SynthesisResult::canceled(format!("{status}: {body}")));
        }

        let wav = response.bytes().await?;
        if audio.send(wav).is_err() {
            return Ok(SynthesisResult::canceled("audio track closed"));
        }
        Ok(SynthesisResult::completed())
    }

    fn close(&mut self) -> Result<(), AvatarError> {
        self.audio = None;
        Ok(())
    }
}

/// Builds the SSML document for one utterance.
fn ssml(voice: &str, text: &str) -> String {
    format!(
        "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' xml:lang='{}'>\
         <voice name='{}'>{}</voice></speak>",
        voice_locale(voice),
        escape_xml(voice),
        escape_xml(text)
    )
}

/// `en-US-AvaMultilingualNeural` → `en-US`.
fn voice_locale(voice: &str) -> String {
    let mut parts = voice.splitn(3, '-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(lang), Some(region), Some(_)) if !lang.is_empty() && !region.is_empty() => {
            escape_xml(&format!("{lang}-{region}"))
        }
        _ => "en-US".to_string(),
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Plays each audio frame by writing it to disk and running a player command.
///
/// Stream ids restart with every avatar session, so each track also gets a
/// number from this player to keep utterance files apart.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    command: Vec<String>,
    dir: PathBuf,
    tracks: Arc<AtomicUsize>,
}

impl CommandPlayer {
    pub fn new(command: Vec<String>, dir: PathBuf) -> Self {
        Self {
            command,
            dir,
            tracks: Arc::new(AtomicUsize::new(0)),
        }
    }
}

fn utterance_name(stream_id: &str, track: usize, played: usize) -> String {
    format!("{stream_id}-{track}-{played}.wav")
}

impl AudioOutput for CommandPlayer {
    fn play(
        &self,
        stream_id: &str,
        mut frames: mpsc::UnboundedReceiver<Bytes>,
    ) -> Result<(), AvatarError> {
        let Some((program, args)) = self.command.split_first() else {
            return Err(AvatarError::Playback("no audio player configured".into()));
        };
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|err| AvatarError::Playback(err.to_string()))?;

        let program = program.clone();
        let args = args.to_vec();
        let dir = self.dir.clone();
        let stream_id = stream_id.to_string();
        let track = self.tracks.fetch_add(1, Ordering::Relaxed) + 1;

        runtime.spawn(async move {
            let mut played = 0usize;
            while let Some(frame) = frames.recv().await {
                played += 1;
                let path = dir.join(utterance_name(&stream_id, track, played));
                if let Err(err) = crate::fs::atomic_write(&path, &frame) {
                    tracing::warn!(error = %err, "could not write utterance");
                    continue;
                }
                match Command::new(&program).args(&args).arg(&path).status().await {
                    Ok(status) if status.success() => {}
                    Ok(status) => {
                        tracing::warn!(%status, player = %program, "audio player failed");
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, player = %program, "audio player failed");
                    }
                }
                if let Err(err) = tokio::fs::remove_file(&path).await {
                    tracing::debug!(error = %err, "could not remove played utterance");
                }
            }
            tracing::debug!(%stream_id, played, "audio track ended");
        });
        Ok(())
    }
}
