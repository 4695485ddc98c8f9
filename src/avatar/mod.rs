//! Talking avatar driven by the speech service.
//!
//! [`Avatar`] is the narrow capability the chat controller depends on:
//! `init`, `speak`, `close`. [`AvatarClient`] implements it on top of a
//! [`SpeechPlatform`], which supplies relay credentials, the synthesizer and
//! audio output. [`CognitiveSpeech`] is the production platform.

mod client;
mod cognitive;
mod media;
mod platform;
mod relay;

#[cfg(test)]
pub(crate) mod testing;

pub use client::AvatarClient;
pub use cognitive::{CognitiveSpeech, CommandPlayer, DEFAULT_PLAYER_COMMAND};
pub use media::{
    AudioOutput, AvatarMount, ConnectionState, Direction, FrameSender, InboundTrack,
    MountedElement, PeerConnection, SharedMount, TrackHandler, TrackKind, Transceiver,
};
pub use platform::{AvatarConfig, AvatarSynthesizer, ResultReason, SpeechPlatform, SynthesisResult};
pub use relay::{IceServer, RelayToken, fetch_relay_token};

use async_trait::async_trait;

use crate::speech::SpeechConfig;

pub const DEFAULT_VOICE: &str = "en-US-AvaMultilingualNeural";
pub const DEFAULT_CHARACTER: &str = "lisa";
pub const DEFAULT_STYLE: &str = "casual-sitting";

/// Lifecycle of an avatar session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarState {
    Uninitialized,
    Initializing,
    Ready,
    Speaking,
    Closed,
}

/// Everything `init` needs to bring an avatar up.
#[derive(Debug, Clone)]
pub struct AvatarOptions {
    pub speech: SpeechConfig,
    pub mount: SharedMount,
    pub voice: String,
    pub character: String,
    pub style: String,
}

impl AvatarOptions {
    pub fn new(speech: SpeechConfig, mount: SharedMount) -> Self {
        Self {
            speech,
            mount,
            voice: DEFAULT_VOICE.to_string(),
            character: DEFAULT_CHARACTER.to_string(),
            style: DEFAULT_STYLE.to_string(),
        }
    }

    #[must_use]
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    #[must_use]
    pub fn with_persona(mut self, character: impl Into<String>, style: impl Into<String>) -> Self {
        self.character = character.into();
        self.style = style.into();
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    #[error("Speech SDK not available.")]
    SdkUnavailable,

    #[error("Avatar not initialized.")]
    NotInitialized,

    #[error("ICE token fetch failed: {0}")]
    RelayStatus(reqwest::StatusCode),

    #[error("Relay token has no ICE server URLs")]
    NoIceServer,

    #[error("Speech service request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Avatar synthesis failed: {0}")]
    Synthesis(String),

    #[error("Media transport error: {0}")]
    Transport(String),

    #[error("Audio playback failed: {0}")]
    Playback(String),
}

/// The avatar capability used by the chat controller.
#[async_trait]
pub trait Avatar: Send {
    /// Connects a new avatar session and mounts its media.
    async fn init(&mut self, options: AvatarOptions) -> Result<(), AvatarError>;

    /// Speaks `text` through the avatar. Only valid while ready.
    async fn speak(&mut self, text: &str) -> Result<(), AvatarError>;

    /// Tears the session down. Safe to call in any state, any number of times.
    fn close(&mut self);

    fn state(&self) -> AvatarState;
}
