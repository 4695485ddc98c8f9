use async_trait::async_trait;
use std::sync::Arc;

use super::AvatarError;
use super::media::{AudioOutput, PeerConnection};
use super::relay::RelayToken;
use crate::speech::SpeechConfig;

/// Which avatar persona to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarConfig {
    pub character: String,
    pub style: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultReason {
    SynthesizingAudioCompleted,
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisResult {
    pub reason: ResultReason,
    pub error_details: Option<String>,
}

impl SynthesisResult {
    pub const fn completed() -> Self {
        Self {
            reason: ResultReason::SynthesizingAudioCompleted,
            error_details: None,
        }
    }

    pub fn canceled(details: impl Into<String>) -> Self {
        Self {
            reason: ResultReason::Canceled,
            error_details: Some(details.into()),
        }
    }
}

/// Vendor synthesizer bound to a peer connection.
#[async_trait]
pub trait AvatarSynthesizer: Send {
    /// Starts the avatar session; the service begins sending media over
    /// `connection`.
    async fn start_avatar(&mut self, connection: &mut PeerConnection) -> Result<(), AvatarError>;

    /// Synthesizes speech. A finished request that did not complete is
    /// reported through the result reason rather than an `Err`.
    async fn speak_text(&mut self, text: &str) -> Result<SynthesisResult, AvatarError>;

    fn close(&mut self) -> Result<(), AvatarError>;
}

/// The services an avatar session is assembled from.
#[async_trait]
pub trait SpeechPlatform: Send + Sync {
    async fn relay_token(&self, speech: &SpeechConfig) -> Result<RelayToken, AvatarError>;

    fn synthesizer(
        &self,
        speech: &SpeechConfig,
        voice: &str,
        avatar: &AvatarConfig,
    ) -> Result<Box<dyn AvatarSynthesizer>, AvatarError>;

    fn audio_output(&self) -> Arc<dyn AudioOutput>;
}
