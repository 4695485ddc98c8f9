use async_trait::async_trait;
use std::sync::Arc;

use super::media::{AudioOutput, Direction, PeerConnection, SharedMount, TrackKind};
use super::platform::{AvatarConfig, AvatarSynthesizer, ResultReason, SpeechPlatform};
use super::{Avatar, AvatarError, AvatarOptions, AvatarState};

struct LiveSession {
    connection: PeerConnection,
    synthesizer: Box<dyn AvatarSynthesizer>,
}

/// [`Avatar`] implementation holding at most one live session.
///
/// Without a platform every operation fails with
/// [`AvatarError::SdkUnavailable`] (except `close`).
pub struct AvatarClient {
    platform: Option<Arc<dyn SpeechPlatform>>,
    state: AvatarState,
    session: Option<LiveSession>,
}

impl AvatarClient {
    pub fn new(platform: Arc<dyn SpeechPlatform>) -> Self {
        Self {
            platform: Some(platform),
            state: AvatarState::Uninitialized,
            session: None,
        }
    }

    /// A client with no speech platform behind it.
    pub const fn unavailable() -> Self {
        Self {
            platform: None,
            state: AvatarState::Uninitialized,
            session: None,
        }
    }

    fn platform(&self) -> Result<Arc<dyn SpeechPlatform>, AvatarError> {
        self.platform.clone().ok_or(AvatarError::SdkUnavailable)
    }

    async fn connect(
        platform: &dyn SpeechPlatform,
        options: &AvatarOptions,
    ) -> Result<LiveSession, AvatarError> {
        let token = platform.relay_token(&options.speech).await?;
        let mut connection = PeerConnection::new(vec![token.ice_server()?]);
        mount_tracks(
            &mut connection,
            Arc::clone(&options.mount),
            platform.audio_output(),
        );

        let avatar = AvatarConfig {
            character: options.character.clone(),
            style: options.style.clone(),
        };
        let mut synthesizer = platform.synthesizer(&options.speech, &options.voice, &avatar)?;

        if let Err(err) = synthesizer.start_avatar(&mut connection).await {
            if let Err(close_err) = synthesizer.close() {
                tracing::debug!(error = %close_err, "synthesizer close after failed start");
            }
            if let Err(close_err) = connection.close() {
                tracing::debug!(error = %close_err, "connection close after failed start");
            }
            return Err(err);
        }

        Ok(LiveSession {
            connection,
            synthesizer,
        })
    }

    fn teardown(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        if let Err(err) = session.synthesizer.close() {
            tracing::debug!(error = %err, "ignoring synthesizer close error");
        }
        if let Err(err) = session.connection.close() {
            tracing::debug!(error = %err, "ignoring peer connection close error");
        }
    }
}

/// Routes inbound avatar media into the mount and declares the transceivers.
fn mount_tracks(connection: &mut PeerConnection, mount: SharedMount, output: Arc<dyn AudioOutput>) {
    connection.set_on_track(Box::new(move |track| match track.kind {
        TrackKind::Video => {
            mount.lock().show_video(&track.stream_id);
        }
        TrackKind::Audio => {
            mount.lock().add_audio(&track.stream_id);
            if let Err(err) = output.play(&track.stream_id, track.frames) {
                tracing::warn!(error = %err, "audio autoplay blocked or failed");
            }
        }
    }));

    connection.add_transceiver(TrackKind::Video, Direction::SendRecv);
    connection.add_transceiver(TrackKind::Audio, Direction::SendRecv);
}

#[async_trait]
impl Avatar for AvatarClient {
    async fn init(&mut self, options: AvatarOptions) -> Result<(), AvatarError> {
        let platform = self.platform()?;

        if self.session.is_some() {
            tracing::debug!("closing previous avatar session before re-init");
            self.teardown();
        }

        self.state = AvatarState::Initializing;
        match Self::connect(platform.as_ref(), &options).await {
            Ok(session) => {
                self.session = Some(session);
                self.state = AvatarState::Ready;
                tracing::debug!(
                    character = %options.character,
                    style = %options.style,
                    "avatar ready"
                );
                Ok(())
            }
            Err(err) => {
                self.state = AvatarState::Uninitialized;
                Err(err)
            }
        }
    }

    async fn speak(&mut self, text: &str) -> Result<(), AvatarError> {
        self.platform()?;
        if self.state != AvatarState::Ready {
            return Err(AvatarError::NotInitialized);
        }
        let session = self.session.as_mut().ok_or(AvatarError::NotInitialized)?;

        self.state = AvatarState::Speaking;
        let result = session.synthesizer.speak_text(text).await;
        self.state = AvatarState::Ready;

        let result = result?;
        if result.reason != ResultReason::SynthesizingAudioCompleted {
            tracing::warn!(
                reason = ?result.reason,
                details = result.error_details.as_deref().unwrap_or(""),
                "avatar speak did not complete"
            );
        }
        Ok(())
    }

    fn close(&mut self) {
        self.teardown();
        self.state = AvatarState::Closed;
    }

    fn state(&self) -> AvatarState {
        self.state
    }
}
