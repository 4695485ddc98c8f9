//! In-memory speech platform used by avatar and controller tests.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::mpsc;

use super::AvatarError;
use super::media::{AudioOutput, PeerConnection, TrackKind, Transceiver};
use super::platform::{
    AvatarConfig, AvatarSynthesizer, ResultReason, SpeechPlatform, SynthesisResult,
};
use super::relay::{IceServer, RelayToken};
use crate::speech::SpeechConfig;

#[derive(Default)]
pub struct Recorded {
    pub relay_calls: AtomicUsize,
    pub started: AtomicUsize,
    pub closed: AtomicUsize,
    pub spoken: Mutex<Vec<String>>,
    pub transceivers: Mutex<Vec<Transceiver>>,
    pub ice_servers: Mutex<Vec<IceServer>>,
    pub played: Mutex<Vec<String>>,
}

pub struct FakePlatform {
    pub recorded: Arc<Recorded>,
    pub relay_fails: AtomicBool,
    pub start_fails: AtomicBool,
    pub playback_blocked: bool,
    pub speak_reason: ResultReason,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            recorded: Arc::new(Recorded::default()),
            relay_fails: AtomicBool::new(false),
            start_fails: AtomicBool::new(false),
            playback_blocked: false,
            speak_reason: ResultReason::SynthesizingAudioCompleted,
        }
    }
}

struct FakeSynthesizer {
    recorded: Arc<Recorded>,
    start_fails: bool,
    reason: ResultReason,
    audio: Option<mpsc::UnboundedSender<Bytes>>,
}

#[async_trait]
impl AvatarSynthesizer for FakeSynthesizer {
    async fn start_avatar(&mut self, connection: &mut PeerConnection) -> Result<(), AvatarError> {
        *self.recorded.transceivers.lock() = connection.transceivers().to_vec();
        *self.recorded.ice_servers.lock() = connection.ice_servers().to_vec();
        if self.start_fails {
            return Err(AvatarError::Synthesis("avatar start rejected".into()));
        }
        self.recorded.started.fetch_add(1, Ordering::SeqCst);
        connection.open_remote_track(TrackKind::Video)?;
        self.audio = Some(connection.open_remote_track(TrackKind::Audio)?);
        Ok(())
    }

    async fn speak_text(&mut self, text: &str) -> Result<SynthesisResult, AvatarError> {
        self.recorded.spoken.lock().push(text.to_string());
        Ok(match self.reason {
            ResultReason::SynthesizingAudioCompleted => SynthesisResult::completed(),
            ResultReason::Canceled => SynthesisResult::canceled("voice not found"),
        })
    }

    fn close(&mut self) -> Result<(), AvatarError> {
        self.recorded.closed.fetch_add(1, Ordering::SeqCst);
        self.audio = None;
        Ok(())
    }
}

struct FakeOutput {
    recorded: Arc<Recorded>,
    blocked: bool,
}

impl AudioOutput for FakeOutput {
    fn play(
        &self,
        stream_id: &str,
        _frames: mpsc::UnboundedReceiver<Bytes>,
    ) -> Result<(), AvatarError> {
        if self.blocked {
            return Err(AvatarError::Playback("autoplay blocked".into()));
        }
        self.recorded.played.lock().push(stream_id.to_string());
        Ok(())
    }
}

#[async_trait]
impl SpeechPlatform for FakePlatform {
    async fn relay_token(&self, _speech: &SpeechConfig) -> Result<RelayToken, AvatarError> {
        self.recorded.relay_calls.fetch_add(1, Ordering::SeqCst);
        if self.relay_fails.load(Ordering::SeqCst) {
            return Err(AvatarError::NoIceServer);
        }
        Ok(RelayToken {
            urls: vec!["stun:relay".into(), "turn:relay".into()],
            username: Some("u".into()),
            credential: Some("p".into()),
        })
    }

    fn synthesizer(
        &self,
        _speech: &SpeechConfig,
        _voice: &str,
        _avatar: &AvatarConfig,
    ) -> Result<Box<dyn AvatarSynthesizer>, AvatarError> {
        Ok(Box::new(FakeSynthesizer {
            recorded: Arc::clone(&self.recorded),
            start_fails: self.start_fails.load(Ordering::SeqCst),
            reason: self.speak_reason,
            audio: None,
        }))
    }

    fn audio_output(&self) -> Arc<dyn AudioOutput> {
        Arc::new(FakeOutput {
            recorded: Arc::clone(&self.recorded),
            blocked: self.playback_blocked,
        })
    }
}
