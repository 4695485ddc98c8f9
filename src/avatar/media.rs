//! Peer connection and mount point for avatar media.
//!
//! The peer connection here is the local end of the avatar media session:
//! it records the transceivers we declare, and when the remote side starts
//! sending a track it hands the inbound frames to the registered track
//! handler. The mount point is the view model the terminal renders.

use bytes::Bytes;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::AvatarError;
use super::relay::IceServer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => f.write_str("audio"),
            Self::Video => f.write_str("video"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    SendRecv,
    SendOnly,
    RecvOnly,
    Inactive,
}

impl Direction {
    const fn receives(self) -> bool {
        matches!(self, Self::SendRecv | Self::RecvOnly)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transceiver {
    pub kind: TrackKind,
    pub direction: Direction,
}

/// Sending half of an inbound track, held by the remote side.
pub type FrameSender = mpsc::UnboundedSender<Bytes>;

/// A track the remote side started sending.
#[derive(Debug)]
pub struct InboundTrack {
    pub kind: TrackKind,
    pub stream_id: String,
    pub frames: mpsc::UnboundedReceiver<Bytes>,
}

pub type TrackHandler = Box<dyn Fn(InboundTrack) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    New,
    Connected,
    Closed,
}

pub struct PeerConnection {
    ice_servers: Vec<IceServer>,
    transceivers: Vec<Transceiver>,
    on_track: Option<TrackHandler>,
    state: ConnectionState,
    next_stream: usize,
}

impl PeerConnection {
    pub fn new(ice_servers: Vec<IceServer>) -> Self {
        Self {
            ice_servers,
            transceivers: Vec::new(),
            on_track: None,
            state: ConnectionState::New,
            next_stream: 0,
        }
    }

    pub fn ice_servers(&self) -> &[IceServer] {
        &self.ice_servers
    }

    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn set_on_track(&mut self, handler: TrackHandler) {
        self.on_track = Some(handler);
    }

    pub fn add_transceiver(&mut self, kind: TrackKind, direction: Direction) {
        self.transceivers.push(Transceiver { kind, direction });
    }

    pub fn transceivers(&self) -> &[Transceiver] {
        &self.transceivers
    }

    /// Whether a declared transceiver accepts inbound media of `kind`.
    pub fn receives(&self, kind: TrackKind) -> bool {
        self.transceivers
            .iter()
            .any(|t| t.kind == kind && t.direction.receives())
    }

    /// Starts an inbound track of `kind` and returns the sender the remote
    /// side pushes frames into.
    ///
    /// The track handler sees the track before this returns.
    pub fn open_remote_track(&mut self, kind: TrackKind) -> Result<FrameSender, AvatarError> {
        if self.state == ConnectionState::Closed {
            return Err(AvatarError::Transport("peer connection is closed".into()));
        }
        if !self.receives(kind) {
            return Err(AvatarError::Transport(format!(
                "no {kind} transceiver accepts inbound media"
            )));
        }

        self.next_stream += 1;
        let (tx, rx) = mpsc::unbounded_channel();
        let track = InboundTrack {
            kind,
            stream_id: format!("{kind}-{}", self.next_stream),
            frames: rx,
        };
        self.state = ConnectionState::Connected;
        if let Some(handler) = &self.on_track {
            handler(track);
        }
        Ok(tx)
    }

    /// Closes the connection. Dropping the handler ends every inbound track.
    pub fn close(&mut self) -> Result<(), AvatarError> {
        if self.state == ConnectionState::Closed {
            return Err(AvatarError::Transport("peer connection already closed".into()));
        }
        self.on_track = None;
        self.state = ConnectionState::Closed;
        Ok(())
    }
}

/// An element rendered into the avatar mount point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountedElement {
    Video {
        stream_id: String,
        muted: bool,
        interactive: bool,
    },
    /// Overlay drawn above the video.
    Mask,
    Audio {
        stream_id: String,
        muted: bool,
    },
}

/// Where inbound avatar media is rendered.
#[derive(Debug, Default)]
pub struct AvatarMount {
    elements: Vec<MountedElement>,
}

pub type SharedMount = Arc<Mutex<AvatarMount>>;

impl AvatarMount {
    pub fn shared() -> SharedMount {
        Arc::new(Mutex::new(Self::default()))
    }

    pub fn elements(&self) -> &[MountedElement] {
        &self.elements
    }

    /// Replaces everything in the mount with a muted, non-interactive video
    /// and its overlay mask.
    pub fn show_video(&mut self, stream_id: &str) {
        self.elements.clear();
        self.elements.push(MountedElement::Video {
            stream_id: stream_id.to_string(),
            muted: true,
            interactive: false,
        });
        self.elements.push(MountedElement::Mask);
    }

    pub fn add_audio(&mut self, stream_id: &str) {
        self.elements.push(MountedElement::Audio {
            stream_id: stream_id.to_string(),
            muted: false,
        });
    }

    pub fn has_video(&self) -> bool {
        self.elements
            .iter()
            .any(|e| matches!(e, MountedElement::Video { .. }))
    }

    pub fn has_audio(&self) -> bool {
        self.elements
            .iter()
            .any(|e| matches!(e, MountedElement::Audio { .. }))
    }
}

/// Plays the frames of an inbound audio track.
///
/// An `Err` means playback could not start; callers log it and carry on.
pub trait AudioOutput: Send + Sync {
    fn play(&self, stream_id: &str, frames: mpsc::UnboundedReceiver<Bytes>)
    -> Result<(), AvatarError>;
}
