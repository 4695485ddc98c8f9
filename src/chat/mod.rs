//! Interactive assessment chat.
//!
//! [`ChatController`] owns the conversation state and talks to the backend,
//! avatar and recognizer. [`ChatSession`] is the terminal front end: a
//! landing gate followed by a REPL with slash commands.

/// Slash command parsing and autocomplete.
pub mod command;
mod controller;
mod gate;
mod session;
mod transcript;
mod ui;

pub use controller::{
    AVATAR_READY, AppState, AvatarPreferences, ChatController, LISTENING, NO_SESSION_HINT,
    NOT_HEARD, RECOGNITION_UNAVAILABLE, SPEECH_CONFIG_MISSING, Screen,
};
pub use gate::{AccessForm, GateError, View};
pub use session::{ChatSession, SessionConfig};
pub use transcript::{Message, Role, Transcript};
