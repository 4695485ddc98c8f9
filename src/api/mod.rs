//! HTTP client for the assessment backend.

mod client;
mod error;
mod types;

pub use client::{BackendClient, DEFAULT_BACKEND_URL};
pub use error::ApiError;
pub use types::{ChatReply, RemoteConfig, SessionStart};
