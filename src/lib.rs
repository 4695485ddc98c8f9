//! # assess - AI capability assessment in the terminal
//!
//! `assess` is a terminal client for a conversational assessment backend.
//! The backend asks questions, scores the answers across seven domains and
//! eventually produces a report. Replies can be spoken aloud by an avatar
//! backed by Azure Speech, and answers can be spoken instead of typed.
//!
//! ## Quick Start
//!
//! ```bash
//! # Start an assessment against the default backend
//! assess
//!
//! # Point at another backend, text only
//! assess chat --backend-url https://assess.example.com --no-avatar
//!
//! # Show the domains and levels used for scoring
//! assess domains
//! ```
//!
//! ## Configuration
//!
//! Settings are stored in `~/.config/assess/config.toml`:
//!
//! ```toml
//! [assess]
//! backend_url = "http://localhost:8000"
//!
//! [speech]
//! voice = "en-US-AvaMultilingualNeural"
//! player = ["aplay", "-q"]
//! ```
//!
//! Speech credentials are never stored locally; they come from the
//! backend's `/config` endpoint.

/// Backend HTTP client and wire types.
pub mod api;

/// Assessment domains, levels, score table and report rendering.
pub mod assessment;

/// Talking avatar on top of the speech service.
pub mod avatar;

/// Interactive assessment chat.
pub mod chat;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Configuration file management and CLI override resolution.
pub mod config;

/// File system utilities.
pub mod fs;

/// Global output configuration (quiet mode, stderr/stdout routing).
pub mod output;

/// XDG-style path utilities for configuration and cache.
pub mod paths;

/// Speech credentials and single-shot recognition.
pub mod speech;

/// Terminal UI components (spinner, colors).
pub mod ui;
