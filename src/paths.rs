//! XDG-style path utilities for configuration and cache directories.
//!
//! XDG Base Directory conventions are preferred over OS-specific locations
//! so the layout is the same on Linux and macOS.

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_DIR: &str = "assess";

/// Returns the configuration directory for assess.
///
/// Resolution order:
/// 1. `$XDG_CONFIG_HOME/assess` if `XDG_CONFIG_HOME` is set
/// 2. `~/.config/assess` otherwise
pub fn config_dir() -> Result<PathBuf> {
    match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => Ok(PathBuf::from(xdg).join(APP_DIR)),
        _ => Ok(home_dir()?.join(".config").join(APP_DIR)),
    }
}

/// Returns the cache directory for assess.
///
/// Resolution order:
/// 1. `$XDG_CACHE_HOME/assess` if `XDG_CACHE_HOME` is set
/// 2. `~/.cache/assess` otherwise
pub fn cache_dir() -> Result<PathBuf> {
    match std::env::var("XDG_CACHE_HOME") {
        Ok(xdg) if !xdg.is_empty() => Ok(PathBuf::from(xdg).join(APP_DIR)),
        _ => Ok(home_dir()?.join(".cache").join(APP_DIR)),
    }
}

/// Directory where synthesized utterances are written before playback.
pub fn speech_dir() -> Result<PathBuf> {
    Ok(cache_dir()?.join("speech"))
}

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("Failed to determine home directory")
}
