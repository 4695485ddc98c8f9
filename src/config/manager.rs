use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::api::DEFAULT_BACKEND_URL;
use crate::avatar::{DEFAULT_CHARACTER, DEFAULT_PLAYER_COMMAND, DEFAULT_STYLE, DEFAULT_VOICE};
use crate::paths;
use crate::speech::{DEFAULT_CAPTURE_COMMAND, DEFAULT_LANGUAGE};

/// Settings in the `[assess]` section of config.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssessConfig {
    /// Backend used before `/config` is read.
    pub backend_url: Option<String>,
}

/// Settings in the `[speech]` section of config.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeechSettings {
    /// Synthesis voice name.
    pub voice: Option<String>,
    /// Avatar persona.
    pub avatar_character: Option<String>,
    /// Avatar pose/style.
    pub avatar_style: Option<String>,
    /// Recognition language (BCP-47).
    pub language: Option<String>,
    /// Command that plays a WAV file passed as its last argument.
    pub player: Option<Vec<String>>,
    /// Command that writes a short WAV recording to stdout.
    pub capture: Option<Vec<String>>,
}

/// The complete configuration file structure.
///
/// Corresponds to `~/.config/assess/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub assess: AssessConfig,
    #[serde(default)]
    pub speech: SpeechSettings,
}

/// Resolved configuration after merging CLI arguments and config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub backend_url: String,
    pub avatar_enabled: bool,
    pub voice: String,
    pub avatar_character: String,
    pub avatar_style: String,
    pub language: String,
    pub player: Vec<String>,
    pub capture: Vec<String>,
}

/// CLI overrides that take precedence over config file values.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub backend_url: Option<String>,
    pub voice: Option<String>,
    pub no_avatar: bool,
}

fn owned(command: &[&str]) -> Vec<String> {
    command.iter().map(ToString::to_string).collect()
}

/// Resolves configuration: CLI options, then the config file, then built-in
/// defaults.
pub fn resolve_config(options: &ResolveOptions, config_file: &ConfigFile) -> ResolvedConfig {
    let speech = &config_file.speech;
    let pick = |cli: Option<&String>, file: Option<&String>, default: &str| {
        [cli, file]
            .into_iter()
            .flatten()
            .find(|value| !value.trim().is_empty())
            .map_or_else(|| default.to_string(), |value| value.trim().to_string())
    };

    ResolvedConfig {
        backend_url: pick(
            options.backend_url.as_ref(),
            config_file.assess.backend_url.as_ref(),
            DEFAULT_BACKEND_URL,
        ),
        avatar_enabled: !options.no_avatar,
        voice: pick(options.voice.as_ref(), speech.voice.as_ref(), DEFAULT_VOICE),
        avatar_character: pick(None, speech.avatar_character.as_ref(), DEFAULT_CHARACTER),
        avatar_style: pick(None, speech.avatar_style.as_ref(), DEFAULT_STYLE),
        language: pick(None, speech.language.as_ref(), DEFAULT_LANGUAGE),
        player: speech
            .player
            .clone()
            .unwrap_or_else(|| owned(DEFAULT_PLAYER_COMMAND)),
        capture: speech
            .capture
            .clone()
            .unwrap_or_else(|| owned(DEFAULT_CAPTURE_COMMAND)),
    }
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Configuration lives at `$XDG_CONFIG_HOME/assess/config.toml`
    /// or `~/.config/assess/config.toml`.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: paths::config_dir()?.join("config.toml"),
        })
    }

    pub const fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub const fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn load(&self) -> Result<ConfigFile> {
        let contents = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        toml::from_str(&contents).with_context(|| {
            format!(
                "Failed to parse config file: {}",
                self.config_path.display()
            )
        })
    }

    pub fn save(&self, config: &ConfigFile) -> Result<()> {
        let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
        crate::fs::atomic_write(&self.config_path, contents)
    }

    /// Loads the config file; a missing file yields defaults and a broken
    /// one is reported as a warning.
    pub fn load_or_default(&self) -> ConfigFile {
        if !self.config_path.exists() {
            return ConfigFile::default();
        }
        self.load().unwrap_or_else(|err| {
            tracing::warn!(error = %format!("{err:#}"), "ignoring unreadable config file");
            ConfigFile::default()
        })
    }
}
