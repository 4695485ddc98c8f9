//! Configuration file management and CLI override resolution.

mod manager;

pub use manager::{
    AssessConfig, ConfigFile, ConfigManager, ResolveOptions, ResolvedConfig, SpeechSettings,
    resolve_config,
};
