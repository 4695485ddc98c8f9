//! Global output configuration.
//!
//! - Chat content (transcript, score table, report) goes to stdout
//! - Status lines and logs go to stderr
//! - Quiet mode suppresses status lines but never chat content or errors

use std::sync::OnceLock;

static OUTPUT_CONFIG: OnceLock<OutputConfig> = OnceLock::new();

/// Output configuration settings.
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Suppress non-essential output.
    pub quiet: bool,
}

/// Initialize the global output configuration.
///
/// Called once at startup with the CLI flags; later calls are ignored.
pub fn init(config: OutputConfig) {
    let _ = OUTPUT_CONFIG.set(config);
}

/// Get the current output configuration.
pub fn config() -> &'static OutputConfig {
    OUTPUT_CONFIG.get_or_init(OutputConfig::default)
}

/// Check if quiet mode is enabled.
pub fn is_quiet() -> bool {
    config().quiet
}

/// Print a status message to stderr (respects quiet mode).
#[macro_export]
macro_rules! status {
    ($($arg:tt)*) => {
        if !$crate::output::is_quiet() {
            eprintln!($($arg)*);
        }
    };
}
