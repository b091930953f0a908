//! Log verbosity settings persisted across runs.
//!
//! The engine keeps per-level toggles in the `engine.log` section of its
//! settings file, applies them at startup and writes them back at
//! teardown, so a verbosity change survives the process.

use tracing_subscriber::EnvFilter;

use crate::config::ConfigFile;

/// Config section holding the log toggles.
pub const LOG_SECTION: &str = "engine.log";

/// Per-level logging toggles plus source-location display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    pub enable_debug: bool,
    pub enable_info: bool,
    pub enable_warning: bool,
    pub enable_error: bool,
    /// Include file/line of the call site in log output.
    pub enable_location: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            enable_debug: false,
            enable_info: true,
            enable_warning: true,
            enable_error: true,
            enable_location: false,
        }
    }
}

impl LogSettings {
    /// Read the toggles from a settings file, defaulting each one that is
    /// absent or malformed.
    pub fn from_config(config: &ConfigFile) -> Self {
        let defaults = Self::default();
        Self {
            enable_debug: config.get_bool(LOG_SECTION, "enable_debug", defaults.enable_debug),
            enable_info: config.get_bool(LOG_SECTION, "enable_info", defaults.enable_info),
            enable_warning: config.get_bool(LOG_SECTION, "enable_warning", defaults.enable_warning),
            enable_error: config.get_bool(LOG_SECTION, "enable_error", defaults.enable_error),
            enable_location: config.get_bool(
                LOG_SECTION,
                "enable_location",
                defaults.enable_location,
            ),
        }
    }

    /// Write the toggles back into a settings file.
    pub fn store(&self, config: &mut ConfigFile) {
        config.set(LOG_SECTION, "enable_debug", self.enable_debug as u8);
        config.set(LOG_SECTION, "enable_info", self.enable_info as u8);
        config.set(LOG_SECTION, "enable_warning", self.enable_warning as u8);
        config.set(LOG_SECTION, "enable_error", self.enable_error as u8);
        config.set(LOG_SECTION, "enable_location", self.enable_location as u8);
    }

    /// Most verbose level that is still enabled, as an `EnvFilter`
    /// directive for the `ember` crates.
    pub fn filter_directive(&self) -> String {
        let level = if self.enable_debug {
            "debug"
        } else if self.enable_info {
            "info"
        } else if self.enable_warning {
            "warn"
        } else if self.enable_error {
            "error"
        } else {
            "off"
        };
        format!("ember={}", level)
    }
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise the persisted settings decide.
/// Returns quietly when a subscriber is already installed so tests can
/// call it repeatedly.
pub fn init_logging(settings: &LogSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.filter_directive()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(settings.enable_location)
        .with_line_number(settings.enable_location)
        .try_init();
}
