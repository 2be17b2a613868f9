//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Config file location (tilde-expanded at load time)
pub const DEFAULT_CONFIG_PATH: &str = "~/.hotkey-launcher/config.json";

/// How often the listener loop checks its stop flag while waiting for events
pub const DEFAULT_LISTENER_POLL_MS: u64 = 250;

/// Lower bound for the poll interval so a zero value can't spin the loop
pub const MIN_LISTENER_POLL_MS: u64 = 10;

/// Warn (without rejecting) when a file target doesn't exist at add time
pub const DEFAULT_WARN_MISSING_TARGETS: bool = true;
