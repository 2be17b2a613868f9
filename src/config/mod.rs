//! Configuration module - Application settings and user preferences
//!
//! This module provides functionality for:
//! - Loading configuration from ~/.hotkey-launcher/config.json
//! - Default values for all settings
//! - Type definitions for config structures
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definitions
//! - `loader` - File system loading and parsing

mod defaults;
mod loader;
mod types;

pub use defaults::{DEFAULT_CONFIG_PATH, DEFAULT_LISTENER_POLL_MS, MIN_LISTENER_POLL_MS};
pub use types::Config;
pub use loader::{default_config_path, load_config};

#[cfg(test)]
pub use defaults::DEFAULT_WARN_MISSING_TARGETS;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
