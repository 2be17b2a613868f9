//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::*;
use crate::shortcuts::DEFAULT_HOTKEYS_FILE;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Where the hotkey list lives (default: ./hotkeys.json). `~` is expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotkeys_path: Option<String>,
    /// Listener stop-flag poll interval in milliseconds (default: 250)
    #[serde(default = "default_listener_poll_ms")]
    pub listener_poll_ms: u64,
    /// Warn when a file target can't be found at add time (default: true)
    #[serde(default = "default_warn_missing_targets")]
    pub warn_missing_targets: bool,
}

fn default_listener_poll_ms() -> u64 {
    DEFAULT_LISTENER_POLL_MS
}
fn default_warn_missing_targets() -> bool {
    DEFAULT_WARN_MISSING_TARGETS
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hotkeys_path: None,
            listener_poll_ms: DEFAULT_LISTENER_POLL_MS,
            warn_missing_targets: DEFAULT_WARN_MISSING_TARGETS,
        }
    }
}

impl Config {
    /// Resolved hotkey file path.
    pub fn hotkeys_path(&self) -> PathBuf {
        match &self.hotkeys_path {
            Some(p) if !p.trim().is_empty() => {
                PathBuf::from(shellexpand::tilde(p.trim()).as_ref())
            }
            _ => PathBuf::from(DEFAULT_HOTKEYS_FILE),
        }
    }

    /// Poll interval with the lower bound applied.
    pub fn listener_poll_ms(&self) -> u64 {
        self.listener_poll_ms.max(MIN_LISTENER_POLL_MS)
    }
}
