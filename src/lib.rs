//! Hotkey Launcher - global keyboard shortcuts that open URLs and files.
//!
//! The library holds the hotkey list, keeps OS registrations in sync with it,
//! persists it as JSON and launches targets when a registered combo fires.
//! The `hotkey-launcher` binary is a thin CLI over [`shortcuts::HotkeyRegistry`].

pub mod config;
pub mod error;
pub mod hotkeys;
pub mod logging;
pub mod notifications;
pub mod opener;
pub mod shortcuts;

#[cfg(test)]
mod test_support;

pub use error::{LauncherError, Result};
pub use notifications::{Level, Notification, NotificationSink};
pub use shortcuts::{HotkeyEntry, HotkeyRegistry, KindSelection, NewHotkey, TargetKind};
