//! Hotkey configuration: combos, entries, the registry and its persistence.
//!
//! This module provides:
//! - Combo parsing and canonical normalization
//! - The `HotkeyEntry` data model (combo + target + kind)
//! - The `HotkeyRegistry` that owns the entry list and keeps OS
//!   registrations in sync with it
//! - JSON persistence of the entry list
//!
//! # Example
//!
//! ```ignore
//! use hotkey_launcher::shortcuts::{HotkeyRegistry, KindSelection, NewHotkey};
//!
//! registry.load(registry.store_path())?;
//! registry.resync();
//! let report = registry.add(NewHotkey::new("ctrl+alt+g", "https://github.com", KindSelection::Auto))?;
//! assert!(report.is_clean());
//! registry.start()?;
//! ```

mod entry;
mod persistence;
mod registry;
mod types;



pub use types::{canonicalize_key, is_known_key, normalize_combo, Combo, ComboParseError, Modifiers};

pub use entry::{HotkeyEntry, KindSelection, NewHotkey, TargetKind};

pub use registry::{
    HotkeyRegistry, MutationReport, RegistrationFailure, RegistryOptions, ResyncReport,
};

pub use persistence::{deserialize, load_entries, save_entries, serialize, DEFAULT_HOTKEYS_FILE};
