//! Hotkey list persistence.
//!
//! Handles loading and saving the entry list to/from a JSON file.
//! Format: an array of `{combo, target, kind}` objects in insertion order,
//! pretty-printed so the file can be inspected and edited by hand.

use std::fs;
use std::path::{Path, PathBuf};

use super::entry::HotkeyEntry;
use crate::error::{LauncherError, Result};

/// Default file name for the hotkey list.
pub const DEFAULT_HOTKEYS_FILE: &str = "hotkeys.json";

pub fn serialize(entries: &[HotkeyEntry]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(entries)?)
}

/// Parse a hotkey list. Combos and targets are normalized on the way in.
pub fn deserialize(bytes: &[u8]) -> Result<Vec<HotkeyEntry>> {
    let entries: Vec<HotkeyEntry> = serde_json::from_slice(bytes)?;
    Ok(entries.into_iter().map(HotkeyEntry::normalized).collect())
}

/// Load entries from a JSON file.
///
/// Returns `Ok(None)` if the file doesn't exist.
pub fn load_entries(path: &Path) -> Result<Option<Vec<HotkeyEntry>>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read(path).map_err(|e| LauncherError::io(path, e))?;
    deserialize(&content).map(Some)
}

/// Save entries to a JSON file.
///
/// Writes a sibling temp file and renames it over the target, so a failed
/// write leaves the previous content in place.
pub fn save_entries(path: &Path, entries: &[HotkeyEntry]) -> Result<()> {
    // Create parent directories if needed
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| LauncherError::io(parent, e))?;
    }

    let content = serialize(entries)?;
    let tmp = temp_path(path);
    fs::write(&tmp, content).map_err(|e| LauncherError::io(&tmp, e))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(LauncherError::io(path, e));
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| DEFAULT_HOTKEYS_FILE.into());
    name.push(".tmp");
    path.with_file_name(name)
}
