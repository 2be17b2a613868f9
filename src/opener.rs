//! Launching hotkey targets.
//!
//! URLs go to the default browser, everything else goes through the OS
//! "open with default application" mechanism (`open`, `xdg-open`,
//! `ShellExecute`) via the `open` crate. Success means the hand-off did not
//! fail, not that the destination is reachable.

use std::path::Path;

use crate::error::{LauncherError, Result};
use crate::shortcuts::TargetKind;

/// Performs the OS-specific launch of a target.
pub trait Opener: Send + Sync {
    fn open(&self, target: &str, kind: TargetKind) -> Result<()>;
}

/// Opener backed by the system default handlers.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemOpener;

impl Opener for SystemOpener {
    fn open(&self, target: &str, kind: TargetKind) -> Result<()> {
        let resolved = resolve_target(target, kind);
        tracing::info!(target = %resolved, kind = %kind, "Opening target");

        open::that_detached(&resolved).map_err(|e| {
            tracing::warn!(target = %resolved, error = %e, "Failed to open target");
            LauncherError::Launch(e.to_string())
        })
    }
}

/// The string handed to the OS: URLs as given, file targets tilde-expanded.
pub fn resolve_target(target: &str, kind: TargetKind) -> String {
    if kind.is_url() {
        target.trim().to_string()
    } else {
        expand_target(target)
    }
}

/// Expand a leading `~` in a file target.
pub fn expand_target(target: &str) -> String {
    shellexpand::tilde(target.trim()).into_owned()
}

/// Best-effort existence check for a file target.
///
/// True if the path exists or the name resolves on `PATH`. Advisory only:
/// callers warn on `false` but still accept the target.
pub fn target_exists(target: &str) -> bool {
    let expanded = expand_target(target);
    Path::new(&expanded).exists() || which::which(&expanded).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn existing_file_is_found() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("doc.pdf");
        std::fs::write(&file, b"%PDF").unwrap();

        assert!(target_exists(&file.to_string_lossy()));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("definitely-missing.pdf");

        assert!(!target_exists(&file.to_string_lossy()));
    }

    #[test]
    fn tilde_is_expanded() {
        let expanded = expand_target("~/doc.pdf");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("doc.pdf"));
    }

    #[test]
    fn urls_are_not_path_expanded() {
        assert_eq!(
            resolve_target(" https://example.com/~user ", TargetKind::Url),
            "https://example.com/~user"
        );
        assert!(!resolve_target("~/doc.pdf", TargetKind::File).starts_with('~'));
    }

    #[test]
    fn absolute_paths_are_untouched() {
        assert_eq!(expand_target(" /tmp/doc.pdf "), "/tmp/doc.pdf");
    }
}
