use std::path::PathBuf;

use thiserror::Error;
use tracing::error;

/// Domain-specific errors for the hotkey launcher.
///
/// None of these are fatal: the registry converts each into a notification
/// and an `Err` for the caller, leaving prior state untouched.
#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Please enter a {0}.")]
    EmptyField(&'static str),

    #[error("Invalid hotkey '{combo}': {reason}")]
    InvalidCombo { combo: String, reason: String },

    #[error("Hotkey '{0}' is already assigned")]
    DuplicateCombo(String),

    #[error("No hotkey found for {0}")]
    NotFound(String),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed hotkey data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Open failed: {0}")]
    Launch(String),
}

impl LauncherError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, LauncherError>;

/// Extension trait for error logging with caller location tracking.
/// Use when the operation is recoverable and user doesn't need to know.
///
/// # Examples
///
/// ```ignore
/// use hotkey_launcher::error::ResultExt;
///
/// // Final save on shutdown must never block exit
/// registry.save(&path).log_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_message_names_the_field() {
        let err = LauncherError::EmptyField("hotkey combination");
        assert_eq!(err.to_string(), "Please enter a hotkey combination.");
    }

    #[test]
    fn io_error_includes_path() {
        let err = LauncherError::io(
            "/tmp/hotkeys.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/hotkeys.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn log_err_returns_none_on_error() {
        let result: std::result::Result<u32, &str> = Err("boom");
        assert_eq!(result.log_err(), None);
        let ok: std::result::Result<u32, &str> = Ok(7);
        assert_eq!(ok.log_err(), Some(7));
    }
}
