//! Structured JSONL logging to a file plus human-readable stderr output.
//!
//! Dual output:
//! - **JSONL to file** (~/.hotkey-launcher/logs/hotkey-launcher.jsonl)
//! - **Compact to stderr** for whoever is running the launcher
//!
//! # Usage
//!
//! ```rust,ignore
//! use hotkey_launcher::logging;
//!
//! // Keep the guard alive for the duration of the program
//! let _guard = logging::init();
//!
//! tracing::info!(combo = "ctrl+1", "Hotkey registered");
//! ```
//!
//! Each JSONL line is a single object:
//! ```json
//! {"timestamp":"2026-01-05T10:30:45.123Z","level":"INFO","target":"hotkey_launcher::hotkeys","fields":{"message":"'ctrl+1' pressed (id: 3)","category":"HOTKEY"}}
//! ```

use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_NAME: &str = "hotkey-launcher.jsonl";

// =============================================================================
// In-memory buffer of recent category lines
// =============================================================================

const MAX_LOG_LINES: usize = 50;

/// Bounded ring of formatted `[CATEGORY] message` lines.
struct LogBuffer {
    lines: Mutex<VecDeque<String>>,
    capacity: usize,
}

impl LogBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            lines: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    fn push(&self, category: &str, message: &str) {
        if let Ok(mut buf) = self.lines.lock() {
            if buf.len() >= self.capacity {
                buf.pop_front();
            }
            buf.push_back(format!("[{}] {}", category, message));
        }
    }

    fn recent(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|buf| buf.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn last(&self, n: usize) -> Vec<String> {
        self.lines
            .lock()
            .map(|buf| buf.iter().rev().take(n).cloned().collect())
            .unwrap_or_default()
    }
}

static LOG_BUFFER: OnceLock<LogBuffer> = OnceLock::new();

fn buffer() -> &'static LogBuffer {
    LOG_BUFFER.get_or_init(|| LogBuffer::new(MAX_LOG_LINES))
}

/// Guard that must be kept alive for the duration of the program.
/// Dropping it flushes and closes the log file.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the dual-output logging system.
///
/// `RUST_LOG` overrides the default `info` filter. If the log file can't be
/// opened only stderr output is installed.
pub fn init() -> LoggingGuard {
    let log_dir = get_log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }
    let log_path = log_dir.join(LOG_FILE_NAME);

    let file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            None
        }
    };
    let (json_layer, file_guard) = match file {
        Some(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_target(true)
                .with_level(true)
                .with_thread_names(true)
                .with_file(false)
                .with_line_number(false)
                .with_span_events(FmtSpan::NONE);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_level(true)
        .compact();

    // A subscriber may already be installed (tests, embedding hosts).
    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(stderr_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(
            event_type = "app_lifecycle",
            action = "started",
            log_path = %log_path.display(),
            "Logging initialized"
        );
    }

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// Log directory (~/.hotkey-launcher/logs/), falling back to the temp dir.
pub fn get_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".hotkey-launcher").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("hotkey-launcher-logs"))
}

/// Path to the JSONL log file
pub fn log_path() -> PathBuf {
    get_log_dir().join(LOG_FILE_NAME)
}

// =============================================================================
// Category helpers
// =============================================================================

/// Log an info line under `category` and keep it in the recent-lines buffer.
///
/// Prefer tracing macros with structured fields where a category line isn't
/// needed:
/// ```rust,ignore
/// tracing::info!(combo = "ctrl+1", "Hotkey registered");
/// ```
pub fn log(category: &str, message: &str) {
    add_to_buffer(category, message);
    tracing::info!(category = category, "{}", message);
}

fn add_to_buffer(category: &str, message: &str) {
    buffer().push(category, message);
}

/// Recent category lines, oldest first.
pub fn get_recent_logs() -> Vec<String> {
    buffer().recent()
}

/// The last `n` category lines, newest first.
pub fn get_last_logs(n: usize) -> Vec<String> {
    buffer().last(n)
}

/// Debug-only logging, compiled out in release builds
#[cfg(debug_assertions)]
pub fn log_debug(category: &str, message: &str) {
    add_to_buffer(category, message);
    tracing::debug!(category = category, "{}", message);
}

#[cfg(not(debug_assertions))]
pub fn log_debug(_category: &str, _message: &str) {}

/// Log an error with its category and optional context
pub fn log_error(category: &str, error: &str, context: Option<&str>) {
    let msg = match context {
        Some(ctx) => format!("{}: {} (context: {})", category, error, ctx),
        None => format!("{}: {}", category, error),
    };
    add_to_buffer("ERROR", &msg);

    tracing::error!(
        event_type = "error",
        category = category,
        error_message = error,
        context = context,
        "{}",
        msg
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_formats_with_category() {
        let buf = LogBuffer::new(4);
        buf.push("HOTKEY", "listener started");
        assert_eq!(buf.recent(), vec!["[HOTKEY] listener started".to_string()]);
    }

    #[test]
    fn buffer_drops_oldest_when_full() {
        let buf = LogBuffer::new(3);
        for i in 0..5 {
            buf.push("T", &i.to_string());
        }
        assert_eq!(buf.recent(), vec!["[T] 2", "[T] 3", "[T] 4"]);
    }

    #[test]
    fn last_is_newest_first() {
        let buf = LogBuffer::new(10);
        buf.push("T", "a");
        buf.push("T", "b");
        buf.push("T", "c");
        assert_eq!(buf.last(2), vec!["[T] c", "[T] b"]);
        assert_eq!(buf.last(10).len(), 3);
    }

    #[test]
    fn log_error_reaches_global_buffer() {
        log_error("HOTKEY", "boom-marker", Some("ctrl+1"));
        assert!(get_last_logs(MAX_LOG_LINES)
            .iter()
            .any(|l| l == "[ERROR] HOTKEY: boom-marker (context: ctrl+1)"));
    }

    #[test]
    fn log_path_is_jsonl_in_log_dir() {
        let path = log_path();
        assert_eq!(path.parent(), Some(get_log_dir().as_path()));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("jsonl"));
    }
}
