//! Hotkey registry: the ordered entry list and its live OS registrations.
//!
//! Uses a Vec for insertion order (the only identity the UI indexes by) and
//! the dispatcher's combo table for what is currently live. Every mutation
//! persists the list and then reconciles the live set with it.

use parking_lot::RwLock;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::entry::{HotkeyEntry, NewHotkey, TargetKind};
use super::persistence::{self, DEFAULT_HOTKEYS_FILE};
use super::types::{normalize_combo, Combo};
use crate::config::Config;
use crate::error::{LauncherError, Result, ResultExt};
use crate::hotkeys::{FireHandler, HookDispatcher, HotkeyBackend};
use crate::notifications::{Level, NotificationSink};
use crate::opener::{self, Opener};

/// Construction-time settings for a [`HotkeyRegistry`].
#[derive(Clone, Debug)]
pub struct RegistryOptions {
    /// File that mutations persist to.
    pub store_path: PathBuf,
    /// How often the listener loop re-checks its stop flag.
    pub poll_interval: Duration,
    /// Emit an advisory notification when a file target can't be found.
    pub warn_missing_targets: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_HOTKEYS_FILE),
            poll_interval: Duration::from_millis(crate::config::DEFAULT_LISTENER_POLL_MS),
            warn_missing_targets: true,
        }
    }
}

impl From<&Config> for RegistryOptions {
    fn from(config: &Config) -> Self {
        Self {
            store_path: config.hotkeys_path(),
            poll_interval: Duration::from_millis(config.listener_poll_ms()),
            warn_missing_targets: config.warn_missing_targets,
        }
    }
}

/// A combo that could not be made live during a resync.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrationFailure {
    pub combo: String,
    pub reason: String,
}

/// Outcome of reconciling OS registrations with the entry list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResyncReport {
    /// Number of combos live after the resync.
    pub active: usize,
    /// Combos newly registered by this resync.
    pub registered: Vec<String>,
    /// Combos released because they left the list.
    pub unregistered: Vec<String>,
    pub failures: Vec<RegistrationFailure>,
}

impl ResyncReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn failure_detail(&self) -> String {
        self.failures
            .iter()
            .map(|f| format!("'{}' ({})", f.combo, f.reason))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Outcome of add / remove / clear.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct MutationReport {
    /// Entries added or removed by the operation.
    pub changed: Vec<HotkeyEntry>,
    /// Set when the in-memory change could not be written to disk.
    pub save_error: Option<String>,
    pub resync: ResyncReport,
}

impl MutationReport {
    pub fn is_clean(&self) -> bool {
        self.save_error.is_none() && self.resync.is_clean()
    }
}

/// Single source of truth for configured hotkeys and which of them are live.
pub struct HotkeyRegistry {
    entries: Arc<RwLock<Vec<HotkeyEntry>>>,
    dispatcher: HookDispatcher,
    opener: Arc<dyn Opener>,
    sink: Arc<dyn NotificationSink>,
    options: RegistryOptions,
}

impl HotkeyRegistry {
    pub fn new(
        backend: Arc<dyn HotkeyBackend>,
        opener: Arc<dyn Opener>,
        sink: Arc<dyn NotificationSink>,
        options: RegistryOptions,
    ) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            dispatcher: HookDispatcher::new(backend, options.poll_interval),
            opener,
            sink,
            options,
        }
    }

    /// Snapshot of the entry list in insertion order.
    pub fn entries(&self) -> Vec<HotkeyEntry> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn store_path(&self) -> &Path {
        &self.options.store_path
    }

    /// Canonical combos currently registered with the OS, sorted.
    pub fn active_combos(&self) -> Vec<String> {
        self.dispatcher.active_combos()
    }

    pub fn is_listening(&self) -> bool {
        self.dispatcher.is_running()
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    /// Replace the entry list with the contents of `path` and bring the live
    /// registrations in line with it.
    ///
    /// A missing file yields an empty list. On any read or parse failure the
    /// current list and registrations are left untouched. Per-entry
    /// registration failures are not notified here; `resync` reports them.
    pub fn load(&self, path: &Path) -> Result<usize> {
        match persistence::load_entries(path) {
            Ok(Some(loaded)) => {
                let count = loaded.len();
                *self.entries.write() = loaded;
                self.reconcile();
                tracing::info!(path = %path.display(), count, "Loaded hotkeys");
                self.sink
                    .notify(Level::Success, &format!("Loaded {} hotkey(s).", count));
                Ok(count)
            }
            Ok(None) => {
                self.entries.write().clear();
                self.reconcile();
                tracing::info!(path = %path.display(), "Hotkey file not found, starting empty");
                self.sink
                    .notify(Level::Info, "No saved hotkeys found. Start adding!");
                Ok(0)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load hotkeys");
                self.sink.notify(Level::Error, &format!("Load failed: {}", e));
                Err(e)
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        match self.persist(path) {
            Ok(()) => {
                self.sink.notify(Level::Success, "Hotkeys saved.");
                Ok(())
            }
            Err(e) => {
                self.sink.notify(Level::Error, &format!("Save failed: {}", e));
                Err(e)
            }
        }
    }

    fn persist(&self, path: &Path) -> Result<()> {
        let snapshot = self.entries();
        persistence::save_entries(path, &snapshot).inspect_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Failed to save hotkeys");
        })
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Validate, append, persist and register a new hotkey.
    ///
    /// Duplicate combos are rejected with `DuplicateCombo`. The combo is
    /// test-registered with the OS before the list is touched.
    pub fn add(&self, new: NewHotkey) -> Result<MutationReport> {
        let combo_input = new.combo.trim();
        let target = new.target.trim();
        if combo_input.is_empty() {
            return self.fail(LauncherError::EmptyField("hotkey combination"));
        }
        if target.is_empty() {
            return self.fail(LauncherError::EmptyField("URL or file path"));
        }

        let combo = match Combo::parse(combo_input) {
            Ok(combo) => combo,
            Err(e) => {
                return self.fail(LauncherError::InvalidCombo {
                    combo: combo_input.to_string(),
                    reason: e.to_string(),
                })
            }
        };
        let key = combo.to_canonical_string();
        if self.contains_combo(&key) {
            return self.fail(LauncherError::DuplicateCombo(key));
        }
        // A combo that is already live has been accepted by the OS.
        if !self.dispatcher.is_registered(&key) {
            if let Err(e) = self.dispatcher.validate(&combo) {
                return self.fail(e);
            }
        }

        let kind = new.kind.resolve(target);
        if kind == TargetKind::File
            && self.options.warn_missing_targets
            && !opener::target_exists(target)
        {
            self.sink.notify(
                Level::Info,
                "File not found. Will attempt to open via system.",
            );
        }

        let entry = HotkeyEntry::new(&key, target, kind);
        {
            let mut entries = self.entries.write();
            if entries.iter().any(|e| e.combo == key) {
                drop(entries);
                return self.fail(LauncherError::DuplicateCombo(key));
            }
            entries.push(entry.clone());
        }

        let report = self.commit(vec![entry]);
        Ok(self.finish(report, format!("Added hotkey '{}'.", key)))
    }

    /// Remove the entry at `index`; the rest keep their relative order.
    pub fn remove(&self, index: usize) -> Result<MutationReport> {
        let removed = {
            let mut entries = self.entries.write();
            (index < entries.len()).then(|| entries.remove(index))
        };
        match removed {
            Some(entry) => {
                let message = format!("Removed '{}'.", entry.combo);
                let report = self.commit(vec![entry]);
                Ok(self.finish(report, message))
            }
            None => self.fail(LauncherError::NotFound(format!("index {}", index))),
        }
    }

    pub fn remove_by_combo(&self, combo: &str) -> Result<MutationReport> {
        let key = normalize_combo(combo);
        let removed = {
            let mut entries = self.entries.write();
            entries
                .iter()
                .position(|e| e.combo == key)
                .map(|i| entries.remove(i))
        };
        match removed {
            Some(entry) => {
                let message = format!("Removed '{}'.", entry.combo);
                let report = self.commit(vec![entry]);
                Ok(self.finish(report, message))
            }
            None => self.fail(LauncherError::NotFound(format!("hotkey '{}'", key))),
        }
    }

    /// Remove every entry. Clearing an empty list only reports that fact.
    pub fn clear(&self) -> Result<MutationReport> {
        let removed = std::mem::take(&mut *self.entries.write());
        if removed.is_empty() {
            if !self.dispatcher.active_combos().is_empty() {
                self.reconcile();
            }
            self.sink.notify(Level::Info, "Nothing to clear.");
            return Ok(MutationReport::default());
        }
        let message = format!("Cleared all hotkeys ({} removed).", removed.len());
        let report = self.commit(removed);
        Ok(self.finish(report, message))
    }

    fn contains_combo(&self, key: &str) -> bool {
        self.entries.read().iter().any(|e| e.combo == key)
    }

    /// Persist then reconcile, without notifying.
    fn commit(&self, changed: Vec<HotkeyEntry>) -> MutationReport {
        let save_error = self
            .persist(&self.options.store_path)
            .err()
            .map(|e| e.to_string());
        let resync = self.reconcile();
        MutationReport {
            changed,
            save_error,
            resync,
        }
    }

    /// Emit the single terminal notification for a mutation.
    fn finish(&self, report: MutationReport, success: String) -> MutationReport {
        if report.is_clean() {
            self.sink.notify(Level::Success, &success);
            return report;
        }

        let mut message = success;
        if let Some(e) = &report.save_error {
            message.push_str(&format!(" Save failed: {}.", e));
        }
        if !report.resync.is_clean() {
            message.push_str(&format!(
                " Failed to register: {}.",
                report.resync.failure_detail()
            ));
        }
        self.sink.notify(Level::Error, &message);
        report
    }

    fn fail<T>(&self, err: LauncherError) -> Result<T> {
        tracing::warn!(error = %err, "Hotkey operation rejected");
        self.sink.notify(Level::Error, &err.to_string());
        Err(err)
    }

    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------

    /// Make the OS registrations match the entry list and report the result.
    ///
    /// Individual failures are reported per entry and never abort the rest.
    pub fn resync(&self) -> ResyncReport {
        let report = self.reconcile();
        for failure in &report.failures {
            self.sink.notify(
                Level::Error,
                &format!("Failed to register '{}': {}", failure.combo, failure.reason),
            );
        }

        if report.is_clean() {
            self.sink.notify(
                Level::Info,
                &format!("Registered {} hotkey(s).", report.active),
            );
        } else {
            let failed: Vec<&str> = report.failures.iter().map(|f| f.combo.as_str()).collect();
            self.sink.notify(
                Level::Error,
                &format!(
                    "Registered {} hotkey(s); {} failed: {}",
                    report.active,
                    failed.len(),
                    failed.join(", ")
                ),
            );
        }
        report
    }

    fn reconcile(&self) -> ResyncReport {
        let snapshot = self.entries();
        let mut report = ResyncReport::default();

        let mut wanted: HashSet<String> = HashSet::new();
        let mut to_register: Vec<&HotkeyEntry> = Vec::new();
        for entry in &snapshot {
            if wanted.insert(entry.combo.clone()) {
                to_register.push(entry);
            } else {
                report.failures.push(RegistrationFailure {
                    combo: entry.combo.clone(),
                    reason: LauncherError::DuplicateCombo(entry.combo.clone()).to_string(),
                });
            }
        }

        for combo in self.dispatcher.active_combos() {
            if !wanted.contains(&combo) {
                self.dispatcher.unregister(&combo);
                report.unregistered.push(combo);
            }
        }

        for entry in to_register {
            if self.dispatcher.is_registered(&entry.combo) {
                continue;
            }
            let combo = match Combo::parse(&entry.combo) {
                Ok(combo) => combo,
                Err(e) => {
                    report.failures.push(RegistrationFailure {
                        combo: entry.combo.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            match self
                .dispatcher
                .register(&combo, self.fire_handler(entry.combo.clone()))
            {
                Ok(_) => report.registered.push(entry.combo.clone()),
                Err(e) => report.failures.push(RegistrationFailure {
                    combo: entry.combo.clone(),
                    reason: e.to_string(),
                }),
            }
        }

        report.active = self.dispatcher.active_combos().len();
        tracing::info!(
            active = report.active,
            registered = report.registered.len(),
            unregistered = report.unregistered.len(),
            failed = report.failures.len(),
            "Hotkeys resynced"
        );
        report
    }

    /// Handler for one combo. It captures the combo string, not the entry,
    /// and resolves the target from the list at fire time.
    pub(super) fn fire_handler(&self, combo: String) -> FireHandler {
        let entries = Arc::clone(&self.entries);
        let opener = Arc::clone(&self.opener);
        let sink = Arc::clone(&self.sink);

        Arc::new(move || {
            let entry = entries.read().iter().find(|e| e.combo == combo).cloned();
            // Removed between the key press and now.
            let Some(entry) = entry else {
                return;
            };
            let result = opener.open(&entry.target, entry.kind);
            sink.notify(
                Level::from_ok(result.is_ok()),
                &format!("[{}] {}", combo, launch_message(&result)),
            );
        })
    }

    // -------------------------------------------------------------------------
    // Launching & lifecycle
    // -------------------------------------------------------------------------

    /// Launch an entry's target right away, as if its hotkey had fired.
    pub fn open_entry(&self, index: usize) -> Result<()> {
        let entry = self.entries.read().get(index).cloned();
        let Some(entry) = entry else {
            return self.fail(LauncherError::NotFound(format!("index {}", index)));
        };
        let result = self.opener.open(&entry.target, entry.kind);
        self.sink.notify(
            Level::from_ok(result.is_ok()),
            &format!("[{}] {}", entry.combo, launch_message(&result)),
        );
        result
    }

    /// Start listening for hotkey presses. Calling this while running is a no-op.
    pub fn start(&self) -> Result<()> {
        self.dispatcher.start().inspect_err(|e| {
            self.sink
                .notify(Level::Error, &format!("Listener failed to start: {}", e));
        })
    }

    pub fn stop(&self) {
        self.dispatcher.stop();
    }

    /// Stop listening, release every OS registration and attempt a final save.
    /// A failed save is logged and never blocks shutdown.
    pub fn shutdown(&self) {
        self.dispatcher.stop();
        self.dispatcher.unregister_all();
        let path = self.options.store_path.clone();
        self.save(&path).log_err();
    }
}

fn launch_message(result: &Result<()>) -> String {
    match result {
        Ok(()) => "Opened successfully.".to_string(),
        Err(e) => e.to_string(),
    }
}
