//! In-process stand-ins for the OS hook, the launcher and the UI sink.

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::mpsc;
use std::time::Duration;

use crate::error::{LauncherError, Result};
use crate::hotkeys::{HotkeyBackend, HotkeyId};
use crate::notifications::{Level, Notification, NotificationSink};
use crate::opener::Opener;
use crate::shortcuts::{Combo, TargetKind};

#[derive(Default)]
struct FakeState {
    next_id: HotkeyId,
    by_combo: HashMap<String, HotkeyId>,
    rejected: HashSet<String>,
    register_calls: usize,
}

/// Hook backend with scriptable rejections and synthetic key presses.
pub struct FakeBackend {
    state: Mutex<FakeState>,
    tx: Mutex<mpsc::Sender<HotkeyId>>,
    rx: Mutex<mpsc::Receiver<HotkeyId>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            state: Mutex::new(FakeState::default()),
            tx: Mutex::new(tx),
            rx: Mutex::new(rx),
        }
    }
}

impl FakeBackend {
    /// Make the "OS" refuse this combo from now on.
    pub fn reject(&self, combo: &str) {
        self.state.lock().rejected.insert(combo.to_string());
    }

    /// Simulate the user pressing `combo`. Ignored if it isn't registered.
    pub fn press(&self, combo: &str) {
        let id = self.state.lock().by_combo.get(combo).copied();
        if let Some(id) = id {
            let _ = self.tx.lock().send(id);
        }
    }

    pub fn registered(&self) -> Vec<String> {
        let mut combos: Vec<String> = self.state.lock().by_combo.keys().cloned().collect();
        combos.sort();
        combos
    }

    pub fn register_calls(&self) -> usize {
        self.state.lock().register_calls
    }
}

impl HotkeyBackend for FakeBackend {
    fn register(&self, combo: &Combo) -> anyhow::Result<HotkeyId> {
        let key = combo.to_canonical_string();
        let mut state = self.state.lock();
        state.register_calls += 1;
        if state.rejected.contains(&key) {
            anyhow::bail!("System rejected hotkey '{}'", key);
        }
        if state.by_combo.contains_key(&key) {
            anyhow::bail!("Hotkey '{}' is already registered", key);
        }
        state.next_id += 1;
        let id = state.next_id;
        state.by_combo.insert(key, id);
        Ok(id)
    }

    fn unregister(&self, id: HotkeyId) -> anyhow::Result<()> {
        self.state.lock().by_combo.retain(|_, v| *v != id);
        Ok(())
    }

    fn wait_event(&self, timeout: Duration) -> Option<HotkeyId> {
        self.rx.lock().recv_timeout(timeout).ok()
    }
}

/// Sink that keeps every notification for later assertions.
#[derive(Default)]
pub struct RecordingSink {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.seen.lock().last().cloned()
    }

    pub fn count(&self, level: Level) -> usize {
        self.seen.lock().iter().filter(|n| n.level == level).count()
    }

    pub fn clear(&self) {
        self.seen.lock().clear();
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, level: Level, message: &str) {
        self.seen.lock().push(Notification {
            level,
            message: message.to_string(),
        });
    }
}

/// Opener that records launches, optionally sleeping or failing per target.
#[derive(Default)]
pub struct FakeOpener {
    opened: Mutex<Vec<(String, TargetKind)>>,
    delays: Mutex<HashMap<String, Duration>>,
    failing: Mutex<HashSet<String>>,
    notify: Mutex<Option<mpsc::Sender<String>>>,
}

impl FakeOpener {
    pub fn delay(&self, target: &str, delay: Duration) {
        self.delays.lock().insert(target.to_string(), delay);
    }

    pub fn fail(&self, target: &str) {
        self.failing.lock().insert(target.to_string());
    }

    /// Receive each target as soon as its launch completes.
    pub fn subscribe(&self) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel();
        *self.notify.lock() = Some(tx);
        rx
    }

    pub fn opened(&self) -> Vec<(String, TargetKind)> {
        self.opened.lock().clone()
    }
}

impl Opener for FakeOpener {
    fn open(&self, target: &str, kind: TargetKind) -> Result<()> {
        let delay = self.delays.lock().get(target).copied();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        if self.failing.lock().contains(target) {
            return Err(LauncherError::Launch(format!("cannot open {}", target)));
        }
        self.opened.lock().push((target.to_string(), kind));
        if let Some(tx) = self.notify.lock().as_ref() {
            let _ = tx.send(target.to_string());
        }
        Ok(())
    }
}
