use global_hotkey::{
    hotkey::{Code, HotKey, Modifiers},
    Error as HotkeyError, GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::error::{LauncherError, Result};
use crate::logging;
use crate::shortcuts::Combo;

/// Identifier the OS hook assigns to a registered combination.
pub type HotkeyId = u32;

/// Callback invoked (off the listener thread) when a combo fires.
pub type FireHandler = Arc<dyn Fn() + Send + Sync>;

// =============================================================================
// OS hook primitive
// =============================================================================

/// The OS-level hotkey facility.
///
/// `wait_event` blocks for at most `timeout` and yields the id of a combo that
/// was just pressed. Releases are never reported.
pub trait HotkeyBackend: Send + Sync {
    fn register(&self, combo: &Combo) -> anyhow::Result<HotkeyId>;
    /// Removing an id that was never registered is a no-op.
    fn unregister(&self, id: HotkeyId) -> anyhow::Result<()>;
    fn wait_event(&self, timeout: Duration) -> Option<HotkeyId>;
}

/// Backend over the `global-hotkey` crate.
///
/// The platform event loop requirements of `global-hotkey` apply: on macOS
/// and Windows the manager must be created on a thread that runs an event
/// loop. On Linux (X11) the crate runs its own event thread.
pub struct GlobalHotkeyBackend {
    manager: Mutex<GlobalHotKeyManager>,
    /// Maps hotkey ID -> HotKey object (needed for proper unregistration)
    hotkeys: Mutex<HashMap<HotkeyId, HotKey>>,
}

impl GlobalHotkeyBackend {
    pub fn new() -> anyhow::Result<Self> {
        let manager = GlobalHotKeyManager::new()
            .map_err(|e| anyhow::anyhow!("Failed to create hotkey manager: {}", e))?;
        Ok(Self {
            manager: Mutex::new(manager),
            hotkeys: Mutex::new(HashMap::new()),
        })
    }
}

impl HotkeyBackend for GlobalHotkeyBackend {
    fn register(&self, combo: &Combo) -> anyhow::Result<HotkeyId> {
        let hotkey = to_hotkey(combo)
            .ok_or_else(|| anyhow::anyhow!("Key '{}' is not supported by the OS hook", combo.key))?;
        let hotkey_id = hotkey.id();

        self.manager
            .lock()
            .register(hotkey)
            .map_err(|e| anyhow::anyhow!(format_hotkey_error(&e, &combo.display())))?;
        self.hotkeys.lock().insert(hotkey_id, hotkey);
        Ok(hotkey_id)
    }

    fn unregister(&self, id: HotkeyId) -> anyhow::Result<()> {
        if let Some(hotkey) = self.hotkeys.lock().remove(&id) {
            self.manager
                .lock()
                .unregister(hotkey)
                .map_err(|e| anyhow::anyhow!("Failed to unregister hotkey (id: {}): {}", id, e))?;
        }
        Ok(())
    }

    fn wait_event(&self, timeout: Duration) -> Option<HotkeyId> {
        let event = GlobalHotKeyEvent::receiver().recv_timeout(timeout).ok()?;
        // Only respond to key PRESS, not release
        (event.state == HotKeyState::Pressed).then_some(event.id)
    }
}

/// Format a hotkey registration error with helpful context
fn format_hotkey_error(e: &HotkeyError, shortcut_display: &str) -> String {
    match e {
        HotkeyError::AlreadyRegistered(hk) => {
            format!(
                "Hotkey '{}' is already registered by another application (ID: {})",
                shortcut_display,
                hk.id()
            )
        }
        HotkeyError::FailedToRegister(msg) => {
            format!(
                "System rejected hotkey '{}': {}. This shortcut may be reserved by the OS.",
                shortcut_display, msg
            )
        }
        HotkeyError::OsError(os_err) => {
            format!("OS error registering '{}': {}", shortcut_display, os_err)
        }
        other => format!(
            "Failed to register hotkey '{}': {}",
            shortcut_display, other
        ),
    }
}

fn to_hotkey(combo: &Combo) -> Option<HotKey> {
    let mut modifiers = Modifiers::empty();
    if combo.modifiers.ctrl {
        modifiers |= Modifiers::CONTROL;
    }
    if combo.modifiers.alt {
        modifiers |= Modifiers::ALT;
    }
    if combo.modifiers.shift {
        modifiers |= Modifiers::SHIFT;
    }
    if combo.modifiers.cmd {
        modifiers |= Modifiers::META;
    }
    let code = code_for_key(&combo.key)?;
    Some(HotKey::new(Some(modifiers), code))
}

/// Convert a canonical key name to a `global_hotkey::Code`.
fn code_for_key(key: &str) -> Option<Code> {
    let code = match key {
        "a" => Code::KeyA,
        "b" => Code::KeyB,
        "c" => Code::KeyC,
        "d" => Code::KeyD,
        "e" => Code::KeyE,
        "f" => Code::KeyF,
        "g" => Code::KeyG,
        "h" => Code::KeyH,
        "i" => Code::KeyI,
        "j" => Code::KeyJ,
        "k" => Code::KeyK,
        "l" => Code::KeyL,
        "m" => Code::KeyM,
        "n" => Code::KeyN,
        "o" => Code::KeyO,
        "p" => Code::KeyP,
        "q" => Code::KeyQ,
        "r" => Code::KeyR,
        "s" => Code::KeyS,
        "t" => Code::KeyT,
        "u" => Code::KeyU,
        "v" => Code::KeyV,
        "w" => Code::KeyW,
        "x" => Code::KeyX,
        "y" => Code::KeyY,
        "z" => Code::KeyZ,
        "0" => Code::Digit0,
        "1" => Code::Digit1,
        "2" => Code::Digit2,
        "3" => Code::Digit3,
        "4" => Code::Digit4,
        "5" => Code::Digit5,
        "6" => Code::Digit6,
        "7" => Code::Digit7,
        "8" => Code::Digit8,
        "9" => Code::Digit9,
        // Function keys
        "f1" => Code::F1,
        "f2" => Code::F2,
        "f3" => Code::F3,
        "f4" => Code::F4,
        "f5" => Code::F5,
        "f6" => Code::F6,
        "f7" => Code::F7,
        "f8" => Code::F8,
        "f9" => Code::F9,
        "f10" => Code::F10,
        "f11" => Code::F11,
        "f12" => Code::F12,
        "f13" => Code::F13,
        "f14" => Code::F14,
        "f15" => Code::F15,
        "f16" => Code::F16,
        "f17" => Code::F17,
        "f18" => Code::F18,
        "f19" => Code::F19,
        "f20" => Code::F20,
        "f21" => Code::F21,
        "f22" => Code::F22,
        "f23" => Code::F23,
        "f24" => Code::F24,
        "space" => Code::Space,
        "enter" => Code::Enter,
        "tab" => Code::Tab,
        "escape" => Code::Escape,
        "backspace" => Code::Backspace,
        "delete" => Code::Delete,
        "insert" => Code::Insert,
        "up" => Code::ArrowUp,
        "down" => Code::ArrowDown,
        "left" => Code::ArrowLeft,
        "right" => Code::ArrowRight,
        "home" => Code::Home,
        "end" => Code::End,
        "pageup" => Code::PageUp,
        "pagedown" => Code::PageDown,
        "semicolon" => Code::Semicolon,
        "quote" => Code::Quote,
        "comma" => Code::Comma,
        "period" => Code::Period,
        "slash" => Code::Slash,
        "backslash" => Code::Backslash,
        "bracketleft" => Code::BracketLeft,
        "bracketright" => Code::BracketRight,
        "minus" => Code::Minus,
        "equal" => Code::Equal,
        "backquote" => Code::Backquote,
        _ => return None,
    };
    Some(code)
}

// =============================================================================
// Hook Dispatcher
// =============================================================================

struct Registration {
    combo: String,
    handler: FireHandler,
}

#[derive(Default)]
struct Registrations {
    /// Maps canonical combo -> hotkey ID
    by_combo: HashMap<String, HotkeyId>,
    /// Maps hotkey ID -> registration (combo snapshot + handler)
    by_id: HashMap<HotkeyId, Registration>,
}

/// Keeps exactly one OS registration per live combo and runs the listener
/// loop that turns hook events into handler invocations.
pub struct HookDispatcher {
    backend: Arc<dyn HotkeyBackend>,
    registrations: Arc<Mutex<Registrations>>,
    running: Arc<AtomicBool>,
    listener: Mutex<Option<JoinHandle<()>>>,
    poll_interval: Duration,
}

impl HookDispatcher {
    pub fn new(backend: Arc<dyn HotkeyBackend>, poll_interval: Duration) -> Self {
        Self {
            backend,
            registrations: Arc::new(Mutex::new(Registrations::default())),
            running: Arc::new(AtomicBool::new(false)),
            listener: Mutex::new(None),
            poll_interval,
        }
    }

    /// Check that the OS hook accepts `combo` by registering and immediately
    /// releasing it. Nothing is left registered either way.
    pub fn validate(&self, combo: &Combo) -> Result<()> {
        let id = self
            .backend
            .register(combo)
            .map_err(|e| LauncherError::InvalidCombo {
                combo: combo.to_canonical_string(),
                reason: e.to_string(),
            })?;
        if let Err(e) = self.backend.unregister(id) {
            logging::log(
                "HOTKEY",
                &format!("Warning: failed to release validation hotkey {}: {}", combo, e),
            );
        }
        Ok(())
    }

    /// Install `handler` for `combo`. An existing registration for the same
    /// combo is replaced.
    pub fn register(&self, combo: &Combo, handler: FireHandler) -> anyhow::Result<HotkeyId> {
        let key = combo.to_canonical_string();
        self.unregister(&key);

        let id = self.backend.register(combo)?;
        let mut regs = self.registrations.lock();
        regs.by_combo.insert(key.clone(), id);
        regs.by_id.insert(id, Registration { combo: key, handler });
        drop(regs);

        logging::log(
            "HOTKEY",
            &format!("Registered hotkey '{}' (id: {})", combo, id),
        );
        Ok(id)
    }

    /// Remove the registration for `combo`. Unknown combos are a no-op.
    pub fn unregister(&self, combo: &str) {
        let id = {
            let mut regs = self.registrations.lock();
            let Some(id) = regs.by_combo.remove(combo) else {
                return;
            };
            regs.by_id.remove(&id);
            id
        };

        if let Err(e) = self.backend.unregister(id) {
            // Internal tracking is already updated
            logging::log(
                "HOTKEY",
                &format!("Warning: failed to unregister '{}' (id: {}): {}", combo, id, e),
            );
        } else {
            logging::log(
                "HOTKEY",
                &format!("Unregistered hotkey '{}' (id: {})", combo, id),
            );
        }
    }

    pub fn unregister_all(&self) {
        for combo in self.active_combos() {
            self.unregister(&combo);
        }
    }

    pub fn is_registered(&self, combo: &str) -> bool {
        self.registrations.lock().by_combo.contains_key(combo)
    }

    /// Canonical combos that currently hold an OS registration, sorted.
    pub fn active_combos(&self) -> Vec<String> {
        let mut combos: Vec<String> = self
            .registrations
            .lock()
            .by_combo
            .keys()
            .cloned()
            .collect();
        combos.sort();
        combos
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start the listener loop on a dedicated thread. No-op while running.
    ///
    /// After `stop`, the previous loop is joined before a new one is spawned,
    /// which blocks for at most one poll interval.
    pub fn start(&self) -> Result<()> {
        let mut listener = self.listener.lock();
        if let Some(handle) = listener.take() {
            if self.is_running() && !handle.is_finished() {
                *listener = Some(handle);
                return Ok(());
            }
            // The old loop has seen (or will see within one poll) a false
            // flag; it must be gone before a new one takes the flag.
            self.running.store(false, Ordering::SeqCst);
            if handle.join().is_err() {
                logging::log_error("HOTKEY", "previous listener panicked", None);
            }
        }

        self.running.store(true, Ordering::SeqCst);
        let backend = Arc::clone(&self.backend);
        let registrations = Arc::clone(&self.registrations);
        let running = Arc::clone(&self.running);
        let poll_interval = self.poll_interval;

        let handle = std::thread::Builder::new()
            .name("hotkey-listener".to_string())
            .spawn(move || listen_loop(backend, registrations, running, poll_interval))
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                LauncherError::io("hotkey-listener thread", e)
            })?;
        *listener = Some(handle);

        logging::log("HOTKEY", "Hotkey listener started");
        Ok(())
    }

    /// Ask the listener loop to exit at its next observation point.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            logging::log("HOTKEY", "Hotkey listener stop requested");
        }
    }
}

impl Drop for HookDispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn listen_loop(
    backend: Arc<dyn HotkeyBackend>,
    registrations: Arc<Mutex<Registrations>>,
    running: Arc<AtomicBool>,
    poll_interval: Duration,
) {
    while running.load(Ordering::SeqCst) {
        let Some(id) = backend.wait_event(poll_interval) else {
            continue;
        };

        let fired = registrations
            .lock()
            .by_id
            .get(&id)
            .map(|reg| (reg.combo.clone(), Arc::clone(&reg.handler)));

        let Some((combo, handler)) = fired else {
            logging::log_debug("HOTKEY", &format!("Ignoring event for unknown id {}", id));
            continue;
        };

        logging::log("HOTKEY", &format!("'{}' pressed (id: {})", combo, id));

        // Each invocation gets its own thread so a slow launch never delays
        // the next event.
        let spawned = std::thread::Builder::new()
            .name(format!("hotkey-fire-{}", combo))
            .spawn(move || handler());
        if let Err(e) = spawned {
            logging::log_error("HOTKEY", &e.to_string(), Some(&combo));
        }
    }
    logging::log("HOTKEY", "Hotkey listener stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeBackend;
    use std::sync::mpsc;

    fn combo(s: &str) -> Combo {
        Combo::parse(s).unwrap()
    }

    fn dispatcher(backend: &Arc<FakeBackend>) -> HookDispatcher {
        HookDispatcher::new(backend.clone(), Duration::from_millis(10))
    }

    #[test]
    fn code_mapping_covers_every_known_key() {
        let keys = [
            "a", "z", "0", "9", "f1", "f12", "f24", "space", "enter", "tab", "escape",
            "backspace", "delete", "insert", "up", "down", "left", "right", "home", "end",
            "pageup", "pagedown", "semicolon", "quote", "comma", "period", "slash", "backslash",
            "bracketleft", "bracketright", "minus", "equal", "backquote",
        ];
        for key in keys {
            assert!(crate::shortcuts::is_known_key(key), "{} should be known", key);
            assert!(code_for_key(key).is_some(), "{} should map to a Code", key);
        }
        assert!(code_for_key("hyper").is_none());
    }

    #[test]
    fn same_combo_maps_to_same_hotkey_id() {
        let a = to_hotkey(&combo("ctrl+alt+c")).unwrap();
        let b = to_hotkey(&combo("Alt + Control + C")).unwrap();
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn validate_leaves_nothing_registered() {
        let backend = Arc::new(FakeBackend::default());
        let d = dispatcher(&backend);

        d.validate(&combo("ctrl+1")).unwrap();
        assert!(backend.registered().is_empty());
        assert!(d.active_combos().is_empty());
    }

    #[test]
    fn validate_reports_os_rejection_as_invalid_combo() {
        let backend = Arc::new(FakeBackend::default());
        backend.reject("ctrl+alt+delete");
        let d = dispatcher(&backend);

        let err = d.validate(&combo("ctrl+alt+delete")).unwrap_err();
        assert!(matches!(err, LauncherError::InvalidCombo { .. }));
    }

    #[test]
    fn unregister_unknown_combo_is_noop() {
        let backend = Arc::new(FakeBackend::default());
        let d = dispatcher(&backend);
        d.unregister("ctrl+q");
        assert!(d.active_combos().is_empty());
    }

    #[test]
    fn register_replaces_existing_registration() {
        let backend = Arc::new(FakeBackend::default());
        let d = dispatcher(&backend);

        d.register(&combo("ctrl+1"), Arc::new(|| {})).unwrap();
        d.register(&combo("ctrl+1"), Arc::new(|| {})).unwrap();

        assert_eq!(d.active_combos(), vec!["ctrl+1".to_string()]);
        assert_eq!(backend.registered(), vec!["ctrl+1".to_string()]);
    }

    #[test]
    fn start_is_idempotent() {
        let backend = Arc::new(FakeBackend::default());
        let d = dispatcher(&backend);

        d.start().unwrap();
        let first = d.listener.lock().as_ref().map(|h| h.thread().id());
        d.start().unwrap();
        let second = d.listener.lock().as_ref().map(|h| h.thread().id());
        assert!(d.is_running());
        assert!(first.is_some());
        assert_eq!(first, second);

        d.stop();
        assert!(!d.is_running());
    }

    #[test]
    fn restart_after_stop_spawns_a_live_listener() {
        let backend = Arc::new(FakeBackend::default());
        let d = dispatcher(&backend);
        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        d.register(
            &combo("ctrl+r"),
            Arc::new(move || {
                let _ = tx.lock().send(());
            }),
        )
        .unwrap();

        d.start().unwrap();
        let first = d.listener.lock().as_ref().map(|h| h.thread().id());
        d.stop();
        d.start().unwrap();
        let second = d.listener.lock().as_ref().map(|h| h.thread().id());

        assert!(d.is_running());
        assert_ne!(first, second);
        assert!(d
            .listener
            .lock()
            .as_ref()
            .is_some_and(|h| !h.is_finished()));

        backend.press("ctrl+r");
        rx.recv_timeout(Duration::from_secs(2)).unwrap();
        d.stop();
    }

    #[test]
    fn fired_combo_runs_its_own_handler() {
        let backend = Arc::new(FakeBackend::default());
        let d = dispatcher(&backend);
        let (tx, rx) = mpsc::channel();

        for name in ["ctrl+1", "ctrl+2", "ctrl+3"] {
            let tx = Mutex::new(tx.clone());
            let snapshot = name.to_string();
            d.register(
                &combo(name),
                Arc::new(move || {
                    let _ = tx.lock().send(snapshot.clone());
                }),
            )
            .unwrap();
        }
        d.start().unwrap();

        backend.press("ctrl+2");
        let got = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(got, "ctrl+2");

        backend.press("ctrl+1");
        let got = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(got, "ctrl+1");

        d.stop();
    }

    #[test]
    fn slow_handler_does_not_block_other_combos() {
        let backend = Arc::new(FakeBackend::default());
        let d = dispatcher(&backend);
        let (tx, rx) = mpsc::channel();

        let slow_tx = Mutex::new(tx.clone());
        d.register(
            &combo("ctrl+s"),
            Arc::new(move || {
                std::thread::sleep(Duration::from_secs(3));
                let _ = slow_tx.lock().send("slow");
            }),
        )
        .unwrap();
        let fast_tx = Mutex::new(tx);
        d.register(
            &combo("ctrl+f"),
            Arc::new(move || {
                let _ = fast_tx.lock().send("fast");
            }),
        )
        .unwrap();
        d.start().unwrap();

        backend.press("ctrl+s");
        backend.press("ctrl+f");

        let first = rx.recv_timeout(Duration::from_millis(1000)).unwrap();
        assert_eq!(first, "fast");
        d.stop();
    }
}
