//! Key combinations: parsing, canonical identity and a readable label.
//!
//! A combo is any set of modifiers plus exactly one key. Its canonical string
//! (`ctrl+alt+c`) is the identity used by the registry, the store and the
//! dispatcher; `display` is only for humans.

use std::fmt;
use thiserror::Error;

/// Errors that can occur when parsing a combo string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComboParseError {
    #[error("hotkey string is empty")]
    Empty,
    #[error("hotkey has no key, only modifiers")]
    MissingKey,
    #[error("unexpected token '{0}' (only one non-modifier key is allowed)")]
    UnknownToken(String),
    #[error("unknown key '{0}'")]
    UnknownKey(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Modifier {
    Ctrl,
    Alt,
    Shift,
    Cmd,
}

/// Lowercased spellings accepted for each modifier.
const MODIFIER_ALIASES: &[(&str, Modifier)] = &[
    ("ctrl", Modifier::Ctrl),
    ("control", Modifier::Ctrl),
    ("ctl", Modifier::Ctrl),
    ("alt", Modifier::Alt),
    ("opt", Modifier::Alt),
    ("option", Modifier::Alt),
    ("shift", Modifier::Shift),
    ("cmd", Modifier::Cmd),
    ("command", Modifier::Cmd),
    ("meta", Modifier::Cmd),
    ("super", Modifier::Cmd),
    ("win", Modifier::Cmd),
];

/// Alternate key spellings and the canonical name they map to.
const KEY_ALIASES: &[(&str, &str)] = &[
    ("arrowup", "up"),
    ("arrowdown", "down"),
    ("arrowleft", "left"),
    ("arrowright", "right"),
    ("return", "enter"),
    ("esc", "escape"),
    ("del", "delete"),
    ("ins", "insert"),
    ("pgup", "pageup"),
    ("pgdn", "pagedown"),
    ("/", "slash"),
    ("\\", "backslash"),
    (";", "semicolon"),
    ("'", "quote"),
    (",", "comma"),
    (".", "period"),
    ("[", "bracketleft"),
    ("]", "bracketright"),
    ("-", "minus"),
    ("=", "equal"),
    ("`", "backquote"),
];

/// Named (non-character, non-function) keys the OS hook supports, with the
/// label shown to users.
const NAMED_KEYS: &[(&str, &str)] = &[
    ("space", "Space"),
    ("enter", "Enter"),
    ("tab", "Tab"),
    ("escape", "Esc"),
    ("backspace", "Backspace"),
    ("delete", "Delete"),
    ("insert", "Insert"),
    ("up", "Up"),
    ("down", "Down"),
    ("left", "Left"),
    ("right", "Right"),
    ("home", "Home"),
    ("end", "End"),
    ("pageup", "PageUp"),
    ("pagedown", "PageDown"),
    ("semicolon", ";"),
    ("quote", "'"),
    ("comma", ","),
    ("period", "."),
    ("slash", "/"),
    ("backslash", "\\"),
    ("bracketleft", "["),
    ("bracketright", "]"),
    ("minus", "-"),
    ("equal", "="),
    ("backquote", "`"),
];

/// Modifier keys for a combo.
///
/// `cmd` is the platform key: Command on macOS, Super/Windows elsewhere.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub cmd: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.cmd || self.ctrl || self.alt || self.shift
    }

    fn insert(&mut self, modifier: Modifier) {
        match modifier {
            Modifier::Ctrl => self.ctrl = true,
            Modifier::Alt => self.alt = true,
            Modifier::Shift => self.shift = true,
            Modifier::Cmd => self.cmd = true,
        }
    }

    /// (canonical, label) pairs of the held modifiers in canonical order.
    fn held(&self) -> impl Iterator<Item = (&'static str, &'static str)> {
        [
            (self.ctrl, "ctrl", "Ctrl"),
            (self.alt, "alt", "Alt"),
            (self.shift, "shift", "Shift"),
            (self.cmd, "cmd", "Cmd"),
        ]
        .into_iter()
        .filter(|(on, _, _)| *on)
        .map(|(_, name, label)| (name, label))
    }
}

/// A simultaneous key combination: any set of modifiers plus exactly one key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Combo {
    pub key: String,
    pub modifiers: Modifiers,
}

impl Combo {
    /// Parse `ctrl+alt+c`, `Ctrl + Alt + C` or `ctrl alt c`.
    ///
    /// Tokens are case-insensitive and modifiers may come in any order.
    pub fn parse(s: &str) -> Result<Self, ComboParseError> {
        let tokens: Vec<&str> = s
            .split(|c: char| c == '+' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() {
            return Err(ComboParseError::Empty);
        }

        let mut modifiers = Modifiers::default();
        let mut key: Option<&str> = None;
        for token in tokens {
            let lower = token.to_lowercase();
            if let Some(&(_, modifier)) = MODIFIER_ALIASES.iter().find(|(a, _)| *a == lower) {
                modifiers.insert(modifier);
            } else if key.replace(token).is_some() {
                return Err(ComboParseError::UnknownToken(token.to_string()));
            }
        }

        let raw = key.ok_or(ComboParseError::MissingKey)?;
        let key = canonicalize_key(raw);
        if !is_known_key(&key) {
            return Err(ComboParseError::UnknownKey(raw.to_string()));
        }
        Ok(Self { key, modifiers })
    }

    /// Canonical identity string, e.g. `ctrl+alt+c`.
    ///
    /// Modifiers always appear in the order ctrl, alt, shift, cmd.
    pub fn to_canonical_string(&self) -> String {
        self.modifiers
            .held()
            .map(|(name, _)| name)
            .chain(std::iter::once(self.key.as_str()))
            .collect::<Vec<_>>()
            .join("+")
    }

    /// Human label, e.g. `Ctrl+Alt+C` or `Shift+PageUp`.
    pub fn display(&self) -> String {
        let key = NAMED_KEYS
            .iter()
            .find(|(name, _)| *name == self.key)
            .map(|(_, label)| label.to_string())
            .unwrap_or_else(|| self.key.to_uppercase());
        self.modifiers
            .held()
            .map(|(_, label)| label.to_string())
            .chain(std::iter::once(key))
            .collect::<Vec<_>>()
            .join("+")
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

/// Normalize a user- or file-supplied combo string.
///
/// Parseable combos map to their canonical form. Anything else is lowercased
/// with whitespace stripped, so the raw row survives a load and is reported
/// by resync instead of vanishing.
pub fn normalize_combo(raw: &str) -> String {
    match Combo::parse(raw) {
        Ok(combo) => combo.to_canonical_string(),
        Err(_) => raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase(),
    }
}

/// Lowercase a key name and resolve aliases (`esc` -> `escape`, `/` -> `slash`).
pub fn canonicalize_key(key: &str) -> String {
    let lower = key.to_lowercase();
    KEY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(lower)
}

/// Whether a canonical key name is supported by the OS hook: a-z, 0-9,
/// f1-f24 and the named keys.
pub fn is_known_key(key: &str) -> bool {
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return c.is_ascii_lowercase() || c.is_ascii_digit();
    }
    if let Some(n) = key.strip_prefix('f').filter(|n| !n.starts_with('0')) {
        if let Ok(n) = n.parse::<u8>() {
            return (1..=24).contains(&n);
        }
    }
    NAMED_KEYS.iter().any(|(name, _)| *name == key)
}
