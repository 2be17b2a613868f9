//! The persisted unit of configuration: one combo bound to one target.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::types::normalize_combo;

/// What a hotkey's target is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Url,
    #[default]
    File,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Url => "url",
            TargetKind::File => "file",
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(self, TargetKind::Url)
    }

    /// `http://` and `https://` targets are URLs, everything else is a file.
    pub fn detect(target: &str) -> Self {
        let lower = target.trim().to_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            TargetKind::Url
        } else {
            TargetKind::File
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown, missing or non-string `kind` values read as `file`.
impl<'de> Deserialize<'de> for TargetKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value.as_str().map(str::to_lowercase).as_deref() {
            Some("url") => TargetKind::Url,
            _ => TargetKind::File,
        })
    }
}

/// Kind as requested at add time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KindSelection {
    #[default]
    Auto,
    Url,
    File,
}

impl KindSelection {
    pub fn resolve(self, target: &str) -> TargetKind {
        match self {
            KindSelection::Auto => TargetKind::detect(target),
            KindSelection::Url => TargetKind::Url,
            KindSelection::File => TargetKind::File,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyEntry {
    pub combo: String,
    pub target: String,
    #[serde(default)]
    pub kind: TargetKind,
}

impl HotkeyEntry {
    /// Build an entry with trimmed fields and a normalized combo.
    pub fn new(combo: &str, target: &str, kind: TargetKind) -> Self {
        Self {
            combo: normalize_combo(combo),
            target: target.trim().to_string(),
            kind,
        }
    }

    /// Re-apply the same normalization `new` uses, for rows read from disk.
    pub(crate) fn normalized(self) -> Self {
        Self::new(&self.combo, &self.target, self.kind)
    }
}

/// Input to the registry's add operation.
#[derive(Clone, Debug, Default)]
pub struct NewHotkey {
    pub combo: String,
    pub target: String,
    pub kind: KindSelection,
}

impl NewHotkey {
    pub fn new(combo: impl Into<String>, target: impl Into<String>, kind: KindSelection) -> Self {
        Self {
            combo: combo.into(),
            target: target.into(),
            kind,
        }
    }
}
