use super::*;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.hotkeys_path, None);
    assert_eq!(config.listener_poll_ms, DEFAULT_LISTENER_POLL_MS);
    assert_eq!(config.warn_missing_targets, DEFAULT_WARN_MISSING_TARGETS);
    assert_eq!(config.hotkeys_path(), PathBuf::from("hotkeys.json"));
}

#[test]
fn test_partial_config_uses_defaults() {
    let config: Config = serde_json::from_str(r#"{"warnMissingTargets": false}"#).unwrap();
    assert!(!config.warn_missing_targets);
    assert_eq!(config.listener_poll_ms, DEFAULT_LISTENER_POLL_MS);
    assert_eq!(config.hotkeys_path, None);
}

#[test]
fn test_config_serialization_uses_camel_case() {
    let config = Config {
        hotkeys_path: Some("/data/hotkeys.json".to_string()),
        listener_poll_ms: 100,
        warn_missing_targets: false,
    };

    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("hotkeysPath"));
    assert!(json.contains("listenerPollMs"));

    let deserialized: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized, config);
}

#[test]
fn test_hotkeys_path_tilde_expansion() {
    let config = Config {
        hotkeys_path: Some("~/launcher/hotkeys.json".to_string()),
        ..Default::default()
    };
    let path = config.hotkeys_path();
    assert!(!path.to_string_lossy().starts_with('~'));
    assert!(path.ends_with("launcher/hotkeys.json"));
}

#[test]
fn test_blank_hotkeys_path_falls_back_to_default() {
    let config = Config {
        hotkeys_path: Some("   ".to_string()),
        ..Default::default()
    };
    assert_eq!(config.hotkeys_path(), PathBuf::from("hotkeys.json"));
}

#[test]
fn test_poll_interval_lower_bound() {
    let config = Config {
        listener_poll_ms: 0,
        ..Default::default()
    };
    assert_eq!(config.listener_poll_ms(), MIN_LISTENER_POLL_MS);
}

#[test]
fn test_load_missing_file_returns_defaults() {
    let dir = tempdir().unwrap();
    let config = load_config(Some(&dir.path().join("config.json")));
    assert_eq!(config, Config::default());
}

#[test]
fn test_load_malformed_file_returns_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ listenerPollMs: }").unwrap();

    assert_eq!(load_config(Some(&path)), Config::default());
}

#[test]
fn test_load_valid_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"hotkeysPath": "/srv/hotkeys.json", "listenerPollMs": 50}"#,
    )
    .unwrap();

    let config = load_config(Some(&path));
    assert_eq!(config.hotkeys_path(), PathBuf::from("/srv/hotkeys.json"));
    assert_eq!(config.listener_poll_ms(), 50);
    assert!(config.warn_missing_targets);
}

#[test]
fn test_default_config_path_is_expanded() {
    let path = default_config_path();
    assert!(path.ends_with(".hotkey-launcher/config.json"));
}
