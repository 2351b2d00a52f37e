//! Persistence round-trip and edge case tests.
//!
//! Tests file I/O operations, JSON persistence, and settings round-trip.

use std::path::PathBuf;
use tempfile::TempDir;

use crate::persistence::{load_json, load_json_or_default, save_json};
use crate::settings_store::{LogLevel, Settings, SettingsStore};

// ============================================================================
// JSON Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let nested_path = temp_dir.path().join("deeply").join("nested").join("settings.json");

    save_json(&nested_path, &Settings::default()).await.unwrap();
    assert!(nested_path.exists());
}

#[tokio::test]
async fn test_load_nonexistent_file() {
    let file_path = PathBuf::from("/nonexistent/ymobar/settings.json");

    let result: Result<Settings, _> = load_json(&file_path).await;
    assert!(result.is_err());

    let fallback: Settings = load_json_or_default(&file_path).await;
    assert_eq!(fallback, Settings::default());
}

#[tokio::test]
async fn test_load_corrupt_file_falls_back() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");
    tokio::fs::write(&file_path, "{ not json").await.unwrap();

    let fallback: Settings = load_json_or_default(&file_path).await;
    assert_eq!(fallback, Settings::default());
}

// ============================================================================
// Settings Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_settings_full_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");

    let settings = Settings {
        portal_domain: "example.jp".to_string(),
        connect_timeout_secs: 10,
        read_timeout_secs: 20,
        refresh_interval_secs: 600,
        log_level: LogLevel::Debug,
    };

    save_json(&file_path, &settings).await.unwrap();
    let loaded: Settings = load_json(&file_path).await.unwrap();

    assert_eq!(loaded, settings);
}

#[tokio::test]
async fn test_settings_file_uses_snake_case_levels() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");

    save_json(&file_path, &Settings::default()).await.unwrap();
    let raw = tokio::fs::read_to_string(&file_path).await.unwrap();

    assert!(raw.contains(r#""log_level": "warn""#));
    assert!(raw.contains(r#""portal_domain": "ymobile.jp""#));
}

#[tokio::test]
async fn test_load_json_with_unknown_fields() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("extra_fields.json");

    let json = r#"{
        "refresh_interval_secs": 120,
        "theme": "dark",
        "nested_unknown": {"key": "value"}
    }"#;
    tokio::fs::write(&file_path, json).await.unwrap();

    let loaded: Settings = load_json(&file_path).await.unwrap();
    assert_eq!(loaded.refresh_interval_secs, 120);
    assert_eq!(loaded.log_level, LogLevel::Warn);
}

// ============================================================================
// Settings Store Tests
// ============================================================================

#[tokio::test]
async fn test_store_load_missing_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");

    let store = SettingsStore::load(path.clone()).await;

    assert_eq!(store.get().await, Settings::default());
    assert_eq!(store.path(), path.as_path());
    assert!(!path.exists());
}

#[tokio::test]
async fn test_store_save_and_reload() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("conf").join("settings.json");

    let store = SettingsStore::load(path.clone()).await;
    store.set_value("refresh_interval_secs", "900").await.unwrap();
    store.set_value("log_level", "info").await.unwrap();
    store.save().await.unwrap();

    let reloaded = SettingsStore::load(path).await;
    let settings = reloaded.get().await;
    assert_eq!(settings.refresh_interval_secs, 900);
    assert_eq!(settings.log_level, LogLevel::Info);
}

#[tokio::test]
async fn test_store_load_corrupt_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    tokio::fs::write(&path, "[1, 2, 3]").await.unwrap();

    let store = SettingsStore::load(path).await;
    assert_eq!(store.get().await, Settings::default());
}
