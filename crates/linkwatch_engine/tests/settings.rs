use std::fs;

use linkwatch_engine::{FileSettingsStore, Settings, SettingsStore};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn configured() -> Settings {
    Settings {
        channel_url: Some("https://discord.com/channels/1/2".to_string()),
        regex_filter: "clip/".to_string(),
        opening_delay: 1500,
        notify_enabled: false,
        open_enabled: true,
        webhook_url: None,
        source_label: Some("#clips".to_string()),
        monitoring_stopped: false,
        ..Settings::default()
    }
}

#[test]
fn missing_file_reads_as_defaults() {
    let temp = TempDir::new().unwrap();
    let store = FileSettingsStore::new(temp.path().join("settings.json"));
    assert_eq!(store.load().unwrap(), Settings::default());
}

#[test]
fn save_then_load_round_trips_and_creates_directories() {
    let temp = TempDir::new().unwrap();
    let store = FileSettingsStore::new(temp.path().join("nested/dir/settings.json"));

    store.save(&configured()).unwrap();
    assert_eq!(store.load().unwrap(), configured());

    let text = fs::read_to_string(store.path()).unwrap();
    assert!(text.contains("\"channelUrl\""));
    assert!(text.contains("\"openingDelay\": 1500"));
}

#[test]
fn stop_flag_is_written_without_touching_other_keys() {
    let temp = TempDir::new().unwrap();
    let store = FileSettingsStore::new(temp.path().join("settings.json"));
    store.save(&configured()).unwrap();

    store.set_monitoring_stopped(true).unwrap();
    let loaded = store.load().unwrap();
    assert!(loaded.monitoring_stopped);
    assert_eq!(loaded.regex_filter, "clip/");
    assert_eq!(loaded.opening_delay, 1500);
}

#[test]
fn stop_flag_write_keeps_keys_owned_by_others() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.json");
    fs::write(
        &path,
        r#"{"channelUrl": "https://discord.com/channels/1/2", "popupWidth": 320}"#,
    )
    .unwrap();
    let store = FileSettingsStore::new(path);

    store.set_monitoring_stopped(true).unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(written["popupWidth"], 320);
    assert_eq!(written["monitoringStopped"], true);
    assert_eq!(
        store.stored_channel_url().as_deref(),
        Some("https://discord.com/channels/1/2")
    );
}

#[test]
fn malformed_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(FileSettingsStore::new(path).load().is_err());
}

#[test]
fn invalid_pattern_surfaces_as_config_error() {
    let settings = Settings {
        regex_filter: "([".to_string(),
        ..configured()
    };
    let err = settings.monitor_config().unwrap_err();
    assert!(err.to_string().contains("(["), "{err}");
}
