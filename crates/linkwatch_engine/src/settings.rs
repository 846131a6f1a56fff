use std::sync::Mutex;

use linkwatch_core::{ConfigError, MonitorConfig, RawConfig};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings: {0}")]
    Format(#[from] serde_json::Error),
    #[error("settings store unavailable: {0}")]
    Unavailable(String),
}

/// Persisted settings, keyed the way the browser storage keys them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_url: Option<String>,
    #[serde(default)]
    pub regex_filter: String,
    #[serde(default, deserialize_with = "delay_from_number_or_text")]
    pub opening_delay: u64,
    #[serde(default = "enabled")]
    pub notify_enabled: bool,
    #[serde(default = "enabled")]
    pub open_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_label: Option<String>,
    #[serde(default)]
    pub monitoring_stopped: bool,
    /// Keys owned by other components of the storage, written back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            channel_url: None,
            regex_filter: String::new(),
            opening_delay: 0,
            notify_enabled: true,
            open_enabled: true,
            webhook_url: None,
            source_label: None,
            monitoring_stopped: false,
            extra: Map::new(),
        }
    }
}

impl Settings {
    pub fn raw_config(&self) -> RawConfig {
        RawConfig {
            target_location: self.channel_url.clone(),
            pattern: self.regex_filter.clone(),
            delay_ms: self.opening_delay,
            notify_enabled: self.notify_enabled,
            open_enabled: self.open_enabled,
            notify_endpoint: self.webhook_url.clone(),
            source_label: self.source_label.clone(),
        }
    }

    pub fn monitor_config(&self) -> Result<MonitorConfig, ConfigError> {
        MonitorConfig::compile(self.raw_config())
    }
}

fn enabled() -> bool {
    true
}

/// Parses a delay the way the settings form reads numbers: any finite,
/// non-negative decimal (`"1.5"`, `"1e3"`), rounded down to whole milliseconds.
/// Blank text reads as zero.
pub fn parse_opening_delay(text: &str) -> Option<u64> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0);
    }
    text.parse::<f64>().ok().and_then(whole_millis)
}

fn whole_millis(ms: f64) -> Option<u64> {
    (ms.is_finite() && ms >= 0.0).then(|| ms.floor() as u64)
}

/// The settings form historically stored the delay as text; accept both.
fn delay_from_number_or_text<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Delay {
        Number(f64),
        Text(String),
    }

    let parsed = match Delay::deserialize(deserializer)? {
        Delay::Number(ms) => whole_millis(ms).ok_or_else(|| ms.to_string()),
        Delay::Text(text) => parse_opening_delay(&text).ok_or(text),
    };
    parsed.map_err(|raw| {
        serde::de::Error::custom(format!(
            "opening delay must be a non-negative number, got `{raw}`"
        ))
    })
}

/// Externally owned key-value state the engine reads at session start and
/// writes the stop flag back to.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<Settings, SettingsError>;

    fn save(&self, settings: &Settings) -> Result<(), SettingsError>;

    /// The stored channel url, read leniently for when `load` fails on some
    /// other key.
    fn stored_channel_url(&self) -> Option<String> {
        None
    }

    fn set_monitoring_stopped(&self, stopped: bool) -> Result<(), SettingsError> {
        let mut settings = self.load()?;
        settings.monitoring_stopped = stopped;
        self.save(&settings)
    }
}

#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: Mutex<Settings>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }

    pub fn snapshot(&self) -> Settings {
        self.settings
            .lock()
            .map(|s| s.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Settings, SettingsError> {
        self.settings
            .lock()
            .map(|s| s.clone())
            .map_err(|err| SettingsError::Unavailable(err.to_string()))
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let mut guard = self
            .settings
            .lock()
            .map_err(|err| SettingsError::Unavailable(err.to_string()))?;
        *guard = settings.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_opening_delay, Settings};
    use serde_json::json;

    #[test]
    fn missing_keys_take_defaults() {
        let settings: Settings =
            serde_json::from_value(json!({"channelUrl": "https://discord.com/channels/1/2"}))
                .unwrap();
        assert!(settings.notify_enabled);
        assert!(settings.open_enabled);
        assert_eq!(settings.opening_delay, 0);
        assert!(!settings.monitoring_stopped);
    }

    #[test]
    fn delay_accepts_text_and_numbers() {
        let text: Settings = serde_json::from_value(json!({"openingDelay": "750"})).unwrap();
        assert_eq!(text.opening_delay, 750);
        let number: Settings = serde_json::from_value(json!({"openingDelay": 20})).unwrap();
        assert_eq!(number.opening_delay, 20);
        let blank: Settings = serde_json::from_value(json!({"openingDelay": ""})).unwrap();
        assert_eq!(blank.opening_delay, 0);
    }

    #[test]
    fn fractional_and_exponent_delays_round_down() {
        for (raw, ms) in [
            (json!("1.5"), 1),
            (json!("1e3"), 1000),
            (json!(" 2.9 "), 2),
            (json!(250.75), 250),
        ] {
            let settings: Settings =
                serde_json::from_value(json!({"openingDelay": raw})).unwrap();
            assert_eq!(settings.opening_delay, ms, "{raw}");
        }
        assert_eq!(parse_opening_delay("NaN"), None);
        assert_eq!(parse_opening_delay("inf"), None);
    }

    #[test]
    fn unknown_keys_survive_a_round_trip() {
        let stored = json!({"regexFilter": "clip/", "theme": "dark", "seen": [1, 2]});
        let mut settings: Settings = serde_json::from_value(stored).unwrap();
        assert_eq!(settings.extra.get("theme"), Some(&json!("dark")));

        settings.monitoring_stopped = true;
        let written = serde_json::to_value(&settings).unwrap();
        assert_eq!(written["theme"], json!("dark"));
        assert_eq!(written["seen"], json!([1, 2]));
        assert_eq!(written["monitoringStopped"], json!(true));
    }

    #[test]
    fn negative_delay_is_rejected() {
        assert!(serde_json::from_value::<Settings>(json!({"openingDelay": -5})).is_err());
        assert!(serde_json::from_value::<Settings>(json!({"openingDelay": "-5"})).is_err());
        assert!(serde_json::from_value::<Settings>(json!({"openingDelay": "soon"})).is_err());
    }
}
