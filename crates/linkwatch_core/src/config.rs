use std::time::Duration;

use url::Url;

use crate::pattern::{Pattern, PatternError};

/// Unvalidated configuration as read from persisted settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawConfig {
    pub target_location: Option<String>,
    pub pattern: String,
    pub delay_ms: u64,
    pub notify_enabled: bool,
    pub open_enabled: bool,
    pub notify_endpoint: Option<String>,
    pub source_label: Option<String>,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no target location configured")]
    MissingTarget,
    #[error("target location `{location}` is not a valid url: {message}")]
    InvalidTarget { location: String, message: String },
    #[error(transparent)]
    InvalidPattern(#[from] PatternError),
    #[error("notifications are enabled but no notification endpoint is configured")]
    MissingEndpoint,
}

/// Immutable per-session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    target_location: String,
    pattern: Pattern,
    delay: Duration,
    notify_enabled: bool,
    open_enabled: bool,
    notify_endpoint: Option<String>,
    source_label: String,
}

impl MonitorConfig {
    /// Validates a raw configuration. Monitoring must not start unless this succeeds.
    pub fn compile(raw: RawConfig) -> Result<Self, ConfigError> {
        let target_location = raw
            .target_location
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingTarget)?;
        Url::parse(&target_location).map_err(|err| ConfigError::InvalidTarget {
            location: target_location.clone(),
            message: err.to_string(),
        })?;

        let pattern = Pattern::compile(&raw.pattern)?;

        let notify_endpoint = raw
            .notify_endpoint
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        if raw.notify_enabled && notify_endpoint.is_none() {
            return Err(ConfigError::MissingEndpoint);
        }

        let source_label = raw
            .source_label
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| default_source_label(&target_location));

        Ok(Self {
            target_location,
            pattern,
            delay: Duration::from_millis(raw.delay_ms),
            notify_enabled: raw.notify_enabled,
            open_enabled: raw.open_enabled,
            notify_endpoint,
            source_label,
        })
    }

    pub fn target_location(&self) -> &str {
        &self.target_location
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay.as_millis() as u64
    }

    pub fn notify_enabled(&self) -> bool {
        self.notify_enabled
    }

    pub fn open_enabled(&self) -> bool {
        self.open_enabled
    }

    pub fn notify_endpoint(&self) -> Option<&str> {
        self.notify_endpoint.as_deref()
    }

    pub fn source_label(&self) -> &str {
        &self.source_label
    }
}

/// `#<last path segment>`, the way channels are named in logs and notifications.
fn default_source_label(target: &str) -> String {
    let segment = target
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(target);
    format!("#{segment}")
}
