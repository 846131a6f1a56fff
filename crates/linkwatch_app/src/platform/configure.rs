use linkwatch_core::{Pattern, PatternError};
use linkwatch_engine::{parse_opening_delay, Settings, SettingsError, SettingsStore};

/// Values entered in the settings form. Unset toggles keep their stored value.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SettingsForm {
    /// Channel page to monitor
    #[arg(long)]
    pub channel_url: String,

    /// Case-insensitive link pattern (empty matches every link)
    #[arg(long, default_value = "")]
    pub regex: String,

    /// Milliseconds between a match and its reaction (fractions round down)
    #[arg(long, default_value = "0")]
    pub delay: String,

    /// Send webhook notifications (true/false)
    #[arg(long)]
    pub notify: Option<bool>,

    /// Open matched links (true/false)
    #[arg(long)]
    pub open: Option<bool>,

    #[arg(long)]
    pub webhook_url: Option<String>,

    /// Label used in notifications, defaults to `#<channel id>`
    #[arg(long)]
    pub source_label: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("channel url is required")]
    MissingChannel,
    #[error(transparent)]
    InvalidPattern(#[from] PatternError),
    #[error("opening delay must be a non-negative number of milliseconds, got `{0}`")]
    InvalidDelay(String),
    #[error(transparent)]
    Store(#[from] SettingsError),
}

/// Applies a form on top of the current settings, rejecting it at the first
/// invalid field in form order.
pub fn apply_form(form: &SettingsForm, current: &Settings) -> Result<Settings, FormError> {
    let channel_url = form.channel_url.trim();
    if channel_url.is_empty() {
        return Err(FormError::MissingChannel);
    }
    Pattern::compile(&form.regex)?;
    let delay = parse_opening_delay(&form.delay)
        .ok_or_else(|| FormError::InvalidDelay(form.delay.clone()))?;

    let mut settings = current.clone();
    settings.channel_url = Some(channel_url.to_string());
    settings.regex_filter = form.regex.clone();
    settings.opening_delay = delay;
    if let Some(notify) = form.notify {
        settings.notify_enabled = notify;
    }
    if let Some(open) = form.open {
        settings.open_enabled = open;
    }
    if form.webhook_url.is_some() {
        settings.webhook_url = form.webhook_url.clone();
    }
    if form.source_label.is_some() {
        settings.source_label = form.source_label.clone();
    }
    Ok(settings)
}

pub fn configure(store: &dyn SettingsStore, form: &SettingsForm) -> Result<Settings, FormError> {
    let settings = apply_form(form, &store.load()?)?;
    store.save(&settings)?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use linkwatch_engine::{FileSettingsStore, Settings, SettingsStore};
    use tempfile::TempDir;

    use super::{apply_form, configure, FormError, SettingsForm};

    fn form() -> SettingsForm {
        SettingsForm {
            channel_url: " https://discord.com/channels/1/2 ".to_string(),
            regex: "clip/".to_string(),
            delay: "1500".to_string(),
            ..SettingsForm::default()
        }
    }

    #[test]
    fn fields_are_validated_in_form_order() {
        let current = Settings::default();
        let blank = SettingsForm {
            channel_url: "  ".to_string(),
            regex: "([".to_string(),
            ..form()
        };
        assert!(matches!(
            apply_form(&blank, &current),
            Err(FormError::MissingChannel)
        ));

        let bad_pattern = SettingsForm {
            regex: "([".to_string(),
            delay: "-1".to_string(),
            ..form()
        };
        assert!(matches!(
            apply_form(&bad_pattern, &current),
            Err(FormError::InvalidPattern(_))
        ));

        for delay in ["-1", "soon", "NaN"] {
            let bad_delay = SettingsForm {
                delay: delay.to_string(),
                ..form()
            };
            assert!(matches!(
                apply_form(&bad_delay, &current),
                Err(FormError::InvalidDelay(_))
            ));
        }
    }

    #[test]
    fn decimal_delays_are_accepted() {
        let current = Settings::default();
        for (delay, ms) in [("1.5", 1), ("1e3", 1000)] {
            let settings = apply_form(
                &SettingsForm {
                    delay: delay.to_string(),
                    ..form()
                },
                &current,
            )
            .unwrap();
            assert_eq!(settings.opening_delay, ms);
        }
    }

    #[test]
    fn unset_toggles_keep_stored_values() {
        let current = Settings {
            notify_enabled: false,
            monitoring_stopped: true,
            ..Settings::default()
        };
        let settings = apply_form(
            &SettingsForm {
                open: Some(false),
                ..form()
            },
            &current,
        )
        .unwrap();

        assert_eq!(
            settings.channel_url.as_deref(),
            Some("https://discord.com/channels/1/2")
        );
        assert_eq!(settings.opening_delay, 1500);
        assert!(!settings.notify_enabled);
        assert!(!settings.open_enabled);
        assert!(settings.monitoring_stopped);
    }

    #[test]
    fn configure_persists_valid_forms_only() {
        let temp = TempDir::new().unwrap();
        let store = FileSettingsStore::new(temp.path().join("linkwatch.json"));

        let saved = configure(
            &store,
            &SettingsForm {
                notify: Some(false),
                ..form()
            },
        )
        .unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.regex_filter, "clip/");
        assert_eq!(loaded.opening_delay, 1500);
        assert!(!loaded.notify_enabled);
        assert!(loaded.open_enabled);
        assert!(loaded.monitor_config().is_ok());

        let rejected = SettingsForm {
            regex: "([".to_string(),
            ..form()
        };
        assert!(configure(&store, &rejected).is_err());
        assert_eq!(store.load().unwrap().regex_filter, "clip/");
    }
}
