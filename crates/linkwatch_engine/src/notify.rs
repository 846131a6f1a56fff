use std::time::Duration;

use chrono::{DateTime, Local};
use linkwatch_core::NotificationRequest;
use reqwest::header::CONTENT_TYPE;
use serde_json::json;

use crate::protocol::DispatchOutcome;

pub const NOTIFICATION_TITLE: &str = "New link detected";
const EMBED_COLOR: u32 = 0x5BC935;
const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S%.3f";

#[derive(Debug, Clone)]
pub struct NotifySettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// One-shot delivery of a detected link. Implementations never retry.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, request: &NotificationRequest) -> DispatchOutcome;
}

/// Embed-style webhook body understood by chat webhooks.
pub fn webhook_payload(
    request: &NotificationRequest,
    timestamp: DateTime<Local>,
) -> serde_json::Value {
    json!({
        "embeds": [{
            "title": NOTIFICATION_TITLE,
            "description": &request.link,
            "color": EMBED_COLOR,
            "fields": [
                {"name": "Delay", "value": format!("{}ms", request.delay_ms), "inline": true},
                {"name": "Pattern", "value": format!("`{}`", request.pattern), "inline": true},
                {"name": "Source", "value": &request.source_label, "inline": true},
            ],
            "footer": {
                "text": format_timestamp(timestamp)
            }
        }]
    })
}

/// Local time with millisecond precision, e.g. `18/10/2026 14:03:07.042`.
pub fn format_timestamp(timestamp: DateTime<Local>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(settings: NotifySettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, request: &NotificationRequest) -> DispatchOutcome {
        let url = match reqwest::Url::parse(&request.endpoint) {
            Ok(url) => url,
            Err(err) => return DispatchOutcome::failed(format!("invalid endpoint: {err}")),
        };
        let body = webhook_payload(request, Local::now());
        let bytes = match serde_json::to_vec(&body) {
            Ok(bytes) => bytes,
            Err(err) => return DispatchOutcome::failed(err.to_string()),
        };

        let response = match self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(bytes)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) if err.is_timeout() => return DispatchOutcome::failed("timeout"),
            Err(err) => return DispatchOutcome::failed(err.to_string()),
        };

        let status = response.status();
        if status.is_success() {
            DispatchOutcome::ok()
        } else {
            DispatchOutcome::failed(format!("HTTP {status}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};
    use linkwatch_core::NotificationRequest;

    use super::{format_timestamp, webhook_payload};

    fn request() -> NotificationRequest {
        NotificationRequest {
            reaction_id: 1,
            endpoint: "https://hooks.example.com/x".to_string(),
            source_label: "#clips".to_string(),
            pattern: "clip/".to_string(),
            delay_ms: 1500,
            link: "https://example.com/clip/42".to_string(),
        }
    }

    #[test]
    fn timestamp_has_millisecond_precision() {
        let ts = Local
            .with_ymd_and_hms(2026, 10, 18, 14, 3, 7)
            .single()
            .unwrap()
            + chrono::Duration::milliseconds(42);
        assert_eq!(format_timestamp(ts), "18/10/2026 14:03:07.042");
    }

    #[test]
    fn payload_has_embed_shape() {
        let ts = Local
            .with_ymd_and_hms(2026, 1, 2, 3, 4, 5)
            .single()
            .unwrap();
        let body = webhook_payload(&request(), ts);
        let embed = &body["embeds"][0];
        assert_eq!(embed["title"], "New link detected");
        assert_eq!(embed["description"], "https://example.com/clip/42");
        assert_eq!(embed["fields"][0]["name"], "Delay");
        assert_eq!(embed["fields"][0]["value"], "1500ms");
        assert_eq!(embed["fields"][1]["name"], "Pattern");
        assert_eq!(embed["fields"][1]["value"], "`clip/`");
        assert_eq!(embed["fields"][2]["name"], "Source");
        assert_eq!(embed["fields"][2]["value"], "#clips");
        assert_eq!(embed["footer"]["text"], "02/01/2026 03:04:05.000");
    }
}
