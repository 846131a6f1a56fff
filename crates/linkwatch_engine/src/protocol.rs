use linkwatch_core::NotificationRequest;
use serde::{Deserialize, Serialize};

/// Message accepted from outside the page (e.g. the popup).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundCommand {
    /// Navigate to `url` and clear the stop flag.
    OpenDiscord { url: String },
}

/// Messages the engine sends to the background coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundCommand {
    Speak {
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    SendWebhook {
        endpoint: String,
        source_label: String,
        pattern: String,
        delay_ms: u64,
        link: String,
    },
}

impl From<&NotificationRequest> for OutboundCommand {
    fn from(request: &NotificationRequest) -> Self {
        OutboundCommand::SendWebhook {
            endpoint: request.endpoint.clone(),
            source_label: request.source_label.clone(),
            pattern: request.pattern.clone(),
            delay_ms: request.delay_ms,
            link: request.link.clone(),
        }
    }
}

/// Reply to `sendWebhook`, and the result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    #[serde(rename = "success")]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DispatchOutcome {
    pub fn ok() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }

    pub fn into_result(self) -> Result<(), String> {
        if self.ok {
            Ok(())
        } else {
            Err(self.error.unwrap_or_else(|| "unknown error".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DispatchOutcome, InboundCommand, OutboundCommand};
    use serde_json::json;

    #[test]
    fn inbound_open_command_uses_wire_names() {
        let command: InboundCommand =
            serde_json::from_value(json!({"type": "openDiscord", "url": "https://x/1"})).unwrap();
        assert_eq!(
            command,
            InboundCommand::OpenDiscord {
                url: "https://x/1".to_string()
            }
        );
    }

    #[test]
    fn send_webhook_serializes_camel_case() {
        let command = OutboundCommand::SendWebhook {
            endpoint: "https://hook".to_string(),
            source_label: "#clips".to_string(),
            pattern: "clip/".to_string(),
            delay_ms: 250,
            link: "https://x/clip/1".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&command).unwrap(),
            json!({
                "type": "sendWebhook",
                "endpoint": "https://hook",
                "sourceLabel": "#clips",
                "pattern": "clip/",
                "delayMs": 250,
                "link": "https://x/clip/1"
            })
        );
        assert_eq!(
            serde_json::to_value(OutboundCommand::Speak {
                message: "hi".to_string()
            })
            .unwrap(),
            json!({"type": "speak", "message": "hi"})
        );
    }

    #[test]
    fn notification_request_maps_to_send_webhook() {
        let request = linkwatch_core::NotificationRequest {
            reaction_id: 9,
            endpoint: "https://hook".to_string(),
            source_label: "#clips".to_string(),
            pattern: "clip/".to_string(),
            delay_ms: 0,
            link: "https://x/clip/1".to_string(),
        };
        assert_eq!(
            OutboundCommand::from(&request),
            OutboundCommand::SendWebhook {
                endpoint: "https://hook".to_string(),
                source_label: "#clips".to_string(),
                pattern: "clip/".to_string(),
                delay_ms: 0,
                link: "https://x/clip/1".to_string(),
            }
        );
    }

    #[test]
    fn dispatch_reply_shape() {
        assert_eq!(
            serde_json::to_value(DispatchOutcome::ok()).unwrap(),
            json!({"success": true})
        );
        let failed: DispatchOutcome =
            serde_json::from_value(json!({"success": false, "error": "HTTP 500"})).unwrap();
        assert_eq!(failed.into_result(), Err("HTTP 500".to_string()));
    }
}
