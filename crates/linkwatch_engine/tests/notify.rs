use std::time::Duration;

use linkwatch_core::NotificationRequest;
use linkwatch_engine::{Notifier, NotifySettings, WebhookNotifier};
use pretty_assertions::assert_eq;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn request(endpoint: String) -> NotificationRequest {
    NotificationRequest {
        reaction_id: 3,
        endpoint,
        source_label: "#clips".to_string(),
        pattern: "clip/".to_string(),
        delay_ms: 1000,
        link: "https://example.com/clip/42".to_string(),
    }
}

fn notifier() -> WebhookNotifier {
    WebhookNotifier::new(NotifySettings::default()).expect("client builds")
}

#[tokio::test]
async fn successful_delivery_posts_one_embed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = notifier()
        .send(&request(format!("{}/hook", server.uri())))
        .await;
    assert!(outcome.ok, "{outcome:?}");

    let received: Vec<Request> = server.received_requests().await.unwrap_or_default();
    assert_eq!(received.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    let embed = &body["embeds"][0];
    assert_eq!(embed["title"], "New link detected");
    assert_eq!(embed["description"], "https://example.com/clip/42");
    assert_eq!(embed["fields"][0]["value"], "1000ms");
    assert_eq!(embed["fields"][1]["value"], "`clip/`");
    assert_eq!(embed["fields"][2]["value"], "#clips");
    assert!(embed["footer"]["text"].as_str().is_some());
}

#[tokio::test]
async fn server_error_is_reported_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = notifier()
        .send(&request(format!("{}/hook", server.uri())))
        .await;
    assert!(!outcome.ok);
    assert_eq!(outcome.error.as_deref(), Some("HTTP 500 Internal Server Error"));
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(NotifySettings {
        connect_timeout: Duration::from_secs(1),
        request_timeout: Duration::from_millis(50),
    })
    .unwrap();
    let outcome = notifier
        .send(&request(format!("{}/hook", server.uri())))
        .await;
    assert_eq!(outcome.error.as_deref(), Some("timeout"));
}

#[tokio::test]
async fn malformed_endpoint_fails_without_a_request() {
    let outcome = notifier().send(&request("not a url".to_string())).await;
    assert!(!outcome.ok);
    assert!(outcome
        .error
        .unwrap_or_default()
        .starts_with("invalid endpoint"));
}
