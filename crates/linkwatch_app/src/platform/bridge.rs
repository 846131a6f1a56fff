//! JSON-lines feed that plays the role of the page and of the popup.
//!
//! One event per line, e.g.
//! `{"type":"messages","items":["<li class=\"messageListItem_a\">...</li>"]}`.
//! Blank lines and lines starting with `#` are skipped.

use std::io::BufRead;
use std::thread;
use std::time::Duration;

use linkwatch_engine::{
    HostDocument, InboundCommand, MemoryDocument, SessionCommand, SessionControl, StructuralQuery,
};
use linkwatch_logging::{monitor_debug, monitor_warn};
use serde::Deserialize;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FeedEvent {
    /// The popup's "monitor" button.
    OpenDiscord { url: String },
    /// A click on the overlay's stop button.
    Stop,
    /// Static markup (landmarks, the message list).
    Render { html: String },
    /// Message items inserted together.
    Messages { items: Vec<String> },
    /// Removes the first node matching `selector`.
    Remove { selector: String },
    /// Pauses the replay.
    Wait { ms: u64 },
}

pub fn parse_line(line: &str) -> Result<Option<FeedEvent>, serde_json::Error> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed).map(Some)
}

/// Reads the feed on its own thread. The receiver ends with the input.
pub fn spawn_reader(source: Box<dyn BufRead + Send>) -> mpsc::UnboundedReceiver<FeedEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        for (index, line) in source.lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    monitor_warn!("feed read failed: {err}");
                    break;
                }
            };
            match parse_line(&line) {
                Ok(Some(event)) => {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) => monitor_warn!("feed line {} skipped: {err}", index + 1),
            }
        }
    });
    rx
}

/// Applies feed events in order until the feed ends.
pub async fn replay(
    mut events: mpsc::UnboundedReceiver<FeedEvent>,
    document: MemoryDocument,
    control: SessionControl,
) {
    while let Some(event) = events.recv().await {
        match event {
            FeedEvent::Wait { ms } => tokio::time::sleep(Duration::from_millis(ms)).await,
            other => apply(other, &document, &control),
        }
    }
}

pub fn apply(event: FeedEvent, document: &MemoryDocument, control: &SessionControl) {
    match event {
        FeedEvent::OpenDiscord { url } => {
            control.send(SessionCommand::from(InboundCommand::OpenDiscord { url }));
        }
        FeedEvent::Stop => {
            if !document.click_stop() {
                monitor_debug!("stop ignored, no overlay on the page");
            }
        }
        FeedEvent::Render { html } => {
            document.render(html);
        }
        FeedEvent::Messages { items } => {
            document.append_messages(items);
        }
        FeedEvent::Remove { selector } => match StructuralQuery::parse(&selector) {
            Ok(query) => match document.query(&query) {
                Some(node) => document.remove(&node),
                None => monitor_debug!("nothing matches `{selector}`"),
            },
            Err(err) => monitor_warn!("{err}"),
        },
        FeedEvent::Wait { .. } => {}
    }
}
