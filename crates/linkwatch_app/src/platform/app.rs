use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use linkwatch_engine::{
    session_channel, FileSettingsStore, MemoryDocument, NotifySettings, PageProfile, Session,
    SessionCommands, SessionExit, SettingsStore, WebhookNotifier,
};
use linkwatch_logging::{monitor_debug, monitor_info};
use tokio::sync::watch;

use super::bridge;
use super::terminal::TerminalHost;

pub struct RunOptions {
    pub settings: PathBuf,
    pub location: Option<String>,
    pub feed: Option<PathBuf>,
}

/// Serves pages from the feed until it ends with nothing left to monitor,
/// or until Ctrl-C.
pub async fn run_app(options: RunOptions) -> Result<()> {
    let store = Arc::new(FileSettingsStore::new(&options.settings));
    let stored = store
        .load()
        .with_context(|| format!("reading settings from {}", options.settings.display()))?;
    let location = options
        .location
        .or(stored.channel_url)
        .context("no --location given and no channelUrl configured")?;

    let document = MemoryDocument::new(location);
    let notifier = WebhookNotifier::new(NotifySettings::default())?;
    let profile = PageProfile::discord()?;
    let (control, mut commands) = session_channel();
    let mut session = Session::new(
        Arc::new(TerminalHost::new(document.clone())),
        store,
        Arc::new(notifier),
        profile,
        control.clone(),
    );

    let events = bridge::spawn_reader(open_feed(options.feed.as_ref())?);
    let (feed_done_tx, feed_done) = watch::channel(false);
    tokio::spawn(async move {
        bridge::replay(events, document, control).await;
        let _ = feed_done_tx.send(true);
    });

    tokio::select! {
        _ = drive_sessions(&mut session, &mut commands, feed_done) => {}
        _ = tokio::signal::ctrl_c() => monitor_info!("interrupted"),
    }
    Ok(())
}

/// One session per page load; between pages only inbound commands are served.
async fn drive_sessions(
    session: &mut Session,
    commands: &mut SessionCommands,
    mut feed_done: watch::Receiver<bool>,
) {
    loop {
        let mut exit = session.run(commands).await;
        monitor_debug!("page finished: {exit:?}");
        while !exit.replaces_page() {
            if exit == SessionExit::Closed {
                return;
            }
            exit = tokio::select! {
                biased;
                exit = session.idle(commands) => exit,
                _ = feed_done.wait_for(|done| *done) => {
                    monitor_info!("feed finished, nothing left to monitor");
                    return;
                }
            };
        }
    }
}

fn open_feed(path: Option<&PathBuf>) -> Result<Box<dyn BufRead + Send>> {
    match path {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("opening feed {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}
