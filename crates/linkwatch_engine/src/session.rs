use std::collections::VecDeque;
use std::fmt::Display;
use std::future::{pending, Future};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Local;
use linkwatch_core::{
    navigation_effects, stop_effects, update, Effect, MessageLinks, MonitorState, Msg,
    OverlayView, SessionState, StopReason, Tone,
};
use linkwatch_logging::{
    monitor_debug, monitor_error, monitor_info, monitor_warn, set_session_tag,
};
use tokio::sync::mpsc;
use tokio::time::Sleep;
use url::Url;

use crate::control::{SessionCommand, SessionCommands, SessionControl};
use crate::host::{HostDocument, Subscription};
use crate::links::{extract_links, is_message_item};
use crate::notify::Notifier;
use crate::overlay::FeedbackSurface;
use crate::probe::{settle_page, ProbeReport};
use crate::profile::PageProfile;
use crate::protocol::{DispatchOutcome, OutboundCommand};
use crate::settings::SettingsStore;
use crate::types::{MutationBatch, SessionExit};

static NEXT_SESSION_TAG: AtomicU64 = AtomicU64::new(1);

type ProbeFuture = Pin<Box<dyn Future<Output = ProbeReport> + Send>>;

/// Resources that live exactly as long as one page load.
struct Runtime {
    probe: Option<ProbeFuture>,
    subscription: Option<Subscription>,
    delay: Option<(u64, Pin<Box<Sleep>>)>,
    notify_tx: mpsc::UnboundedSender<(u64, DispatchOutcome)>,
    notifications: mpsc::UnboundedReceiver<(u64, DispatchOutcome)>,
    page_exit: Option<SessionExit>,
}

impl Runtime {
    fn new() -> Self {
        let (notify_tx, notifications) = mpsc::unbounded_channel();
        Self {
            probe: None,
            subscription: None,
            delay: None,
            notify_tx,
            notifications,
            page_exit: None,
        }
    }

    fn detach(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.detach();
            monitor_debug!("observer detached");
        }
    }

    fn shutdown(&mut self) {
        self.detach();
        self.probe = None;
        self.delay = None;
    }
}

/// One monitoring session per page load.
pub struct Session {
    host: Arc<dyn HostDocument>,
    store: Arc<dyn SettingsStore>,
    notifier: Arc<dyn Notifier>,
    profile: PageProfile,
    surface: FeedbackSurface,
}

impl Session {
    pub fn new(
        host: Arc<dyn HostDocument>,
        store: Arc<dyn SettingsStore>,
        notifier: Arc<dyn Notifier>,
        profile: PageProfile,
        control: SessionControl,
    ) -> Self {
        let surface = FeedbackSurface::new(host.clone(), control);
        Self {
            host,
            store,
            notifier,
            profile,
            surface,
        }
    }

    /// Runs the entry sequence for the current page and, if it qualifies,
    /// monitors it until the session stops or the page is replaced.
    pub async fn run(&mut self, commands: &mut SessionCommands) -> SessionExit {
        set_session_tag(NEXT_SESSION_TAG.fetch_add(1, Ordering::Relaxed));
        self.surface.forget();

        let location = self.host.location();
        let settings = match self.store.load() {
            Ok(settings) => settings,
            Err(err) => {
                monitor_error!("could not load settings: {err}");
                let target = self.store.stored_channel_url();
                self.reject_settings(target.as_deref(), &location, &err);
                return SessionExit::Inactive;
            }
        };

        let config = match settings.monitor_config() {
            Ok(config) => config,
            Err(err) => {
                monitor_error!("monitoring disabled, invalid settings: {err}");
                self.reject_settings(settings.channel_url.as_deref(), &location, &err);
                return SessionExit::Inactive;
            }
        };

        let (state, effects) = update(
            MonitorState::new(config),
            Msg::PageLoaded {
                location: location.clone(),
                monitoring_stopped: settings.monitoring_stopped,
            },
        );
        if state.session() == SessionState::Idle {
            if settings.monitoring_stopped {
                monitor_info!("monitoring was stopped by the user, not resuming on {location}");
            } else {
                monitor_debug!("{location} is not the monitored channel");
            }
            return SessionExit::Inactive;
        }

        monitor_info!(
            "monitoring {} for links matching `{}`",
            state.config().source_label(),
            state.config().pattern().as_str()
        );
        self.drive(state, effects, commands).await
    }

    /// Shows the error overlay when the page is the configured channel.
    fn reject_settings(&mut self, target: Option<&str>, location: &str, err: &dyn Display) {
        if target.map(str::trim) == Some(location) {
            self.surface.show(&OverlayView::new(
                format!("Invalid settings: {err}"),
                Tone::Error,
            ));
        }
    }

    /// Serves inbound commands while nothing is monitored on this page.
    ///
    /// A stop from an overlay left on the page (after a fault or a settings
    /// error) is stored and the page reloaded, as it is while monitoring.
    pub async fn idle(&mut self, commands: &mut SessionCommands) -> SessionExit {
        loop {
            let effects = match commands.recv().await {
                Some(SessionCommand::Open { url }) => navigation_effects(url),
                Some(SessionCommand::Stop) if self.surface.is_mounted() => {
                    monitor_info!("stop requested by user");
                    stop_effects()
                }
                Some(SessionCommand::Stop) => {
                    monitor_debug!("stop ignored, nothing is monitored");
                    continue;
                }
                None => return SessionExit::Closed,
            };
            let mut runtime = Runtime::new();
            self.execute(effects, &mut runtime);
            if let Some(exit) = runtime.page_exit.take() {
                return exit;
            }
        }
    }

    async fn drive(
        &mut self,
        mut state: MonitorState,
        effects: Vec<Effect>,
        commands: &mut SessionCommands,
    ) -> SessionExit {
        let mut runtime = Runtime::new();
        let mut pending_msgs: VecDeque<Msg> = self.execute(effects, &mut runtime).into();

        loop {
            while let Some(msg) = pending_msgs.pop_front() {
                let matches_before = state.view().matches;
                let (next, effects) = update(state, msg);
                state = next;
                if state.view().matches != matches_before {
                    if let Some(found) = state.last_match() {
                        monitor_info!("matched {} (node {})", found.link.url, found.link.node);
                    }
                }
                pending_msgs.extend(self.execute(effects, &mut runtime));
            }

            if let Some(exit) = exit_for(&state, &mut runtime) {
                runtime.shutdown();
                return exit;
            }

            let msg = tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(SessionCommand::Stop) => {
                        monitor_info!("stop requested by user");
                        Msg::StopClicked
                    }
                    Some(SessionCommand::Open { url }) => Msg::OpenRequested { url },
                    None => {
                        runtime.shutdown();
                        return SessionExit::Closed;
                    }
                },
                report = poll_probe(&mut runtime.probe) => {
                    runtime.probe = None;
                    monitor_debug!("page settled, {} landmarks removed", report.removed);
                    Msg::ProbesSettled { escaped: report.escaped }
                },
                batch = poll_subscription(&mut runtime.subscription) => match batch {
                    Some(batch) => Msg::MessagesInserted {
                        messages: self.classify(&batch),
                        received_at: Local::now(),
                    },
                    None => {
                        runtime.subscription = None;
                        Msg::EnvironmentFault {
                            reason: "message list disappeared".to_string(),
                        }
                    }
                },
                reaction_id = poll_delay(&mut runtime.delay) => {
                    runtime.delay = None;
                    Msg::ReactionDelayElapsed { reaction_id }
                },
                Some((reaction_id, outcome)) = runtime.notifications.recv() => {
                    if let Some(error) = &outcome.error {
                        monitor_warn!("notification for reaction {reaction_id} failed: {error}");
                    } else {
                        monitor_debug!("notification for reaction {reaction_id} delivered");
                    }
                    Msg::NotificationFinished {
                        reaction_id,
                        outcome: outcome.into_result(),
                    }
                },
            };
            pending_msgs.push_back(msg);
        }
    }

    /// Message items of a batch with their links, in batch order.
    fn classify(&self, batch: &MutationBatch) -> Vec<MessageLinks> {
        let base = Url::parse(&self.host.location()).ok();
        batch
            .inserted
            .iter()
            .filter(|node| is_message_item(&node.html, &self.profile.message_item))
            .map(|node| MessageLinks::new(node.id, extract_links(&node.html, base.as_ref())))
            .collect()
    }

    /// Runs effects in order; returns messages produced by failing effects.
    fn execute(&mut self, effects: Vec<Effect>, runtime: &mut Runtime) -> Vec<Msg> {
        let mut follow_up = Vec::new();
        for effect in effects {
            match effect {
                Effect::ShowOverlay(view) => self.surface.show(&view),
                Effect::StartProbes => {
                    runtime.probe = Some(Box::pin(settle_page(
                        self.host.clone(),
                        self.profile.clone(),
                    )));
                }
                Effect::AttachObserver => {
                    runtime.detach();
                    match self.host.observe(&self.profile.message_container) {
                        Ok(subscription) => {
                            monitor_debug!("observer attached");
                            runtime.subscription = Some(subscription);
                        }
                        Err(err) => follow_up.push(Msg::EnvironmentFault {
                            reason: err.to_string(),
                        }),
                    }
                }
                Effect::DetachObserver => runtime.detach(),
                Effect::Notify(request) => {
                    monitor_info!("notifying webhook about {}", request.link);
                    if let Ok(command) = serde_json::to_string(&OutboundCommand::from(&request)) {
                        monitor_debug!("outbound {command}");
                    }
                    let notifier = self.notifier.clone();
                    let tx = runtime.notify_tx.clone();
                    tokio::spawn(async move {
                        let outcome = notifier.send(&request).await;
                        let _ = tx.send((request.reaction_id, outcome));
                    });
                }
                Effect::ScheduleReaction { reaction_id, delay } => {
                    monitor_debug!("reaction {reaction_id} fires in {delay:?}");
                    runtime.delay = Some((reaction_id, Box::pin(tokio::time::sleep(delay))));
                }
                Effect::CancelReaction => runtime.delay = None,
                Effect::Speak { message } => self.host.speak(&message),
                Effect::OpenLink { url } => match self.host.open_in_new_context(&url) {
                    Ok(()) => monitor_info!("opened {url}"),
                    Err(err) => monitor_error!("{err}"),
                },
                Effect::PersistStopFlag(stopped) => {
                    if let Err(err) = self.store.set_monitoring_stopped(stopped) {
                        monitor_error!("could not persist stop flag: {err}");
                    }
                }
                Effect::Reload => {
                    monitor_warn!("reloading page");
                    self.host.reload();
                    runtime.page_exit = Some(SessionExit::Reloaded);
                }
                Effect::Navigate { url } => {
                    monitor_info!("opening channel {}", channel_name(&url));
                    self.host.navigate(&url);
                    runtime.page_exit = Some(SessionExit::Navigated(url));
                }
            }
        }
        follow_up
    }
}

fn exit_for(state: &MonitorState, runtime: &mut Runtime) -> Option<SessionExit> {
    if state.session() == SessionState::Stopped {
        let reason = state.stop_reason().unwrap_or(StopReason::Fault);
        monitor_info!("session stopped ({reason:?})");
        return Some(SessionExit::Stopped {
            reason,
            reloaded: runtime.page_exit.take() == Some(SessionExit::Reloaded),
        });
    }
    if let Some(exit) = runtime.page_exit.take() {
        return Some(exit);
    }
    if state.session() == SessionState::Idle {
        return Some(SessionExit::Inactive);
    }
    None
}

fn channel_name(url: &str) -> String {
    format!("#{}", url.trim_end_matches('/').rsplit('/').next().unwrap_or(url))
}

async fn poll_probe(slot: &mut Option<ProbeFuture>) -> ProbeReport {
    match slot {
        Some(probe) => probe.await,
        None => pending().await,
    }
}

async fn poll_subscription(slot: &mut Option<Subscription>) -> Option<MutationBatch> {
    match slot {
        Some(subscription) => subscription.next_batch().await,
        None => pending().await,
    }
}

async fn poll_delay(slot: &mut Option<(u64, Pin<Box<Sleep>>)>) -> u64 {
    match slot {
        Some((reaction_id, sleep)) => {
            sleep.as_mut().await;
            *reaction_id
        }
        None => pending().await,
    }
}
