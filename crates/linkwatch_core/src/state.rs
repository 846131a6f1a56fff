use chrono::{DateTime, Local};

use crate::view_model::{MonitorView, OverlayView};
use crate::MonitorConfig;

/// Host-assigned identity of an inserted message node.
pub type NodeId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Probing,
    Monitoring,
    Reacting,
    Stopped,
}

/// Change Monitor view of the session: observing, or detached while a reaction is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorPhase {
    Armed,
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Overlay stop button.
    User,
    /// The matched link was opened.
    LinkOpened,
    /// The page broke under the monitor.
    Fault,
}

/// Links of one inserted message item, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLinks {
    pub node: NodeId,
    pub links: Vec<String>,
}

impl MessageLinks {
    pub fn new(node: NodeId, links: Vec<String>) -> Self {
        Self { node, links }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    pub url: String,
    pub node: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub link: CandidateLink,
    pub matched_at: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PendingAction {
    Open,
    Rearm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingReaction {
    pub(crate) id: u64,
    pub(crate) result: MatchResult,
    pub(crate) action: PendingAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorState {
    config: MonitorConfig,
    session: SessionState,
    stop_reason: Option<StopReason>,
    reaction: Option<PendingReaction>,
    next_reaction_id: u64,
    reload_scheduled: bool,
    last_match: Option<MatchResult>,
    matches: u64,
    notifications_sent: u64,
    notifications_failed: u64,
    overlay: OverlayView,
}

impl MonitorState {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            session: SessionState::Idle,
            stop_reason: None,
            reaction: None,
            next_reaction_id: 1,
            reload_scheduled: false,
            last_match: None,
            matches: 0,
            notifications_sent: 0,
            notifications_failed: 0,
            overlay: OverlayView::default(),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn monitor_phase(&self) -> Option<MonitorPhase> {
        match self.session {
            SessionState::Monitoring => Some(MonitorPhase::Armed),
            SessionState::Reacting => Some(MonitorPhase::Suspended),
            _ => None,
        }
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    pub fn reload_scheduled(&self) -> bool {
        self.reload_scheduled
    }

    pub fn last_match(&self) -> Option<&MatchResult> {
        self.last_match.as_ref()
    }

    pub fn view(&self) -> MonitorView {
        MonitorView {
            session: self.session,
            overlay: self.overlay.clone(),
            matches: self.matches,
            last_link: self.last_match.as_ref().map(|m| m.link.url.clone()),
            notifications_sent: self.notifications_sent,
            notifications_failed: self.notifications_failed,
        }
    }

    pub(crate) fn set_session(&mut self, session: SessionState) {
        self.session = session;
    }

    pub(crate) fn stop(&mut self, reason: StopReason) {
        self.session = SessionState::Stopped;
        self.stop_reason = Some(reason);
        self.reaction = None;
    }

    pub(crate) fn schedule_reload(&mut self) {
        self.reload_scheduled = true;
    }

    pub(crate) fn begin_reaction(&mut self, result: MatchResult, action: PendingAction) -> u64 {
        let id = self.next_reaction_id;
        self.next_reaction_id += 1;
        self.matches += 1;
        self.last_match = Some(result.clone());
        self.reaction = Some(PendingReaction { id, result, action });
        self.session = SessionState::Reacting;
        id
    }

    /// Removes the pending reaction if `id` still refers to it.
    pub(crate) fn take_reaction(&mut self, id: u64) -> Option<PendingReaction> {
        match &self.reaction {
            Some(pending) if pending.id == id => self.reaction.take(),
            _ => None,
        }
    }

    pub(crate) fn has_pending_reaction(&self) -> bool {
        self.reaction.is_some()
    }

    pub(crate) fn record_notification(&mut self, ok: bool) {
        if ok {
            self.notifications_sent += 1;
        } else {
            self.notifications_failed += 1;
        }
    }

    pub(crate) fn set_overlay(&mut self, overlay: OverlayView) {
        self.overlay = overlay;
    }
}
