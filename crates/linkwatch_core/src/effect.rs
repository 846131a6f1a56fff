use std::time::Duration;

use crate::OverlayView;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Upsert the status overlay.
    ShowOverlay(OverlayView),
    /// Wait for the page landmarks, clean them up, then report `ProbesSettled`.
    StartProbes,
    /// Subscribe to message insertions in the message list.
    AttachObserver,
    /// Drop the live subscription, if any.
    DetachObserver,
    /// Fire-and-forget webhook delivery; completion comes back as `NotificationFinished`.
    Notify(NotificationRequest),
    /// Report `ReactionDelayElapsed { reaction_id }` after `delay`.
    ScheduleReaction { reaction_id: u64, delay: Duration },
    CancelReaction,
    Speak { message: String },
    OpenLink { url: String },
    PersistStopFlag(bool),
    Reload,
    Navigate { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub reaction_id: u64,
    pub endpoint: String,
    pub source_label: String,
    pub pattern: String,
    pub delay_ms: u64,
    pub link: String,
}
