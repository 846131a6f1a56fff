//! Link watcher core: pure monitoring state machine and view-model helpers.
mod config;
mod effect;
mod msg;
mod pattern;
mod state;
mod update;
mod view_model;

pub use config::{ConfigError, MonitorConfig, RawConfig};
pub use effect::{Effect, NotificationRequest};
pub use msg::Msg;
pub use pattern::{Pattern, PatternError};
pub use state::{
    CandidateLink, MatchResult, MessageLinks, MonitorPhase, MonitorState, NodeId, SessionState,
    StopReason,
};
pub use update::{navigation_effects, stop_effects, update};
pub use view_model::{MonitorView, OverlayView, Tone};
