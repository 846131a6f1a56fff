//! Link watcher engine: host seams, page probing, notification delivery and
//! the session runtime that executes core effects.
mod control;
mod host;
mod links;
mod memory;
mod notify;
mod overlay;
mod persist;
mod probe;
mod profile;
mod protocol;
mod session;
mod settings;
mod types;

pub use control::{session_channel, SessionCommand, SessionCommands, SessionControl};
pub use host::{HostDocument, Subscription};
pub use links::{extract_links, is_message_item};
pub use memory::{MemoryDocument, OpenedLink};
pub use notify::{
    format_timestamp, webhook_payload, Notifier, NotifySettings, WebhookNotifier,
    NOTIFICATION_TITLE,
};
pub use overlay::FeedbackSurface;
pub use persist::FileSettingsStore;
pub use probe::{settle_page, EscapeAction, ProbeReport, ProbeSettings, StructuralProbe};
pub use profile::PageProfile;
pub use protocol::{DispatchOutcome, InboundCommand, OutboundCommand};
pub use session::Session;
pub use settings::{
    parse_opening_delay, MemorySettingsStore, Settings, SettingsError, SettingsStore,
};
pub use types::{
    HostError, InsertedNode, MutationBatch, NodeHandle, OverlayId, QueryError, SessionExit,
    StructuralQuery,
};
