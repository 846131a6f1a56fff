use chrono::{DateTime, Local};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A page finished loading; decides whether this session monitors at all.
    PageLoaded {
        location: String,
        monitoring_stopped: bool,
    },
    /// Landmark probing and cleanup finished. `escaped` is set when at least
    /// one landmark never appeared.
    ProbesSettled { escaped: bool },
    /// One mutation batch, reduced to the message items it inserted, in batch order.
    MessagesInserted {
        messages: Vec<crate::MessageLinks>,
        received_at: DateTime<Local>,
    },
    /// The pre-action delay of a reaction ran out.
    ReactionDelayElapsed { reaction_id: u64 },
    /// Webhook delivery for a reaction completed.
    NotificationFinished {
        reaction_id: u64,
        outcome: Result<(), String>,
    },
    /// User clicked the overlay's stop button.
    StopClicked,
    /// External `openDiscord` command.
    OpenRequested { url: String },
    /// Something the engine relies on vanished or broke.
    EnvironmentFault { reason: String },
}
