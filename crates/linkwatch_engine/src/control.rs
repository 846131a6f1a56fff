use tokio::sync::mpsc;

use crate::protocol::InboundCommand;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Stop,
    Open { url: String },
}

impl From<InboundCommand> for SessionCommand {
    fn from(command: InboundCommand) -> Self {
        match command {
            InboundCommand::OpenDiscord { url } => SessionCommand::Open { url },
        }
    }
}

/// Cloneable handle for the user stop button and external commands.
#[derive(Debug, Clone)]
pub struct SessionControl {
    tx: mpsc::UnboundedSender<SessionCommand>,
}

/// Receiving side, owned by whoever drives sessions.
pub type SessionCommands = mpsc::UnboundedReceiver<SessionCommand>;

pub fn session_channel() -> (SessionControl, SessionCommands) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SessionControl { tx }, rx)
}

impl SessionControl {
    pub fn stop(&self) {
        let _ = self.tx.send(SessionCommand::Stop);
    }

    pub fn open(&self, url: impl Into<String>) {
        let _ = self.tx.send(SessionCommand::Open { url: url.into() });
    }

    pub fn send(&self, command: SessionCommand) {
        let _ = self.tx.send(command);
    }
}
