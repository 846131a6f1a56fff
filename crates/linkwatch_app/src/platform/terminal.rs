use linkwatch_core::OverlayView;
use linkwatch_engine::{
    HostDocument, HostError, MemoryDocument, NodeHandle, OutboundCommand, OverlayId,
    SessionControl, StructuralQuery, Subscription,
};
use linkwatch_logging::monitor_debug;

/// Host that keeps the page in memory (fed by the bridge) and surfaces
/// everything user-visible on the terminal.
pub struct TerminalHost {
    document: MemoryDocument,
}

impl TerminalHost {
    pub fn new(document: MemoryDocument) -> Self {
        Self { document }
    }

    fn print_overlay(view: &OverlayView) {
        println!("[{:?}] {}", view.tone, view.message);
    }
}

impl HostDocument for TerminalHost {
    fn location(&self) -> String {
        self.document.location()
    }

    fn query(&self, query: &StructuralQuery) -> Option<NodeHandle> {
        self.document.query(query)
    }

    fn remove(&self, node: &NodeHandle) {
        self.document.remove(node);
    }

    fn observe(&self, container: &StructuralQuery) -> Result<Subscription, HostError> {
        self.document.observe(container)
    }

    fn mount_overlay(&self, view: &OverlayView, on_stop: SessionControl) -> OverlayId {
        Self::print_overlay(view);
        self.document.mount_overlay(view, on_stop)
    }

    fn update_overlay(&self, id: OverlayId, view: &OverlayView) -> Result<(), HostError> {
        self.document.update_overlay(id, view)?;
        Self::print_overlay(view);
        Ok(())
    }

    /// Rings the bell and emits the `speak` command for a coordinator reading stdout.
    fn speak(&self, message: &str) {
        let command = OutboundCommand::Speak {
            message: message.to_string(),
        };
        match serde_json::to_string(&command) {
            Ok(line) => println!("\x07{line}"),
            Err(_) => println!("\x07{message}"),
        }
        self.document.speak(message);
    }

    fn open_in_new_context(&self, url: &str) -> Result<(), HostError> {
        webbrowser::open(url).map_err(|err| HostError::OpenFailed {
            url: url.to_string(),
            message: err.to_string(),
        })?;
        self.document.open_in_new_context(url)
    }

    fn reload(&self) {
        println!("-- reload {}", self.document.location());
        self.document.reload();
        self.document.clear_page();
    }

    fn navigate(&self, url: &str) {
        println!("-- navigate {url}");
        self.document.navigate(url);
        self.document.clear_page();
        monitor_debug!("page replaced, waiting for the feed to render {url}");
    }
}
