use std::sync::{Arc, Mutex, MutexGuard};

use linkwatch_core::{NodeId, OverlayView};
use scraper::Html;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::control::SessionControl;
use crate::host::{HostDocument, Subscription};
use crate::types::{
    HostError, InsertedNode, MutationBatch, NodeHandle, OverlayId, StructuralQuery,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedLink {
    pub url: String,
    pub at: Instant,
}

struct Observer {
    id: u64,
    container: StructuralQuery,
    tx: mpsc::UnboundedSender<MutationBatch>,
}

struct Overlay {
    id: OverlayId,
    view: OverlayView,
    on_stop: SessionControl,
}

#[derive(Default)]
struct DocumentState {
    location: String,
    nodes: Vec<(NodeId, String)>,
    next_node: NodeId,
    observers: Vec<Observer>,
    next_observer: u64,
    overlay: Option<Overlay>,
    overlay_mounts: usize,
    queries: usize,
    reloads: usize,
    navigations: Vec<String>,
    opened: Vec<OpenedLink>,
    spoken: Vec<String>,
}

impl DocumentState {
    fn find(&self, query: &StructuralQuery) -> Option<NodeHandle> {
        self.nodes.iter().find_map(|(id, html)| {
            let fragment = Html::parse_fragment(html);
            let found = fragment.select(query.selector()).next()?;
            Some(NodeHandle {
                id: *id,
                html: found.html(),
            })
        })
    }
}

/// In-process page: a flat list of top-level HTML fragments plus recorded
/// side effects. Inserting messages fans a batch out to every live observer.
#[derive(Clone)]
pub struct MemoryDocument {
    state: Arc<Mutex<DocumentState>>,
}

impl MemoryDocument {
    pub fn new(location: impl Into<String>) -> Self {
        let state = DocumentState {
            location: location.into(),
            next_node: 1,
            next_observer: 1,
            ..DocumentState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DocumentState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Adds a static node (landmark, container) without notifying observers.
    pub fn render(&self, html: impl Into<String>) -> NodeId {
        let mut state = self.lock();
        let id = state.next_node;
        state.next_node += 1;
        state.nodes.push((id, html.into()));
        id
    }

    /// Inserts nodes as one mutation batch.
    pub fn append_messages<I, S>(&self, items: I) -> Vec<NodeId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.lock();
        let mut inserted = Vec::new();
        for html in items {
            let id = state.next_node;
            state.next_node += 1;
            let html = html.into();
            state.nodes.push((id, html.clone()));
            inserted.push(InsertedNode { id, html });
        }
        let ids = inserted.iter().map(|node| node.id).collect();
        if !inserted.is_empty() {
            let batch = MutationBatch::new(inserted);
            state
                .observers
                .retain(|observer| observer.tx.send(batch.clone()).is_ok());
        }
        ids
    }

    /// Removes a node; observers whose container disappeared are closed.
    pub fn remove_node(&self, id: NodeId) {
        let mut state = self.lock();
        state.nodes.retain(|(node, _)| *node != id);
        let observers: Vec<Observer> = std::mem::take(&mut state.observers);
        let kept: Vec<Observer> = observers
            .into_iter()
            .filter(|observer| state.find(&observer.container).is_some())
            .collect();
        state.observers = kept;
    }

    /// Drops the tree, its observers and the overlay, as a page replacement
    /// would. Recorded side effects are kept.
    pub fn clear_page(&self) {
        let mut state = self.lock();
        state.nodes.clear();
        state.observers.clear();
        state.overlay = None;
    }

    pub fn set_location(&self, location: impl Into<String>) {
        self.lock().location = location.into();
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.lock().nodes.iter().any(|(node, _)| *node == id)
    }

    pub fn observer_count(&self) -> usize {
        self.lock().observers.len()
    }

    pub fn query_count(&self) -> usize {
        self.lock().queries
    }

    pub fn reload_count(&self) -> usize {
        self.lock().reloads
    }

    pub fn navigations(&self) -> Vec<String> {
        self.lock().navigations.clone()
    }

    pub fn opened(&self) -> Vec<OpenedLink> {
        self.lock().opened.clone()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.lock().spoken.clone()
    }

    pub fn overlay(&self) -> Option<OverlayView> {
        self.lock().overlay.as_ref().map(|overlay| overlay.view.clone())
    }

    pub fn overlay_mounts(&self) -> usize {
        self.lock().overlay_mounts
    }

    /// Simulates a click on the overlay's stop button. Returns false without an overlay.
    pub fn click_stop(&self) -> bool {
        let on_stop = self.lock().overlay.as_ref().map(|o| o.on_stop.clone());
        match on_stop {
            Some(control) => {
                control.stop();
                true
            }
            None => false,
        }
    }

    /// Removes the overlay the way a page script might.
    pub fn discard_overlay(&self) {
        self.lock().overlay = None;
    }
}

impl HostDocument for MemoryDocument {
    fn location(&self) -> String {
        self.lock().location.clone()
    }

    fn query(&self, query: &StructuralQuery) -> Option<NodeHandle> {
        let mut state = self.lock();
        state.queries += 1;
        state.find(query)
    }

    fn remove(&self, node: &NodeHandle) {
        self.remove_node(node.id);
    }

    fn observe(&self, container: &StructuralQuery) -> Result<Subscription, HostError> {
        let mut state = self.lock();
        if state.find(container).is_none() {
            return Err(HostError::ContainerMissing(container.to_string()));
        }
        let id = state.next_observer;
        state.next_observer += 1;
        let (tx, rx) = mpsc::unbounded_channel();
        state.observers.push(Observer {
            id,
            container: container.clone(),
            tx,
        });

        let shared = Arc::downgrade(&self.state);
        Ok(Subscription::new(rx, move || {
            if let Some(shared) = shared.upgrade() {
                let mut state = shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                state.observers.retain(|observer| observer.id != id);
            }
        }))
    }

    fn mount_overlay(&self, view: &OverlayView, on_stop: SessionControl) -> OverlayId {
        let mut state = self.lock();
        state.overlay_mounts += 1;
        let id = state.overlay_mounts as OverlayId;
        // A page holds at most one overlay element.
        state.overlay = Some(Overlay {
            id,
            view: view.clone(),
            on_stop,
        });
        id
    }

    fn update_overlay(&self, id: OverlayId, view: &OverlayView) -> Result<(), HostError> {
        let mut state = self.lock();
        match state.overlay.as_mut() {
            Some(overlay) if overlay.id == id => {
                overlay.view = view.clone();
                Ok(())
            }
            _ => Err(HostError::OverlayGone(id)),
        }
    }

    fn speak(&self, message: &str) {
        self.lock().spoken.push(message.to_string());
    }

    fn open_in_new_context(&self, url: &str) -> Result<(), HostError> {
        self.lock().opened.push(OpenedLink {
            url: url.to_string(),
            at: Instant::now(),
        });
        Ok(())
    }

    fn reload(&self) {
        self.lock().reloads += 1;
    }

    fn navigate(&self, url: &str) {
        let mut state = self.lock();
        state.navigations.push(url.to_string());
        state.location = url.to_string();
    }
}
