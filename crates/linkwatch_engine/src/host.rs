use linkwatch_core::OverlayView;
use tokio::sync::mpsc;

use crate::control::SessionControl;
use crate::types::{HostError, MutationBatch, NodeHandle, OverlayId, StructuralQuery};

/// The page the engine runs against. The engine never owns the tree; it
/// only queries it, subscribes to insertions and asks for side effects.
pub trait HostDocument: Send + Sync {
    fn location(&self) -> String;

    /// First node matching `query`, in document order.
    fn query(&self, query: &StructuralQuery) -> Option<NodeHandle>;

    fn remove(&self, node: &NodeHandle);

    /// Subscribe to node insertions under the first node matching `container`.
    fn observe(&self, container: &StructuralQuery) -> Result<Subscription, HostError>;

    /// Create the status overlay; its stop button must call `on_stop.stop()`.
    fn mount_overlay(&self, view: &OverlayView, on_stop: SessionControl) -> OverlayId;

    fn update_overlay(&self, id: OverlayId, view: &OverlayView) -> Result<(), HostError>;

    fn speak(&self, message: &str);

    fn open_in_new_context(&self, url: &str) -> Result<(), HostError>;

    fn reload(&self);

    fn navigate(&self, url: &str);
}

/// Owned insertion subscription. Detaching is explicit; dropping the handle
/// detaches as a fallback so a subscription can never outlive its owner.
pub struct Subscription {
    batches: mpsc::UnboundedReceiver<MutationBatch>,
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(
        batches: mpsc::UnboundedReceiver<MutationBatch>,
        detach: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            batches,
            detach: Some(Box::new(detach)),
        }
    }

    /// Next batch in delivery order; `None` once the host tore the container down.
    pub async fn next_batch(&mut self) -> Option<MutationBatch> {
        self.batches.recv().await
    }

    pub fn detach(mut self) {
        self.run_detach();
    }

    fn run_detach(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
        self.batches.close();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_detach();
    }
}
