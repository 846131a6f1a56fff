use std::sync::Arc;

use linkwatch_core::OverlayView;
use linkwatch_logging::monitor_debug;

use crate::control::SessionControl;
use crate::host::HostDocument;
use crate::types::OverlayId;

/// The one status overlay of a page: created on first `show`, updated in place after.
pub struct FeedbackSurface {
    host: Arc<dyn HostDocument>,
    on_stop: SessionControl,
    mounted: Option<OverlayId>,
}

impl FeedbackSurface {
    pub fn new(host: Arc<dyn HostDocument>, on_stop: SessionControl) -> Self {
        Self {
            host,
            on_stop,
            mounted: None,
        }
    }

    /// Drops the handle of an overlay that went away with its page.
    pub fn forget(&mut self) {
        self.mounted = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn show(&mut self, view: &OverlayView) {
        if let Some(id) = self.mounted {
            match self.host.update_overlay(id, view) {
                Ok(()) => return,
                Err(err) => monitor_debug!("{err}; mounting a new overlay"),
            }
        }
        self.mounted = Some(self.host.mount_overlay(view, self.on_stop.clone()));
    }
}
