use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use linkwatch_logging::{monitor_debug, monitor_warn};

use crate::host::HostDocument;
use crate::profile::PageProfile;
use crate::types::{NodeHandle, StructuralQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSettings {
    pub poll_interval: Duration,
    pub max_attempts: u32,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            max_attempts: 200,
        }
    }
}

/// What the caller must do when a landmark never shows up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeAction {
    /// Assume the page is stale and load it again.
    Reload,
}

#[derive(Debug, Clone, Copy)]
pub struct StructuralProbe {
    settings: ProbeSettings,
}

impl StructuralProbe {
    pub fn new(settings: ProbeSettings) -> Self {
        Self { settings }
    }

    /// Polls until `query` matches, at most `max_attempts` times.
    pub async fn wait_for(
        &self,
        host: &dyn HostDocument,
        query: &StructuralQuery,
    ) -> Result<NodeHandle, EscapeAction> {
        for attempt in 0..self.settings.max_attempts {
            if let Some(node) = host.query(query) {
                monitor_debug!("landmark `{}` found after {} polls", query, attempt + 1);
                return Ok(node);
            }
            tokio::time::sleep(self.settings.poll_interval).await;
        }
        monitor_warn!(
            "landmark `{}` missing after {} polls",
            query,
            self.settings.max_attempts
        );
        Err(EscapeAction::Reload)
    }

    /// Runs one probe per query concurrently; a timeout never cancels siblings.
    pub async fn wait_for_all(
        &self,
        host: &dyn HostDocument,
        queries: &[StructuralQuery],
    ) -> Vec<Result<NodeHandle, EscapeAction>> {
        join_all(queries.iter().map(|query| self.wait_for(host, query))).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProbeReport {
    pub removed: usize,
    pub escaped: bool,
}

/// Entry sequence before monitoring: let the page render, wait for its
/// landmarks, strip them and the extra clutter.
pub async fn settle_page(host: Arc<dyn HostDocument>, profile: PageProfile) -> ProbeReport {
    tokio::time::sleep(profile.settle_before_probe).await;

    let probe = StructuralProbe::new(profile.probe);
    let mut report = ProbeReport::default();
    for outcome in probe.wait_for_all(host.as_ref(), &profile.landmarks).await {
        match outcome {
            Ok(node) => {
                host.remove(&node);
                report.removed += 1;
            }
            Err(EscapeAction::Reload) => report.escaped = true,
        }
    }
    for query in &profile.extra_cleanup {
        if let Some(node) = host.query(query) {
            host.remove(&node);
            report.removed += 1;
        }
    }

    if !report.escaped {
        tokio::time::sleep(profile.settle_after_cleanup).await;
    }
    report
}
