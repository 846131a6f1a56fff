use std::fmt;

use linkwatch_core::{NodeId, StopReason};
use scraper::Selector;

/// A structural query (CSS selector) validated at construction.
#[derive(Clone)]
pub struct StructuralQuery {
    source: String,
    selector: Selector,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("invalid structural query `{query}`: {message}")]
pub struct QueryError {
    pub query: String,
    pub message: String,
}

impl StructuralQuery {
    pub fn parse(source: &str) -> Result<Self, QueryError> {
        let selector = Selector::parse(source).map_err(|err| QueryError {
            query: source.to_string(),
            message: format!("{err:?}"),
        })?;
        Ok(Self {
            source: source.to_string(),
            selector,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl fmt::Debug for StructuralQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StructuralQuery").field(&self.source).finish()
    }
}

impl fmt::Display for StructuralQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl PartialEq for StructuralQuery {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for StructuralQuery {}

/// A node found by a structural query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeHandle {
    pub id: NodeId,
    pub html: String,
}

/// One node inserted into the observed container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedNode {
    pub id: NodeId,
    pub html: String,
}

/// Insertions delivered together, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MutationBatch {
    pub inserted: Vec<InsertedNode>,
}

impl MutationBatch {
    pub fn new(inserted: Vec<InsertedNode>) -> Self {
        Self { inserted }
    }

    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty()
    }
}

pub type OverlayId = u64;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum HostError {
    #[error("container `{0}` not found")]
    ContainerMissing(String),
    #[error("overlay {0} is no longer mounted")]
    OverlayGone(OverlayId),
    #[error("could not open `{url}`: {message}")]
    OpenFailed { url: String, message: String },
}

/// How one page load ended for the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionExit {
    /// Monitoring never started on this page (other page, stop flag, bad config).
    Inactive,
    Stopped { reason: StopReason, reloaded: bool },
    /// The engine reloaded the page (probe escape hatch).
    Reloaded,
    Navigated(String),
    /// Every command sender is gone.
    Closed,
}

impl SessionExit {
    /// True when the current page is gone and a new session should start on the next one.
    pub fn replaces_page(&self) -> bool {
        matches!(
            self,
            SessionExit::Reloaded
                | SessionExit::Navigated(_)
                | SessionExit::Stopped { reloaded: true, .. }
        )
    }
}
