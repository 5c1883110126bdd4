use graph::CommitGraph;
use std::sync::Arc;

/// Triggers delivered to the refresh worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryEvent {
    /// Something under the git directory changed
    Changed,
    /// The watch is being torn down
    Shutdown,
}

/// Notifications for graph consumers, one per completed refresh or state change
#[derive(Debug, Clone)]
pub enum SessionEvent {
    GraphReplaced(Arc<CommitGraph>),
    /// Retrieval failed; the previous graph is still current
    RefreshFailed(String),
    /// The repository path was cleared or became invalid
    Cleared,
    /// The repository loaded but changes on disk will not trigger refreshes
    WatchFailed(String),
}
