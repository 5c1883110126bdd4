use anyhow::Result;
use graph::Commit;

/// Source of commit records for the graph builder.
///
/// Implementations own any I/O and its failure modes; callers only see
/// well-formed [`Commit`] records or an error.
pub trait LogRetriever: Send {
    /// Most recent commits first, at most `count` of them
    fn recent_commits(&self, count: usize) -> Result<Vec<Commit>>;

    /// Short name of the branch HEAD is attached to; empty when detached
    fn active_reference_name(&self) -> Result<String>;

    /// Hashes of commits no reference can reach, newest first
    fn recent_unreachable_commit_hashes(&self) -> Result<Vec<String>>;

    /// Records for the given hashes; hashes that are not commits are skipped
    fn specific_commits(&self, hashes: &[String]) -> Result<Vec<Commit>>;
}
