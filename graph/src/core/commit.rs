use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Parent hashes of a commit; almost every commit has one or two.
pub type ParentHashes = SmallVec<[String; 2]>;

/// A parsed commit record as delivered by the log retriever
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Unique commit ID (SHA)
    pub hash: String,
    /// Parent commit IDs, in parent order
    #[serde(default)]
    pub parent_hashes: ParentHashes,
    /// Names of the references pointing at this commit (may contain `HEAD`)
    #[serde(default)]
    pub refs: Vec<String>,
    /// Commit message (short)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Author name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Commit timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Commit {
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            parent_hashes: ParentHashes::new(),
            refs: Vec::new(),
            subject: None,
            author: None,
            timestamp: None,
        }
    }

    pub fn with_parents<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parent_hashes = parents.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_refs<I, S>(mut self, refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.refs = refs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Check if this is a root commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parent_hashes.is_empty()
    }

    /// Check if this is a merge commit (multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parent_hashes.len() > 1
    }

    /// Abbreviated hash for display
    pub fn short_hash(&self) -> &str {
        let end = self
            .hash
            .char_indices()
            .nth(7)
            .map(|(i, _)| i)
            .unwrap_or(self.hash.len());
        &self.hash[..end]
    }
}
