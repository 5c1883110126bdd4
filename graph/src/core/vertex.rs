use serde::{Serialize, Serializer};

use super::commit::Commit;
use super::reference::Reference;

/// Identity used to deduplicate vertices within one graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VertexId {
    Commit(String),
    /// The reserved HEAD slot
    Head,
    Reference(String),
}

impl std::fmt::Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VertexId::Commit(hash) => write!(f, "commit:{}", hash),
            VertexId::Head => f.write_str(super::reference::HEAD),
            VertexId::Reference(name) => write!(f, "ref:{}", name),
        }
    }
}

impl Serialize for VertexId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VertexKind {
    Commit(Commit),
    Reference(Reference),
}

/// A graph vertex: exactly one commit or one reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vertex {
    #[serde(flatten)]
    pub kind: VertexKind,
    /// Only set for commits that came from the unreachable set
    pub orphan: bool,
}

impl Vertex {
    pub fn commit(commit: Commit) -> Self {
        Self {
            kind: VertexKind::Commit(commit),
            orphan: false,
        }
    }

    pub fn orphan(commit: Commit) -> Self {
        Self {
            kind: VertexKind::Commit(commit),
            orphan: true,
        }
    }

    pub fn reference(reference: Reference) -> Self {
        Self {
            kind: VertexKind::Reference(reference),
            orphan: false,
        }
    }

    pub fn head() -> Self {
        Self::reference(Reference::head())
    }

    pub fn id(&self) -> VertexId {
        match &self.kind {
            VertexKind::Commit(commit) => VertexId::Commit(commit.hash.clone()),
            VertexKind::Reference(reference) if reference.is_head() => VertexId::Head,
            VertexKind::Reference(reference) => VertexId::Reference(reference.name.clone()),
        }
    }

    pub fn as_commit(&self) -> Option<&Commit> {
        match &self.kind {
            VertexKind::Commit(commit) => Some(commit),
            VertexKind::Reference(_) => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match &self.kind {
            VertexKind::Reference(reference) => Some(reference),
            VertexKind::Commit(_) => None,
        }
    }

    pub fn is_head(&self) -> bool {
        self.as_reference().is_some_and(Reference::is_head)
    }
}
