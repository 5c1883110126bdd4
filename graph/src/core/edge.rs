use serde::Serialize;

use super::graph::VertexIdx;

/// A directed edge between two vertices of the same graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    pub source: VertexIdx,
    pub target: VertexIdx,
    pub edge_type: EdgeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// Commit to one of its parents
    Ancestry,
    /// Branch or tag to the commit it names
    RefTarget,
    /// HEAD to the active reference, or to a commit when detached
    HeadResolution,
}

impl Edge {
    pub fn new(source: VertexIdx, target: VertexIdx, edge_type: EdgeType) -> Self {
        Self {
            source,
            target,
            edge_type,
        }
    }
}
