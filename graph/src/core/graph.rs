use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use super::edge::{Edge, EdgeType};
use super::vertex::{Vertex, VertexId, VertexKind};

/// Handle to a vertex slot in the graph that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VertexIdx(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EdgeIdx(usize);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("edge endpoint {0} is not a vertex of this graph")]
    MissingEndpoint(VertexId),
}

/// Directed graph of commits and references.
///
/// Vertices live in an insertion-ordered arena indexed by identity, so the
/// same commit hash (or HEAD) never occupies two slots. Edges refer to slots.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommitGraph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    #[serde(skip)]
    index: HashMap<VertexId, VertexIdx>,
}

impl CommitGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a vertex unless one with the same identity exists.
    /// Returns the slot holding the vertex for that identity either way.
    pub fn add_vertex(&mut self, vertex: Vertex) -> VertexIdx {
        let id = vertex.id();
        if let Some(&idx) = self.index.get(&id) {
            return idx;
        }
        let idx = VertexIdx(self.vertices.len());
        self.vertices.push(vertex);
        self.index.insert(id, idx);
        idx
    }

    /// Append a directed edge.
    ///
    /// # Panics
    ///
    /// If either handle does not belong to this graph.
    pub fn add_edge(&mut self, source: VertexIdx, target: VertexIdx, edge_type: EdgeType) -> EdgeIdx {
        assert!(
            source.0 < self.vertices.len() && target.0 < self.vertices.len(),
            "edge {:?} -> {:?} references a vertex outside this graph",
            source,
            target
        );
        let idx = EdgeIdx(self.edges.len());
        self.edges.push(Edge::new(source, target, edge_type));
        idx
    }

    /// Identity-based variant of [`add_edge`](Self::add_edge)
    pub fn try_add_edge(
        &mut self,
        source: &VertexId,
        target: &VertexId,
        edge_type: EdgeType,
    ) -> Result<EdgeIdx, GraphError> {
        let source = self
            .find(source)
            .ok_or_else(|| GraphError::MissingEndpoint(source.clone()))?;
        let target = self
            .find(target)
            .ok_or_else(|| GraphError::MissingEndpoint(target.clone()))?;
        Ok(self.add_edge(source, target, edge_type))
    }

    pub fn find(&self, id: &VertexId) -> Option<VertexIdx> {
        self.index.get(id).copied()
    }

    pub fn vertex(&self, idx: VertexIdx) -> &Vertex {
        &self.vertices[idx.0]
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexIdx, &Vertex)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, vertex)| (VertexIdx(i), vertex))
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The HEAD vertex, if HEAD was seen on any commit
    pub fn head(&self) -> Option<VertexIdx> {
        self.find(&VertexId::Head)
    }

    pub fn commit(&self, hash: &str) -> Option<&Vertex> {
        self.find(&VertexId::Commit(hash.to_string()))
            .map(|idx| self.vertex(idx))
    }

    /// Outgoing edges of a vertex, in insertion order
    pub fn successors(&self, idx: VertexIdx) -> impl Iterator<Item = (VertexIdx, EdgeType)> + '_ {
        self.edges
            .iter()
            .filter(move |edge| edge.source == idx)
            .map(|edge| (edge.target, edge.edge_type))
    }

    /// Follow HEAD through an active reference to the commit it denotes
    pub fn head_target(&self) -> Option<&Vertex> {
        let mut current = self.head()?;
        // HEAD -> ref -> commit at most; the bound guards against malformed input.
        for _ in 0..2 {
            let (next, _) = self
                .successors(current)
                .find(|(_, ty)| matches!(ty, EdgeType::HeadResolution | EdgeType::RefTarget))?;
            if self.vertex(next).as_commit().is_some() {
                return Some(self.vertex(next));
            }
            current = next;
        }
        None
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            total_edges: self.edges.len(),
            ..GraphStats::default()
        };
        for vertex in &self.vertices {
            match &vertex.kind {
                VertexKind::Commit(commit) => {
                    stats.total_commits += 1;
                    stats.orphan_commits += usize::from(vertex.orphan);
                    stats.merge_commits += usize::from(commit.is_merge());
                    stats.root_commits += usize::from(commit.is_root());
                }
                VertexKind::Reference(reference) if reference.is_head() => stats.has_head = true,
                VertexKind::Reference(_) => stats.references += 1,
            }
        }
        stats
    }

    fn identity_edges(&self) -> Vec<(VertexId, VertexId, EdgeType)> {
        let mut edges: Vec<_> = self
            .edges
            .iter()
            .map(|edge| {
                (
                    self.vertex(edge.source).id(),
                    self.vertex(edge.target).id(),
                    edge.edge_type,
                )
            })
            .collect();
        edges.sort();
        edges
    }
}

/// Structural equality: same vertex identities and flags, same typed edges
/// between the same identities. Slot numbering is ignored.
impl PartialEq for CommitGraph {
    fn eq(&self, other: &Self) -> bool {
        if self.vertices.len() != other.vertices.len() || self.edges.len() != other.edges.len() {
            return false;
        }
        let same_vertices = self.vertices.iter().all(|vertex| {
            other
                .find(&vertex.id())
                .is_some_and(|idx| other.vertex(idx) == vertex)
        });
        same_vertices && self.identity_edges() == other.identity_edges()
    }
}

impl Eq for CommitGraph {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub total_commits: usize,
    pub orphan_commits: usize,
    pub merge_commits: usize,
    pub root_commits: usize,
    pub references: usize,
    pub total_edges: usize,
    pub has_head: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Commit, Reference};

    #[test]
    fn add_vertex_is_idempotent_per_identity() {
        let mut graph = CommitGraph::new();
        let a = graph.add_vertex(Vertex::commit(Commit::new("a")));
        let again = graph.add_vertex(Vertex::commit(Commit::new("a").with_subject("other")));
        let head = graph.add_vertex(Vertex::head());
        let head_again = graph.add_vertex(Vertex::head());

        assert_eq!(a, again);
        assert_eq!(head, head_again);
        assert_eq!(graph.vertex_count(), 2);
        // The first insertion wins.
        assert_eq!(graph.vertex(a).as_commit().unwrap().subject, None);
    }

    #[test]
    fn edges_are_not_deduplicated() {
        let mut graph = CommitGraph::new();
        let a = graph.add_vertex(Vertex::commit(Commit::new("a")));
        let b = graph.add_vertex(Vertex::commit(Commit::new("b")));
        graph.add_edge(a, b, EdgeType::Ancestry);
        graph.add_edge(a, b, EdgeType::Ancestry);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.successors(a).count(), 2);
        assert_eq!(graph.successors(b).count(), 0);
    }

    #[test]
    #[should_panic(expected = "outside this graph")]
    fn foreign_handle_fails_fast() {
        let mut other = CommitGraph::new();
        other.add_vertex(Vertex::commit(Commit::new("x")));
        let foreign = other.add_vertex(Vertex::commit(Commit::new("y")));

        let mut graph = CommitGraph::new();
        let a = graph.add_vertex(Vertex::commit(Commit::new("a")));
        graph.add_edge(a, foreign, EdgeType::Ancestry);
    }

    #[test]
    fn try_add_edge_reports_missing_endpoint() {
        let mut graph = CommitGraph::new();
        graph.add_vertex(Vertex::commit(Commit::new("a")));
        let err = graph
            .try_add_edge(
                &VertexId::Commit("a".into()),
                &VertexId::Commit("b".into()),
                EdgeType::Ancestry,
            )
            .unwrap_err();
        assert_eq!(err, GraphError::MissingEndpoint(VertexId::Commit("b".into())));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn head_target_follows_active_reference() {
        let mut graph = CommitGraph::new();
        let a = graph.add_vertex(Vertex::commit(Commit::new("a")));
        let main = graph.add_vertex(Vertex::reference(Reference::new("main", true)));
        let head = graph.add_vertex(Vertex::head());
        graph.add_edge(main, a, EdgeType::RefTarget);
        graph.add_edge(head, main, EdgeType::HeadResolution);

        let target = graph.head_target().unwrap();
        assert_eq!(target.as_commit().unwrap().hash, "a");
    }

    #[test]
    fn structural_equality_ignores_slot_order() {
        let mut left = CommitGraph::new();
        let a = left.add_vertex(Vertex::commit(Commit::new("a")));
        let b = left.add_vertex(Vertex::commit(Commit::new("b")));
        left.add_edge(a, b, EdgeType::Ancestry);

        let mut right = CommitGraph::new();
        let b = right.add_vertex(Vertex::commit(Commit::new("b")));
        let a = right.add_vertex(Vertex::commit(Commit::new("a")));
        right.add_edge(a, b, EdgeType::Ancestry);

        assert_eq!(left, right);

        let mut flipped = CommitGraph::new();
        let a = flipped.add_vertex(Vertex::commit(Commit::new("a")));
        let b = flipped.add_vertex(Vertex::commit(Commit::new("b")));
        flipped.add_edge(b, a, EdgeType::Ancestry);
        assert_ne!(left, flipped);
    }
}
