use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::core::{Commit, CommitGraph, EdgeType, Reference, Vertex, VertexIdx, HEAD};

/// Turns retrieved commit records into a [`CommitGraph`].
///
/// The build is pure: it performs no I/O and cannot fail. Input is assumed to
/// be well formed (unique hashes within `commits`).
pub struct GraphBuilder<'a> {
    commits: &'a [Commit],
    active_ref_name: &'a str,
    unreachable: Option<&'a [Commit]>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(commits: &'a [Commit], active_ref_name: &'a str) -> Self {
        Self {
            commits,
            active_ref_name,
            unreachable: None,
        }
    }

    /// Also show these commits as orphans. Any whose hash is among the
    /// reachable commits is dropped; reachability wins.
    pub fn with_unreachable(mut self, unreachable: Option<&'a [Commit]>) -> Self {
        self.unreachable = unreachable;
        self
    }

    pub fn build(&self) -> CommitGraph {
        let working_set = self.working_set();
        let mut graph = CommitGraph::new();

        // Reachable commits only; orphans are never parent targets.
        let mut reachable: HashMap<&str, VertexIdx> = HashMap::with_capacity(self.commits.len());
        let mut slots = Vec::with_capacity(working_set.len());

        for &(commit, orphan) in &working_set {
            let vertex = if orphan {
                Vertex::orphan(commit.clone())
            } else {
                Vertex::commit(commit.clone())
            };
            let commit_idx = graph.add_vertex(vertex);
            slots.push(commit_idx);
            if !orphan {
                reachable.insert(commit.hash.as_str(), commit_idx);
            }
            self.add_ref_edges(&mut graph, commit_idx, commit);
        }

        for (&(commit, _), &commit_idx) in working_set.iter().zip(&slots) {
            for parent in &commit.parent_hashes {
                // Parents outside the retrieved window are expected.
                if let Some(&parent_idx) = reachable.get(parent.as_str()) {
                    graph.add_edge(commit_idx, parent_idx, EdgeType::Ancestry);
                }
            }
        }

        debug!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            "built commit graph"
        );
        graph
    }

    /// Commits to show, each paired with its orphan flag
    fn working_set(&self) -> Vec<(&'a Commit, bool)> {
        let mut seen: HashSet<&str> = self.commits.iter().map(|c| c.hash.as_str()).collect();
        let mut working_set: Vec<_> = self.commits.iter().map(|commit| (commit, false)).collect();

        if let Some(unreachable) = self.unreachable {
            let before = working_set.len();
            working_set.extend(
                unreachable
                    .iter()
                    .filter(|commit| seen.insert(commit.hash.as_str()))
                    .map(|commit| (commit, true)),
            );
            let dropped = unreachable.len() - (working_set.len() - before);
            if dropped > 0 {
                debug!(dropped, "dropped orphan candidates already present");
            }
        }
        working_set
    }

    fn add_ref_edges(&self, graph: &mut CommitGraph, commit_idx: VertexIdx, commit: &Commit) {
        let mut head_here = false;
        let mut head_resolved = false;

        for name in &commit.refs {
            if name == HEAD {
                head_here = true;
                graph.add_vertex(Vertex::head());
                continue;
            }

            let is_active = !self.active_ref_name.is_empty() && name == self.active_ref_name;
            let ref_idx = graph.add_vertex(Vertex::reference(Reference::new(name.as_str(), is_active)));
            graph.add_edge(ref_idx, commit_idx, EdgeType::RefTarget);

            if is_active {
                let head_idx = graph.add_vertex(Vertex::head());
                graph.add_edge(head_idx, ref_idx, EdgeType::HeadResolution);
                head_resolved = true;
            }
        }

        if head_here && !head_resolved {
            let head_idx = graph.add_vertex(Vertex::head());
            graph.add_edge(head_idx, commit_idx, EdgeType::HeadResolution);
        }
    }
}

/// Convenience wrapper over [`GraphBuilder`]
pub fn build_graph(commits: &[Commit], active_ref_name: &str, unreachable: Option<&[Commit]>) -> CommitGraph {
    GraphBuilder::new(commits, active_ref_name)
        .with_unreachable(unreachable)
        .build()
}
