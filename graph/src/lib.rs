//! Commit graph model and builder.
//!
//! Turns retrieved commit records, the active reference name and an optional
//! set of unreachable commits into a [`CommitGraph`] of commits, references
//! and HEAD.

pub mod core;
pub mod builder;

pub use builder::{build_graph, GraphBuilder};
pub use core::{
    Commit, CommitGraph, Edge, EdgeIdx, EdgeType, GraphError, GraphStats, Reference, Vertex,
    VertexId, VertexIdx, VertexKind, HEAD,
};
