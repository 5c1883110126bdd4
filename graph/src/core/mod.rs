pub mod commit;
pub mod reference;
pub mod vertex;
pub mod edge;
pub mod graph;

pub use commit::Commit;
pub use reference::{Reference, HEAD};
pub use vertex::{Vertex, VertexId, VertexKind};
pub use edge::{Edge, EdgeType};
pub use graph::{CommitGraph, EdgeIdx, GraphError, GraphStats, VertexIdx};
