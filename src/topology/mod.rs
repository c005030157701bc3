//! Skeleton topology: pixel adjacency and its split into lines and
//! intersections.

mod graph;
mod network;
mod parser;

pub use graph::{Adjacency, AdjacencyGraph, NodeId, SparseAdjacency};
pub use network::{Intersection, IntersectionId, Line, LineEnd, LineId, Network};
pub use parser::TopologyParser;
