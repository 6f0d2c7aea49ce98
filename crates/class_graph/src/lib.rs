// Collects the classes reachable from a root class into a dependency graph.

mod collector;
mod error;
mod graph;
mod references;

pub use collector::Collector;
pub use error::{GraphError, NodeError};
pub use graph::{DependencyGraph, Node, NodeStatus};
pub use references::referenced_classes;

pub type Result<T, E = GraphError> = std::result::Result<T, E>;
