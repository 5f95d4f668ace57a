//! Read-only graph model consumed by the matcher, plus an in-memory dataflow
//! implementation.
//!
//! The matcher never touches graph storage directly. Everything it needs goes
//! through [`GraphView`]: node identity, operator metadata, ordered argument
//! lists, adjacency and a topological order. Identifiers are plain indices so
//! results never hold borrows into the graph.

mod dataflow;
pub mod io;
mod topology;
mod types;

pub use dataflow::DataflowGraph;
pub use types::{Dim, ElemType, OpNode, ValueArg, normalize_domain};

use crate::api_ergonomics::{ArgId, NodeId};

/// Edge direction relative to a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Edges arriving at the node (producers of its inputs).
    Incoming,
    /// Edges leaving the node (consumers of its outputs).
    Outgoing,
}

/// Adapter trait exposing a dataflow graph to the matcher.
///
/// Implementations must return identifiers that stay valid for as long as the
/// graph is not mutated, and iteration orders that are stable across calls.
pub trait GraphView {
    fn node_count(&self) -> usize;
    fn node(&self, id: NodeId) -> Option<&OpNode>;
    fn arg(&self, id: ArgId) -> Option<&ValueArg>;
    /// Ordered input arguments; omitted optional inputs are skipped.
    fn input_args(&self, id: NodeId) -> Vec<ArgId>;
    fn output_args(&self, id: NodeId) -> Vec<ArgId>;
    /// Distinct producer nodes of the node's inputs.
    fn input_nodes(&self, id: NodeId) -> Vec<NodeId>;
    /// Distinct consumer nodes of the node's outputs.
    fn output_nodes(&self, id: NodeId) -> Vec<NodeId>;
    /// Number of (consumer, input slot) edges fed by the node's outputs.
    fn output_edge_count(&self, id: NodeId) -> usize;
    fn topological_order(&self) -> Vec<NodeId>;

    fn neighbors(&self, id: NodeId, direction: Direction) -> Vec<NodeId> {
        match direction {
            Direction::Incoming => self.input_nodes(id),
            Direction::Outgoing => self.output_nodes(id),
        }
    }
}

impl<G> GraphView for &G
where
    G: GraphView + ?Sized,
{
    fn node_count(&self) -> usize {
        (*self).node_count()
    }

    fn node(&self, id: NodeId) -> Option<&OpNode> {
        (*self).node(id)
    }

    fn arg(&self, id: ArgId) -> Option<&ValueArg> {
        (*self).arg(id)
    }

    fn input_args(&self, id: NodeId) -> Vec<ArgId> {
        (*self).input_args(id)
    }

    fn output_args(&self, id: NodeId) -> Vec<ArgId> {
        (*self).output_args(id)
    }

    fn input_nodes(&self, id: NodeId) -> Vec<NodeId> {
        (*self).input_nodes(id)
    }

    fn output_nodes(&self, id: NodeId) -> Vec<NodeId> {
        (*self).output_nodes(id)
    }

    fn output_edge_count(&self, id: NodeId) -> usize {
        (*self).output_edge_count(id)
    }

    fn topological_order(&self) -> Vec<NodeId> {
        (*self).topological_order()
    }
}
