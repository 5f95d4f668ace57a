//! In-memory dataflow graph wired by shared argument names.

use std::sync::Arc;

use ahash::AHashMap;

use crate::{
    api_ergonomics::{ArgId, NodeId},
    cache::{CacheStats, DerivedCache},
    errors::{PatternGraphError, Result},
};

use super::{
    GraphView,
    topology::{self, Topology},
    types::{OpNode, ValueArg},
};

/// ONNX-style computation graph: nodes consume and produce named arguments,
/// and an edge exists wherever one node's output feeds another node's input.
///
/// Adjacency and topological order are derived on first use and cached until
/// the next mutation.
#[derive(Clone, Default)]
pub struct DataflowGraph {
    nodes: Vec<OpNode>,
    node_index: AHashMap<String, NodeId>,
    args: Vec<ValueArg>,
    arg_index: AHashMap<String, ArgId>,
    node_inputs: Vec<Vec<Option<ArgId>>>,
    node_outputs: Vec<Vec<ArgId>>,
    topology: DerivedCache<Topology>,
}

impl DataflowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an argument, or merge metadata into an existing one of the
    /// same name.
    pub fn add_arg(&mut self, arg: ValueArg) -> Result<ArgId> {
        if arg.name.is_empty() {
            return Err(PatternGraphError::invalid_input("argument name must be set"));
        }
        if let Some(&id) = self.arg_index.get(&arg.name) {
            self.args[id.index()].absorb(arg);
            return Ok(id);
        }
        Ok(self.intern_arg(arg))
    }

    /// Insert a node, creating any argument it names that was not declared.
    pub fn add_node(&mut self, node: OpNode) -> Result<NodeId> {
        node.validate()?;
        if self.node_index.contains_key(&node.name) {
            return Err(PatternGraphError::invalid_input(format!(
                "duplicate node name {}",
                node.name
            )));
        }
        for (slot, output) in node.outputs.iter().enumerate() {
            if node.outputs[..slot].contains(output) {
                return Err(PatternGraphError::invalid_input(format!(
                    "node {} lists output {} twice",
                    node.name, output
                )));
            }
            if let Some(&arg) = self.arg_index.get(output) {
                if let Some(owner) = self.producer_of(arg) {
                    return Err(PatternGraphError::invalid_input(format!(
                        "argument {} is already produced by {}",
                        output, self.nodes[owner.index()].name
                    )));
                }
            }
        }

        let inputs: Vec<Option<ArgId>> = node
            .inputs
            .iter()
            .map(|name| (!name.is_empty()).then(|| self.arg_for(name)))
            .collect();
        let outputs: Vec<ArgId> = node.outputs.iter().map(|name| self.arg_for(name)).collect();

        let id = NodeId(self.nodes.len());
        self.node_index.insert(node.name.clone(), id);
        self.nodes.push(node);
        self.node_inputs.push(inputs);
        self.node_outputs.push(outputs);
        self.topology.invalidate();
        Ok(id)
    }

    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.node_index.get(name).copied()
    }

    pub fn find_arg(&self, name: &str) -> Option<ArgId> {
        self.arg_index.get(name).copied()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    pub fn args(&self) -> &[ValueArg] {
        &self.args
    }

    pub fn nodes(&self) -> &[OpNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn producer(&self, arg: ArgId) -> Option<NodeId> {
        self.topology()
            .producer
            .get(arg.index())
            .copied()
            .flatten()
    }

    /// Consumers of an argument as (node, input slot) pairs.
    pub fn consumers(&self, arg: ArgId) -> Vec<(NodeId, usize)> {
        self.topology()
            .consumers
            .get(arg.index())
            .cloned()
            .unwrap_or_default()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.topology.stats()
    }

    fn topology(&self) -> Arc<Topology> {
        self.topology.get_or_build(|| {
            topology::derive(&self.node_inputs, &self.node_outputs, self.args.len())
        })
    }

    fn producer_of(&self, arg: ArgId) -> Option<NodeId> {
        self.node_outputs
            .iter()
            .position(|outputs| outputs.contains(&arg))
            .map(NodeId)
    }

    fn arg_for(&mut self, name: &str) -> ArgId {
        match self.arg_index.get(name) {
            Some(&id) => id,
            None => self.intern_arg(ValueArg::new(name)),
        }
    }

    fn intern_arg(&mut self, arg: ValueArg) -> ArgId {
        let id = ArgId(self.args.len());
        self.arg_index.insert(arg.name.clone(), id);
        self.args.push(arg);
        self.topology.invalidate();
        id
    }
}

impl GraphView for DataflowGraph {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node(&self, id: NodeId) -> Option<&OpNode> {
        self.nodes.get(id.index())
    }

    fn arg(&self, id: ArgId) -> Option<&ValueArg> {
        self.args.get(id.index())
    }

    fn input_args(&self, id: NodeId) -> Vec<ArgId> {
        self.node_inputs
            .get(id.index())
            .map(|inputs| inputs.iter().flatten().copied().collect())
            .unwrap_or_default()
    }

    fn output_args(&self, id: NodeId) -> Vec<ArgId> {
        self.node_outputs
            .get(id.index())
            .cloned()
            .unwrap_or_default()
    }

    fn input_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.topology()
            .input_nodes
            .get(id.index())
            .cloned()
            .unwrap_or_default()
    }

    fn output_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.topology()
            .output_nodes
            .get(id.index())
            .cloned()
            .unwrap_or_default()
    }

    fn output_edge_count(&self, id: NodeId) -> usize {
        self.topology()
            .output_edges
            .get(id.index())
            .copied()
            .unwrap_or(0)
    }

    fn topological_order(&self) -> Vec<NodeId> {
        self.topology().order.clone()
    }
}

impl std::fmt::Debug for DataflowGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataflowGraph")
            .field("nodes", &self.nodes)
            .field("args", &self.args)
            .finish()
    }
}
