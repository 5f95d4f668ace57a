//! Pattern description: nodes, input arguments and the compiled pattern
//! graph.
//!
//! A pattern is declared through [`PatternGraphBuilder`]. Nodes connect
//! implicitly by sharing argument names, exactly like operators in a dataflow
//! graph, and the compiled [`PatternGraph`] keeps both a stable name lookup
//! table and the pattern laid out as its own [`DataflowGraph`] so the matcher
//! can walk pattern edges the same way it walks target edges.

use std::{collections::VecDeque, sync::Arc};

use ahash::{AHashMap, AHashSet};

pub use input::PatternInput;
pub use node::{FanOut, OpTypeSet, PatternNode};

use crate::{
    api_ergonomics::{ArgId, NodeId},
    config::MatchConfig,
    constraint::{ArgConstraint, ConstraintSet, NodeConstraint},
    errors::{PatternGraphError, Result},
    graph::{DataflowGraph, GraphView, OpNode, ValueArg},
    matcher::PatternMatcher,
    result::PatternMatchResult,
};

mod input;
mod node;


/// Compiled pattern: name → entity lookup, pattern topology and constraint
/// table. Immutable once built.
#[derive(Clone)]
pub struct PatternGraph {
    name: String,
    graph: DataflowGraph,
    nodes: Vec<Arc<PatternNode>>,
    inputs: Vec<Arc<PatternInput>>,
    input_index: AHashMap<String, usize>,
    constraints: ConstraintSet,
}

impl PatternGraph {
    pub fn builder(name: impl Into<String>) -> PatternGraphBuilder {
        PatternGraphBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pattern laid out as a dataflow graph; node ids follow declaration
    /// order.
    pub fn graph(&self) -> &DataflowGraph {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, name: &str) -> Result<&PatternNode> {
        let id = self.node_id(name)?;
        Ok(self.nodes[id.index()].as_ref())
    }

    pub fn node_id(&self, name: &str) -> Result<NodeId> {
        self.graph
            .find_node(name)
            .ok_or_else(|| PatternGraphError::not_found(format!("pattern node {name}")))
    }

    pub fn node_at(&self, id: NodeId) -> Option<&Arc<PatternNode>> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Arc<PatternNode>)> {
        self.nodes.iter().enumerate().map(|(idx, n)| (NodeId(idx), n))
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.name.as_str())
    }

    pub fn input(&self, name: &str) -> Result<&PatternInput> {
        self.input_def(name)
            .map(Arc::as_ref)
            .ok_or_else(|| PatternGraphError::not_found(format!("pattern input {name}")))
    }

    /// Definition of a declared input, `None` for don't-care names.
    pub fn input_def(&self, name: &str) -> Option<&Arc<PatternInput>> {
        self.input_index.get(name).map(|&idx| &self.inputs[idx])
    }

    /// Declared inputs in declaration order.
    pub fn inputs(&self) -> impl Iterator<Item = &Arc<PatternInput>> {
        self.inputs.iter()
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    /// Pattern nodes in topological order; the first one is the default root.
    pub fn root_candidates(&self) -> Vec<NodeId> {
        self.graph.topological_order()
    }

    /// Find one occurrence of this pattern in `target`.
    ///
    /// Returns [`PatternGraphError::NoMatch`] when the pattern does not occur
    /// and [`PatternGraphError::Config`] when `root` names no pattern node or
    /// the pattern is empty.
    pub fn try_match(
        &self,
        target: &dyn GraphView,
        root: Option<&str>,
    ) -> Result<PatternMatchResult> {
        PatternMatcher::new(self).try_match(target, root)
    }

    /// Like [`PatternGraph::try_match`], filling a caller-owned result.
    pub fn try_match_into(
        &self,
        target: &dyn GraphView,
        root: Option<&str>,
        result: &mut PatternMatchResult,
    ) -> Result<()> {
        PatternMatcher::new(self).try_match_into(target, root, result)
    }

    /// Pattern nodes not reachable from the first node over pattern edges.
    fn unreachable_nodes(&self) -> Vec<&str> {
        let Some(&start) = self.root_candidates().first() else {
            return Vec::new();
        };
        let mut seen = AHashSet::new();
        let mut queue = VecDeque::new();
        seen.insert(start);
        queue.push_back(start);
        while let Some(node) = queue.pop_front() {
            for next in self
                .graph
                .input_nodes(node)
                .into_iter()
                .chain(self.graph.output_nodes(node))
            {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        self.nodes()
            .filter(|(id, _)| !seen.contains(id))
            .map(|(_, n)| n.name.as_str())
            .collect()
    }
}

impl std::fmt::Debug for PatternGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternGraph")
            .field("name", &self.name)
            .field("nodes", &self.nodes)
            .field("inputs", &self.inputs)
            .finish()
    }
}

/// Builder for [`PatternGraph`].
///
/// ```rust
/// use patgraph::{PatternGraph, PatternInput, PatternNode};
///
/// let pattern = PatternGraph::builder("add-relu")
///     .input(PatternInput::new("x"))
///     .node(PatternNode::new("P1").op_type("Add").inputs(["x", "bias"]).outputs(["sum"]))
///     .node(PatternNode::new("P2").op_type("Relu").inputs(["sum"]).outputs(["out"]))
///     .build()?;
/// assert_eq!(pattern.len(), 2);
/// # Ok::<(), patgraph::PatternGraphError>(())
/// ```
pub struct PatternGraphBuilder {
    name: String,
    nodes: Vec<PatternNode>,
    inputs: Vec<PatternInput>,
    node_constraints: Vec<(String, Arc<dyn NodeConstraint>)>,
    arg_constraints: Vec<(String, Arc<dyn ArgConstraint>)>,
    config: MatchConfig,
}

impl PatternGraphBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            inputs: Vec::new(),
            node_constraints: Vec::new(),
            arg_constraints: Vec::new(),
            config: MatchConfig::default(),
        }
    }

    pub fn node(mut self, node: PatternNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn input(mut self, input: PatternInput) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default predicate for pattern node `name`.
    pub fn node_constraint(
        mut self,
        name: impl Into<String>,
        constraint: impl NodeConstraint + 'static,
    ) -> Self {
        let constraint: Arc<dyn NodeConstraint> = Arc::new(constraint);
        self.node_constraints.push((name.into(), constraint));
        self
    }

    /// Closure form of [`PatternGraphBuilder::node_constraint`].
    pub fn node_constraint_fn<F>(self, name: impl Into<String>, constraint: F) -> Self
    where
        F: Fn(&dyn GraphView, NodeId, &PatternGraph, &PatternNode) -> bool
            + Send
            + Sync
            + 'static,
    {
        self.node_constraint(name, constraint)
    }

    /// Replace the default predicate for pattern input `name`.
    pub fn arg_constraint(
        mut self,
        name: impl Into<String>,
        constraint: impl ArgConstraint + 'static,
    ) -> Self {
        let constraint: Arc<dyn ArgConstraint> = Arc::new(constraint);
        self.arg_constraints.push((name.into(), constraint));
        self
    }

    /// Closure form of [`PatternGraphBuilder::arg_constraint`].
    pub fn arg_constraint_fn<F>(self, name: impl Into<String>, constraint: F) -> Self
    where
        F: Fn(&dyn GraphView, ArgId, &PatternGraph, &PatternInput) -> bool
            + Send
            + Sync
            + 'static,
    {
        self.arg_constraint(name, constraint)
    }

    pub fn build(self) -> Result<PatternGraph> {
        let mut graph = DataflowGraph::new();

        let mut input_index = AHashMap::new();
        let mut inputs = Vec::with_capacity(self.inputs.len());
        for input in self.inputs {
            if input.name.trim().is_empty() {
                return Err(PatternGraphError::invalid_input(
                    "pattern input name must be set",
                ));
            }
            if input_index.contains_key(&input.name) {
                return Err(PatternGraphError::invalid_input(format!(
                    "duplicate pattern input {}",
                    input.name
                )));
            }
            let mut arg = ValueArg::new(input.name.clone());
            arg.elem_type = input.allowed_types.first().copied();
            graph.add_arg(arg)?;
            input_index.insert(input.name.clone(), inputs.len());
            inputs.push(Arc::new(input));
        }

        let mut nodes = Vec::with_capacity(self.nodes.len());
        for node in self.nodes {
            if node.name.trim().is_empty() {
                return Err(PatternGraphError::invalid_input(
                    "pattern node name must be set",
                ));
            }
            let (domain, version) = node
                .domain_versions
                .as_ref()
                .and_then(|m| m.iter().next())
                .map(|(d, v)| (d.clone(), v.first().copied().unwrap_or(0)))
                .unwrap_or_default();
            let laid_out = OpNode::new(node.name.clone(), node.op_types.primary())
                .domain(domain)
                .version(version)
                .inputs(node.inputs.iter().cloned())
                .outputs(node.outputs.iter().cloned());
            let id = graph.add_node(laid_out).map_err(|e| match e {
                PatternGraphError::InvalidInput(msg) if msg.starts_with("duplicate node") => {
                    PatternGraphError::invalid_input(format!("duplicate pattern node {}", node.name))
                }
                other => other,
            })?;
            debug_assert_eq!(id.index(), nodes.len());
            nodes.push(Arc::new(node));
        }

        let mut constraints = ConstraintSet::new(self.config);
        for (name, constraint) in self.node_constraints {
            if graph.find_node(&name).is_none() {
                return Err(PatternGraphError::not_found(format!(
                    "node constraint names undeclared pattern node {name}"
                )));
            }
            constraints.register_node(&name, constraint)?;
        }
        for (name, constraint) in self.arg_constraints {
            if !input_index.contains_key(&name) {
                return Err(PatternGraphError::not_found(format!(
                    "argument constraint names undeclared pattern input {name}"
                )));
            }
            constraints.register_arg(&name, constraint)?;
        }

        let pattern = PatternGraph {
            name: self.name,
            graph,
            nodes,
            inputs,
            input_index,
            constraints,
        };
        let unreachable = pattern.unreachable_nodes();
        if !unreachable.is_empty() {
            tracing::warn!(
                pattern = %pattern.name,
                ?unreachable,
                "pattern nodes unreachable from the default root are never bound"
            );
        }
        Ok(pattern)
    }
}
