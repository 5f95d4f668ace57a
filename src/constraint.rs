//! Node and argument compatibility predicates.
//!
//! Each family has one default structural predicate, installed when the
//! pattern is built, and an override table keyed by pattern entity name. At
//! match time the table is resolved once into a per-entity choice, so the
//! recursive search never does a name lookup to find its predicate.
//!
//! Predicates receive shared references only and must be deterministic for
//! fixed inputs; backtracking relies on a rejected candidate leaving no trace.

use std::sync::Arc;

use ahash::AHashMap;

use crate::{
    api_ergonomics::{ArgId, NodeId},
    config::MatchConfig,
    errors::{PatternGraphError, Result},
    graph::GraphView,
    pattern::{PatternGraph, PatternInput, PatternNode},
};

/// Decides whether a target node can stand in for a pattern node.
pub trait NodeConstraint: Send + Sync {
    fn matches(
        &self,
        target: &dyn GraphView,
        node: NodeId,
        pattern: &PatternGraph,
        pattern_node: &PatternNode,
    ) -> bool;
}

/// Decides whether a target argument can stand in for a pattern input.
pub trait ArgConstraint: Send + Sync {
    fn matches(
        &self,
        target: &dyn GraphView,
        arg: ArgId,
        pattern: &PatternGraph,
        pattern_arg: &PatternInput,
    ) -> bool;
}

impl<F> NodeConstraint for F
where
    F: Fn(&dyn GraphView, NodeId, &PatternGraph, &PatternNode) -> bool + Send + Sync,
{
    fn matches(
        &self,
        target: &dyn GraphView,
        node: NodeId,
        pattern: &PatternGraph,
        pattern_node: &PatternNode,
    ) -> bool {
        self(target, node, pattern, pattern_node)
    }
}

impl<F> ArgConstraint for F
where
    F: Fn(&dyn GraphView, ArgId, &PatternGraph, &PatternInput) -> bool + Send + Sync,
{
    fn matches(
        &self,
        target: &dyn GraphView,
        arg: ArgId,
        pattern: &PatternGraph,
        pattern_arg: &PatternInput,
    ) -> bool {
        self(target, arg, pattern, pattern_arg)
    }
}

/// Op type, domain/version and fan-out comparison.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultNodeConstraint {
    config: MatchConfig,
}

impl DefaultNodeConstraint {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }
}

impl NodeConstraint for DefaultNodeConstraint {
    fn matches(
        &self,
        target: &dyn GraphView,
        node: NodeId,
        pattern: &PatternGraph,
        pattern_node: &PatternNode,
    ) -> bool {
        let Some(op) = target.node(node) else {
            return false;
        };
        if self.config.op_type_check && !pattern_node.matches_op_type(&op.op_type) {
            tracing::trace!(target_node = %op.name, op_type = %op.op_type, "op type mismatch");
            return false;
        }
        if self.config.domain_version_check
            && !pattern_node.matches_domain_version(&op.domain, op.since_version)
        {
            tracing::trace!(
                target_node = %op.name,
                domain = %op.domain,
                version = op.since_version,
                "domain or version mismatch"
            );
            return false;
        }
        if self.config.fan_out_check {
            let pattern_degree = pattern
                .node_id(&pattern_node.name)
                .map(|id| pattern.graph().output_edge_count(id))
                .unwrap_or(0);
            let target_degree = target.output_edge_count(node);
            if !pattern_node.fan_out.accepts(pattern_degree, target_degree) {
                tracing::trace!(
                    target_node = %op.name,
                    target_degree,
                    pattern_degree,
                    "output edge count mismatch"
                );
                return false;
            }
        }
        true
    }
}

/// Element type, rank and constness comparison.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultArgConstraint;

impl ArgConstraint for DefaultArgConstraint {
    fn matches(
        &self,
        target: &dyn GraphView,
        arg: ArgId,
        _pattern: &PatternGraph,
        pattern_arg: &PatternInput,
    ) -> bool {
        let Some(value) = target.arg(arg) else {
            return false;
        };
        pattern_arg.matches_type(value)
            && pattern_arg.matches_rank(value)
            && pattern_arg.matches_constness(value)
    }
}

/// Which predicate an entity uses.
#[derive(Clone, Copy)]
pub enum ConstraintChoice<C> {
    Default(C),
    Override(C),
}

impl<C: Copy> ConstraintChoice<C> {
    pub fn get(&self) -> C {
        match self {
            ConstraintChoice::Default(c) | ConstraintChoice::Override(c) => *c,
        }
    }

    pub fn is_override(&self) -> bool {
        matches!(self, ConstraintChoice::Override(_))
    }
}

/// Default predicates plus name-keyed overrides.
#[derive(Clone)]
pub struct ConstraintSet {
    default_node: Arc<dyn NodeConstraint>,
    default_arg: Arc<dyn ArgConstraint>,
    node_overrides: AHashMap<String, Arc<dyn NodeConstraint>>,
    arg_overrides: AHashMap<String, Arc<dyn ArgConstraint>>,
}

impl ConstraintSet {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            default_node: Arc::new(DefaultNodeConstraint::new(config)),
            default_arg: Arc::new(DefaultArgConstraint),
            node_overrides: AHashMap::new(),
            arg_overrides: AHashMap::new(),
        }
    }

    /// Register the override for pattern node `name`. A second registration
    /// for the same name is rejected.
    pub fn register_node(&mut self, name: &str, constraint: Arc<dyn NodeConstraint>) -> Result<()> {
        if self.node_overrides.contains_key(name) {
            return Err(PatternGraphError::invalid_input(format!(
                "node constraint for {name} registered twice"
            )));
        }
        self.node_overrides.insert(name.to_string(), constraint);
        Ok(())
    }

    /// Register the override for pattern input `name`. A second registration
    /// for the same name is rejected.
    pub fn register_arg(&mut self, name: &str, constraint: Arc<dyn ArgConstraint>) -> Result<()> {
        if self.arg_overrides.contains_key(name) {
            return Err(PatternGraphError::invalid_input(format!(
                "argument constraint for {name} registered twice"
            )));
        }
        self.arg_overrides.insert(name.to_string(), constraint);
        Ok(())
    }

    pub fn node_choice(&self, name: &str) -> ConstraintChoice<&dyn NodeConstraint> {
        match self.node_overrides.get(name) {
            Some(custom) => ConstraintChoice::Override(custom.as_ref()),
            None => ConstraintChoice::Default(self.default_node.as_ref()),
        }
    }

    pub fn arg_choice(&self, name: &str) -> ConstraintChoice<&dyn ArgConstraint> {
        match self.arg_overrides.get(name) {
            Some(custom) => ConstraintChoice::Override(custom.as_ref()),
            None => ConstraintChoice::Default(self.default_arg.as_ref()),
        }
    }

    /// Resolve every pattern entity to its predicate.
    pub fn resolve<'a>(&'a self, pattern: &'a PatternGraph) -> ResolvedConstraints<'a> {
        let nodes = pattern
            .nodes()
            .map(|(_, node)| self.node_choice(&node.name))
            .collect();
        let args = pattern
            .inputs()
            .map(|input| {
                (
                    input.name.as_str(),
                    (self.arg_choice(&input.name), input.as_ref()),
                )
            })
            .collect();
        ResolvedConstraints { nodes, args }
    }
}

/// Per-entity predicates for one match call.
pub struct ResolvedConstraints<'a> {
    nodes: Vec<ConstraintChoice<&'a dyn NodeConstraint>>,
    args: AHashMap<&'a str, (ConstraintChoice<&'a dyn ArgConstraint>, &'a PatternInput)>,
}

impl<'a> ResolvedConstraints<'a> {
    /// Predicate of the pattern node at `id`.
    pub fn node(&self, id: NodeId) -> Option<&'a dyn NodeConstraint> {
        self.nodes.get(id.index()).map(ConstraintChoice::get)
    }

    /// Definition and predicate of the pattern argument `name`; `None` marks
    /// a don't-care argument.
    pub fn arg(&self, name: &str) -> Option<(&'a dyn ArgConstraint, &'a PatternInput)> {
        self.args
            .get(name)
            .map(|(choice, input)| (choice.get(), *input))
    }

    pub fn override_count(&self) -> usize {
        self.nodes.iter().filter(|c| c.is_override()).count()
            + self.args.values().filter(|(c, _)| c.is_override()).count()
    }
}
