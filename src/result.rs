//! Committed bindings of a successful match.

use std::{collections::BTreeMap, sync::Arc};

use serde::Serialize;

use crate::{
    api_ergonomics::{ArgId, NodeId},
    errors::{PatternGraphError, Result},
    pattern::{PatternInput, PatternNode},
};

/// A target node together with the pattern node it was bound to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchedNodeGroup {
    pub matched_node: NodeId,
    pub pattern_node: Arc<PatternNode>,
}

impl MatchedNodeGroup {
    pub fn new(matched_node: NodeId, pattern_node: Arc<PatternNode>) -> Self {
        Self {
            matched_node,
            pattern_node,
        }
    }
}

/// A target argument together with the pattern input it was bound to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchedInputGroup {
    pub matched_input: ArgId,
    pub pattern_input: Arc<PatternInput>,
}

impl MatchedInputGroup {
    pub fn new(matched_input: ArgId, pattern_input: Arc<PatternInput>) -> Self {
        Self {
            matched_input,
            pattern_input,
        }
    }
}

/// Serializable view of a match, keyed by pattern names.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub nodes: BTreeMap<String, NodeId>,
    pub inputs: BTreeMap<String, ArgId>,
}

/// Pattern name → target element bindings.
///
/// Populated only by a fully successful match attempt; a failed attempt
/// leaves it empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatternMatchResult {
    nodes: BTreeMap<String, MatchedNodeGroup>,
    inputs: BTreeMap<String, MatchedInputGroup>,
}

impl PatternMatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.inputs.clear();
    }

    /// Number of bound pattern nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.inputs.is_empty()
    }

    /// Target node bound to pattern node `name`.
    pub fn node_by_name(&self, name: &str) -> Result<NodeId> {
        self.nodes
            .get(name)
            .map(|group| group.matched_node)
            .ok_or_else(|| {
                PatternGraphError::not_found(format!("no target node bound to pattern node {name}"))
            })
    }

    /// Target argument bound to pattern input `name`.
    pub fn input_by_name(&self, name: &str) -> Result<ArgId> {
        self.inputs
            .get(name)
            .map(|group| group.matched_input)
            .ok_or_else(|| {
                PatternGraphError::not_found(format!("no argument bound to pattern input {name}"))
            })
    }

    /// Bound target nodes whose (pattern name, group) satisfies `filter`, in
    /// pattern name order. Evaluated lazily.
    pub fn nodes_with_condition<'a, F>(&'a self, mut filter: F) -> impl Iterator<Item = NodeId> + 'a
    where
        F: FnMut(&str, &MatchedNodeGroup) -> bool + 'a,
    {
        self.nodes
            .iter()
            .filter(move |(name, group)| filter(name.as_str(), group))
            .map(|(_, group)| group.matched_node)
    }

    pub fn node_groups(&self) -> impl Iterator<Item = (&str, &MatchedNodeGroup)> {
        self.nodes.iter().map(|(name, group)| (name.as_str(), group))
    }

    pub fn input_groups(&self) -> impl Iterator<Item = (&str, &MatchedInputGroup)> {
        self.inputs.iter().map(|(name, group)| (name.as_str(), group))
    }

    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            nodes: self
                .nodes
                .iter()
                .map(|(name, group)| (name.clone(), group.matched_node))
                .collect(),
            inputs: self
                .inputs
                .iter()
                .map(|(name, group)| (name.clone(), group.matched_input))
                .collect(),
        }
    }

    pub(crate) fn append_node(&mut self, group: MatchedNodeGroup) {
        self.nodes.insert(group.pattern_node.name.clone(), group);
    }

    pub(crate) fn append_input(&mut self, group: MatchedInputGroup) {
        self.inputs.insert(group.pattern_input.name.clone(), group);
    }
}
