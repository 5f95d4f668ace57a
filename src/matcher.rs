//! Matching engine.
//!
//! [`PatternMatcher`] enumerates target nodes in topological order as
//! candidates for the pattern root and runs the recursive search from each.
//! The first candidate that produces a complete match wins; nothing from a
//! failed candidate survives into the result.

use crate::{
    api_ergonomics::NodeId,
    errors::{PatternGraphError, Result},
    graph::GraphView,
    pattern::PatternGraph,
    result::{MatchedInputGroup, MatchedNodeGroup, PatternMatchResult},
};

pub use metrics::{MatchMetrics, MatchMetricsSnapshot};

use engine::{Bindings, Search};

mod args;
mod engine;
mod metrics;
mod path;


/// Runs a compiled pattern against target graphs.
///
/// The matcher holds no per-call state besides its counters, so one matcher
/// can be reused for any number of targets.
#[derive(Debug)]
pub struct PatternMatcher<'p> {
    pattern: &'p PatternGraph,
    metrics: MatchMetrics,
}

impl<'p> PatternMatcher<'p> {
    pub fn new(pattern: &'p PatternGraph) -> Self {
        Self {
            pattern,
            metrics: MatchMetrics::default(),
        }
    }

    pub fn pattern(&self) -> &'p PatternGraph {
        self.pattern
    }

    pub fn metrics(&self) -> &MatchMetrics {
        &self.metrics
    }

    pub fn try_match(&self, target: &dyn GraphView, root: Option<&str>) -> Result<PatternMatchResult> {
        let mut result = PatternMatchResult::new();
        self.try_match_into(target, root, &mut result)?;
        Ok(result)
    }

    /// Match into a caller-owned result. On any error `result` is left empty.
    pub fn try_match_into(
        &self,
        target: &dyn GraphView,
        root: Option<&str>,
        result: &mut PatternMatchResult,
    ) -> Result<()> {
        result.clear();
        let root = self.resolve_root(root)?;
        let mut search = Search::new(target, self.pattern, &self.metrics);

        for candidate in target.topological_order() {
            self.metrics.record_candidate();
            search.reset();
            if let Some(bindings) = search.find_match(candidate, root) {
                self.commit(bindings, result);
                tracing::debug!(
                    pattern = %self.pattern.name(),
                    root_candidate = %candidate,
                    bound = result.len(),
                    "pattern matched"
                );
                return Ok(());
            }
        }

        tracing::debug!(
            pattern = %self.pattern.name(),
            target_nodes = target.node_count(),
            "no match"
        );
        Err(PatternGraphError::NoMatch)
    }

    fn resolve_root(&self, root: Option<&str>) -> Result<NodeId> {
        match root {
            Some(name) => self
                .pattern
                .graph()
                .find_node(name)
                .ok_or_else(|| PatternGraphError::config(format!("unknown root node {name}"))),
            None => self
                .pattern
                .root_candidates()
                .first()
                .copied()
                .ok_or_else(|| PatternGraphError::config("pattern has no nodes")),
        }
    }

    fn commit(&self, bindings: Bindings<'_>, result: &mut PatternMatchResult) {
        for (pattern_node, target_node) in bindings.nodes {
            if let Some(node) = self.pattern.node_at(pattern_node) {
                result.append_node(MatchedNodeGroup::new(target_node, node.clone()));
            }
        }
        for (name, arg) in bindings.args {
            if let Some(input) = self.pattern.input_def(name) {
                result.append_input(MatchedInputGroup::new(arg, input.clone()));
            }
        }
    }
}
