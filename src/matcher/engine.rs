//! Recursive backtracking search for one root candidate.

use crate::{
    api_ergonomics::{ArgId, NodeId},
    constraint::ResolvedConstraints,
    graph::{Direction, GraphView},
    pattern::PatternGraph,
};

use super::{metrics::MatchMetrics, path::PathState};

/// Bindings discovered by a successful call: its own node and arguments plus
/// everything its descendants bound.
#[derive(Debug, Default)]
pub(crate) struct Bindings<'a> {
    /// (pattern node, target node)
    pub(crate) nodes: Vec<(NodeId, NodeId)>,
    pub(crate) args: Vec<(&'a str, ArgId)>,
}

impl Bindings<'_> {
    fn absorb(&mut self, child: Self) {
        self.nodes.extend(child.nodes);
        self.args.extend(child.args);
    }
}

pub(crate) struct Search<'a> {
    pub(super) target: &'a dyn GraphView,
    pub(super) pattern: &'a PatternGraph,
    pub(super) constraints: ResolvedConstraints<'a>,
    pub(super) metrics: &'a MatchMetrics,
    pub(super) path: PathState<'a>,
}

impl<'a> Search<'a> {
    pub(crate) fn new(
        target: &'a dyn GraphView,
        pattern: &'a PatternGraph,
        metrics: &'a MatchMetrics,
    ) -> Self {
        Self {
            target,
            pattern,
            constraints: pattern.constraints().resolve(pattern),
            metrics,
            path: PathState::new(),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.path.clear();
    }

    /// Try to match pattern node `p` at target node `g`.
    ///
    /// On `None` the path state is exactly as it was on entry.
    pub(crate) fn find_match(&mut self, g: NodeId, p: NodeId) -> Option<Bindings<'a>> {
        self.metrics.record_call();
        let pattern = self.pattern;
        let pattern_node = pattern.node_at(p)?;
        let constraint = self.constraints.node(p)?;

        tracing::trace!(target_node = %g, pattern_node = %pattern_node.name, "find match");
        if !constraint.matches(self.target, g, pattern, pattern_node) {
            self.metrics.record_node_rejection();
            tracing::trace!(target_node = %g, pattern_node = %pattern_node.name, "node rejected");
            return None;
        }

        self.scoped(|search| {
            let entry = search.path.checkpoint();
            let target_args = search.target.input_args(g);
            let mut claimed = vec![false; target_args.len()];
            // The neighbor phases run once per argument assignment; a failure
            // there moves on to the next assignment.
            let found = search.assign_args(
                &pattern_node.inputs,
                &target_args,
                0,
                &mut claimed,
                &mut |search: &mut Search<'a>| {
                    let mut bindings = Bindings {
                        nodes: vec![(p, g)],
                        args: search.path.args_since(entry).collect(),
                    };
                    search.path.bind_node(p, g);
                    search.match_neighbors(g, p, Direction::Incoming, &mut bindings)?;
                    search.match_neighbors(g, p, Direction::Outgoing, &mut bindings)?;
                    Some(bindings)
                },
            );
            if found.is_none() {
                tracing::trace!(target_node = %g, pattern_node = %pattern_node.name, "no argument assignment completed the match");
            }
            found
        })
    }

    /// Run `f` and, if it fails, roll the path back to where it was before.
    fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let mark = self.path.checkpoint();
        let outcome = f(self);
        if outcome.is_none() {
            self.path.rollback(mark);
        }
        outcome
    }

    /// Find a distinct target neighbor of `g` for every pattern neighbor of
    /// `p` in `direction`.
    ///
    /// A pattern neighbor already bound is not searched again: the target
    /// node it is bound to must be a neighbor of `g` (look-ahead), otherwise
    /// the call fails. Successful children stay on the path, so a target node
    /// is never offered to two pattern neighbors.
    fn match_neighbors(
        &mut self,
        g: NodeId,
        p: NodeId,
        direction: Direction,
        bindings: &mut Bindings<'a>,
    ) -> Option<()> {
        let target_neighbors = self.target.neighbors(g, direction);
        for cur in self.pattern.graph().neighbors(p, direction) {
            if let Some(bound) = self.path.bound_target(cur) {
                if target_neighbors.contains(&bound) {
                    continue;
                }
                self.metrics.record_look_ahead_failure();
                tracing::trace!(
                    target_node = %g,
                    pattern_neighbor = %cur,
                    bound_to = %bound,
                    ?direction,
                    "look-ahead failed"
                );
                return None;
            }

            let mut matched = None;
            for &candidate in &target_neighbors {
                if self.path.on_graph_path(candidate) {
                    continue;
                }
                if let Some(child) = self.find_match(candidate, cur) {
                    matched = Some(child);
                    break;
                }
                // The failed child already rolled back whatever it recorded.
                self.metrics.record_backtrack();
            }
            match matched {
                Some(child) => bindings.absorb(child),
                None => {
                    tracing::trace!(
                        target_node = %g,
                        pattern_neighbor = %cur,
                        ?direction,
                        "no target neighbor matched"
                    );
                    return None;
                }
            }
        }
        Some(())
    }

    #[cfg(test)]
    pub(crate) fn path(&self) -> &PathState<'a> {
        &self.path
    }
}
