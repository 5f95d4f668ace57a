//! Path state shared by one match attempt.
//!
//! Every binding goes through an undo trail. A caller takes a checkpoint
//! before trying something and rolls back to it on failure, which removes
//! exactly what was recorded after the checkpoint and nothing else.

use ahash::AHashMap;

use crate::api_ergonomics::{ArgId, NodeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TrailEntry<'p> {
    Node { pattern: NodeId, target: NodeId },
    Arg { name: &'p str, arg: ArgId },
}

/// Position in the undo trail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Checkpoint(usize);

#[derive(Debug, Default)]
pub(crate) struct PathState<'p> {
    /// Target node → pattern node.
    graph_path: AHashMap<NodeId, NodeId>,
    /// Pattern node → target node.
    pattern_path: AHashMap<NodeId, NodeId>,
    arg_map: AHashMap<&'p str, ArgId>,
    bound_args: AHashMap<ArgId, &'p str>,
    trail: Vec<TrailEntry<'p>>,
}

impl<'p> PathState<'p> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.trail.len())
    }

    pub(crate) fn bind_node(&mut self, pattern: NodeId, target: NodeId) {
        debug_assert!(!self.pattern_path.contains_key(&pattern));
        debug_assert!(!self.graph_path.contains_key(&target));
        self.graph_path.insert(target, pattern);
        self.pattern_path.insert(pattern, target);
        self.trail.push(TrailEntry::Node { pattern, target });
    }

    /// Returns `false` when `name` was already bound to `arg`; nothing is
    /// recorded in that case.
    pub(crate) fn bind_arg(&mut self, name: &'p str, arg: ArgId) -> bool {
        if self.arg_map.get(name) == Some(&arg) {
            return false;
        }
        debug_assert!(!self.arg_map.contains_key(name));
        debug_assert!(!self.bound_args.contains_key(&arg));
        self.arg_map.insert(name, arg);
        self.bound_args.insert(arg, name);
        self.trail.push(TrailEntry::Arg { name, arg });
        true
    }

    /// Undo everything recorded after `mark`. Entries that are already gone
    /// are ignored.
    pub(crate) fn rollback(&mut self, mark: Checkpoint) {
        while self.trail.len() > mark.0 {
            let Some(entry) = self.trail.pop() else {
                break;
            };
            match entry {
                TrailEntry::Node { pattern, target } => {
                    self.pattern_path.remove(&pattern);
                    self.graph_path.remove(&target);
                }
                TrailEntry::Arg { name, arg } => {
                    self.arg_map.remove(name);
                    self.bound_args.remove(&arg);
                }
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.graph_path.clear();
        self.pattern_path.clear();
        self.arg_map.clear();
        self.bound_args.clear();
        self.trail.clear();
    }

    pub(crate) fn on_graph_path(&self, target: NodeId) -> bool {
        self.graph_path.contains_key(&target)
    }

    #[cfg(test)]
    pub(crate) fn on_pattern_path(&self, pattern: NodeId) -> bool {
        self.pattern_path.contains_key(&pattern)
    }

    pub(crate) fn bound_target(&self, pattern: NodeId) -> Option<NodeId> {
        self.pattern_path.get(&pattern).copied()
    }

    pub(crate) fn bound_arg(&self, name: &str) -> Option<ArgId> {
        self.arg_map.get(name).copied()
    }

    pub(crate) fn arg_owner(&self, arg: ArgId) -> Option<&'p str> {
        self.bound_args.get(&arg).copied()
    }

    /// Argument bindings recorded after `mark`, oldest first.
    pub(crate) fn args_since(&self, mark: Checkpoint) -> impl Iterator<Item = (&'p str, ArgId)> + '_ {
        self.trail[mark.0.min(self.trail.len())..]
            .iter()
            .filter_map(|entry| match *entry {
                TrailEntry::Arg { name, arg } => Some((name, arg)),
                TrailEntry::Node { .. } => None,
            })
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.pattern_path.len()
    }
}
