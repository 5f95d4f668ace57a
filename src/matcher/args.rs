//! Injective assignment of pattern input arguments to target input slots.

use crate::api_ergonomics::ArgId;

use super::engine::Search;

impl<'a> Search<'a> {
    /// Bind every declared argument in `pattern_args[idx..]` to a distinct
    /// slot of `target_args`, then run `complete` on the full assignment.
    ///
    /// Pattern arguments are taken strictly in order; names without a
    /// declaration are don't-care and consume no slot. A name already bound
    /// earlier in the match must land on the same target argument again, and
    /// a target argument owned by another pattern argument is off limits.
    ///
    /// When `complete` fails the next assignment is tried, so a choice made
    /// here is revisited if the rest of the match cannot live with it. On
    /// `None` every binding made here or by `complete` has been rolled back.
    pub(super) fn assign_args<T>(
        &mut self,
        pattern_args: &'a [String],
        target_args: &[ArgId],
        idx: usize,
        claimed: &mut [bool],
        complete: &mut dyn FnMut(&mut Self) -> Option<T>,
    ) -> Option<T> {
        let Some(name) = pattern_args.get(idx) else {
            let mark = self.path.checkpoint();
            let outcome = complete(self);
            if outcome.is_none() {
                self.path.rollback(mark);
            }
            return outcome;
        };
        let name = name.as_str();
        let Some((constraint, definition)) = self.constraints.arg(name) else {
            return self.assign_args(pattern_args, target_args, idx + 1, claimed, complete);
        };
        let already = self.path.bound_arg(name);

        for (slot, &arg) in target_args.iter().enumerate() {
            if claimed[slot] {
                continue;
            }
            match already {
                Some(bound) if bound != arg => continue,
                None if self.path.arg_owner(arg).is_some() => continue,
                _ => {}
            }
            if !constraint.matches(self.target, arg, self.pattern, definition) {
                self.metrics.record_arg_rejection();
                tracing::trace!(pattern_arg = name, target_arg = %arg, "argument rejected");
                continue;
            }

            let mark = self.path.checkpoint();
            self.path.bind_arg(name, arg);
            claimed[slot] = true;
            if let Some(found) =
                self.assign_args(pattern_args, target_args, idx + 1, claimed, complete)
            {
                return Some(found);
            }
            claimed[slot] = false;
            self.path.rollback(mark);
            self.metrics.record_backtrack();
        }
        None
    }
}
