//! Pattern input argument definition.

use crate::graph::{ElemType, ValueArg};

/// A named symbolic argument of the pattern.
///
/// Only arguments declared this way take part in argument matching; any
/// other argument name a pattern node lists is a don't-care.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatternInput {
    pub name: String,
    /// Accepted element types; empty accepts any.
    pub allowed_types: Vec<ElemType>,
    /// Accepted ranks; empty accepts any.
    pub allowed_ranks: Vec<usize>,
    /// When set, the target argument's constant flag must equal it.
    pub constant: Option<bool>,
}

impl PatternInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn allowed_type(mut self, elem_type: ElemType) -> Self {
        if !self.allowed_types.contains(&elem_type) {
            self.allowed_types.push(elem_type);
        }
        self
    }

    pub fn allowed_types(self, types: impl IntoIterator<Item = ElemType>) -> Self {
        types.into_iter().fold(self, |input, t| input.allowed_type(t))
    }

    pub fn rank(mut self, rank: usize) -> Self {
        if !self.allowed_ranks.contains(&rank) {
            self.allowed_ranks.push(rank);
        }
        self
    }

    pub fn constant(mut self, constant: bool) -> Self {
        self.constant = Some(constant);
        self
    }

    pub fn matches_type(&self, arg: &ValueArg) -> bool {
        if self.allowed_types.is_empty() {
            return true;
        }
        arg.elem_type
            .is_some_and(|t| self.allowed_types.contains(&t))
    }

    pub fn matches_rank(&self, arg: &ValueArg) -> bool {
        if self.allowed_ranks.is_empty() {
            return true;
        }
        arg.rank().is_some_and(|r| self.allowed_ranks.contains(&r))
    }

    pub fn matches_constness(&self, arg: &ValueArg) -> bool {
        self.constant.is_none_or(|c| c == arg.constant)
    }
}
