//! Pattern node definition and builder functionality.

use std::collections::BTreeMap;

use crate::graph::normalize_domain;

/// Operator types a pattern node accepts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OpTypeSet {
    /// Wildcard: any operator type.
    #[default]
    Any,
    OneOf(Vec<String>),
}

impl OpTypeSet {
    pub fn matches(&self, op_type: &str) -> bool {
        match self {
            OpTypeSet::Any => true,
            OpTypeSet::OneOf(types) => types.iter().any(|t| t == op_type),
        }
    }

    /// Representative op type used when the pattern is laid out as a graph.
    pub fn primary(&self) -> &str {
        match self {
            OpTypeSet::Any => "*",
            OpTypeSet::OneOf(types) => types.first().map(String::as_str).unwrap_or("*"),
        }
    }
}

/// Output fan-out a target node must have.
///
/// `Derived` takes the requirement from the pattern node's own out-degree
/// inside the pattern graph: a pattern sink (out-degree 0) has no
/// requirement, any other node needs exactly that many output edges.
/// `Exact(n)` requires exactly `n` output edges regardless of the pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FanOut {
    #[default]
    Derived,
    Exact(usize),
}

impl FanOut {
    /// `0` is the "derive from pattern" sentinel.
    pub fn from_count(count: usize) -> Self {
        if count == 0 {
            FanOut::Derived
        } else {
            FanOut::Exact(count)
        }
    }

    pub fn accepts(self, pattern_degree: usize, target_degree: usize) -> bool {
        match self {
            FanOut::Exact(n) => target_degree == n,
            FanOut::Derived => pattern_degree == 0 || target_degree == pattern_degree,
        }
    }
}

/// A node of the pattern graph.
///
/// Nodes are wired to each other by argument names: when one node lists a
/// name among its outputs and another among its inputs, the pattern has an
/// edge between them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatternNode {
    pub name: String,
    pub op_types: OpTypeSet,
    /// Domain → accepted since-versions. `None` skips the check; an empty
    /// version list accepts every version of that domain.
    pub domain_versions: Option<BTreeMap<String, Vec<i32>>>,
    pub fan_out: FanOut,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

impl PatternNode {
    /// Create a wildcard node with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Accept `op_type`, in addition to any type already accepted.
    pub fn op_type(mut self, op_type: impl Into<String>) -> Self {
        let op_type = op_type.into();
        match &mut self.op_types {
            OpTypeSet::Any => self.op_types = OpTypeSet::OneOf(vec![op_type]),
            OpTypeSet::OneOf(types) => {
                if !types.contains(&op_type) {
                    types.push(op_type);
                }
            }
        }
        self
    }

    pub fn op_types<I, S>(self, op_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        op_types.into_iter().fold(self, |node, t| node.op_type(t))
    }

    /// Accept `domain` at the listed versions (empty = any version).
    pub fn domain_version(mut self, domain: &str, versions: impl IntoIterator<Item = i32>) -> Self {
        self.domain_versions
            .get_or_insert_with(BTreeMap::new)
            .entry(normalize_domain(domain).to_string())
            .or_default()
            .extend(versions);
        self
    }

    pub fn fan_out(mut self, count: usize) -> Self {
        self.fan_out = FanOut::from_count(count);
        self
    }

    pub fn inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn outputs<I, S>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs = outputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn matches_op_type(&self, op_type: &str) -> bool {
        self.op_types.matches(op_type)
    }

    pub fn matches_domain_version(&self, domain: &str, version: i32) -> bool {
        let Some(maps) = &self.domain_versions else {
            return true;
        };
        match maps.get(normalize_domain(domain)) {
            Some(versions) => versions.is_empty() || versions.contains(&version),
            None => false,
        }
    }
}
