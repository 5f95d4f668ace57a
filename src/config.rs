//! Configuration of the structural checks performed during matching.
//!
//! The default node predicate consults [`MatchConfig`] to decide which
//! properties of a candidate target node it compares against the pattern
//! node. Custom predicates registered on the pattern builder bypass it.

/// Structural checks applied by the default node predicate.
///
/// # Default Configuration
///
/// ```rust
/// use patgraph::MatchConfig;
///
/// let config = MatchConfig::default();
/// assert!(config.op_type_check);
/// assert!(config.domain_version_check);
/// assert!(config.fan_out_check);
/// ```
///
/// # Examples
///
/// ```rust
/// use patgraph::{MatchConfig, PatternGraph, PatternNode};
///
/// // Match purely on shape: any operator, any opset.
/// let _pattern = PatternGraph::builder("shape-only")
///     .config(MatchConfig::structural())
///     .node(PatternNode::new("a").op_type("Add").outputs(["t"]))
///     .node(PatternNode::new("b").inputs(["t"]))
///     .build()?;
/// # Ok::<(), patgraph::PatternGraphError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchConfig {
    /// Compare the target op type against the pattern node's accepted set.
    ///
    /// **Default:** `true`
    pub op_type_check: bool,

    /// Compare the target domain and since-version against the pattern
    /// node's domain/version table, when the node declares one.
    ///
    /// **Default:** `true`
    pub domain_version_check: bool,

    /// Enforce the pattern node's output fan-out requirement.
    ///
    /// **Default:** `true`
    pub fan_out_check: bool,
}

impl MatchConfig {
    /// Every check enabled.
    pub fn strict() -> Self {
        Self {
            op_type_check: true,
            domain_version_check: true,
            fan_out_check: true,
        }
    }

    /// Only graph shape and fan-out; op types and opsets are ignored.
    pub fn structural() -> Self {
        Self {
            op_type_check: false,
            domain_version_check: false,
            fan_out_check: true,
        }
    }

    pub fn without_op_type_check(mut self) -> Self {
        self.op_type_check = false;
        self
    }

    pub fn without_domain_version_check(mut self) -> Self {
        self.domain_version_check = false;
        self
    }

    pub fn without_fan_out_check(mut self) -> Self {
        self.fan_out_check = false;
        self
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::strict()
    }
}
