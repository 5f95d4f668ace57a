//! Subgraph pattern matching for dataflow graphs.
//!
//! Build a [`PatternGraph`] describing an operator shape, then call
//! [`PatternGraph::try_match`] against any [`GraphView`] to bind every pattern
//! node and declared input to a distinct target element.
//!
//! ```rust
//! use patgraph::{DataflowGraph, OpNode, PatternGraph, PatternNode};
//!
//! let mut target = DataflowGraph::new();
//! target.add_node(OpNode::new("N1", "Add").inputs(["x", "y"]).outputs(["s"]))?;
//! target.add_node(OpNode::new("N2", "Relu").inputs(["s"]).outputs(["r"]))?;
//! target.add_node(OpNode::new("N3", "Sigmoid").inputs(["r"]).outputs(["out"]))?;
//!
//! let pattern = PatternGraph::builder("add-relu")
//!     .node(PatternNode::new("P1").op_type("Add").outputs(["sum"]))
//!     .node(PatternNode::new("P2").op_type("Relu").inputs(["sum"]))
//!     .build()?;
//!
//! let result = pattern.try_match(&target, Some("P2"))?;
//! assert_eq!(result.node_by_name("P1")?, target.find_node("N1").unwrap());
//! # Ok::<(), patgraph::PatternGraphError>(())
//! ```
//! Run Criterion benchmarks with `cargo bench` to inspect reports under `target/criterion`.

pub mod api_ergonomics;
pub mod bench_utils;
pub mod cache;
pub mod config;
pub mod constraint;
pub mod dsl;
pub mod errors;
pub mod graph;
pub mod matcher;
pub mod pattern;
pub mod result;

pub use crate::api_ergonomics::{ArgId, NodeId};
pub use crate::config::MatchConfig;
pub use crate::constraint::{
    ArgConstraint, ConstraintChoice, ConstraintSet, DefaultArgConstraint, DefaultNodeConstraint,
    NodeConstraint,
};
pub use crate::dsl::{parse_chain, parse_named_chain};
pub use crate::errors::{PatternGraphError, Result};
pub use crate::graph::{DataflowGraph, Dim, Direction, ElemType, GraphView, OpNode, ValueArg};
pub use crate::matcher::{MatchMetrics, MatchMetricsSnapshot, PatternMatcher};
pub use crate::pattern::{
    FanOut, OpTypeSet, PatternGraph, PatternGraphBuilder, PatternInput, PatternNode,
};
pub use crate::result::{MatchSummary, MatchedInputGroup, MatchedNodeGroup, PatternMatchResult};
