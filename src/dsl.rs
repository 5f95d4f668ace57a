//! Compact text form for linear patterns.
//!
//! ```text
//! conv:Conv -> Add|Sum -> Relu*2 -> *
//! ```
//!
//! Segments are separated by `->`. Each segment is `[name:]op[|op...][*count]`
//! where `*` on its own accepts any operator and `*count` repeats the segment.
//! Unnamed segments are called `n0`, `n1`, ... by position; a named segment
//! repeated `count` times yields `name0`, `name1`, .... Consecutive nodes are
//! wired through generated argument names.

use crate::{
    errors::{PatternGraphError, Result},
    pattern::{PatternGraph, PatternNode},
};

/// Parse a chain pattern, naming the compiled pattern after the input text.
pub fn parse_chain(input: &str) -> Result<PatternGraph> {
    parse_named_chain(input.trim(), input)
}

/// Parse a chain pattern into a pattern called `name`.
pub fn parse_named_chain(name: &str, input: &str) -> Result<PatternGraph> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PatternGraphError::invalid_input("empty chain pattern"));
    }

    let mut nodes = Vec::new();
    for (position, token) in trimmed.split("->").enumerate() {
        let segment = parse_segment(token.trim(), position)?;
        for copy in 0..segment.count {
            let node_name = match (&segment.name, segment.count) {
                (Some(name), 1) => name.clone(),
                (Some(name), _) => format!("{name}{copy}"),
                (None, _) => format!("n{}", nodes.len()),
            };
            let node = segment
                .ops
                .iter()
                .fold(PatternNode::new(node_name), |node, op| node.op_type(op.as_str()));
            nodes.push(node);
        }
    }

    let last = nodes.len().saturating_sub(1);
    nodes
        .into_iter()
        .enumerate()
        .fold(PatternGraph::builder(name), |builder, (idx, mut node)| {
            if idx > 0 {
                node = node.inputs([link_name(idx - 1)]);
            }
            if idx < last {
                node = node.outputs([link_name(idx)]);
            }
            builder.node(node)
        })
        .build()
}

struct Segment {
    name: Option<String>,
    /// Empty means any operator.
    ops: Vec<String>,
    count: usize,
}

fn parse_segment(token: &str, position: usize) -> Result<Segment> {
    if token.is_empty() {
        return Err(PatternGraphError::invalid_input(format!(
            "empty segment at position {position}"
        )));
    }
    let (name, rest) = match token.split_once(':') {
        Some((name, rest)) => {
            let name = name.trim();
            if name.is_empty() {
                return Err(PatternGraphError::invalid_input(format!(
                    "empty node name at position {position}"
                )));
            }
            (Some(name.to_string()), rest.trim())
        }
        None => (None, token),
    };

    let (ops_part, count) = match rest.rsplit_once('*') {
        Some((head, times)) if !head.trim().is_empty() => {
            let count = times.trim().parse::<usize>().map_err(|_| {
                PatternGraphError::invalid_input(format!(
                    "bad repeat count {times:?} at position {position}"
                ))
            })?;
            if count == 0 {
                return Err(PatternGraphError::invalid_input(format!(
                    "repeat count must be positive at position {position}"
                )));
            }
            (head.trim(), count)
        }
        _ => (rest, 1),
    };

    let ops = if ops_part == "*" {
        Vec::new()
    } else {
        let ops: Vec<String> = ops_part.split('|').map(|op| op.trim().to_string()).collect();
        if ops.iter().any(|op| op.is_empty() || op.contains('*')) {
            return Err(PatternGraphError::invalid_input(format!(
                "bad operator list {ops_part:?} at position {position}"
            )));
        }
        ops
    };

    Ok(Segment { name, ops, count })
}

fn link_name(idx: usize) -> String {
    format!("chain_{idx}")
}
