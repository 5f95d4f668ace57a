//! Seeded synthetic dataflow graphs for benchmarks and randomized tests.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    errors::{PatternGraphError, Result},
    graph::{DataflowGraph, OpNode},
};

/// Operator mix used when the caller does not pick one.
pub const DEFAULT_OPS: [&str; 6] = ["Conv", "Add", "Relu", "Mul", "Sigmoid", "MatMul"];

#[derive(Clone, Debug)]
pub enum DataflowShape {
    /// Each node consumes the previous node's output.
    Chain,
    /// Rows of `width` nodes; every node reads two nodes of the previous row.
    Layered { width: usize },
    /// Each node reads between one and `max_fan_in` earlier outputs.
    RandomDag { max_fan_in: usize },
}

/// Build a graph of `node_count` operators. Node `i` is called `v{i}`,
/// produces `t{i}` and takes its op type from `ops`, chosen by `seed`.
pub fn generate_dataflow(
    shape: DataflowShape,
    node_count: usize,
    seed: u64,
    ops: &[&str],
) -> Result<DataflowGraph> {
    if node_count == 0 {
        return Err(PatternGraphError::invalid_input("node_count must be positive"));
    }
    let ops = if ops.is_empty() { &DEFAULT_OPS[..] } else { ops };
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = DataflowGraph::new();

    for idx in 0..node_count {
        let inputs = match &shape {
            DataflowShape::Chain => chain_inputs(idx),
            DataflowShape::Layered { width } => layered_inputs(idx, *width, &mut rng)?,
            DataflowShape::RandomDag { max_fan_in } => {
                random_inputs(idx, *max_fan_in, &mut rng)?
            }
        };
        let op = ops[rng.gen_range(0..ops.len())];
        graph.add_node(
            OpNode::new(format!("v{idx}"), op)
                .inputs(inputs)
                .outputs([value_name(idx)]),
        )?;
    }
    Ok(graph)
}

fn chain_inputs(idx: usize) -> Vec<String> {
    if idx == 0 {
        vec!["input".to_string()]
    } else {
        vec![value_name(idx - 1)]
    }
}

fn layered_inputs(idx: usize, width: usize, rng: &mut StdRng) -> Result<Vec<String>> {
    if width == 0 {
        return Err(PatternGraphError::invalid_input("layer width must be positive"));
    }
    let row = idx / width;
    if row == 0 {
        return Ok(vec![format!("input{idx}")]);
    }
    let prev = (row - 1) * width;
    let first = prev + rng.gen_range(0..width);
    let second = prev + rng.gen_range(0..width);
    Ok(vec![value_name(first), value_name(second)])
}

fn random_inputs(idx: usize, max_fan_in: usize, rng: &mut StdRng) -> Result<Vec<String>> {
    if max_fan_in == 0 {
        return Err(PatternGraphError::invalid_input("max_fan_in must be positive"));
    }
    if idx == 0 {
        return Ok(vec!["input".to_string()]);
    }
    let fan_in = rng.gen_range(1..=max_fan_in);
    Ok((0..fan_in)
        .map(|_| value_name(rng.gen_range(0..idx)))
        .collect())
}

fn value_name(idx: usize) -> String {
    format!("t{idx}")
}
