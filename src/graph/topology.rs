//! Adjacency and ordering derived from argument wiring.

use std::{cmp::Reverse, collections::BinaryHeap};

use crate::api_ergonomics::{ArgId, NodeId};

#[derive(Clone, Debug, Default)]
pub(crate) struct Topology {
    pub producer: Vec<Option<NodeId>>,
    pub consumers: Vec<Vec<(NodeId, usize)>>,
    pub input_nodes: Vec<Vec<NodeId>>,
    pub output_nodes: Vec<Vec<NodeId>>,
    pub output_edges: Vec<usize>,
    pub order: Vec<NodeId>,
}

pub(crate) fn derive(
    node_inputs: &[Vec<Option<ArgId>>],
    node_outputs: &[Vec<ArgId>],
    arg_count: usize,
) -> Topology {
    let node_count = node_inputs.len();
    let mut producer = vec![None; arg_count];
    let mut consumers: Vec<Vec<(NodeId, usize)>> = vec![Vec::new(); arg_count];

    for (idx, outputs) in node_outputs.iter().enumerate() {
        for arg in outputs {
            producer[arg.index()] = Some(NodeId(idx));
        }
    }
    for (idx, inputs) in node_inputs.iter().enumerate() {
        for (slot, arg) in inputs.iter().enumerate() {
            if let Some(arg) = arg {
                consumers[arg.index()].push((NodeId(idx), slot));
            }
        }
    }

    let mut input_nodes = Vec::with_capacity(node_count);
    for inputs in node_inputs {
        let mut preds = Vec::new();
        for arg in inputs.iter().flatten() {
            if let Some(src) = producer[arg.index()] {
                if !preds.contains(&src) {
                    preds.push(src);
                }
            }
        }
        input_nodes.push(preds);
    }

    let mut output_nodes = Vec::with_capacity(node_count);
    let mut output_edges = Vec::with_capacity(node_count);
    for outputs in node_outputs {
        let mut succs = Vec::new();
        let mut edges = 0;
        for arg in outputs {
            let uses = &consumers[arg.index()];
            edges += uses.len();
            for (dst, _) in uses {
                if !succs.contains(dst) {
                    succs.push(*dst);
                }
            }
        }
        output_nodes.push(succs);
        output_edges.push(edges);
    }

    let order = topological_order(&input_nodes, &output_nodes);

    Topology {
        producer,
        consumers,
        input_nodes,
        output_nodes,
        output_edges,
        order,
    }
}

/// Kahn's algorithm with the smallest ready id first. Nodes left over on a
/// cycle are appended in ascending id order.
fn topological_order(input_nodes: &[Vec<NodeId>], output_nodes: &[Vec<NodeId>]) -> Vec<NodeId> {
    let node_count = input_nodes.len();
    let mut in_degree: Vec<usize> = input_nodes.iter().map(Vec::len).collect();
    let mut ready: BinaryHeap<Reverse<NodeId>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, deg)| **deg == 0)
        .map(|(idx, _)| Reverse(NodeId(idx)))
        .collect();

    let mut order = Vec::with_capacity(node_count);
    let mut placed = vec![false; node_count];
    while let Some(Reverse(node)) = ready.pop() {
        order.push(node);
        placed[node.index()] = true;
        for next in &output_nodes[node.index()] {
            let deg = &mut in_degree[next.index()];
            *deg = deg.saturating_sub(1);
            if *deg == 0 && !placed[next.index()] {
                ready.push(Reverse(*next));
            }
        }
    }

    if order.len() < node_count {
        order.extend(
            (0..node_count)
                .filter(|idx| !placed[*idx])
                .map(NodeId),
        );
    }
    order
}
