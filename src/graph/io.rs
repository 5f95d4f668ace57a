//! JSON-lines dump and load for [`DataflowGraph`].
//!
//! Each line is one record tagged by `type`: `arg` records carry argument
//! metadata, `node` records carry operators in insertion order. Loading
//! replays the records through the normal graph builders, so the same
//! validation applies.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::errors::{PatternGraphError, Result};

use super::{
    dataflow::DataflowGraph,
    types::{OpNode, ValueArg},
};

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum GraphRecord {
    Arg(ValueArg),
    Node(OpNode),
}

pub fn dump_graph_to_path<P: AsRef<Path>>(graph: &DataflowGraph, path: P) -> Result<()> {
    let file = File::create(path.as_ref())
        .map_err(|e| PatternGraphError::invalid_input(e.to_string()))?;
    dump_graph_to_writer(graph, BufWriter::new(file))
}

pub fn dump_graph_to_writer<W: Write>(graph: &DataflowGraph, mut writer: W) -> Result<()> {
    for arg in graph.args() {
        write_record(&mut writer, &GraphRecord::Arg(arg.clone()))?;
    }
    for node in graph.nodes() {
        write_record(&mut writer, &GraphRecord::Node(node.clone()))?;
    }
    writer
        .flush()
        .map_err(|e| PatternGraphError::invalid_input(e.to_string()))
}

pub fn load_graph_from_path<P: AsRef<Path>>(path: P) -> Result<DataflowGraph> {
    let file =
        File::open(path.as_ref()).map_err(|e| PatternGraphError::invalid_input(e.to_string()))?;
    load_graph_from_reader(BufReader::new(file))
}

pub fn load_graph_from_reader<R: BufRead>(reader: R) -> Result<DataflowGraph> {
    let mut graph = DataflowGraph::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| PatternGraphError::invalid_input(e.to_string()))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: GraphRecord = serde_json::from_str(&line).map_err(|e| {
            PatternGraphError::invalid_input(format!("line {}: {}", idx + 1, e))
        })?;
        match record {
            GraphRecord::Arg(arg) => {
                graph.add_arg(arg)?;
            }
            GraphRecord::Node(node) => {
                graph.add_node(node)?;
            }
        }
    }
    Ok(graph)
}

fn write_record<W: Write>(writer: &mut W, record: &GraphRecord) -> Result<()> {
    serde_json::to_writer(&mut *writer, record)
        .map_err(|e| PatternGraphError::invalid_input(e.to_string()))?;
    writer
        .write_all(b"\n")
        .map_err(|e| PatternGraphError::invalid_input(e.to_string()))
}
