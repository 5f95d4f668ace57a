use patgraph::{
    ArgId, DataflowGraph, GraphView, MatchConfig, NodeId, OpNode, PatternGraph, PatternGraphError,
    PatternInput, PatternMatchResult, PatternMatcher, PatternNode,
};
use patgraph::bench_utils::{DataflowShape, generate_dataflow};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn add(graph: &mut DataflowGraph, name: &str, op: &str, inputs: &[&str], outputs: &[&str]) -> NodeId {
    graph
        .add_node(
            OpNode::new(name, op)
                .inputs(inputs.iter().copied())
                .outputs(outputs.iter().copied()),
        )
        .expect("node")
}

fn add_relu_sigmoid() -> DataflowGraph {
    let mut graph = DataflowGraph::new();
    add(&mut graph, "N1", "Add", &["x", "y"], &["s"]);
    add(&mut graph, "N2", "Relu", &["s"], &["r"]);
    add(&mut graph, "N3", "Sigmoid", &["r"], &["out"]);
    graph
}

fn pattern_of(first_op: &str) -> PatternGraph {
    PatternGraph::builder("pair")
        .node(PatternNode::new("P1").op_type(first_op).outputs(["p1_out"]))
        .node(PatternNode::new("P2").op_type("Relu").inputs(["p1_out"]))
        .build()
        .expect("pattern")
}

fn diamond(prefix: &str) -> DataflowGraph {
    let name = |n: &str| format!("{prefix}{n}");
    let mut graph = DataflowGraph::new();
    add(&mut graph, &name("A"), "Split", &["x"], &["a"]);
    add(&mut graph, &name("B"), "Relu", &["a"], &["b"]);
    add(&mut graph, &name("C"), "Relu", &["a"], &["c"]);
    add(&mut graph, &name("D"), "Add", &["b", "c"], &["d"]);
    graph
}

fn diamond_pattern() -> PatternGraph {
    PatternGraph::builder("diamond")
        .node(PatternNode::new("pa").op_type("Split").outputs(["a"]))
        .node(PatternNode::new("pb").op_type("Relu").inputs(["a"]).outputs(["b"]))
        .node(PatternNode::new("pc").op_type("Relu").inputs(["a"]).outputs(["c"]))
        .node(PatternNode::new("pd").op_type("Add").inputs(["b", "c"]))
        .build()
        .expect("pattern")
}

fn assert_sound(pattern: &PatternGraph, target: &dyn GraphView, result: &PatternMatchResult) {
    let mut seen = std::collections::HashSet::new();
    for (name, group) in result.node_groups() {
        assert!(seen.insert(group.matched_node), "{name} shares a target node");
        let op = &target.node(group.matched_node).expect("bound node").op_type;
        assert!(group.pattern_node.matches_op_type(op), "{name} bound to {op}");
    }
    for (p_from, _) in pattern.nodes() {
        for p_to in pattern.graph().output_nodes(p_from) {
            let from = result.node_by_name(&pattern.node_at(p_from).unwrap().name).unwrap();
            let to = result.node_by_name(&pattern.node_at(p_to).unwrap().name).unwrap();
            assert!(
                target.output_nodes(from).contains(&to),
                "pattern edge {p_from}->{p_to} not present as {from}->{to}"
            );
        }
    }
    let args: std::collections::HashSet<ArgId> =
        result.input_groups().map(|(_, group)| group.matched_input).collect();
    assert_eq!(args.len(), result.input_groups().count());
}

#[test]
fn test_add_relu_with_explicit_root() {
    let target = add_relu_sigmoid();
    let result = pattern_of("Add").try_match(&target, Some("P2")).unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result.node_by_name("P1").unwrap(), target.find_node("N1").unwrap());
    assert_eq!(result.node_by_name("P2").unwrap(), target.find_node("N2").unwrap());
}

#[test]
fn test_conv_pattern_reports_no_match() {
    let target = add_relu_sigmoid();
    let err = pattern_of("Conv").try_match(&target, Some("P2")).unwrap_err();
    assert_eq!(err, PatternGraphError::NoMatch);
    assert!(err.is_no_match());
}

#[test]
fn test_unknown_root_is_config_error() {
    let target = add_relu_sigmoid();
    let err = pattern_of("Add").try_match(&target, Some("P7")).unwrap_err();
    assert!(matches!(err, PatternGraphError::Config(_)));
}

#[test]
fn test_lookup_of_unbound_name_is_not_found() {
    let target = add_relu_sigmoid();
    let result = pattern_of("Add").try_match(&target, None).unwrap();
    assert!(matches!(result.node_by_name("P3"), Err(PatternGraphError::NotFound(_))));
    assert!(matches!(result.input_by_name("x"), Err(PatternGraphError::NotFound(_))));
}

#[test]
fn test_wildcard_binds_first_node_in_topological_order() {
    let mut target = DataflowGraph::new();
    // Consumer inserted before its producer: id order differs from topo order.
    let late = add(&mut target, "consumer", "Relu", &["t"], &["u"]);
    let early = add(&mut target, "producer", "Add", &["x"], &["t"]);
    assert_eq!(target.topological_order(), vec![early, late]);

    let pattern = PatternGraph::builder("any")
        .node(PatternNode::new("any"))
        .build()
        .unwrap();
    let result = pattern.try_match(&target, None).unwrap();
    assert_eq!(result.node_by_name("any").unwrap(), early);
}

#[test]
fn test_diamond_binds_distinct_branches() {
    let target = diamond("");
    let pattern = diamond_pattern();
    for root in [None, Some("pd"), Some("pb")] {
        let result = pattern.try_match(&target, root).unwrap();
        assert_eq!(result.len(), 4);
        assert_eq!(result.node_by_name("pa").unwrap(), target.find_node("A").unwrap());
        assert_eq!(result.node_by_name("pd").unwrap(), target.find_node("D").unwrap());
        let b = result.node_by_name("pb").unwrap();
        let c = result.node_by_name("pc").unwrap();
        assert_ne!(b, c);
        assert_sound(&pattern, &target, &result);
    }
}

#[test]
fn test_diamond_needs_both_branches() {
    // A -> B -> D and A -> C, but C does not feed D.
    let mut target = DataflowGraph::new();
    add(&mut target, "A", "Split", &["x"], &["a"]);
    add(&mut target, "B", "Relu", &["a"], &["b"]);
    add(&mut target, "C", "Relu", &["a"], &["c"]);
    add(&mut target, "D", "Add", &["b", "y"], &["d"]);
    add(&mut target, "E", "Neg", &["c"], &["e"]);
    assert_eq!(
        diamond_pattern().try_match(&target, None),
        Err(PatternGraphError::NoMatch)
    );
}

#[test]
fn test_look_ahead_keeps_shared_neighbor_consistent() {
    // Two Relu consumers of A; only the second also feeds M. The pattern
    // requires the Relu bound to `r` to be the one M consumes.
    let mut target = DataflowGraph::new();
    add(&mut target, "A", "Split", &["x"], &["a"]);
    add(&mut target, "R1", "Relu", &["a"], &["r1"]);
    add(&mut target, "R2", "Relu", &["a"], &["r2"]);
    add(&mut target, "M", "Mul", &["a", "r2"], &["m"]);
    add(&mut target, "Z", "Neg", &["r1"], &["z"]);

    let pattern = PatternGraph::builder("shared")
        .config(MatchConfig::default().without_fan_out_check())
        .node(PatternNode::new("a").op_type("Split").outputs(["pa"]))
        .node(PatternNode::new("m").op_type("Mul").inputs(["pa", "pr"]))
        .node(PatternNode::new("r").op_type("Relu").inputs(["pa"]).outputs(["pr"]))
        .build()
        .unwrap();

    for root in [None, Some("r")] {
        let result = pattern.try_match(&target, root).unwrap();
        assert_eq!(result.node_by_name("r").unwrap(), target.find_node("R2").unwrap());
        assert_eq!(result.node_by_name("m").unwrap(), target.find_node("M").unwrap());
        assert_sound(&pattern, &target, &result);
    }

    // Rooted at `r`, the first candidate R1 reaches M through A, where M is
    // not a consumer of R1.
    let matcher = PatternMatcher::new(&pattern);
    matcher.try_match(&target, Some("r")).unwrap();
    assert!(matcher.metrics().snapshot().look_ahead_failure_count >= 1);
}

#[test]
fn test_explicit_fan_out_is_enforced() {
    let mut target = DataflowGraph::new();
    let three = add(&mut target, "X", "Split", &["in"], &["x"]);
    for name in ["c1", "c2", "c3"] {
        add(&mut target, name, "Relu", &["x"], &[]);
    }
    let two = add(&mut target, "Y", "Split", &["in"], &["y"]);
    for name in ["d1", "d2"] {
        add(&mut target, name, "Relu", &["y"], &[]);
    }
    assert_eq!(target.output_edge_count(three), 3);

    let pattern = PatternGraph::builder("fan2")
        .node(PatternNode::new("fan").fan_out(2))
        .build()
        .unwrap();
    let result = pattern.try_match(&target, None).unwrap();
    assert_eq!(result.node_by_name("fan").unwrap(), two);

    let mut only_three = DataflowGraph::new();
    add(&mut only_three, "X", "Split", &["in"], &["x"]);
    for name in ["c1", "c2", "c3"] {
        add(&mut only_three, name, "Relu", &["x"], &[]);
    }
    assert_eq!(pattern.try_match(&only_three, None), Err(PatternGraphError::NoMatch));
}

#[test]
fn test_derived_fan_out_rejects_extra_consumers() {
    // N1 feeds both N2 and N3, but the pattern's P1 has a single consumer.
    let mut target = DataflowGraph::new();
    add(&mut target, "N1", "Add", &["x"], &["s"]);
    add(&mut target, "N2", "Relu", &["s"], &["r"]);
    add(&mut target, "N3", "Neg", &["s"], &["n"]);
    assert_eq!(
        pattern_of("Add").try_match(&target, None),
        Err(PatternGraphError::NoMatch)
    );

    let relaxed = PatternGraph::builder("pair")
        .config(MatchConfig::default().without_fan_out_check())
        .node(PatternNode::new("P1").op_type("Add").outputs(["p1_out"]))
        .node(PatternNode::new("P2").op_type("Relu").inputs(["p1_out"]))
        .build()
        .unwrap();
    assert_eq!(relaxed.try_match(&target, None).unwrap().len(), 2);
}

#[test]
fn test_failed_candidate_leaves_nothing_behind() {
    let mut target = DataflowGraph::new();
    add(&mut target, "A1", "Add", &["x"], &["a1"]);
    add(&mut target, "R1", "Relu", &["a1"], &["r1"]);
    add(&mut target, "S", "Sigmoid", &["r1"], &["s"]);
    add(&mut target, "A2", "Add", &["y"], &["a2"]);
    add(&mut target, "R2", "Relu", &["a2"], &["r2"]);
    add(&mut target, "M", "Mul", &["r2"], &["m"]);

    let pattern = PatternGraph::builder("add-relu-mul")
        .node(PatternNode::new("P1").op_type("Add").outputs(["t1"]))
        .node(PatternNode::new("P2").op_type("Relu").inputs(["t1"]).outputs(["t2"]))
        .node(PatternNode::new("P3").op_type("Mul").inputs(["t2"]))
        .build()
        .unwrap();
    let matcher = PatternMatcher::new(&pattern);
    let result = matcher.try_match(&target, None).unwrap();
    assert_eq!(result.len(), 3);
    assert_eq!(result.node_by_name("P1").unwrap(), target.find_node("A2").unwrap());
    assert_eq!(result.node_by_name("P2").unwrap(), target.find_node("R2").unwrap());
    assert_eq!(result.node_by_name("P3").unwrap(), target.find_node("M").unwrap());
    assert!(matcher.metrics().snapshot().backtrack_count >= 1);
}

#[test]
fn test_match_is_deterministic() {
    let target = diamond("t_");
    let pattern = diamond_pattern();
    let first = pattern.try_match(&target, None).unwrap();
    let second = pattern.try_match(&target, None).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first.summary()).unwrap(),
        serde_json::to_string(&second.summary()).unwrap()
    );
}

#[test]
fn test_domain_and_version_constraints() {
    let mut target = DataflowGraph::new();
    target
        .add_node(OpNode::new("g", "Gelu").domain("com.microsoft").version(1).inputs(["x"]))
        .unwrap();
    target
        .add_node(OpNode::new("r", "Relu").domain("").version(14).inputs(["x"]))
        .unwrap();

    let gelu = |versions: Vec<i32>| {
        PatternGraph::builder("gelu")
            .node(PatternNode::new("g").op_type("Gelu").domain_version("com.microsoft", versions))
            .build()
            .unwrap()
    };
    assert!(gelu(vec![1]).try_match(&target, None).is_ok());
    assert!(gelu(vec![]).try_match(&target, None).is_ok());
    assert!(gelu(vec![2]).try_match(&target, None).unwrap_err().is_no_match());

    let relu = PatternGraph::builder("relu")
        .node(PatternNode::new("r").op_type("Relu").domain_version("ai.onnx", [13, 14]))
        .build()
        .unwrap();
    assert_eq!(
        relu.try_match(&target, None).unwrap().node_by_name("r").unwrap(),
        target.find_node("r").unwrap()
    );

    let relaxed = PatternGraph::builder("gelu-any-version")
        .config(MatchConfig::default().without_domain_version_check())
        .node(PatternNode::new("g").op_type("Gelu").domain_version("com.microsoft", [9]))
        .build()
        .unwrap();
    assert!(relaxed.try_match(&target, None).is_ok());
}

#[test]
fn test_custom_constraints_override_defaults() {
    let target = add_relu_sigmoid();

    // Structural config ignores op types; the overrides pin P2 to N3 and
    // `lhs` to `s`.
    let pattern = PatternGraph::builder("custom")
        .config(MatchConfig::structural())
        .input(PatternInput::new("lhs"))
        .node(PatternNode::new("P1").inputs(["lhs"]).outputs(["t"]))
        .node(PatternNode::new("P2").inputs(["t"]))
        .node_constraint_fn(
            "P2",
            |target: &dyn GraphView, node: NodeId, _: &PatternGraph, _: &PatternNode| {
                target.node(node).is_some_and(|n| n.op_type == "Sigmoid")
            },
        )
        .arg_constraint_fn(
            "lhs",
            |target: &dyn GraphView, arg: ArgId, _: &PatternGraph, _: &PatternInput| {
                target.arg(arg).is_some_and(|a| a.name == "s")
            },
        )
        .build()
        .unwrap();

    let result = pattern.try_match(&target, None).unwrap();
    assert_eq!(result.node_by_name("P1").unwrap(), target.find_node("N2").unwrap());
    assert_eq!(result.node_by_name("P2").unwrap(), target.find_node("N3").unwrap());
    assert_eq!(result.input_by_name("lhs").unwrap(), target.find_arg("s").unwrap());

    let first: Vec<_> = result
        .nodes_with_condition(|name, _| name == "P1")
        .collect();
    assert_eq!(first, vec![target.find_node("N2").unwrap()]);
}

#[test]
fn test_input_bound_once_across_nodes() {
    // Both pattern nodes read the same declared input, so the target nodes
    // must share it too.
    let mut target = DataflowGraph::new();
    add(&mut target, "sa", "Sqrt", &["u"], &["o1"]);
    add(&mut target, "sb", "Sqrt", &["v"], &["o2"]);
    add(&mut target, "sum", "Add", &["o1", "o2"], &["out"]);

    let pattern = PatternGraph::builder("shared-input")
        .input(PatternInput::new("x"))
        .node(PatternNode::new("a").op_type("Sqrt").inputs(["x"]).outputs(["pa"]))
        .node(PatternNode::new("b").op_type("Sqrt").inputs(["x"]).outputs(["pb"]))
        .node(PatternNode::new("s").op_type("Add").inputs(["pa", "pb"]))
        .build()
        .unwrap();
    assert!(pattern.try_match(&target, None).unwrap_err().is_no_match());

    let mut shared = DataflowGraph::new();
    add(&mut shared, "sa", "Sqrt", &["u"], &["o1"]);
    add(&mut shared, "sb", "Sqrt", &["u"], &["o2"]);
    add(&mut shared, "sum", "Add", &["o1", "o2"], &["out"]);
    let result = pattern.try_match(&shared, None).unwrap();
    assert_eq!(result.input_by_name("x").unwrap(), shared.find_arg("u").unwrap());
}

#[test]
fn test_argument_choice_is_revisited_when_neighbor_fails() {
    // A reads (u, v) and M reads (v, s). Binding x to u at A fits A alone but
    // leaves no x for M, so the search has to come back and try x -> v.
    let mut target = DataflowGraph::new();
    add(&mut target, "A", "Add", &["u", "v"], &["s"]);
    add(&mut target, "M", "Mul", &["v", "s"], &["out"]);

    let pattern = PatternGraph::builder("add-mul")
        .input(PatternInput::new("x"))
        .input(PatternInput::new("y"))
        .node(PatternNode::new("P").op_type("Add").inputs(["x", "y"]).outputs(["t"]))
        .node(PatternNode::new("Q").op_type("Mul").inputs(["x", "t"]))
        .build()
        .unwrap();

    for root in [None, Some("P"), Some("Q")] {
        let matcher = PatternMatcher::new(&pattern);
        let result = matcher.try_match(&target, root).unwrap();
        assert_eq!(result.node_by_name("P").unwrap(), target.find_node("A").unwrap());
        assert_eq!(result.node_by_name("Q").unwrap(), target.find_node("M").unwrap());
        assert_eq!(result.input_by_name("x").unwrap(), target.find_arg("v").unwrap());
        assert_eq!(result.input_by_name("y").unwrap(), target.find_arg("u").unwrap());
        assert_sound(matcher.pattern(), &target, &result);
    }

    let matcher = PatternMatcher::new(&pattern);
    matcher.try_match(&target, Some("P")).unwrap();
    assert!(matcher.metrics().snapshot().backtrack_count >= 1);
}

fn add_relu_loop() -> DataflowGraph {
    let mut graph = DataflowGraph::new();
    add(&mut graph, "a", "Add", &["x", "loop"], &["y"]);
    add(&mut graph, "b", "Relu", &["y"], &["loop"]);
    graph
}

#[test]
fn test_cyclic_target_terminates_and_binds() {
    let target = add_relu_loop();
    let pattern = pattern_of("Add");
    for root in [None, Some("P1"), Some("P2")] {
        let result = pattern.try_match(&target, root).unwrap();
        assert_eq!(result.node_by_name("P1").unwrap(), target.find_node("a").unwrap());
        assert_eq!(result.node_by_name("P2").unwrap(), target.find_node("b").unwrap());
        assert_sound(&pattern, &target, &result);
    }

    // No Conv anywhere on the loop: every candidate fails and the sweep ends.
    assert!(pattern_of("Conv").try_match(&target, None).unwrap_err().is_no_match());
}

#[test]
fn test_cyclic_pattern_closes_back_edge_by_look_ahead() {
    let pattern = PatternGraph::builder("loop")
        .node(PatternNode::new("P1").op_type("Add").inputs(["back"]).outputs(["fwd"]))
        .node(PatternNode::new("P2").op_type("Relu").inputs(["fwd"]).outputs(["back"]))
        .build()
        .unwrap();

    let target = add_relu_loop();
    for root in [None, Some("P2")] {
        let result = pattern.try_match(&target, root).unwrap();
        assert_eq!(result.node_by_name("P1").unwrap(), target.find_node("a").unwrap());
        assert_eq!(result.node_by_name("P2").unwrap(), target.find_node("b").unwrap());
    }

    // Same operators without the back edge: P2 is reached from P1's inputs,
    // but b does not consume a, so the look-ahead on P1 rejects it.
    let mut open = DataflowGraph::new();
    add(&mut open, "b", "Relu", &["u"], &["z"]);
    add(&mut open, "a", "Add", &["z"], &["y"]);
    add(&mut open, "c", "Sigmoid", &["y"], &["w"]);
    let matcher = PatternMatcher::new(&pattern);
    assert!(matcher.try_match(&open, None).unwrap_err().is_no_match());
    assert!(matcher.metrics().snapshot().look_ahead_failure_count >= 1);
}

fn random_dag(rng: &mut StdRng, size: usize) -> DataflowGraph {
    generate_dataflow(
        DataflowShape::RandomDag { max_fan_in: 2 },
        size,
        rng.r#gen(),
        &["Add", "Relu", "Mul"],
    )
    .expect("random dag")
}

#[test]
fn test_random_graphs_yield_sound_injective_matches() {
    let patterns = [
        PatternGraph::builder("add-relu")
            .config(MatchConfig::default().without_fan_out_check())
            .node(PatternNode::new("p1").op_type("Add").outputs(["t"]))
            .node(PatternNode::new("p2").op_type("Relu").inputs(["t"]))
            .build()
            .unwrap(),
        PatternGraph::builder("fork")
            .config(MatchConfig::default().without_fan_out_check())
            .node(PatternNode::new("src").op_types(["Add", "Mul"]).outputs(["t"]))
            .node(PatternNode::new("l").op_type("Relu").inputs(["t"]).outputs(["l_out"]))
            .node(PatternNode::new("r").op_type("Relu").inputs(["t"]).outputs(["r_out"]))
            .node(PatternNode::new("join").inputs(["l_out", "r_out"]))
            .build()
            .unwrap(),
        PatternGraph::builder("strict-chain")
            .node(PatternNode::new("a").outputs(["t"]))
            .node(PatternNode::new("b").op_type("Mul").inputs(["t"]))
            .build()
            .unwrap(),
    ];

    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut matched = 0;
    for _ in 0..200 {
        let size = rng.gen_range(2..14);
        let target = random_dag(&mut rng, size);
        for pattern in &patterns {
            match pattern.try_match(&target, None) {
                Ok(result) => {
                    matched += 1;
                    assert_eq!(result.len(), pattern.len());
                    assert_sound(pattern, &target, &result);
                    assert_eq!(pattern.try_match(&target, None).unwrap(), result);
                }
                Err(err) => assert!(err.is_no_match(), "unexpected error {err}"),
            }
        }
    }
    assert!(matched > 0);
}
