//! Integration tests for graph mutations and connection acceptance.

#[allow(dead_code)]
mod helpers;

use helpers::*;
use workflow_editor::error::{GraphError, RejectionReason};
use workflow_editor::model::*;
use workflow_editor::schema::capabilities;
use workflow_editor::types::TypeTag;
use workflow_editor::validate::{self, IssueKind};

fn kinds(graph: &GraphModel) -> Vec<IssueKind> {
    validate::validate_graph(graph).into_iter().map(|i| i.kind).collect()
}

#[test]
fn table_feeding_required_input_gives_empty_report() {
    init_tracing();
    let mut graph = GraphModel::new();
    let t = graph.add_node(NodeTypeTag::Table, source_schema(TypeTag::Table));
    let p = add(&mut graph, NodeSchema::new(vec![required("in", TypeTag::Table)], vec![]));

    let edge = graph.propose_edge(candidate(&t, "out", &p, "in"));
    assert!(edge.is_ok(), "Table -> Table should connect: {:?}", edge);

    let report = validate::validate_graph(&graph);
    assert!(report.is_empty(), "Expected empty report, got: {:?}", report);
}

#[test]
fn second_edge_into_same_input_is_rejected() {
    let mut graph = GraphModel::new();
    let t = add(&mut graph, source_schema(TypeTag::Table));
    let p = add(&mut graph, pass_schema(TypeTag::Table));

    graph.propose_edge(candidate(&t, "out", &p, "in")).unwrap();
    let second = graph.propose_edge(candidate(&t, "out", &p, "in"));

    assert_eq!(second, Err(RejectionReason::InputAlreadyConnected));
    assert_eq!(graph.edges().len(), 1, "Graph must keep exactly one edge");
}

#[test]
fn any_output_feeds_int_input() {
    let mut graph = GraphModel::new();
    let a = add(&mut graph, source_schema(TypeTag::Any));
    let n = add(&mut graph, pass_schema(TypeTag::Int));
    assert!(graph.propose_edge(candidate(&a, "out", &n, "in")).is_ok());
}

#[test]
fn int_widens_to_float_but_not_back() {
    let mut graph = GraphModel::new();
    let i = add(&mut graph, source_schema(TypeTag::Int));
    let f = add(&mut graph, source_schema(TypeTag::Float));
    let wants_float = add(&mut graph, pass_schema(TypeTag::Float));
    let wants_int = add(&mut graph, pass_schema(TypeTag::Int));

    assert!(graph.propose_edge(candidate(&i, "out", &wants_float, "in")).is_ok());
    assert_eq!(
        graph.propose_edge(candidate(&f, "out", &wants_int, "in")),
        Err(RejectionReason::TypeMismatch(TypeTag::Float, TypeTag::Int))
    );
}

#[test]
fn rejection_message_names_both_types() {
    let mut graph = GraphModel::new();
    let s = add(&mut graph, source_schema(TypeTag::Str));
    let b = add(&mut graph, pass_schema(TypeTag::Bool));
    let err = graph.propose_edge(candidate(&s, "out", &b, "in")).unwrap_err();
    assert_eq!(err.to_string(), "Type mismatch: str cannot connect to bool");
}

#[test]
fn self_loop_is_rejected_even_with_matching_types() {
    let mut graph = GraphModel::new();
    let n = add(&mut graph, pass_schema(TypeTag::Int));
    assert_eq!(
        graph.propose_edge(candidate(&n, "out", &n, "in")),
        Err(RejectionReason::SelfLoop)
    );
    assert!(graph.edges().is_empty());
}

#[test]
fn rejections_leave_graph_untouched() {
    let mut graph = GraphModel::new();
    let a = add(&mut graph, source_schema(TypeTag::Str));
    let b = add(&mut graph, pass_schema(TypeTag::Int));
    let before_edges = graph.edges().to_vec();
    let before_report = validate::validate_graph(&graph);

    let attempts = [
        candidate("ghost", "out", &b, "in"),
        candidate(&a, "nope", &b, "in"),
        candidate(&a, "out", &b, "nope"),
        candidate(&b, "out", &b, "in"),
        candidate(&a, "out", &b, "in"),
    ];
    for c in attempts {
        assert!(graph.propose_edge(c.clone()).is_err(), "{:?} should be refused", c);
    }

    assert_eq!(graph.edges(), before_edges.as_slice());
    assert_eq!(validate::validate_graph(&graph), before_report);
}

#[test]
fn checks_run_in_order() {
    let mut graph = GraphModel::new();
    let a = add(&mut graph, pass_schema(TypeTag::Int));
    // Missing endpoint wins over everything else.
    assert_eq!(
        graph.propose_edge(candidate("ghost", "x", "ghost", "y")),
        Err(RejectionReason::EndpointMissing)
    );
    // Missing port is checked before the self loop.
    assert_eq!(
        graph.propose_edge(candidate(&a, "x", &a, "in")),
        Err(RejectionReason::PortMissing)
    );
}

#[test]
fn each_input_has_at_most_one_edge() {
    let mut graph = GraphModel::new();
    let sources: Vec<_> = (0..5).map(|_| add(&mut graph, source_schema(TypeTag::Int))).collect();
    let sink = add(&mut graph, pass_schema(TypeTag::Float));

    let accepted = sources
        .iter()
        .filter(|s| graph.propose_edge(candidate(s, "out", &sink, "in")).is_ok())
        .count();

    assert_eq!(accepted, 1);
    assert_eq!(graph.incoming(&sink).count(), 1);
}

#[test]
fn outputs_fan_out_freely() {
    let mut graph = GraphModel::new();
    let src = add(&mut graph, source_schema(TypeTag::Table));
    for _ in 0..4 {
        let sink = add(&mut graph, pass_schema(TypeTag::Table));
        link(&mut graph, &src, &sink);
    }
    assert_eq!(graph.outgoing(&src).count(), 4);
}

#[test]
fn removing_a_node_removes_its_edges() {
    let (mut graph, ids) = chain(3);
    let removed = graph.remove_node(&ids[1]).unwrap();

    assert_eq!(removed.edges.len(), 2, "Both incident edges go with the node");
    assert!(graph.edges().iter().all(|e| !e.touches(&ids[1])));
    assert_eq!(graph.edges().len(), 1);
    assert!(graph.node(&ids[1]).is_none());
}

#[test]
fn removing_unknown_node_is_an_error() {
    let mut graph = GraphModel::new();
    assert_eq!(
        graph.remove_node("nope").unwrap_err(),
        GraphError::node_not_found("nope")
    );
}

#[test]
fn missing_input_appears_and_clears() {
    let mut graph = GraphModel::new();
    let src = add(&mut graph, source_schema(TypeTag::Int));
    let sink = add(&mut graph, pass_schema(TypeTag::Int));
    assert_eq!(kinds(&graph), vec![IssueKind::MissingRequiredInput]);

    let edge = link(&mut graph, &src, &sink);
    assert!(kinds(&graph).is_empty());

    graph.remove_edge(&edge).unwrap();
    let report = validate::validate_graph(&graph);
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].node_id.as_deref(), Some(sink.as_str()));
    assert_eq!(report[0].message, "Required input \"in\" is not connected");
}

#[test]
fn missing_input_clears_when_requirement_is_dropped() {
    let mut graph = GraphModel::new();
    let sink = add(&mut graph, pass_schema(TypeTag::Int));
    assert_eq!(kinds(&graph), vec![IssueKind::MissingRequiredInput]);

    let optional = NodeSchema::new(vec![input("in", TypeTag::Int)], vec![output("out", TypeTag::Int)]);
    graph.update_node_schema(&sink, optional).unwrap();
    assert!(kinds(&graph).is_empty(), "optional input needs no edge");

    graph.update_node_schema(&sink, pass_schema(TypeTag::Int)).unwrap();
    assert_eq!(kinds(&graph), vec![IssueKind::MissingRequiredInput]);

    let defaulted = NodeSchema::new(
        vec![required("in", TypeTag::Int).with_default(serde_json::json!(0))],
        vec![output("out", TypeTag::Int)],
    );
    graph.update_node_schema(&sink, defaulted).unwrap();
    assert!(kinds(&graph).is_empty(), "a default satisfies the requirement");
}

#[test]
fn optional_and_defaulted_inputs_need_no_edge() {
    let mut graph = GraphModel::new();
    add(
        &mut graph,
        NodeSchema::new(
            vec![
                input("opt", TypeTag::Int),
                required("dflt", TypeTag::Int).with_default(serde_json::json!(3)),
            ],
            vec![],
        ),
    );
    assert!(kinds(&graph).is_empty());
}

#[test]
fn schema_replacement_keeps_edges_and_flags_them() {
    let mut graph = GraphModel::new();
    let src = add(&mut graph, source_schema(TypeTag::Int));
    let sink = add(&mut graph, pass_schema(TypeTag::Int));
    let edge = link(&mut graph, &src, &sink);

    graph
        .update_node_schema(&sink, NodeSchema::new(vec![input("other", TypeTag::Int)], vec![]))
        .unwrap();

    assert!(graph.edge(&edge).is_some(), "Edge must survive the schema change");
    let report = validate::validate_graph(&graph);
    assert_eq!(report.len(), 1, "{:?}", report);
    assert_eq!(report[0].kind, IssueKind::DanglingEdge);
    assert_eq!(report[0].node_id.as_deref(), Some(sink.as_str()));
}

#[test]
fn new_nodes_get_distinct_ids_and_type_labels() {
    let mut graph = GraphModel::new();
    let a = graph.add_node(NodeTypeTag::Output, NodeSchema::empty());
    let b = graph.add_node(NodeTypeTag::Output, NodeSchema::empty());
    assert_ne!(a, b);
    assert_eq!(graph.node(&a).unwrap().label, capabilities(NodeTypeTag::Output).default_label);
}

#[test]
fn ids_are_not_reused_after_removal() {
    let mut graph = GraphModel::new();
    let a = add(&mut graph, NodeSchema::empty());
    graph.remove_node(&a).unwrap();
    let b = add(&mut graph, NodeSchema::empty());
    assert_ne!(a, b);
}

#[test]
fn binding_a_value_node_is_refused() {
    let mut graph = GraphModel::new();
    let v = graph.add_node(NodeTypeTag::Value, NodeSchema::empty());
    let err = graph.bind_reference(&v, Some("1".into())).unwrap_err();
    assert!(matches!(err, GraphError::NotReferenceBacked { .. }), "got {err:?}");
}
