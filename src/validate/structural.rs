//! Whole-graph validation report (V001–V003).

use std::fmt;

use serde::Serialize;

use super::cycle::find_cycle;
use crate::model::graph::GraphModel;
use crate::model::types::{Node, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IssueKind {
    MissingRequiredInput,
    DanglingEdge,
    Cycle,
}

impl IssueKind {
    pub fn code(&self) -> &'static str {
        match self {
            IssueKind::MissingRequiredInput => "V001",
            IssueKind::DanglingEdge => "V002",
            IssueKind::Cycle => "V003",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub node_id: Option<NodeId>,
    pub kind: IssueKind,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node_id {
            Some(id) => write!(f, "[{}] {} (node '{}')", self.kind.code(), self.message, id),
            None => write!(f, "[{}] {}", self.kind.code(), self.message),
        }
    }
}

/// Build the report for `graph`.
///
/// Node-scoped issues come first, grouped by node in insertion order; the
/// untagged cycle issue, if any, comes last. An empty report means the graph
/// is ready to execute.
pub fn build_report(graph: &GraphModel) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for node in graph.nodes() {
        v001_required_inputs_connected(graph, node, &mut issues);
        v002_edges_reference_current_ports(graph, node, &mut issues);
    }
    v003_no_cycles(graph, &mut issues);

    issues
}

fn v001_required_inputs_connected(graph: &GraphModel, node: &Node, issues: &mut Vec<ValidationIssue>) {
    for input in node.schema.inputs.iter().filter(|p| p.needs_connection()) {
        if graph.edge_into(&node.id, &input.id).is_none() {
            issues.push(ValidationIssue {
                node_id: Some(node.id.clone()),
                kind: IssueKind::MissingRequiredInput,
                message: format!("Required input \"{}\" is not connected", input.label),
            });
        }
    }
}

/// Edges survive schema replacement; report the ones whose port on this node
/// no longer exists.
fn v002_edges_reference_current_ports(
    graph: &GraphModel,
    node: &Node,
    issues: &mut Vec<ValidationIssue>,
) {
    for edge in graph.edges() {
        if edge.source_node == node.id && node.schema.output(&edge.source_port).is_none() {
            issues.push(ValidationIssue {
                node_id: Some(node.id.clone()),
                kind: IssueKind::DanglingEdge,
                message: format!(
                    "Edge '{}' starts at output \"{}\", which no longer exists",
                    edge.id, edge.source_port
                ),
            });
        }
        if edge.target_node == node.id && node.schema.input(&edge.target_port).is_none() {
            issues.push(ValidationIssue {
                node_id: Some(node.id.clone()),
                kind: IssueKind::DanglingEdge,
                message: format!(
                    "Edge '{}' ends at input \"{}\", which no longer exists",
                    edge.id, edge.target_port
                ),
            });
        }
    }
}

fn v003_no_cycles(graph: &GraphModel, issues: &mut Vec<ValidationIssue>) {
    if let Some(path) = find_cycle(graph) {
        let mut shown = path.clone();
        if let Some(first) = path.first() {
            shown.push(first.clone());
        }
        issues.push(ValidationIssue {
            node_id: None,
            kind: IssueKind::Cycle,
            message: format!("Workflow contains a cycle: {}", shown.join(" -> ")),
        });
    }
}
