//! Graph validation: edge acceptance, cycle search and the pre-save report.

pub mod connection;
pub mod cycle;
pub mod node_rules;
pub mod structural;

pub use connection::can_connect;
pub use cycle::{find_cycle, has_cycle};
pub use node_rules::ConfigIssue;
pub use structural::{IssueKind, ValidationIssue};

use crate::model::graph::GraphModel;

/// Validate the entire graph (required inputs, dangling edges, cycles).
pub fn validate_graph(graph: &GraphModel) -> Vec<ValidationIssue> {
    structural::build_report(graph)
}

/// Validate every node's configuration.
pub fn validate_configs(graph: &GraphModel) -> Vec<ConfigIssue> {
    node_rules::validate_node_configs(graph)
}
