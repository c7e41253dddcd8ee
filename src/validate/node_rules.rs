//! Per-node configuration validation.
//! SYNC NOTE: Codes here must track `NodeTypeTag` in `model/types.rs`.

use serde::Serialize;

use crate::model::graph::GraphModel;
use crate::model::types::{Node, NodeId, NodeTypeTag};
use crate::schema::capabilities::capabilities;

/// A problem in a node's own settings, independent of its connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigIssue {
    pub code: &'static str,
    pub node_id: NodeId,
    pub message: String,
}

fn code_for(tag: NodeTypeTag) -> &'static str {
    match tag {
        NodeTypeTag::Table => "N001",
        NodeTypeTag::Procedure => "N002",
        NodeTypeTag::Value => "N003",
        NodeTypeTag::Api => "N004",
        NodeTypeTag::Output => "N005",
    }
}

/// Validate a single node's config. Returns all issues found.
pub fn validate_node_config(node: &Node) -> Vec<ConfigIssue> {
    (capabilities(node.type_tag).validate_config)(node)
        .into_iter()
        .map(|message| ConfigIssue {
            code: code_for(node.type_tag),
            node_id: node.id.clone(),
            message,
        })
        .collect()
}

pub fn validate_node_configs(graph: &GraphModel) -> Vec<ConfigIssue> {
    graph.nodes().flat_map(validate_node_config).collect()
}
