//! Wire types for the stored workflow graph.
//!
//! These mirror what the workflow service stores under `graph`:
//! `{ nodes: [{id, type, position, data}], edges: [{id, source, sourceHandle,
//! target, targetHandle}] }`. `data` is open-ended: label, type-specific
//! fields, the bound reference and the node's `schema`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::types::{NodeId, PortId, Position};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedGraph {
    #[serde(default)]
    pub nodes: Vec<PersistedNode>,
    #[serde(default)]
    pub edges: Vec<PersistedEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
}

/// Values keyed by node id, then input port id.
pub type PortValues = BTreeMap<NodeId, BTreeMap<PortId, Value>>;

/// What the execution service receives: the graph, the order to run it in
/// and a value for every input that no edge feeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    pub graph: PersistedGraph,
    pub execution_order: Vec<NodeId>,
    pub input_params: PortValues,
}
