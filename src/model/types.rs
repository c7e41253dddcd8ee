//! Nodes, ports, schemas and edges of the dataflow graph.
//!
//! Field names follow the persisted workflow JSON (`sourceHandle`, `type`,
//! `default`, ...) so the same types serve the storage and catalog shapes.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::TypeTag;

pub type NodeId = String;
pub type EdgeId = String;
pub type PortId = String;
/// Id of a table, procedure or other catalog entry a node is bound to.
pub type ExternalId = String;
/// Type-specific node fields (`valueType`, `endpoint`, `action`, ...).
pub type NodeConfig = Map<String, Value>;

// =============================================================================
// NODE TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeTypeTag {
    Table,
    Procedure,
    Value,
    Api,
    Output,
}

impl NodeTypeTag {
    pub const ALL: [NodeTypeTag; 5] = [
        NodeTypeTag::Table,
        NodeTypeTag::Procedure,
        NodeTypeTag::Value,
        NodeTypeTag::Api,
        NodeTypeTag::Output,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeTypeTag::Table => "table",
            NodeTypeTag::Procedure => "procedure",
            NodeTypeTag::Value => "value",
            NodeTypeTag::Api => "api",
            NodeTypeTag::Output => "output",
        }
    }
}

impl fmt::Display for NodeTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// PORTS & SCHEMAS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: PortId,
    pub label: String,
    #[serde(rename = "type")]
    pub data_type: TypeTag,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// JSON `null` and a missing key both mean "no default".
    #[serde(default, rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Port {
    pub fn new(id: impl Into<PortId>, label: impl Into<String>, data_type: TypeTag) -> Self {
        Port {
            id: id.into(),
            label: label.into(),
            data_type,
            required: false,
            default_value: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// A required input with no default must be fed by an edge.
    pub fn needs_connection(&self) -> bool {
        self.required && self.default_value.is_none()
    }
}

/// Input and output ports of a node. Replaced wholesale, never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSchema {
    #[serde(default)]
    pub inputs: Vec<Port>,
    #[serde(default)]
    pub outputs: Vec<Port>,
}

impl NodeSchema {
    pub fn empty() -> Self {
        NodeSchema::default()
    }

    pub fn new(inputs: Vec<Port>, outputs: Vec<Port>) -> Self {
        NodeSchema { inputs, outputs }
    }

    pub fn input(&self, port_id: &str) -> Option<&Port> {
        self.inputs.iter().find(|p| p.id == port_id)
    }

    pub fn output(&self, port_id: &str) -> Option<&Port> {
        self.outputs.iter().find(|p| p.id == port_id)
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty()
    }
}

// =============================================================================
// NODES
// =============================================================================

/// Canvas coordinates, carried through for storage only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub type_tag: NodeTypeTag,
    pub label: String,
    pub bound_reference: Option<ExternalId>,
    pub schema: NodeSchema,
    pub config: NodeConfig,
    pub position: Position,
    /// Advanced on every rebind; a schema resolution only lands if its
    /// ticket still carries the current value.
    pub generation: u64,
}

// =============================================================================
// EDGES
// =============================================================================

/// A connection the user wants to make; becomes an [`Edge`] once accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeCandidate {
    #[serde(rename = "source")]
    pub source_node: NodeId,
    #[serde(rename = "sourceHandle")]
    pub source_port: PortId,
    #[serde(rename = "target")]
    pub target_node: NodeId,
    #[serde(rename = "targetHandle")]
    pub target_port: PortId,
}

impl EdgeCandidate {
    pub fn new(
        source_node: impl Into<NodeId>,
        source_port: impl Into<PortId>,
        target_node: impl Into<NodeId>,
        target_port: impl Into<PortId>,
    ) -> Self {
        EdgeCandidate {
            source_node: source_node.into(),
            source_port: source_port.into(),
            target_node: target_node.into(),
            target_port: target_port.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    #[serde(rename = "source")]
    pub source_node: NodeId,
    #[serde(rename = "sourceHandle")]
    pub source_port: PortId,
    #[serde(rename = "target")]
    pub target_node: NodeId,
    #[serde(rename = "targetHandle")]
    pub target_port: PortId,
}

impl Edge {
    pub fn from_candidate(id: EdgeId, candidate: EdgeCandidate) -> Self {
        Edge {
            id,
            source_node: candidate.source_node,
            source_port: candidate.source_port,
            target_node: candidate.target_node,
            target_port: candidate.target_port,
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source_node == node_id || self.target_node == node_id
    }

    pub fn targets(&self, node_id: &str, port_id: &str) -> bool {
        self.target_node == node_id && self.target_port == port_id
    }
}
