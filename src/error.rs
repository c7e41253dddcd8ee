//! Error types shared by the graph model, the schema registry and import.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::model::types::{ExternalId, NodeId, NodeTypeTag};
use crate::types::TypeTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Node,
    Edge,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Node => write!(f, "Node"),
            EntityKind::Edge => write!(f, "Edge"),
        }
    }
}

/// Misuse of the graph API. Callers must surface these, never swallow them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("{kind} id '{id}' is already in use")]
    DuplicateId { kind: EntityKind, id: String },

    #[error("Node '{id}' of type '{tag}' has no external reference to bind")]
    NotReferenceBacked { id: NodeId, tag: NodeTypeTag },
}

impl GraphError {
    pub fn node_not_found(id: impl Into<String>) -> Self {
        GraphError::NotFound {
            kind: EntityKind::Node,
            id: id.into(),
        }
    }

    pub fn edge_not_found(id: impl Into<String>) -> Self {
        GraphError::NotFound {
            kind: EntityKind::Edge,
            id: id.into(),
        }
    }
}

/// Why a proposed connection was refused. The message is what the editor
/// shows in its transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", content = "types")]
pub enum RejectionReason {
    #[error("Source or target node does not exist")]
    EndpointMissing,

    #[error("Source or target port does not exist")]
    PortMissing,

    #[error("Cannot connect node to itself")]
    SelfLoop,

    #[error("This input is already connected")]
    InputAlreadyConnected,

    #[error("Type mismatch: {0} cannot connect to {1}")]
    TypeMismatch(TypeTag, TypeTag),
}

impl RejectionReason {
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::EndpointMissing => "EndpointMissing",
            RejectionReason::PortMissing => "PortMissing",
            RejectionReason::SelfLoop => "SelfLoop",
            RejectionReason::InputAlreadyConnected => "InputAlreadyConnected",
            RejectionReason::TypeMismatch(..) => "TypeMismatch",
        }
    }
}

/// Failure of an external catalog lookup. Scoped to the node that asked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Reference '{0}' not found in catalog")]
    NotFound(ExternalId),

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    #[error("Catalog returned an invalid schema: {0}")]
    InvalidSchema(String),
}

/// Coded diagnostic produced while importing a persisted graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportError {
    pub code: &'static str,
    pub message: String,
    pub node_id: Option<String>,
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node_id {
            Some(id) => write!(f, "[Import:{}] {} (node '{}')", self.code, self.message, id),
            None => write!(f, "[Import:{}] {}", self.code, self.message),
        }
    }
}

impl std::error::Error for ImportError {}

impl ImportError {
    pub fn malformed(message: impl Into<String>) -> Self {
        ImportError {
            code: "P001",
            message: message.into(),
            node_id: None,
        }
    }

    pub fn duplicate_node(node_id: impl Into<String>) -> Self {
        let node_id = node_id.into();
        ImportError {
            code: "P002",
            message: format!("Duplicate node id '{}'", node_id),
            node_id: Some(node_id),
        }
    }

    pub fn invalid_node(code: &'static str, message: impl Into<String>, node_id: &str) -> Self {
        ImportError {
            code,
            message: message.into(),
            node_id: Some(node_id.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_messages_match_editor_notices() {
        assert_eq!(RejectionReason::SelfLoop.to_string(), "Cannot connect node to itself");
        assert_eq!(
            RejectionReason::TypeMismatch(TypeTag::Float, TypeTag::Int).to_string(),
            "Type mismatch: float cannot connect to int"
        );
    }

    #[test]
    fn import_error_display_includes_node() {
        let e = ImportError::duplicate_node("table-1");
        assert_eq!(e.to_string(), "[Import:P002] Duplicate node id 'table-1' (node 'table-1')");
    }
}
