//! Import/export of the stored workflow graph and execution requests.

pub mod graph;
pub mod types;

pub use graph::ExecutionGraph;
pub use types::*;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{ImportError, RejectionReason};
use crate::model::graph::GraphModel;
use crate::model::types::*;
use crate::schema::capabilities::capabilities;
use crate::validate::find_cycle;

/// A stored edge that could not be re-established on import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportWarning {
    pub edge_id: EdgeId,
    pub reason: RejectionReason,
}

#[derive(Debug)]
pub struct Imported {
    pub graph: GraphModel,
    /// Edges dropped because the validator refused them.
    pub warnings: Vec<ImportWarning>,
    /// Bound nodes stored without a schema; they need a catalog lookup.
    pub unresolved: Vec<NodeId>,
}

/// Deserialize a stored graph JSON string.
pub fn parse(json: &str) -> Result<PersistedGraph, Vec<ImportError>> {
    serde_json::from_str::<PersistedGraph>(json).map_err(|e| {
        vec![ImportError::malformed(format!(
            "Failed to parse workflow graph JSON: {}",
            e
        ))]
    })
}

/// Parse JSON and rebuild the graph in one step.
pub fn import_json(json: &str) -> Result<Imported, Vec<ImportError>> {
    let persisted = parse(json)?;
    import(&persisted)
}

/// Rebuild a `GraphModel` from its stored form.
///
/// Nodes keep their ids. Edges are re-checked before they are restored:
/// missing endpoints, self-loops, occupied inputs and type mismatches drop the
/// edge with a warning. An edge whose port is absent from the node's current
/// schema is kept and shows up as dangling in the report; for a bound node
/// stored without a schema the port usually returns once the schema resolves.
pub fn import(persisted: &PersistedGraph) -> Result<Imported, Vec<ImportError>> {
    let mut graph = GraphModel::new();
    let mut errors = Vec::new();
    let mut unresolved = Vec::new();

    for stored in &persisted.nodes {
        match node_from_persisted(stored) {
            Ok((node, needs_schema)) => {
                let id = node.id.clone();
                if graph.insert_node(node).is_err() {
                    errors.push(ImportError::duplicate_node(&id));
                } else if needs_schema {
                    unresolved.push(id);
                }
            }
            Err(e) => errors.push(e),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let mut warnings = Vec::new();
    for edge in &persisted.edges {
        let (Some(source_port), Some(target_port)) = (&edge.source_handle, &edge.target_handle) else {
            warnings.push(ImportWarning {
                edge_id: edge.id.clone(),
                reason: RejectionReason::PortMissing,
            });
            continue;
        };
        let candidate = EdgeCandidate::new(&edge.source, source_port, &edge.target, target_port);
        if let Err(reason) = graph.restore_edge(&edge.id, candidate) {
            warn!(edge_id = %edge.id, %reason, "stored edge dropped on import");
            warnings.push(ImportWarning {
                edge_id: edge.id.clone(),
                reason,
            });
        }
    }

    info!(
        nodes = graph.len(),
        edges = graph.edges().len(),
        dropped = warnings.len(),
        "graph imported"
    );
    Ok(Imported {
        graph,
        warnings,
        unresolved,
    })
}

fn parse_node_type(s: &str) -> Option<NodeTypeTag> {
    NodeTypeTag::ALL.into_iter().find(|t| t.as_str() == s)
}

/// Returns the node and whether it is bound but has no stored schema.
fn node_from_persisted(stored: &PersistedNode) -> Result<(Node, bool), ImportError> {
    let tag = parse_node_type(&stored.node_type).ok_or_else(|| {
        ImportError::invalid_node(
            "P003",
            format!("Unknown node type '{}'", stored.node_type),
            &stored.id,
        )
    })?;
    let caps = capabilities(tag);

    let mut config = stored.data.clone();
    let label = match config.remove("label") {
        Some(Value::String(s)) => s,
        _ => caps.default_label.to_string(),
    };

    let bound_reference = match caps.reference_key {
        Some(key) => match config.remove(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(other) => {
                return Err(ImportError::invalid_node(
                    "P005",
                    format!("Invalid {} '{}'", key, other),
                    &stored.id,
                ));
            }
        },
        None => None,
    };

    let stored_schema = match config.remove("schema") {
        None | Some(Value::Null) => None,
        Some(value) => Some(serde_json::from_value::<NodeSchema>(value).map_err(|e| {
            ImportError::invalid_node("P004", format!("Invalid node schema: {}", e), &stored.id)
        })?),
    };
    let needs_schema = stored_schema.is_none() && bound_reference.is_some();
    let schema = stored_schema.unwrap_or_else(|| (caps.default_schema)(&config));

    Ok((
        Node {
            id: stored.id.clone(),
            type_tag: tag,
            label,
            bound_reference,
            schema,
            config,
            position: stored.position,
            generation: 0,
        },
        needs_schema,
    ))
}

/// Produce the stored form of `graph`.
pub fn export(graph: &GraphModel) -> PersistedGraph {
    let nodes = graph.nodes().map(node_to_persisted).collect();
    let edges = graph
        .edges()
        .iter()
        .map(|e| PersistedEdge {
            id: e.id.clone(),
            source: e.source_node.clone(),
            target: e.target_node.clone(),
            source_handle: Some(e.source_port.clone()),
            target_handle: Some(e.target_port.clone()),
        })
        .collect();
    PersistedGraph { nodes, edges }
}

fn node_to_persisted(node: &Node) -> PersistedNode {
    let mut data = node.config.clone();
    data.insert("label".into(), Value::String(node.label.clone()));
    if let (Some(key), Some(reference)) = (capabilities(node.type_tag).reference_key, &node.bound_reference) {
        data.insert(key.into(), Value::String(reference.clone()));
    }
    data.insert(
        "schema".into(),
        serde_json::to_value(&node.schema).unwrap_or(Value::Null),
    );
    PersistedNode {
        id: node.id.clone(),
        node_type: node.type_tag.as_str().to_string(),
        position: node.position,
        data,
    }
}

/// Assemble the request handed to the execution service.
///
/// Fails with the nodes of a cycle when the graph has no execution order.
pub fn execution_request(
    graph: &GraphModel,
    external: &PortValues,
) -> Result<ExecutionRequest, Vec<NodeId>> {
    let execution_order = ExecutionGraph::build(graph)
        .topo_order()
        .map_err(|node| find_cycle(graph).unwrap_or_else(|| vec![node]))?;

    let mut input_params = PortValues::new();
    for node in graph.nodes() {
        for input in &node.schema.inputs {
            if graph.edge_into(&node.id, &input.id).is_some() {
                continue;
            }
            let supplied = external.get(&node.id).and_then(|ports| ports.get(&input.id));
            if let Some(value) = supplied.or(input.default_value.as_ref()) {
                input_params
                    .entry(node.id.clone())
                    .or_default()
                    .insert(input.id.clone(), value.clone());
            }
        }
    }

    Ok(ExecutionRequest {
        graph: export(graph),
        execution_order,
        input_params,
    })
}
