//! The editable dataflow graph.
//!
//! `GraphModel` owns every node and edge. All structural changes go through its
//! methods; other components only ever see `&GraphModel`.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use super::types::*;
use crate::error::{CatalogError, EntityKind, GraphError, RejectionReason};
use crate::schema::capabilities::capabilities;
use crate::validate::connection::{can_connect, can_restore};

/// What a schema resolution was started for. Produced by
/// [`GraphModel::bind_reference`] and handed back with the result.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionTicket {
    pub node_id: NodeId,
    pub type_tag: NodeTypeTag,
    pub reference: Option<ExternalId>,
    pub config: NodeConfig,
    pub generation: u64,
}

/// A finished schema lookup, successful or not.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub ticket: ResolutionTicket,
    pub outcome: Result<NodeSchema, CatalogError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// The schema replaced the node's previous one.
    Applied,
    /// The node was rebound or removed after the lookup started.
    Stale,
    /// The lookup failed; the node keeps its last-known schema.
    Failed(CatalogError),
}

/// A removed node together with the edges that went with it.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedNode {
    pub node: Node,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Default)]
pub struct GraphModel {
    /// Insertion sequence -> node; iteration order is insertion order.
    nodes: BTreeMap<u64, Node>,
    index: HashMap<NodeId, u64>,
    edges: Vec<Edge>,
    next_seq: u64,
    next_node_number: u64,
    next_edge_number: u64,
    used_node_ids: HashSet<NodeId>,
    used_edge_ids: HashSet<EdgeId>,
}

impl GraphModel {
    pub fn new() -> Self {
        GraphModel::default()
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).and_then(|seq| self.nodes.get(seq))
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn incoming<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.target_node == node_id)
    }

    pub fn outgoing<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.source_node == node_id)
    }

    /// The edge feeding a given input port, if any.
    pub fn edge_into(&self, node_id: &str, port_id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.targets(node_id, port_id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // -------------------------------------------------------------------------
    // Node mutations
    // -------------------------------------------------------------------------

    pub fn add_node(&mut self, type_tag: NodeTypeTag, initial_schema: NodeSchema) -> NodeId {
        let id = self.fresh_node_id(type_tag);
        let node = Node {
            id: id.clone(),
            type_tag,
            label: capabilities(type_tag).default_label.to_string(),
            bound_reference: None,
            schema: initial_schema,
            config: NodeConfig::new(),
            position: Position::default(),
            generation: 0,
        };
        self.push_node(node);
        debug!(node_id = %id, node_type = %type_tag, "node added");
        id
    }

    /// Insert a fully formed node under its own id (used by import).
    pub fn insert_node(&mut self, node: Node) -> Result<(), GraphError> {
        if !self.used_node_ids.insert(node.id.clone()) {
            return Err(GraphError::DuplicateId {
                kind: EntityKind::Node,
                id: node.id,
            });
        }
        debug!(node_id = %node.id, node_type = %node.type_tag, "node inserted");
        self.push_node(node);
        Ok(())
    }

    /// Remove a node and all edges incident to it in one step.
    pub fn remove_node(&mut self, id: &str) -> Result<RemovedNode, GraphError> {
        let seq = self
            .index
            .remove(id)
            .ok_or_else(|| GraphError::node_not_found(id))?;
        let node = self
            .nodes
            .remove(&seq)
            .ok_or_else(|| GraphError::node_not_found(id))?;

        let (removed, kept): (Vec<Edge>, Vec<Edge>) =
            std::mem::take(&mut self.edges).into_iter().partition(|e| e.touches(id));
        self.edges = kept;

        debug!(node_id = %id, edges_removed = removed.len(), "node removed");
        Ok(RemovedNode {
            node,
            edges: removed,
        })
    }

    /// Replace a node's schema wholesale. Edges whose ports disappear are
    /// kept and reported as dangling by the validation report.
    pub fn update_node_schema(&mut self, id: &str, schema: NodeSchema) -> Result<(), GraphError> {
        let node = self.node_mut(id)?;
        node.schema = schema;
        debug!(
            node_id = %id,
            inputs = node.schema.inputs.len(),
            outputs = node.schema.outputs.len(),
            "node schema replaced"
        );
        Ok(())
    }

    pub fn update_node_config(&mut self, id: &str, config: NodeConfig) -> Result<(), GraphError> {
        self.node_mut(id)?.config = config;
        debug!(node_id = %id, "node config updated");
        Ok(())
    }

    pub fn set_node_label(&mut self, id: &str, label: impl Into<String>) -> Result<(), GraphError> {
        self.node_mut(id)?.label = label.into();
        Ok(())
    }

    pub fn set_node_position(&mut self, id: &str, position: Position) -> Result<(), GraphError> {
        self.node_mut(id)?.position = position;
        Ok(())
    }

    /// Point a reference-backed node at a new catalog entry (or none).
    ///
    /// Advances the node's generation, which makes every resolution already
    /// in flight for it stale.
    pub fn bind_reference(
        &mut self,
        id: &str,
        reference: Option<ExternalId>,
    ) -> Result<ResolutionTicket, GraphError> {
        let node = self.node_mut(id)?;
        if capabilities(node.type_tag).reference_key.is_none() {
            return Err(GraphError::NotReferenceBacked {
                id: node.id.clone(),
                tag: node.type_tag,
            });
        }
        node.bound_reference = reference;
        node.generation += 1;
        debug!(
            node_id = %id,
            reference = ?node.bound_reference,
            generation = node.generation,
            "reference bound"
        );
        Ok(ResolutionTicket {
            node_id: node.id.clone(),
            type_tag: node.type_tag,
            reference: node.bound_reference.clone(),
            config: node.config.clone(),
            generation: node.generation,
        })
    }

    /// Apply a finished resolution if it is still current for its node.
    pub fn apply_resolution(&mut self, resolution: Resolution) -> ApplyOutcome {
        let Resolution { ticket, outcome } = resolution;
        let current = self.node(&ticket.node_id).map(|n| n.generation);
        if current != Some(ticket.generation) {
            debug!(
                node_id = %ticket.node_id,
                generation = ticket.generation,
                current = ?current,
                "stale resolution discarded"
            );
            return ApplyOutcome::Stale;
        }

        match outcome {
            Ok(schema) => match self.update_node_schema(&ticket.node_id, schema) {
                Ok(()) => ApplyOutcome::Applied,
                Err(_) => ApplyOutcome::Stale,
            },
            Err(e) => ApplyOutcome::Failed(e),
        }
    }

    // -------------------------------------------------------------------------
    // Edge mutations
    // -------------------------------------------------------------------------

    /// Add an edge if the connection validator accepts it. A rejection leaves
    /// the graph exactly as it was.
    pub fn propose_edge(&mut self, candidate: EdgeCandidate) -> Result<EdgeId, RejectionReason> {
        can_connect(&candidate, self)?;
        let id = self.fresh_edge_id();
        Ok(self.push_edge(id, candidate))
    }

    /// Bring back a stored edge, keeping its id when it is still free.
    ///
    /// Unlike [`propose_edge`](Self::propose_edge), an edge whose port is
    /// missing from the current schema is kept; the report flags it as
    /// dangling until the port reappears.
    pub fn restore_edge(&mut self, id: &str, candidate: EdgeCandidate) -> Result<EdgeId, RejectionReason> {
        can_restore(&candidate, self)?;
        let id = if self.used_edge_ids.insert(id.to_string()) {
            id.to_string()
        } else {
            self.fresh_edge_id()
        };
        Ok(self.push_edge(id, candidate))
    }

    pub fn remove_edge(&mut self, id: &str) -> Result<Edge, GraphError> {
        let pos = self
            .edges
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| GraphError::edge_not_found(id))?;
        let edge = self.edges.remove(pos);
        debug!(edge_id = %id, "edge removed");
        Ok(edge)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn node_mut(&mut self, id: &str) -> Result<&mut Node, GraphError> {
        self.index
            .get(id)
            .and_then(|seq| self.nodes.get_mut(seq))
            .ok_or_else(|| GraphError::node_not_found(id))
    }

    fn push_node(&mut self, node: Node) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(node.id.clone(), seq);
        self.nodes.insert(seq, node);
    }

    fn push_edge(&mut self, id: EdgeId, candidate: EdgeCandidate) -> EdgeId {
        let edge = Edge::from_candidate(id.clone(), candidate);
        debug!(
            edge_id = %id,
            source = %edge.source_node,
            target = %edge.target_node,
            "edge added"
        );
        self.edges.push(edge);
        id
    }

    fn fresh_node_id(&mut self, type_tag: NodeTypeTag) -> NodeId {
        loop {
            self.next_node_number += 1;
            let id = format!("{}-{}", type_tag, self.next_node_number);
            if self.used_node_ids.insert(id.clone()) {
                return id;
            }
        }
    }

    fn fresh_edge_id(&mut self) -> EdgeId {
        loop {
            self.next_edge_number += 1;
            let id = format!("edge-{}", self.next_edge_number);
            if self.used_edge_ids.insert(id.clone()) {
                return id;
            }
        }
    }
}
