//! One interactive editing session over a workflow graph.
//!
//! The session is the only writer of its `GraphModel`. Every accepted mutation
//! recomputes the validation report before returning, so `report()` always
//! describes the current graph. Schema lookups run as tasks on a `JoinSet`;
//! their results are applied one at a time through `next_resolution`, and the
//! graph itself never crosses an await point.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::EditorConfig;
use crate::error::{CatalogError, GraphError, ImportError, RejectionReason};
use crate::model::graph::{ApplyOutcome, GraphModel, RemovedNode, Resolution};
use crate::model::types::*;
use crate::persist::{self, ExecutionRequest, ImportWarning, PersistedGraph, PortValues};
use crate::schema::capabilities::capabilities;
use crate::schema::{SchemaCatalog, SchemaRegistry};
use crate::validate::{self, ConfigIssue, ValidationIssue};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Validation issues must be confirmed before continuing")]
    NeedsConfirmation {
        issues: Vec<ValidationIssue>,
        config_issues: Vec<ConfigIssue>,
    },

    #[error("Workflow contains a cycle: {}", .0.join(" -> "))]
    Cyclic(Vec<NodeId>),
}

/// Short-lived message about a refused connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub reason: RejectionReason,
    pub message: String,
    pub expires_at: Instant,
}

/// What happened to one finished schema lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionEvent {
    pub node_id: NodeId,
    pub generation: u64,
    pub outcome: ApplyOutcome,
}

pub struct EditorSession {
    graph: GraphModel,
    registry: SchemaRegistry,
    config: EditorConfig,
    report: Vec<ValidationIssue>,
    pending: JoinSet<Resolution>,
    resolution_errors: HashMap<NodeId, CatalogError>,
    notice: Option<Notice>,
}

impl EditorSession {
    pub fn new(catalog: Arc<dyn SchemaCatalog>, config: EditorConfig) -> Self {
        EditorSession::with_graph(GraphModel::new(), catalog, config)
    }

    pub fn with_graph(graph: GraphModel, catalog: Arc<dyn SchemaCatalog>, config: EditorConfig) -> Self {
        let report = validate::validate_graph(&graph);
        EditorSession {
            graph,
            registry: SchemaRegistry::new(catalog),
            config,
            report,
            pending: JoinSet::new(),
            resolution_errors: HashMap::new(),
            notice: None,
        }
    }

    /// Open a stored graph. Bound nodes stored without a schema are queued
    /// for resolution, so this must run inside a Tokio runtime.
    pub fn open(
        persisted: &PersistedGraph,
        catalog: Arc<dyn SchemaCatalog>,
        config: EditorConfig,
    ) -> Result<(Self, Vec<ImportWarning>), Vec<ImportError>> {
        let imported = persist::import(persisted)?;
        let mut session = EditorSession::with_graph(imported.graph, catalog, config);
        for node_id in imported.unresolved {
            let reference = session
                .graph
                .node(&node_id)
                .and_then(|n| n.bound_reference.clone());
            if let Ok(ticket) = session.graph.bind_reference(&node_id, reference) {
                session.pending.spawn(session.registry.resolve_ticket(ticket));
            }
        }
        Ok((session, imported.warnings))
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Validation report for the current graph.
    pub fn report(&self) -> &[ValidationIssue] {
        &self.report
    }

    pub fn config_issues(&self) -> Vec<ConfigIssue> {
        validate::validate_configs(&self.graph)
    }

    /// Last schema lookup failure for a node, until it resolves or is rebound.
    pub fn resolution_error(&self, node_id: &str) -> Option<&CatalogError> {
        self.resolution_errors.get(node_id)
    }

    pub fn pending_resolutions(&self) -> usize {
        self.pending.len()
    }

    /// The current notice, unless it has expired by `now`.
    pub fn notice(&self, now: Instant) -> Option<&Notice> {
        self.notice.as_ref().filter(|n| now < n.expires_at)
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    pub fn add_node(&mut self, tag: NodeTypeTag) -> NodeId {
        let schema = self.registry.default_schema(tag, &NodeConfig::new());
        let id = self.graph.add_node(tag, schema);
        self.refresh();
        id
    }

    pub fn remove_node(&mut self, id: &str) -> Result<RemovedNode, GraphError> {
        let removed = self.graph.remove_node(id)?;
        self.resolution_errors.remove(id);
        self.refresh();
        Ok(removed)
    }

    /// Try to connect two ports. A refusal leaves the graph unchanged and
    /// raises a notice that expires after the configured time.
    pub fn connect(&mut self, candidate: EdgeCandidate, now: Instant) -> Result<EdgeId, RejectionReason> {
        match self.graph.propose_edge(candidate) {
            Ok(id) => {
                self.notice = None;
                self.refresh();
                Ok(id)
            }
            Err(reason) => {
                warn!(%reason, "connection refused");
                self.notice = Some(Notice {
                    reason,
                    message: reason.to_string(),
                    expires_at: now + self.config.notice_ttl(),
                });
                Err(reason)
            }
        }
    }

    pub fn disconnect(&mut self, edge_id: &str) -> Result<Edge, GraphError> {
        let edge = self.graph.remove_edge(edge_id)?;
        self.refresh();
        Ok(edge)
    }

    /// Replace a node's config. Types whose ports depend on their config
    /// (a value node's type) get their schema recomputed here.
    pub fn update_config(&mut self, id: &str, config: NodeConfig) -> Result<(), GraphError> {
        self.graph.update_node_config(id, config)?;
        let Some(node) = self.graph.node(id) else {
            return Err(GraphError::node_not_found(id));
        };
        if !capabilities(node.type_tag).is_reference_backed() {
            let schema = self.registry.default_schema(node.type_tag, &node.config);
            if schema != node.schema {
                self.graph.update_node_schema(id, schema)?;
            }
        }
        self.refresh();
        Ok(())
    }

    pub fn set_label(&mut self, id: &str, label: impl Into<String>) -> Result<(), GraphError> {
        self.graph.set_node_label(id, label)
    }

    pub fn move_node(&mut self, id: &str, position: Position) -> Result<(), GraphError> {
        self.graph.set_node_position(id, position)
    }

    /// Bind a node to a catalog entry and start resolving its schema.
    ///
    /// Unbinding applies the type's default schema immediately. Binding
    /// spawns the lookup, so this must run inside a Tokio runtime; the result
    /// lands via [`next_resolution`](Self::next_resolution). Returns the new
    /// generation.
    pub fn bind_reference(&mut self, id: &str, reference: Option<ExternalId>) -> Result<u64, GraphError> {
        let ticket = self.graph.bind_reference(id, reference)?;
        let generation = ticket.generation;
        self.resolution_errors.remove(id);

        if ticket.reference.is_none() {
            let schema = self.registry.default_schema(ticket.type_tag, &ticket.config);
            self.graph.update_node_schema(id, schema)?;
            self.refresh();
        } else {
            self.pending.spawn(self.registry.resolve_ticket(ticket));
        }
        Ok(generation)
    }

    /// Wait for the next schema lookup to finish and apply it if it is still
    /// current. Returns `None` once nothing is pending.
    pub async fn next_resolution(&mut self) -> Option<ResolutionEvent> {
        loop {
            match self.pending.join_next().await? {
                Ok(resolution) => return Some(self.apply(resolution)),
                Err(e) => warn!(error = %e, "schema resolution task did not complete"),
            }
        }
    }

    /// Apply every pending lookup as it finishes.
    pub async fn settle(&mut self) -> Vec<ResolutionEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_resolution().await {
            events.push(event);
        }
        events
    }

    fn apply(&mut self, resolution: Resolution) -> ResolutionEvent {
        let node_id = resolution.ticket.node_id.clone();
        let generation = resolution.ticket.generation;
        let outcome = self.graph.apply_resolution(resolution);

        match &outcome {
            ApplyOutcome::Applied => {
                self.resolution_errors.remove(&node_id);
                self.refresh();
            }
            ApplyOutcome::Failed(e) => {
                self.resolution_errors.insert(node_id.clone(), e.clone());
            }
            ApplyOutcome::Stale => {}
        }
        debug!(node_id = %node_id, generation, outcome = ?outcome, "resolution handled");

        ResolutionEvent {
            node_id,
            generation,
            outcome,
        }
    }

    fn refresh(&mut self) {
        self.report = validate::validate_graph(&self.graph);
    }

    // -------------------------------------------------------------------------
    // Save / execute gate
    // -------------------------------------------------------------------------

    fn check_gate(&self, confirmed: bool) -> Result<(), SessionError> {
        let config_issues = if self.config.confirm_config_issues {
            self.config_issues()
        } else {
            Vec::new()
        };
        if confirmed || (self.report.is_empty() && config_issues.is_empty()) {
            return Ok(());
        }
        Err(SessionError::NeedsConfirmation {
            issues: self.report.clone(),
            config_issues,
        })
    }

    /// Stored form of the graph. Outstanding issues need `confirmed`.
    pub fn prepare_save(&self, confirmed: bool) -> Result<PersistedGraph, SessionError> {
        self.check_gate(confirmed)?;
        Ok(persist::export(&self.graph))
    }

    /// Execution request for the graph. Outstanding issues need `confirmed`;
    /// a cyclic graph is refused either way.
    pub fn prepare_execution(
        &self,
        confirmed: bool,
        external: &PortValues,
    ) -> Result<ExecutionRequest, SessionError> {
        self.check_gate(confirmed)?;
        persist::execution_request(&self.graph, external).map_err(SessionError::Cyclic)
    }
}
