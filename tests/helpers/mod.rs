use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use tokio::sync::Notify;
use workflow_editor::error::CatalogError;
use workflow_editor::model::*;
use workflow_editor::schema::SchemaCatalog;
use workflow_editor::types::TypeTag;

// =============================================================================
// Logging
// =============================================================================

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness. Set `RUST_LOG` to see it.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// =============================================================================
// Schema builders
// =============================================================================

pub fn input(id: &str, data_type: TypeTag) -> Port {
    Port::new(id, id, data_type)
}

pub fn required(id: &str, data_type: TypeTag) -> Port {
    Port::new(id, id, data_type).required()
}

pub fn output(id: &str, data_type: TypeTag) -> Port {
    Port::new(id, id, data_type)
}

/// A node with no inputs and a single `out` port.
pub fn source_schema(data_type: TypeTag) -> NodeSchema {
    NodeSchema::new(vec![], vec![output("out", data_type)])
}

/// A node with one required `in` port and one `out` port of the same type.
pub fn pass_schema(data_type: TypeTag) -> NodeSchema {
    NodeSchema::new(vec![required("in", data_type)], vec![output("out", data_type)])
}

// =============================================================================
// Graph builders
// =============================================================================

/// Add a procedure node carrying `schema` directly, skipping the catalog.
pub fn add(graph: &mut GraphModel, schema: NodeSchema) -> NodeId {
    graph.add_node(NodeTypeTag::Procedure, schema)
}

pub fn candidate(source: &str, source_port: &str, target: &str, target_port: &str) -> EdgeCandidate {
    EdgeCandidate::new(source, source_port, target, target_port)
}

/// Connect `source.out` to `target.in`, panicking if the edge is refused.
pub fn link(graph: &mut GraphModel, source: &str, target: &str) -> EdgeId {
    graph
        .propose_edge(candidate(source, "out", target, "in"))
        .unwrap_or_else(|r| panic!("{} -> {} refused: {}", source, target, r))
}

/// A chain of `len` pass-through nodes behind one `Int` source, fully linked.
pub fn chain(len: usize) -> (GraphModel, Vec<NodeId>) {
    let mut graph = GraphModel::new();
    let mut ids = vec![add(&mut graph, source_schema(TypeTag::Int))];
    for _ in 0..len {
        let next = add(&mut graph, pass_schema(TypeTag::Int));
        link(&mut graph, ids.last().unwrap(), &next);
        ids.push(next);
    }
    (graph, ids)
}

// =============================================================================
// Catalogs
// =============================================================================

/// Catalog whose lookups block until the test opens their gate, so tests can
/// choose the order in which resolutions finish.
#[derive(Default)]
pub struct GatedCatalog {
    answers: Mutex<HashMap<ExternalId, Result<NodeSchema, CatalogError>>>,
    gates: Mutex<HashMap<ExternalId, Arc<Notify>>>,
}

impl GatedCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(GatedCatalog::default())
    }

    pub fn answer(&self, reference: &str, outcome: Result<NodeSchema, CatalogError>) {
        self.answers.lock().unwrap().insert(reference.into(), outcome);
    }

    /// Let the lookup for `reference` complete. May be called before the
    /// lookup starts.
    pub fn open(&self, reference: &str) {
        self.gate(reference).notify_one();
    }

    fn gate(&self, reference: &str) -> Arc<Notify> {
        self.gates
            .lock()
            .unwrap()
            .entry(reference.into())
            .or_default()
            .clone()
    }
}

#[async_trait]
impl SchemaCatalog for GatedCatalog {
    async fn bound_schema(
        &self,
        _tag: NodeTypeTag,
        reference: &ExternalId,
    ) -> Result<NodeSchema, CatalogError> {
        let gate = self.gate(reference);
        gate.notified().await;
        self.answers
            .lock()
            .unwrap()
            .get(reference)
            .cloned()
            .unwrap_or_else(|| Err(CatalogError::NotFound(reference.clone())))
    }
}
