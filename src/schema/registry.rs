//! Schema resolution for nodes, instant or via the catalog.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use super::capabilities::capabilities;
use super::catalog::SchemaCatalog;
use crate::error::CatalogError;
use crate::model::graph::{Resolution, ResolutionTicket};
use crate::model::types::*;

#[derive(Clone)]
pub struct SchemaRegistry {
    catalog: Arc<dyn SchemaCatalog>,
}

impl SchemaRegistry {
    pub fn new(catalog: Arc<dyn SchemaCatalog>) -> Self {
        SchemaRegistry { catalog }
    }

    /// The schema a fresh node of this type starts with.
    pub fn default_schema(&self, tag: NodeTypeTag, config: &NodeConfig) -> NodeSchema {
        self.catalog.default_schema(tag, config)
    }

    /// Resolve the schema for a node type and its bound reference.
    ///
    /// Only reference-backed types with a reference set reach the catalog;
    /// everything else completes without suspending.
    pub async fn resolve(
        &self,
        tag: NodeTypeTag,
        reference: Option<&ExternalId>,
        config: &NodeConfig,
    ) -> Result<NodeSchema, CatalogError> {
        match reference {
            Some(reference) if capabilities(tag).is_reference_backed() => {
                debug!(node_type = %tag, reference = %reference, "catalog lookup");
                let schema = self.catalog.bound_schema(tag, reference).await?;
                check_schema(&schema)?;
                Ok(schema)
            }
            _ => Ok(self.catalog.default_schema(tag, config)),
        }
    }

    /// Resolve on behalf of a ticket. The returned future owns everything it
    /// needs, so it can be spawned.
    pub fn resolve_ticket(
        &self,
        ticket: ResolutionTicket,
    ) -> impl Future<Output = Resolution> + Send + use<> {
        let registry = self.clone();
        async move {
            let outcome = registry
                .resolve(ticket.type_tag, ticket.reference.as_ref(), &ticket.config)
                .await;
            if let Err(e) = &outcome {
                warn!(
                    node_id = %ticket.node_id,
                    generation = ticket.generation,
                    error = %e,
                    "schema resolution failed"
                );
            }
            Resolution { ticket, outcome }
        }
    }
}

/// Port ids must be unique per side, or edges could not name them.
fn check_schema(schema: &NodeSchema) -> Result<(), CatalogError> {
    for (side, ports) in [("input", &schema.inputs), ("output", &schema.outputs)] {
        let mut seen = HashSet::new();
        for port in ports {
            if !seen.insert(port.id.as_str()) {
                return Err(CatalogError::InvalidSchema(format!(
                    "duplicate {} port '{}'",
                    side, port.id
                )));
            }
        }
    }
    Ok(())
}
