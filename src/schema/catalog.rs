//! The external catalog that knows the ports of tables and procedures.

use std::collections::HashMap;

use async_trait::async_trait;

use super::capabilities::capabilities;
use crate::error::CatalogError;
use crate::model::types::*;
use crate::types::TypeTag;

/// Source of node schemas. Implementations typically call the workflow
/// service (`/node-schema/{type}/{id}`); the editor only sees this trait.
#[async_trait]
pub trait SchemaCatalog: Send + Sync {
    /// Schema of a node type that is not bound to anything.
    fn default_schema(&self, tag: NodeTypeTag, config: &NodeConfig) -> NodeSchema {
        (capabilities(tag).default_schema)(config)
    }

    /// Schema of a node bound to `reference`. May take a network round trip.
    async fn bound_schema(
        &self,
        tag: NodeTypeTag,
        reference: &ExternalId,
    ) -> Result<NodeSchema, CatalogError>;
}

/// Catalog held in memory, keyed by node type and reference.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    schemas: HashMap<(NodeTypeTag, ExternalId), NodeSchema>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        StaticCatalog::default()
    }

    pub fn insert(&mut self, tag: NodeTypeTag, reference: impl Into<ExternalId>, schema: NodeSchema) {
        self.schemas.insert((tag, reference.into()), schema);
    }

    /// Register a schema in its wire form.
    pub fn insert_json(
        &mut self,
        tag: NodeTypeTag,
        reference: impl Into<ExternalId>,
        json: &str,
    ) -> Result<(), CatalogError> {
        let schema = serde_json::from_str::<NodeSchema>(json)
            .map_err(|e| CatalogError::InvalidSchema(e.to_string()))?;
        self.insert(tag, reference, schema);
        Ok(())
    }

    /// A table contributes a single `Table` output labelled with its name.
    pub fn with_table(mut self, reference: impl Into<ExternalId>, name: &str) -> Self {
        self.insert(
            NodeTypeTag::Table,
            reference,
            NodeSchema::new(vec![], vec![Port::new("output", name, TypeTag::Table)]),
        );
        self
    }

    pub fn with_procedure(mut self, reference: impl Into<ExternalId>, schema: NodeSchema) -> Self {
        self.insert(NodeTypeTag::Procedure, reference, schema);
        self
    }
}

#[async_trait]
impl SchemaCatalog for StaticCatalog {
    async fn bound_schema(
        &self,
        tag: NodeTypeTag,
        reference: &ExternalId,
    ) -> Result<NodeSchema, CatalogError> {
        self.schemas
            .get(&(tag, reference.clone()))
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(reference.clone()))
    }
}
