//! Node schemas: per-type defaults, the external catalog and resolution.

pub mod capabilities;
pub mod catalog;
pub mod registry;

pub use capabilities::{NodeCapabilities, capabilities};
pub use catalog::{SchemaCatalog, StaticCatalog};
pub use registry::SchemaRegistry;
