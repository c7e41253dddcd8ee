//! The graph data model and its mutation API.

pub mod graph;
pub mod types;

pub use graph::{ApplyOutcome, GraphModel, RemovedNode, Resolution, ResolutionTicket};
pub use types::*;
