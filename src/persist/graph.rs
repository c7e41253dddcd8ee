//! petgraph view of the editor graph, used to order execution.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::model::graph::GraphModel;
use crate::model::types::NodeId;

/// Node-level dependency graph; ports do not matter for ordering.
pub struct ExecutionGraph {
    pub graph: DiGraph<NodeId, ()>,
}

impl ExecutionGraph {
    pub fn build(model: &GraphModel) -> Self {
        let mut graph = DiGraph::new();
        let mut indices: HashMap<&str, NodeIndex> = HashMap::new();

        for node in model.nodes() {
            indices.insert(node.id.as_str(), graph.add_node(node.id.clone()));
        }

        for edge in model.edges() {
            if let (Some(&s), Some(&t)) = (
                indices.get(edge.source_node.as_str()),
                indices.get(edge.target_node.as_str()),
            ) {
                graph.add_edge(s, t, ());
            }
        }

        ExecutionGraph { graph }
    }

    /// Node ids with every edge's source before its target. On a cycle,
    /// returns the id of a node on it.
    pub fn topo_order(&self) -> Result<Vec<NodeId>, NodeId> {
        toposort(&self.graph, None)
            .map(|indices| indices.into_iter().map(|idx| self.graph[idx].clone()).collect())
            .map_err(|cycle| self.graph[cycle.node_id()].clone())
    }
}
