//! Directed cycle detection over the node graph.
//!
//! Ports are ignored: every edge is an arc from its source node to its target
//! node. The search is an iterative three-colour DFS, so graph depth is bounded
//! by heap, not by the call stack.

use std::collections::HashMap;

use crate::model::graph::GraphModel;
use crate::model::types::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Not visited yet.
    White,
    /// On the current DFS path.
    Gray,
    /// Fully explored.
    Black,
}

pub fn has_cycle(graph: &GraphModel) -> bool {
    find_cycle(graph).is_some()
}

/// Return the nodes of one directed cycle, in path order, if any exists.
pub fn find_cycle(graph: &GraphModel) -> Option<Vec<NodeId>> {
    let ids: Vec<&str> = graph.nodes().map(|n| n.id.as_str()).collect();
    let index: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    let mut adjacency = vec![Vec::new(); ids.len()];
    for edge in graph.edges() {
        if let (Some(&s), Some(&t)) = (
            index.get(edge.source_node.as_str()),
            index.get(edge.target_node.as_str()),
        ) {
            adjacency[s].push(t);
        }
    }

    find_cycle_in(&adjacency).map(|path| path.into_iter().map(|i| ids[i].to_string()).collect())
}

/// Cycle search on an adjacency list. O(V + E).
pub fn find_cycle_in(adjacency: &[Vec<usize>]) -> Option<Vec<usize>> {
    let mut color = vec![Color::White; adjacency.len()];
    // (vertex, index of the next arc to follow)
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..adjacency.len() {
        if color[root] != Color::White {
            continue;
        }
        color[root] = Color::Gray;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let v = frame.0;
            match adjacency[v].get(frame.1) {
                Some(&w) => {
                    frame.1 += 1;
                    match color[w] {
                        Color::White => {
                            color[w] = Color::Gray;
                            stack.push((w, 0));
                        }
                        // Back edge: w is on the current path.
                        Color::Gray => {
                            let start = stack.iter().position(|&(u, _)| u == w).unwrap_or(0);
                            return Some(stack[start..].iter().map(|&(u, _)| u).collect());
                        }
                        Color::Black => {}
                    }
                }
                None => {
                    color[v] = Color::Black;
                    stack.pop();
                }
            }
        }
    }

    None
}
