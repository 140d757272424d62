//! Depth-bounded sub-graph extraction around a root resource.

use crate::graph::Graph;
use crate::node::Node;
use log::debug;
use std::collections::HashSet;

impl Graph {
    /// Collects every statement reachable from `root` within `max_hops` edges.
    ///
    /// Expansion is breadth-first. Step `k` adds all statements whose subject
    /// is in frontier `k-1` (frontier 0 being the root), and the resource
    /// objects added at step `k` form frontier `k`. Literals are never
    /// expanded. A node already expanded at an earlier step is not expanded
    /// again, which leaves the result unchanged and bounds the work on cyclic
    /// data. `max_hops == 0` yields an empty graph.
    pub fn extract_subgraph(&self, root: &Node, max_hops: usize) -> Graph {
        let mut result = Graph::new();
        let mut expanded: HashSet<&Node> = HashSet::new();
        let mut frontier: Vec<&Node> = vec![root];

        for hop in 1..=max_hops {
            let mut next: Vec<&Node> = Vec::new();
            for node in frontier {
                if node.is_literal() || !expanded.insert(node) {
                    continue;
                }
                for statement in self.statements_for_pattern(Some(node), None, None) {
                    result.insert(statement.clone());
                    if statement.object().is_resource() {
                        next.push(statement.object());
                    }
                }
            }
            debug!(
                "hop {}: {} statements, frontier of {}",
                hop,
                result.len(),
                next.len()
            );
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
        result
    }
}
