//! Cycle-safe depth-first walk of the data hanging off a root resource.

use crate::graph::Graph;
use crate::namespace::Namespaces;
use crate::node::{Node, Statement};
use oxigraph::model::NamedNode;
use std::collections::HashSet;
use std::fmt::Write;

/// One line of a traversal: `node` reached through `predicate` at `depth`.
///
/// The root is the only entry without a predicate and sits at depth 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalEntry {
    pub depth: usize,
    pub predicate: Option<NamedNode>,
    pub node: Node,
}

struct Frame<'a> {
    depth: usize,
    children: Vec<&'a Statement>,
    next: usize,
}

impl Graph {
    /// Walks the graph depth-first from `root`.
    ///
    /// For each node, its literal values are listed first, then each resource
    /// value that has not been seen yet during this walk is listed and
    /// descended into before moving to the next one. Nodes are marked as seen
    /// when they are entered, so every resource appears at most once and the
    /// walk terminates on cyclic data.
    pub fn traverse(&self, root: &Node) -> Vec<TraversalEntry> {
        let mut entries = vec![TraversalEntry {
            depth: 0,
            predicate: None,
            node: root.clone(),
        }];
        let mut visited: HashSet<&Node> = HashSet::from([root]);
        let mut stack = vec![self.enter(root, 0, &mut entries)];

        while let Some(frame) = stack.last_mut() {
            let Some(statement) = frame.children.get(frame.next).copied() else {
                stack.pop();
                continue;
            };
            frame.next += 1;
            let child = statement.object();
            if !visited.insert(child) {
                continue;
            }
            let depth = frame.depth + 1;
            entries.push(TraversalEntry {
                depth,
                predicate: Some(statement.predicate().clone()),
                node: child.clone(),
            });
            let next = self.enter(child, depth, &mut entries);
            stack.push(next);
        }
        entries
    }

    /// Emits the literal values of `node` and returns a frame over its
    /// resource values.
    fn enter<'a>(&'a self, node: &Node, depth: usize, entries: &mut Vec<TraversalEntry>) -> Frame<'a> {
        let mut children = Vec::new();
        for statement in self.statements_for_pattern(Some(node), None, None) {
            if statement.object().is_literal() {
                entries.push(TraversalEntry {
                    depth: depth + 1,
                    predicate: Some(statement.predicate().clone()),
                    node: statement.object().clone(),
                });
            } else {
                children.push(statement);
            }
        }
        Frame {
            depth,
            children,
            next: 0,
        }
    }
}

/// Renders traversal entries as an indented hierarchy, two spaces per level.
///
/// Each line is `predicate value`, with IRIs shortened through `namespaces`.
pub fn render_hierarchy(entries: &[TraversalEntry], namespaces: &Namespaces) -> String {
    let mut out = String::new();
    for entry in entries {
        let indent = entry.depth * 2;
        let node = namespaces.display_name(&entry.node);
        let _ = match &entry.predicate {
            Some(p) => writeln!(
                out,
                "{:indent$}{} {}",
                "",
                namespaces.display_name(&Node::Iri(p.clone())),
                node,
                indent = indent
            ),
            None => writeln!(out, "{}", node),
        };
    }
    out
}
