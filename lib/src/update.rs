//! Guarded modifications: delete and insert statements when a condition holds.

use crate::errors::UpdateRenderError;
use crate::graph::{Graph, Pattern};
use crate::node::{Node, Statement};
use crate::query::BlankVariables;
use log::{debug, info};
use std::fmt::Write;

/// A modification applied only when every condition pattern has a match.
///
/// Deletions run before insertions, so a statement listed in both ends up
/// present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphUpdate {
    pub condition: Vec<Pattern>,
    pub delete: Vec<Statement>,
    pub insert: Vec<Statement>,
}

impl GraphUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn when(mut self, pattern: Pattern) -> Self {
        self.condition.push(pattern);
        self
    }

    pub fn deleting(mut self, statement: Statement) -> Self {
        self.delete.push(statement);
        self
    }

    pub fn inserting(mut self, statement: Statement) -> Self {
        self.insert.push(statement);
        self
    }

    /// Whether every condition pattern matches at least one statement.
    pub fn holds(&self, graph: &Graph) -> bool {
        self.condition
            .iter()
            .all(|pattern| graph.matching(pattern.clone()).next().is_some())
    }

    /// Applies the modification. Returns `false`, leaving the graph untouched,
    /// when the condition does not hold.
    pub fn apply(&self, graph: &mut Graph) -> bool {
        if !self.holds(graph) {
            debug!("update condition not met, graph left unchanged");
            return false;
        }
        for statement in &self.delete {
            graph.delete(statement);
        }
        graph.extend(self.insert.iter().cloned());
        info!(
            "Applied update: {} deleted, {} inserted",
            self.delete.len(),
            self.insert.len()
        );
        true
    }

    /// Renders the modification as a SPARQL 1.1 `DELETE/INSERT ... WHERE` request.
    ///
    /// Wildcard positions of the condition patterns become fresh variables and
    /// blank nodes become shared variables (`?b0`, ...), since a blank node
    /// label cannot name a node on the endpoint. A blank node used in a
    /// template must therefore appear in some condition pattern.
    pub fn to_sparql(&self) -> Result<String, UpdateRenderError> {
        let mut blanks = BlankVariables::default();
        let mut where_clause = String::new();
        for (i, pattern) in self.condition.iter().enumerate() {
            let subject = match &pattern.subject {
                Some(node) => blanks.term(node),
                None => format!("?s{}", i),
            };
            let predicate = match &pattern.predicate {
                Some(p) => p.to_string(),
                None => format!("?p{}", i),
            };
            let object = match &pattern.object {
                Some(node) => blanks.term(node),
                None => format!("?o{}", i),
            };
            let _ = writeln!(where_clause, "  {} {} {} .", subject, predicate, object);
        }

        let mut out = String::new();
        if !self.delete.is_empty() {
            out.push_str("DELETE {\n");
            write_template(&mut out, &self.delete, &blanks)?;
            out.push_str("}\n");
        }
        if !self.insert.is_empty() {
            out.push_str("INSERT {\n");
            write_template(&mut out, &self.insert, &blanks)?;
            out.push_str("}\n");
        }
        if self.delete.is_empty() && self.insert.is_empty() {
            out.push_str("INSERT {\n}\n");
        }
        out.push_str("WHERE {\n");
        out.push_str(&where_clause);
        out.push('}');
        Ok(out)
    }
}

fn write_template(
    out: &mut String,
    statements: &[Statement],
    blanks: &BlankVariables,
) -> Result<(), UpdateRenderError> {
    let term = |node: &Node| {
        blanks
            .bound_term(node)
            .ok_or_else(|| UpdateRenderError::UnboundBlankNode(node.to_string()))
    };
    for statement in statements {
        let _ = writeln!(
            out,
            "  {} {} {} .",
            term(statement.subject())?,
            statement.predicate(),
            term(statement.object())?
        );
    }
    Ok(())
}
