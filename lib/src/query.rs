//! Builders for the SPARQL text the remote client sends.
//!
//! Blank node labels only mean something inside the document that holds
//! them, so a blank node in a pattern is written as a variable (`?b0`, `?b1`,
//! ...) matching any node. The same blank node always maps to the same
//! variable within one query.

use crate::graph::Pattern;
use crate::node::Node;
use oxigraph::model::{BlankNode, NamedNode};
use std::collections::HashMap;
use std::fmt::Write;

/// A `CONSTRUCT` returning every edge chain of at most `hops` edges starting
/// at `root`.
///
/// The template lists the whole chain and the `WHERE` clause is a union of the
/// chains of length 1 to `hops`, so a partial chain still contributes its
/// edges. `hops == 0` yields a query with an empty result.
pub fn construct_query(root: &NamedNode, hops: usize) -> String {
    if hops == 0 {
        return "CONSTRUCT {} WHERE {}".to_string();
    }
    let edge = |k: usize| format!("{} ?p{} ?o{} .", node_var(k - 1), k, k);
    let template: Vec<String> = (1..=hops).map(edge).collect();
    let branches: Vec<String> = (1..=hops)
        .map(|len| {
            let chain: Vec<String> = (1..=len).map(edge).collect();
            format!("{{ {} }}", chain.join(" "))
        })
        .collect();
    format!(
        "CONSTRUCT {{ {} }} WHERE {{ {} FILTER (?root = {}) }}",
        template.join(" "),
        branches.join(" UNION "),
        root
    )
}

/// The two-hop neighbourhood of `root`.
pub fn construct_query_depth2(root: &NamedNode) -> String {
    construct_query(root, 2)
}

fn node_var(k: usize) -> String {
    if k == 0 {
        "?root".to_string()
    } else {
        format!("?o{}", k)
    }
}

/// Variables standing in for blank nodes, numbered by first appearance.
#[derive(Debug, Default)]
pub(crate) struct BlankVariables {
    names: HashMap<BlankNode, String>,
}

impl BlankVariables {
    /// Renders `node`, naming a new variable for a blank node seen for the first time.
    pub(crate) fn term(&mut self, node: &Node) -> String {
        match node {
            Node::Blank(blank) => {
                let next = self.names.len();
                self.names
                    .entry(blank.clone())
                    .or_insert_with(|| format!("?b{}", next))
                    .clone()
            }
            other => other.to_string(),
        }
    }

    /// Renders `node` without naming new variables; `None` for an unseen blank node.
    pub(crate) fn bound_term(&self, node: &Node) -> Option<String> {
        match node {
            Node::Blank(blank) => self.names.get(blank).cloned(),
            other => Some(other.to_string()),
        }
    }
}

fn triple_pattern(pattern: &Pattern) -> String {
    let mut blanks = BlankVariables::default();
    let subject = pattern
        .subject
        .as_ref()
        .map_or("?s".to_string(), |s| blanks.term(s));
    let predicate = pattern
        .predicate
        .as_ref()
        .map_or("?p".to_string(), |p| p.to_string());
    let object = pattern
        .object
        .as_ref()
        .map_or("?o".to_string(), |o| blanks.term(o));
    format!("{} {} {} .", subject, predicate, object)
}

/// A `SELECT` projecting the wildcard positions of `pattern` as `?s`, `?p` and `?o`.
pub fn select_query(pattern: &Pattern) -> String {
    let mut vars = String::new();
    for (unbound, var) in [
        (pattern.subject.is_none(), "?s"),
        (pattern.predicate.is_none(), "?p"),
        (pattern.object.is_none(), "?o"),
    ] {
        if unbound {
            let _ = write!(vars, "{} ", var);
        }
    }
    if vars.is_empty() {
        vars.push_str("* ");
    }
    format!("SELECT {}WHERE {{ {} }}", vars, triple_pattern(pattern))
}

/// A `CONSTRUCT` returning the statements matching `pattern`.
pub fn pattern_construct_query(pattern: &Pattern) -> String {
    let triple = triple_pattern(pattern);
    format!("CONSTRUCT {{ {} }} WHERE {{ {} }}", triple, triple)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TYPE;
    use crate::node::Node;
    use spargebra::Query;

    fn root() -> NamedNode {
        NamedNode::new("http://mre.zcu.cz/id/e334d344").unwrap()
    }

    #[test]
    fn test_depth2_shape() {
        let q = construct_query_depth2(&root());
        assert_eq!(
            q,
            "CONSTRUCT { ?root ?p1 ?o1 . ?o1 ?p2 ?o2 . } WHERE { { ?root ?p1 ?o1 . } UNION \
             { ?root ?p1 ?o1 . ?o1 ?p2 ?o2 . } FILTER (?root = <http://mre.zcu.cz/id/e334d344>) }"
        );
    }

    #[test]
    fn test_construct_queries_parse() {
        for hops in 0..5 {
            let q = construct_query(&root(), hops);
            assert!(matches!(Query::parse(&q, None), Ok(Query::Construct { .. })), "{}", q);
        }
    }

    #[test]
    fn test_select_query_projects_wildcards() {
        let pattern = Pattern::any().with_predicate(TYPE);
        let q = select_query(&pattern);
        assert_eq!(
            q,
            "SELECT ?s ?o WHERE { ?s <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> ?o . }"
        );
        assert!(Query::parse(&q, None).is_ok());

        let bound = Pattern::any()
            .with_subject(Node::Iri(root()))
            .with_predicate(TYPE)
            .with_object(Node::literal("x"));
        assert!(select_query(&bound).starts_with("SELECT * WHERE"));
        assert!(Query::parse(&pattern_construct_query(&bound), None).is_ok());
    }

    #[test]
    fn test_blank_nodes_become_variables() {
        let b0 = Node::blank("b0").unwrap();
        let q = pattern_construct_query(&Pattern::any().with_subject(b0.clone()));
        assert_eq!(q, "CONSTRUCT { ?b0 ?p ?o . } WHERE { ?b0 ?p ?o . }");
        assert!(matches!(Query::parse(&q, None), Ok(Query::Construct { .. })), "{}", q);

        // one node in both positions keeps one variable
        let looped = Pattern::any()
            .with_subject(b0.clone())
            .with_predicate(TYPE)
            .with_object(b0);
        let q = pattern_construct_query(&looped);
        assert!(q.contains("{ ?b0 <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> ?b0 . }"));
        assert!(Query::parse(&q, None).is_ok());

        let two = Pattern::any()
            .with_subject(Node::blank("x").unwrap())
            .with_object(Node::blank("y").unwrap());
        let q = select_query(&two);
        assert_eq!(q, "SELECT ?p WHERE { ?b0 ?p ?b1 . }");
        assert!(matches!(Query::parse(&q, None), Ok(Query::Select { .. })), "{}", q);
    }
}
