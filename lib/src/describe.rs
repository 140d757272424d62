//! Ontology property information: labels, comments, domain, range and types.

use crate::consts::{COMMENT, DOMAIN, LABEL, RANGE, TYPE};
use crate::graph::Graph;
use crate::namespace::Namespaces;
use crate::node::Node;
use oxigraph::model::{Literal, NamedNode};
use serde::Serialize;
use std::fmt::Write;

/// Everything an ontology says about one property. All values are kept; none
/// is collapsed to an arbitrary representative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyInfo {
    pub property: NamedNode,
    pub labels: Vec<Literal>,
    pub comments: Vec<Literal>,
    pub domains: Vec<Node>,
    pub ranges: Vec<Node>,
    pub types: Vec<Node>,
}

/// JSON shape of [`PropertyInfo`] used by the command line front end.
#[derive(Debug, Serialize)]
pub struct PropertySummary {
    pub property: String,
    pub labels: Vec<LabelSummary>,
    pub comments: Vec<LabelSummary>,
    pub domains: Vec<String>,
    pub ranges: Vec<String>,
    pub types: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LabelSummary {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl PropertyInfo {
    pub fn describe(graph: &Graph, property: &NamedNode) -> Self {
        let subject = Node::Iri(property.clone());
        let values = |predicate: NamedNode| -> Vec<Node> {
            graph.objects_of(&subject, &predicate).cloned().collect()
        };
        let literals = |predicate: NamedNode| -> Vec<Literal> {
            values(predicate)
                .into_iter()
                .filter_map(|n| match n {
                    Node::Literal(l) => Some(l),
                    _ => None,
                })
                .collect()
        };
        PropertyInfo {
            property: property.clone(),
            labels: literals(LABEL.into_owned()),
            comments: literals(COMMENT.into_owned()),
            domains: values(DOMAIN.into_owned()),
            ranges: values(RANGE.into_owned()),
            types: values(TYPE.into_owned()),
        }
    }

    /// Labels tagged with `language`, compared case-insensitively.
    pub fn labels_in<'a>(&'a self, language: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.labels
            .iter()
            .filter(move |l| l.language().is_some_and(|tag| tag.eq_ignore_ascii_case(language)))
            .map(|l| l.value())
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
            && self.comments.is_empty()
            && self.domains.is_empty()
            && self.ranges.is_empty()
            && self.types.is_empty()
    }

    pub fn summary(&self) -> PropertySummary {
        let strings = |nodes: &[Node]| -> Vec<String> {
            nodes.iter().map(|n| n.lexical_form().to_string()).collect()
        };
        let texts = |literals: &[Literal]| -> Vec<LabelSummary> {
            literals
                .iter()
                .map(|l| LabelSummary {
                    value: l.value().to_string(),
                    language: l.language().map(str::to_string),
                })
                .collect()
        };
        PropertySummary {
            property: self.property.as_str().to_string(),
            labels: texts(&self.labels),
            comments: texts(&self.comments),
            domains: strings(&self.domains),
            ranges: strings(&self.ranges),
            types: strings(&self.types),
        }
    }

    /// Multi-line human readable description.
    pub fn render(&self, namespaces: &Namespaces) -> String {
        let name = |n: &Node| namespaces.display_name(n);
        let join = |nodes: &[Node]| nodes.iter().map(name).collect::<Vec<_>>().join(", ");
        let mut out = String::new();
        let _ = writeln!(out, "{}", name(&Node::Iri(self.property.clone())));
        for label in &self.labels {
            match label.language() {
                Some(lang) => {
                    let _ = writeln!(out, "  label@{}: {}", lang, label.value());
                }
                None => {
                    let _ = writeln!(out, "  label: {}", label.value());
                }
            }
        }
        for comment in &self.comments {
            let _ = writeln!(out, "  comment: {}", comment.value());
        }
        let _ = writeln!(out, "  domain: {}", join(&self.domains));
        let _ = writeln!(out, "  range: {}", join(&self.ranges));
        let _ = writeln!(out, "  type: {}", join(&self.types));
        out
    }
}
