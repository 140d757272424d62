//! Prefix table used for display and serialization.
//!
//! Prefixes are presentation only: expanding and compacting never changes the
//! identity of a node.

use crate::consts::DEFAULT_PREFIXES;
use crate::node::Node;
use anyhow::{anyhow, Result};
use oxigraph::model::NamedNode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    // insertion ordered; a prefix appears at most once
    entries: Vec<(String, String)>,
}

impl Default for Namespaces {
    fn default() -> Self {
        Self::new()
    }
}

impl Namespaces {
    /// A table holding the rdf, rdfs, owl, xsd and dc prefixes.
    pub fn new() -> Self {
        let mut namespaces = Self::empty();
        for (prefix, iri) in DEFAULT_PREFIXES {
            namespaces.add_prefix(prefix, iri);
        }
        namespaces
    }

    pub fn empty() -> Self {
        Namespaces {
            entries: Vec::new(),
        }
    }

    /// Binds `prefix` to `namespace`, replacing any earlier binding of the prefix.
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        let prefix = prefix.into();
        let namespace = namespace.into();
        match self.entries.iter_mut().find(|(p, _)| *p == prefix) {
            Some(entry) => entry.1 = namespace,
            None => self.entries.push((prefix, namespace)),
        }
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    /// Expands `prefix:local` into a full IRI. Strings that are not a known
    /// prefixed name are taken as full IRIs.
    pub fn expand(&self, name: &str) -> Result<NamedNode> {
        let expanded = match name.split_once(':') {
            Some((prefix, local)) if !local.starts_with("//") => match self.get(prefix) {
                Some(ns) => format!("{ns}{local}"),
                None => name.to_string(),
            },
            _ => name.to_string(),
        };
        NamedNode::new(expanded.as_str()).map_err(|e| anyhow!("invalid IRI '{}': {}", name, e))
    }

    /// Shortens an IRI with the longest matching namespace, if any.
    pub fn compact(&self, iri: &str) -> Option<String> {
        self.entries
            .iter()
            .filter(|(_, ns)| iri.len() > ns.len() && iri.starts_with(ns.as_str()))
            .max_by_key(|(_, ns)| ns.len())
            .map(|(prefix, ns)| format!("{}:{}", prefix, &iri[ns.len()..]))
    }

    /// Short display form of a node: a prefixed name when a namespace
    /// matches, otherwise the IRI's local name. Literals keep their value.
    pub fn display_name(&self, node: &Node) -> String {
        match node {
            Node::Iri(n) => self
                .compact(n.as_str())
                .unwrap_or_else(|| node.local_name().to_string()),
            Node::Blank(b) => format!("_:{}", b.as_str()),
            Node::Literal(l) => l.value().to_string(),
        }
    }
}
