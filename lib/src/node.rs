//! Node and statement model of the exploration engine.
//!
//! A [`Node`] is a closed sum over the three kinds of RDF terms: IRIs, blank
//! nodes and literals. The payloads are the `oxigraph::model` term types so that
//! the codec boundary can hand terms over without re-validating them. Equality
//! and hashing are structural: two nodes are equal when they are the same
//! variant with the same fields.

use crate::errors::StatementError;
use anyhow::{anyhow, Result};
use oxigraph::model::{
    BlankNode, Literal, NamedNode, NamedNodeRef, NamedOrBlankNode, Term, Triple,
};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Iri(NamedNode),
    Blank(BlankNode),
    Literal(Literal),
}

impl Node {
    /// Parses and validates an IRI.
    pub fn iri(iri: impl Into<String>) -> Result<Self> {
        let iri = iri.into();
        NamedNode::new(iri.as_str())
            .map(Node::Iri)
            .map_err(|e| anyhow!("invalid IRI '{}': {}", iri, e))
    }

    /// Builds a blank node with the given identifier.
    pub fn blank(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        BlankNode::new(id.as_str())
            .map(Node::Blank)
            .map_err(|e| anyhow!("invalid blank node id '{}': {}", id, e))
    }

    /// A plain `xsd:string` literal.
    pub fn literal(value: impl Into<String>) -> Self {
        Node::Literal(Literal::new_simple_literal(value))
    }

    pub fn lang_literal(value: impl Into<String>, language: impl Into<String>) -> Result<Self> {
        let language = language.into();
        Literal::new_language_tagged_literal(value, language.as_str())
            .map(Node::Literal)
            .map_err(|e| anyhow!("invalid language tag '{}': {}", language, e))
    }

    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<NamedNode>) -> Self {
        Node::Literal(Literal::new_typed_literal(value, datatype))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Node::Literal(_))
    }

    /// IRIs and blank nodes are resources: they can be subjects and can be expanded.
    pub fn is_resource(&self) -> bool {
        !self.is_literal()
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Node::Blank(_))
    }

    pub fn as_iri(&self) -> Option<NamedNodeRef<'_>> {
        match self {
            Node::Iri(n) => Some(n.as_ref()),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Node::Literal(l) => Some(l),
            _ => None,
        }
    }

    /// The IRI string, blank node id or literal value, without any decoration.
    pub fn lexical_form(&self) -> &str {
        match self {
            Node::Iri(n) => n.as_str(),
            Node::Blank(b) => b.as_str(),
            Node::Literal(l) => l.value(),
        }
    }

    /// The part of an IRI after the last `#`, `/` or `:`; other nodes return
    /// their lexical form.
    pub fn local_name(&self) -> &str {
        match self {
            Node::Iri(n) => local_name(n.as_str()),
            _ => self.lexical_form(),
        }
    }
}

pub(crate) fn local_name(iri: &str) -> &str {
    match iri.rfind(|c: char| c == '#' || c == '/' || c == ':') {
        Some(idx) if idx + 1 < iri.len() => &iri[idx + 1..],
        _ => iri,
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Iri(n) => fmt::Display::fmt(n, f),
            Node::Blank(b) => fmt::Display::fmt(b, f),
            Node::Literal(l) => fmt::Display::fmt(l, f),
        }
    }
}

impl From<NamedNode> for Node {
    fn from(node: NamedNode) -> Self {
        Node::Iri(node)
    }
}

impl From<NamedNodeRef<'_>> for Node {
    fn from(node: NamedNodeRef<'_>) -> Self {
        Node::Iri(node.into_owned())
    }
}

impl From<BlankNode> for Node {
    fn from(node: BlankNode) -> Self {
        Node::Blank(node)
    }
}

impl From<Literal> for Node {
    fn from(literal: Literal) -> Self {
        Node::Literal(literal)
    }
}

impl From<NamedOrBlankNode> for Node {
    fn from(node: NamedOrBlankNode) -> Self {
        match node {
            NamedOrBlankNode::NamedNode(n) => Node::Iri(n),
            NamedOrBlankNode::BlankNode(b) => Node::Blank(b),
        }
    }
}

impl TryFrom<Term> for Node {
    type Error = StatementError;

    fn try_from(term: Term) -> Result<Self, Self::Error> {
        #[allow(unreachable_patterns)]
        match term {
            Term::NamedNode(n) => Ok(Node::Iri(n)),
            Term::BlankNode(b) => Ok(Node::Blank(b)),
            Term::Literal(l) => Ok(Node::Literal(l)),
            other => Err(StatementError::UnsupportedTerm(other.to_string())),
        }
    }
}

impl From<Node> for Term {
    fn from(node: Node) -> Self {
        match node {
            Node::Iri(n) => Term::NamedNode(n),
            Node::Blank(b) => Term::BlankNode(b),
            Node::Literal(l) => Term::Literal(l),
        }
    }
}

/// An ordered (subject, predicate, object) triple.
///
/// The subject is always an IRI or a blank node; [`Statement::new`] is the only
/// way to build one and rejects literal subjects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Statement {
    subject: Node,
    predicate: NamedNode,
    object: Node,
}

impl Statement {
    pub fn new(
        subject: impl Into<Node>,
        predicate: impl Into<NamedNode>,
        object: impl Into<Node>,
    ) -> Result<Self, StatementError> {
        let subject = subject.into();
        if let Node::Literal(l) = &subject {
            return Err(StatementError::LiteralSubject(l.to_string()));
        }
        Ok(Statement {
            subject,
            predicate: predicate.into(),
            object: object.into(),
        })
    }

    pub fn subject(&self) -> &Node {
        &self.subject
    }

    pub fn predicate(&self) -> &NamedNode {
        &self.predicate
    }

    pub fn object(&self) -> &Node {
        &self.object
    }

    pub fn to_triple(&self) -> Triple {
        let subject: NamedOrBlankNode = match &self.subject {
            Node::Iri(n) => n.clone().into(),
            Node::Blank(b) => b.clone().into(),
            Node::Literal(_) => unreachable!("statement subjects are never literals"),
        };
        Triple::new(subject, self.predicate.clone(), self.object.clone())
    }
}

impl TryFrom<Triple> for Statement {
    type Error = StatementError;

    fn try_from(triple: Triple) -> Result<Self, Self::Error> {
        let object = Node::try_from(triple.object)?;
        Statement::new(Node::from(triple.subject), triple.predicate, object)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{TYPE, XSD_DATE};

    #[test]
    fn test_literal_subject_is_rejected() {
        let err = Statement::new(Node::literal("x"), TYPE, Node::literal("y")).unwrap_err();
        assert!(matches!(err, StatementError::LiteralSubject(_)));
    }

    #[test]
    fn test_structural_equality() {
        let a = Node::typed_literal("2015-08-13", XSD_DATE);
        let b = Node::typed_literal("2015-08-13", XSD_DATE);
        let c = Node::literal("2015-08-13");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(
            Node::lang_literal("Plzeň", "cs").unwrap(),
            Node::lang_literal("Plzeň", "en").unwrap()
        );
    }

    #[test]
    fn test_local_name() {
        let hash = Node::iri("http://mre.zcu.cz/ontology/dasta.owl#Patient").unwrap();
        let slash = Node::iri("http://mre.zcu.cz/id/e334d344").unwrap();
        assert_eq!(hash.local_name(), "Patient");
        assert_eq!(slash.local_name(), "e334d344");
        assert_eq!(Node::literal("a/b").local_name(), "a/b");
    }

    #[test]
    fn test_triple_conversion() {
        let st = Statement::new(
            Node::iri("http://example.org/a").unwrap(),
            TYPE,
            Node::blank("b0").unwrap(),
        )
        .unwrap();
        let back = Statement::try_from(st.to_triple()).unwrap();
        assert_eq!(st, back);
        assert!(st.to_string().starts_with("<http://example.org/a>"));
    }
}
