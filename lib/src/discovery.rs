//! Type and value discovery over a [`Graph`].
//!
//! Every lookup here reports all values of a property. A subject with several
//! `rdf:type` values is discoverable through each of them, and asking for
//! "the" value of a property fails when there are several instead of picking
//! one.

use crate::errors::ValueLookupError;
use crate::graph::Graph;
use crate::node::Node;
use log::debug;
use oxigraph::model::NamedNode;
use std::collections::HashSet;

/// Resources grouped under one value of a classifying property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeGroup {
    pub type_node: Node,
    pub resources: Vec<Node>,
}

impl Graph {
    /// Distinct objects of `predicate`, in first-seen order.
    pub fn distinct_objects_of_predicate(&self, predicate: &NamedNode) -> Vec<Node> {
        let mut seen = HashSet::new();
        self.statements_for_pattern(None, Some(predicate), None)
            .map(|st| st.object())
            .filter(|o| seen.insert(*o))
            .cloned()
            .collect()
    }

    /// Subjects `s` with a statement `(s, predicate, type_node)`, in insertion order.
    pub fn resources_of_type(&self, predicate: &NamedNode, type_node: &Node) -> Vec<Node> {
        let mut seen = HashSet::new();
        self.statements_for_pattern(None, Some(predicate), Some(type_node))
            .map(|st| st.subject())
            .filter(|s| seen.insert(*s))
            .cloned()
            .collect()
    }

    /// Distinct subjects having at least one value for `predicate`.
    pub fn resources_with_property(&self, predicate: &NamedNode) -> Vec<Node> {
        let mut seen = HashSet::new();
        self.statements_for_pattern(None, Some(predicate), None)
            .map(|st| st.subject())
            .filter(|s| seen.insert(*s))
            .cloned()
            .collect()
    }

    /// All values of `predicate` on `subject`, in insertion order.
    pub fn objects_of<'a>(
        &'a self,
        subject: &Node,
        predicate: &NamedNode,
    ) -> impl Iterator<Item = &'a Node> + 'a {
        self.statements_for_pattern(Some(subject), Some(predicate), None)
            .map(|st| st.object())
    }

    /// The one value of `predicate` on `subject`.
    ///
    /// Fails with [`ValueLookupError::Missing`] when there is none and with
    /// [`ValueLookupError::Ambiguous`], carrying every value, when there are several.
    pub fn single_object(
        &self,
        subject: &Node,
        predicate: &NamedNode,
    ) -> Result<&Node, ValueLookupError> {
        let mut values = self.objects_of(subject, predicate);
        let Some(first) = values.next() else {
            return Err(ValueLookupError::Missing {
                subject: subject.to_string(),
                predicate: predicate.to_string(),
            });
        };
        if values.next().is_none() {
            return Ok(first);
        }
        Err(ValueLookupError::Ambiguous {
            subject: subject.to_string(),
            predicate: predicate.to_string(),
            values: self.objects_of(subject, predicate).cloned().collect(),
        })
    }

    /// Some value of `predicate` on `subject`.
    ///
    /// Which value is returned when there are several is unspecified; callers
    /// that care should use [`Graph::objects_of`] or [`Graph::single_object`].
    pub fn any_object(&self, subject: &Node, predicate: &NamedNode) -> Option<&Node> {
        self.objects_of(subject, predicate).next()
    }

    /// Groups resources by every value they have for `predicate`.
    ///
    /// Groups come in first-seen order of the type value; a resource appears in
    /// one group per distinct value it carries.
    pub fn type_inventory(&self, predicate: &NamedNode) -> Vec<TypeGroup> {
        let groups: Vec<TypeGroup> = self
            .distinct_objects_of_predicate(predicate)
            .into_iter()
            .map(|type_node| {
                let resources = self.resources_of_type(predicate, &type_node);
                TypeGroup {
                    type_node,
                    resources,
                }
            })
            .collect();
        debug!("Found {} distinct values of {}", groups.len(), predicate);
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TYPE;
    use crate::node::Statement;

    fn ex(s: &str) -> Node {
        Node::iri(format!("http://example.org/{s}")).unwrap()
    }

    fn typed_graph() -> Graph {
        let mut g = Graph::new();
        g.insert(Statement::new(ex("r"), TYPE, ex("A")).unwrap());
        g.insert(Statement::new(ex("r"), TYPE, ex("B")).unwrap());
        g.insert(Statement::new(ex("q"), TYPE, ex("A")).unwrap());
        g
    }

    #[test]
    fn test_resource_is_found_through_every_type() {
        let g = typed_graph();
        let ty = TYPE.into_owned();
        assert_eq!(g.distinct_objects_of_predicate(&ty), vec![ex("A"), ex("B")]);
        assert_eq!(g.resources_of_type(&ty, &ex("A")), vec![ex("r"), ex("q")]);
        assert_eq!(g.resources_of_type(&ty, &ex("B")), vec![ex("r")]);
    }

    #[test]
    fn test_first_value_per_subject_misses_types() {
        // Looking at one arbitrary type per subject can lose a type entirely.
        let g = typed_graph();
        let ty = TYPE.into_owned();
        let one_per_subject: HashSet<Node> = g
            .resources_with_property(&ty)
            .iter()
            .filter_map(|s| g.any_object(s, &ty).cloned())
            .collect();
        let all: HashSet<Node> = g.distinct_objects_of_predicate(&ty).into_iter().collect();
        assert!(one_per_subject.len() < all.len());
    }

    #[test]
    fn test_single_object_reports_multiplicity() {
        let g = typed_graph();
        let ty = TYPE.into_owned();
        assert_eq!(g.single_object(&ex("q"), &ty), Ok(&ex("A")));
        match g.single_object(&ex("r"), &ty) {
            Err(ValueLookupError::Ambiguous { values, .. }) => {
                assert_eq!(values, vec![ex("A"), ex("B")])
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
        assert!(matches!(
            g.single_object(&ex("nobody"), &ty),
            Err(ValueLookupError::Missing { .. })
        ));
    }

    #[test]
    fn test_type_inventory() {
        let g = typed_graph();
        let inventory = g.type_inventory(&TYPE.into_owned());
        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory[0].type_node, ex("A"));
        assert_eq!(inventory[0].resources, vec![ex("r"), ex("q")]);
        assert_eq!(inventory[1].resources, vec![ex("r")]);
    }
}
