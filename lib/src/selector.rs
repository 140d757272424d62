//! Pattern selection with caller-supplied statement filters.

use crate::graph::Graph;
use crate::node::{Node, Statement};
use oxigraph::model::NamedNode;

/// Decides whether a statement that matched a pattern is kept.
///
/// Any `Fn(&Statement) -> bool` closure is a filter.
pub trait StatementFilter {
    fn accept(&self, statement: &Statement) -> bool;

    fn and<F: StatementFilter>(self, other: F) -> And<Self, F>
    where
        Self: Sized,
    {
        And(self, other)
    }

    fn not(self) -> Not<Self>
    where
        Self: Sized,
    {
        Not(self)
    }
}

impl<F> StatementFilter for F
where
    F: Fn(&Statement) -> bool,
{
    fn accept(&self, statement: &Statement) -> bool {
        self(statement)
    }
}

/// Keeps everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl StatementFilter for AcceptAll {
    fn accept(&self, _statement: &Statement) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy)]
pub struct And<A, B>(A, B);

impl<A: StatementFilter, B: StatementFilter> StatementFilter for And<A, B> {
    fn accept(&self, statement: &Statement) -> bool {
        self.0.accept(statement) && self.1.accept(statement)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Not<A>(A);

impl<A: StatementFilter> StatementFilter for Not<A> {
    fn accept(&self, statement: &Statement) -> bool {
        !self.0.accept(statement)
    }
}

/// Case-insensitive substring test over the object's lexical form.
#[derive(Debug, Clone)]
pub struct ObjectContains {
    needle: String,
}

impl ObjectContains {
    pub fn new(needle: &str) -> Self {
        ObjectContains {
            needle: needle.to_lowercase(),
        }
    }
}

impl StatementFilter for ObjectContains {
    fn accept(&self, statement: &Statement) -> bool {
        statement
            .object()
            .lexical_form()
            .to_lowercase()
            .contains(&self.needle)
    }
}

/// Keeps statements whose object does *not* contain the substring, ignoring case.
#[derive(Debug, Clone)]
pub struct ObjectExcludes(Not<ObjectContains>);

impl ObjectExcludes {
    pub fn new(needle: &str) -> Self {
        ObjectExcludes(Not(ObjectContains::new(needle)))
    }
}

impl StatementFilter for ObjectExcludes {
    fn accept(&self, statement: &Statement) -> bool {
        self.0.accept(statement)
    }
}

/// Keeps literal objects carrying the given language tag (compared case-insensitively).
#[derive(Debug, Clone)]
pub struct LiteralLanguage {
    language: String,
}

impl LiteralLanguage {
    pub fn new(language: &str) -> Self {
        LiteralLanguage {
            language: language.to_ascii_lowercase(),
        }
    }
}

impl StatementFilter for LiteralLanguage {
    fn accept(&self, statement: &Statement) -> bool {
        statement
            .object()
            .as_literal()
            .and_then(|l| l.language())
            .is_some_and(|lang| lang.eq_ignore_ascii_case(&self.language))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectIsLiteral;

impl StatementFilter for ObjectIsLiteral {
    fn accept(&self, statement: &Statement) -> bool {
        statement.object().is_literal()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectIsResource;

impl StatementFilter for ObjectIsResource {
    fn accept(&self, statement: &Statement) -> bool {
        statement.object().is_resource()
    }
}

impl Graph {
    /// Statements matching the pattern that the filter accepts, in insertion order.
    pub fn select<'a, F>(
        &'a self,
        subject: Option<&Node>,
        predicate: Option<&NamedNode>,
        object: Option<&Node>,
        filter: F,
    ) -> impl Iterator<Item = &'a Statement> + 'a
    where
        F: StatementFilter + 'a,
    {
        self.statements_for_pattern(subject, predicate, object)
            .filter(move |st| filter.accept(st))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const HAS_ADDRESS: &str = "http://example.org/hasAddress";

    fn addresses() -> Graph {
        let p = NamedNode::new(HAS_ADDRESS).unwrap();
        ["Klatovská 12, Plzeň", "Husova 3, PLZEŇ", "Vinohradská 5, Praha"]
            .iter()
            .enumerate()
            .map(|(i, addr)| {
                Statement::new(
                    Node::iri(format!("http://example.org/p{i}")).unwrap(),
                    p.clone(),
                    Node::literal(*addr),
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_exclude_is_unicode_case_insensitive() {
        let g = addresses();
        let p = NamedNode::new(HAS_ADDRESS).unwrap();
        let kept: Vec<&str> = g
            .select(None, Some(&p), None, ObjectExcludes::new("plzeň"))
            .map(|st| st.object().lexical_form())
            .collect();
        assert_eq!(kept, vec!["Vinohradská 5, Praha"]);
    }

    #[test]
    fn test_closure_and_combinators() {
        let g = addresses();
        let starts_with_k = |st: &Statement| st.object().lexical_form().starts_with('K');
        let hits: Vec<_> = g
            .select(None, None, None, ObjectContains::new("plzeň").and(starts_with_k.not()))
            .collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].object().lexical_form(), "Husova 3, PLZEŇ");
        assert_eq!(g.select(None, None, None, AcceptAll).count(), 3);
    }

    #[test]
    fn test_select_is_lazy() {
        let g = addresses();
        let calls = Cell::new(0);
        let counting = |_: &Statement| {
            calls.set(calls.get() + 1);
            true
        };
        let mut selected = g.select(None, None, None, counting);
        assert_eq!(calls.get(), 0);
        assert!(selected.next().is_some());
        assert_eq!(calls.get(), 1);
        drop(selected);
        assert_eq!(g.len(), 3);
    }

    #[test]
    fn test_language_and_kind_filters() {
        let s = Node::iri("http://example.org/prop").unwrap();
        let label = crate::consts::LABEL;
        let g: Graph = vec![
            Statement::new(s.clone(), label, Node::lang_literal("has therapy", "en").unwrap()),
            Statement::new(s.clone(), label, Node::lang_literal("má terapii", "cs").unwrap()),
            Statement::new(s.clone(), label, Node::iri("http://example.org/x").unwrap()),
        ]
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
        .into_iter()
        .collect();
        let cs: Vec<_> = g.select(Some(&s), None, None, LiteralLanguage::new("CS")).collect();
        assert_eq!(cs.len(), 1);
        assert_eq!(g.select(None, None, None, ObjectIsLiteral).count(), 2);
        assert_eq!(g.select(None, None, None, ObjectIsResource).count(), 1);
    }
}
