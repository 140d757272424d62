//! In-memory statement store with subject, predicate and object indexes.
//!
//! Statements live in insertion-ordered slots. Each index maps a term to the
//! ordered set of slot ids that reference it in that position, so a pattern
//! lookup walks only the smallest candidate set and still yields statements in
//! insertion order. Deleting a statement tombstones its slot; slots are
//! compacted once tombstones outnumber live statements.
//!
//! Iterators returned by [`Graph`] borrow it immutably, so the store cannot be
//! mutated while an iteration is open. Collect the matches first when the
//! result drives a mutation.

use crate::node::{Node, Statement};
use oxigraph::model::NamedNode;
use std::collections::{btree_set, BTreeSet, HashMap, HashSet};
use std::hash::Hash;

const COMPACT_MIN_TOMBSTONES: usize = 1024;

/// A triple pattern; `None` positions are wildcards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pattern {
    pub subject: Option<Node>,
    pub predicate: Option<NamedNode>,
    pub object: Option<Node>,
}

impl Pattern {
    pub fn new(subject: Option<Node>, predicate: Option<NamedNode>, object: Option<Node>) -> Self {
        Pattern {
            subject,
            predicate,
            object,
        }
    }

    /// The all-wildcard pattern.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_subject(mut self, subject: impl Into<Node>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_predicate(mut self, predicate: impl Into<NamedNode>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    pub fn with_object(mut self, object: impl Into<Node>) -> Self {
        self.object = Some(object.into());
        self
    }

    pub fn matches(&self, statement: &Statement) -> bool {
        self.subject.as_ref().map_or(true, |s| s == statement.subject())
            && self
                .predicate
                .as_ref()
                .map_or(true, |p| p == statement.predicate())
            && self.object.as_ref().map_or(true, |o| o == statement.object())
    }
}

impl From<&Statement> for Pattern {
    fn from(statement: &Statement) -> Self {
        Pattern::new(
            Some(statement.subject().clone()),
            Some(statement.predicate().clone()),
            Some(statement.object().clone()),
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    slots: Vec<Option<Statement>>,
    positions: HashMap<Statement, usize>,
    by_subject: HashMap<Node, BTreeSet<usize>>,
    by_predicate: HashMap<NamedNode, BTreeSet<usize>>,
    by_object: HashMap<Node, BTreeSet<usize>>,
    tombstones: usize,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, statement: &Statement) -> bool {
        self.positions.contains_key(statement)
    }

    /// Adds the statement. Inserting a statement that is already present is a no-op.
    pub fn insert(&mut self, statement: Statement) {
        if self.positions.contains_key(&statement) {
            return;
        }
        let id = self.slots.len();
        self.by_subject
            .entry(statement.subject().clone())
            .or_default()
            .insert(id);
        self.by_predicate
            .entry(statement.predicate().clone())
            .or_default()
            .insert(id);
        self.by_object
            .entry(statement.object().clone())
            .or_default()
            .insert(id);
        self.positions.insert(statement.clone(), id);
        self.slots.push(Some(statement));
    }

    /// Removes the statement. Deleting an absent statement is a no-op.
    pub fn delete(&mut self, statement: &Statement) {
        let Some(id) = self.positions.remove(statement) else {
            return;
        };
        unindex(&mut self.by_subject, statement.subject(), id);
        unindex(&mut self.by_predicate, statement.predicate(), id);
        unindex(&mut self.by_object, statement.object(), id);
        self.slots[id] = None;
        self.tombstones += 1;
        if self.tombstones >= COMPACT_MIN_TOMBSTONES && self.tombstones > self.positions.len() {
            self.compact();
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.positions.clear();
        self.by_subject.clear();
        self.by_predicate.clear();
        self.by_object.clear();
        self.tombstones = 0;
    }

    /// All statements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Statement> + '_ {
        self.slots.iter().flatten()
    }

    /// Statements matching the fixed positions, in insertion order.
    ///
    /// The lookup starts from the index of the fixed position with the fewest
    /// statements; with all three positions unbound this is a full scan.
    pub fn statements_for_pattern(
        &self,
        subject: Option<&Node>,
        predicate: Option<&NamedNode>,
        object: Option<&Node>,
    ) -> Matches<'_> {
        self.matching(Pattern::new(
            subject.cloned(),
            predicate.cloned(),
            object.cloned(),
        ))
    }

    pub fn matching(&self, pattern: Pattern) -> Matches<'_> {
        Matches {
            graph: self,
            candidates: self.candidates(&pattern),
            pattern,
        }
    }

    /// Distinct subjects, in order of first appearance.
    pub fn subjects(&self) -> Vec<Node> {
        let mut seen = HashSet::new();
        self.iter()
            .map(|st| st.subject())
            .filter(|s| seen.insert(*s))
            .cloned()
            .collect()
    }

    fn candidates(&self, pattern: &Pattern) -> Candidates<'_> {
        let lookups = [
            pattern.subject.as_ref().map(|s| self.by_subject.get(s)),
            pattern.predicate.as_ref().map(|p| self.by_predicate.get(p)),
            pattern.object.as_ref().map(|o| self.by_object.get(o)),
        ];
        let mut best: Option<&BTreeSet<usize>> = None;
        for lookup in lookups.into_iter().flatten() {
            match lookup {
                // a bound term that no statement uses in that position
                None => return Candidates::Empty,
                Some(ids) => {
                    if best.map_or(true, |b| ids.len() < b.len()) {
                        best = Some(ids);
                    }
                }
            }
        }
        match best {
            Some(ids) => Candidates::Indexed(ids.iter()),
            None => Candidates::Scan(self.slots.iter()),
        }
    }

    fn compact(&mut self) {
        let live: Vec<Statement> = self.slots.drain(..).flatten().collect();
        self.clear();
        self.extend(live);
    }
}

fn unindex<K: Hash + Eq>(index: &mut HashMap<K, BTreeSet<usize>>, key: &K, id: usize) {
    if let Some(ids) = index.get_mut(key) {
        ids.remove(&id);
        if ids.is_empty() {
            index.remove(key);
        }
    }
}

impl PartialEq for Graph {
    /// Graphs are equal when they hold the same statements, regardless of order.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|st| other.contains(st))
    }
}

impl Eq for Graph {}

impl Extend<Statement> for Graph {
    fn extend<T: IntoIterator<Item = Statement>>(&mut self, iter: T) {
        for statement in iter {
            self.insert(statement);
        }
    }
}

impl FromIterator<Statement> for Graph {
    fn from_iter<T: IntoIterator<Item = Statement>>(iter: T) -> Self {
        let mut graph = Graph::new();
        graph.extend(iter);
        graph
    }
}

enum Candidates<'a> {
    Empty,
    Indexed(btree_set::Iter<'a, usize>),
    Scan(std::slice::Iter<'a, Option<Statement>>),
}

/// Lazy iterator over the statements matching a [`Pattern`].
pub struct Matches<'a> {
    graph: &'a Graph,
    candidates: Candidates<'a>,
    pattern: Pattern,
}

impl<'a> Iterator for Matches<'a> {
    type Item = &'a Statement;

    fn next(&mut self) -> Option<Self::Item> {
        let graph = self.graph;
        loop {
            let statement = match &mut self.candidates {
                Candidates::Empty => return None,
                Candidates::Indexed(ids) => {
                    let id = ids.next()?;
                    match graph.slots[*id].as_ref() {
                        Some(st) => st,
                        None => continue,
                    }
                }
                Candidates::Scan(slots) => match slots.next()? {
                    Some(st) => st,
                    None => continue,
                },
            };
            if self.pattern.matches(statement) {
                return Some(statement);
            }
        }
    }
}
