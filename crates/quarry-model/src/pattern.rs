//! Triple/quad patterns and basic graph patterns.

use serde::{Deserialize, Serialize};

use crate::term::Term;

/// A (subject, predicate, object) template, optionally pinned to a graph.
///
/// Positions may be variables/wildcards or concrete terms. A `None` graph
/// means the pattern ranges over any graph the source exposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TriplePattern {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<Term>,
}

impl TriplePattern {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph: None,
        }
    }

    pub fn in_graph(mut self, graph: Term) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Position-wise match of a candidate triple (AND across positions).
    pub fn matches(&self, subject: &Term, predicate: &Term, object: &Term) -> bool {
        self.subject.matches(subject)
            && self.predicate.matches(predicate)
            && self.object.matches(object)
    }

    /// The pattern's terms in (subject, predicate, object) order.
    pub fn positions(&self) -> [&Term; 3] {
        [&self.subject, &self.predicate, &self.object]
    }
}

/// A basic graph pattern: one query matching unit.
///
/// Declaration order is irrelevant to admission filtering; role search uses
/// it only as a deterministic tie-break.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bgp {
    patterns: Vec<TriplePattern>,
}

impl Bgp {
    pub fn new(patterns: Vec<TriplePattern>) -> Self {
        Self { patterns }
    }

    pub fn push(&mut self, pattern: TriplePattern) {
        self.patterns.push(pattern);
    }

    pub fn patterns(&self) -> &[TriplePattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Distinct identity-carrying terms in first-occurrence order.
    ///
    /// Wildcards are skipped: they carry no identity to book-keep against.
    /// The order (pattern declaration order, subject/predicate/object within
    /// a pattern, graph last) is the deterministic tie-break used by role
    /// search.
    pub fn distinct_terms(&self) -> Vec<&Term> {
        let mut seen: Vec<&Term> = Vec::new();
        for pattern in &self.patterns {
            let graph = pattern.graph.iter();
            for term in pattern.positions().into_iter().chain(graph) {
                if matches!(term, Term::Any) {
                    continue;
                }
                if !seen.contains(&term) {
                    seen.push(term);
                }
            }
        }
        seen
    }
}

impl FromIterator<TriplePattern> for Bgp {
    fn from_iter<I: IntoIterator<Item = TriplePattern>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
