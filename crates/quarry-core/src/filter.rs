//! Triple admission: the gate between producers and the sink.
//!
//! One filter is built per (BGP, source) binding and consulted once per
//! candidate statement as a producer streams the source. Admission is an
//! *existential* test against the pattern disjunction (AND across the
//! positions of one pattern, OR across patterns), not a conjunctive
//! evaluation; the real join still happens downstream. Over-admission only
//! costs performance; under-admission would silently drop data.
//!
//! The filter is total and side-effect-free: it never errors, keeps no
//! state, and is safe to call re-entrantly.

use quarry_model::{Bgp, Term};

/// Admission predicate for one source's triplification.
#[derive(Debug, Clone)]
pub struct TripleFilter {
    bgp: Bgp,
    /// The source's own graph identity; pattern graph terms, when concrete,
    /// must equal it.
    graph: Option<Term>,
}

impl TripleFilter {
    pub fn new(bgp: Bgp) -> Self {
        Self { bgp, graph: None }
    }

    /// Pin the filter to the source's graph identity.
    pub fn for_graph(bgp: Bgp, graph: Term) -> Self {
        Self {
            bgp,
            graph: Some(graph),
        }
    }

    pub fn bgp(&self) -> &Bgp {
        &self.bgp
    }

    /// Should a candidate statement be kept? O(|BGP|) comparisons.
    ///
    /// An empty BGP admits nothing: no pattern can possibly match.
    pub fn admit(&self, subject: &Term, predicate: &Term, object: &Term) -> bool {
        self.bgp.patterns().iter().any(|pattern| {
            pattern.matches(subject, predicate, object) && self.graph_admits(pattern.graph.as_ref())
        })
    }

    /// Quad variant: the candidate's graph must also satisfy the pattern's
    /// graph position.
    pub fn admit_quad(
        &self,
        subject: &Term,
        predicate: &Term,
        object: &Term,
        graph: &Term,
    ) -> bool {
        self.bgp.patterns().iter().any(|pattern| {
            pattern.matches(subject, predicate, object)
                && pattern.graph.as_ref().map_or(true, |g| g.matches(graph))
                && self.graph_admits(pattern.graph.as_ref())
        })
    }

    /// A pattern's graph term, if present, must be unbound or equal to the
    /// source's graph identity. Patterns without a graph term range over
    /// the whole source.
    fn graph_admits(&self, pattern_graph: Option<&Term>) -> bool {
        let Some(pattern_graph) = pattern_graph else {
            return true;
        };
        if pattern_graph.is_unbound() {
            return true;
        }
        match &self.graph {
            Some(source_graph) => pattern_graph == source_graph,
            // No pinned identity: a concrete graph term cannot be checked
            // against this source, so the pattern does not admit here.
            None => false,
        }
    }
}
