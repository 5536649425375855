//! Backtracking search over candidate role sets.
//!
//! The deriver leaves genuine ambiguity in place; this module resolves it
//! into zero or more *final interpretations*: total, self-consistent
//! role assignments. Zero finals is a normal outcome (the BGP has no
//! tabular reading and the caller falls back to plain triple-store
//! exposure), not an error.
//!
//! Signatures are immutable `BTreeMap`-backed values with structural
//! equality, so states reached via different branches deduplicate in a
//! visited set instead of threading a linked search DAG around.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::{debug, trace};

use quarry_model::{Bgp, Term};

use crate::config::FacadeConfig;
use crate::constraints::{BgpConstraints, ConstraintError};
use crate::roles::Role;

/// A total role assignment for a BGP's identity-carrying terms.
///
/// Equality is structural equality of the signature, independent of the
/// order resolutions happened in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BgpInterpretation {
    signature: BTreeMap<Term, Role>,
}

impl BgpInterpretation {
    pub fn role(&self, term: &Term) -> Option<Role> {
        self.signature.get(term).copied()
    }

    pub fn signature(&self) -> &BTreeMap<Term, Role> {
        &self.signature
    }

    pub fn len(&self) -> usize {
        self.signature.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signature.is_empty()
    }

    /// How many terms resolved to tabular roles: the pushdown payoff,
    /// and the primary preference criterion.
    pub fn tabular_count(&self) -> usize {
        self.signature.values().filter(|r| r.is_tabular()).count()
    }

    /// Terms a pushdown backend would translate, with their roles.
    pub fn tabular_terms(&self) -> impl Iterator<Item = (&Term, Role)> {
        self.signature
            .iter()
            .filter(|(_, role)| role.is_tabular())
            .map(|(term, role)| (term, *role))
    }
}

/// All final interpretations of `bgp`, most preferred first.
///
/// Propagates `ConstraintError` only from the *initial* derivation (an
/// atomically contradictory BGP); branch-local derivation failures during
/// the search prune silently.
pub fn interpretations(
    bgp: &Bgp,
    config: &FacadeConfig,
) -> Result<Vec<BgpInterpretation>, ConstraintError> {
    let base = BgpConstraints::derive(bgp, config)?;

    // Declaration order of the terms the deriver actually constrains
    // (graph terms are pinned by the filter, not role-assigned).
    let order: Vec<Term> = bgp
        .distinct_terms()
        .into_iter()
        .filter(|term| !base.roles(term).is_empty())
        .cloned()
        .collect();

    let mut search = Search {
        bgp,
        config,
        order: &order,
        visited: HashSet::new(),
        finals: BTreeSet::new(),
    };
    search.expand(BTreeMap::new(), base);

    let mut finals: Vec<BgpInterpretation> = search
        .finals
        .into_iter()
        .map(|signature| BgpInterpretation { signature })
        .collect();

    // Preference: most tabular first; ties broken by comparing role
    // assignments in term declaration order under the fixed role
    // ordering. Never incidental iteration order.
    finals.sort_by(|a, b| {
        b.tabular_count()
            .cmp(&a.tabular_count())
            .then_with(|| declaration_key(a, &order).cmp(&declaration_key(b, &order)))
    });

    debug!(
        finals = finals.len(),
        terms = order.len(),
        "interpretation search finished"
    );
    Ok(finals)
}

/// The preferred final interpretation, if any.
pub fn best_interpretation(
    bgp: &Bgp,
    config: &FacadeConfig,
) -> Result<Option<BgpInterpretation>, ConstraintError> {
    Ok(interpretations(bgp, config)?.into_iter().next())
}

/// The preferred interpretation that actually enables pushdown.
///
/// `None` is the normal "expose the source as a plain triple store"
/// fallback: the BGP has no reading with tabular roles.
pub fn best_tabular_interpretation(
    bgp: &Bgp,
    config: &FacadeConfig,
) -> Result<Option<BgpInterpretation>, ConstraintError> {
    Ok(interpretations(bgp, config)?
        .into_iter()
        .next()
        .filter(|interpretation| interpretation.tabular_count() > 0))
}

fn declaration_key(interpretation: &BgpInterpretation, order: &[Term]) -> Vec<Role> {
    order
        .iter()
        .filter_map(|term| interpretation.role(term))
        .collect()
}

struct Search<'a> {
    bgp: &'a Bgp,
    config: &'a FacadeConfig,
    order: &'a [Term],
    visited: HashSet<BTreeMap<Term, Role>>,
    finals: BTreeSet<BTreeMap<Term, Role>>,
}

impl Search<'_> {
    fn expand(&mut self, fixed: BTreeMap<Term, Role>, constraints: BgpConstraints) {
        if !self.visited.insert(fixed.clone()) {
            return;
        }

        // Resolve forced terms before ambiguous ones: branch on the
        // unresolved term with the fewest candidates (declaration order
        // breaks ties), which keeps the explored tree small.
        let next_term = self
            .order
            .iter()
            .filter(|term| !fixed.contains_key(*term))
            .min_by_key(|term| constraints.roles(term).len())
            .cloned();

        let Some(term) = next_term else {
            // Every term resolved and the last re-derivation accepted the
            // signature: a final interpretation.
            self.finals.insert(fixed);
            return;
        };

        for role in constraints.roles(&term) {
            let mut next = fixed.clone();
            next.insert(term.clone(), role);
            match BgpConstraints::derive_with(self.bgp, self.config, &next) {
                Ok(narrowed) => self.expand(next, narrowed),
                Err(err) => {
                    trace!(term = %term, %role, %err, "branch pruned");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_model::{vocab, TriplePattern};

    fn rdf_type() -> Term {
        Term::iri(vocab::RDF_TYPE_IRI)
    }

    #[test]
    fn generic_bgp_has_single_generic_interpretation() {
        let bgp = Bgp::new(vec![TriplePattern::new(
            Term::var("x"),
            rdf_type(),
            Term::var("f"),
        )]);
        let finals = interpretations(&bgp, &FacadeConfig::default()).expect("search");
        assert_eq!(finals.len(), 1);
        let only = &finals[0];
        assert_eq!(only.role(&Term::var("x")), Some(Role::Subject));
        assert_eq!(only.role(&rdf_type()), Some(Role::TypeProperty));
        assert_eq!(only.role(&Term::var("f")), Some(Role::Object));
    }

    #[test]
    fn preference_picks_the_tabular_reading() {
        let config = FacadeConfig::default();
        let bgp = Bgp::new(vec![TriplePattern::new(
            Term::var("t"),
            rdf_type(),
            config.root_marker_term(),
        )]);
        let finals = interpretations(&bgp, &config).expect("search");
        assert!(finals.len() >= 2, "generic and tabular readings coexist");

        let best = &finals[0];
        assert_eq!(best.role(&Term::var("t")), Some(Role::Table));
        // The generic fallback is still reachable, just not preferred.
        assert!(finals
            .iter()
            .any(|i| i.role(&Term::var("t")) == Some(Role::Subject)));
    }

    #[test]
    fn contradictory_bgp_propagates_the_error() {
        let config = FacadeConfig::default();
        let bgp = Bgp::new(vec![TriplePattern::new(
            rdf_type(),
            rdf_type(),
            config.root_marker_term(),
        )]);
        assert!(interpretations(&bgp, &config).is_err());
    }

    #[test]
    fn finals_are_total_and_fixed_points() {
        let config = FacadeConfig::default();
        let bgp = Bgp::new(vec![
            TriplePattern::new(Term::var("t"), rdf_type(), config.root_marker_term()),
            TriplePattern::new(Term::var("t"), Term::var("s"), Term::var("r")),
            TriplePattern::new(Term::var("r"), Term::var("c"), Term::var("v")),
        ]);
        let finals = interpretations(&bgp, &config).expect("search");
        assert!(!finals.is_empty());

        let term_count = bgp.distinct_terms().len();
        for interpretation in &finals {
            assert_eq!(interpretation.len(), term_count);
            // Re-deriving against the resolved signature must accept every
            // resolved role (fixed point).
            let narrowed =
                BgpConstraints::derive_with(&bgp, &config, interpretation.signature())
                    .expect("final signature re-derives");
            for (term, role) in interpretation.signature() {
                assert!(narrowed.allows(term, *role));
            }
        }
    }
}
