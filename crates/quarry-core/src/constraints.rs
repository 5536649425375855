//! Per-term candidate-role derivation.
//!
//! One scan of a BGP (iterated to a fixed point, because several rules are
//! mutually referential) computes, for every distinct identity-carrying
//! term, the set of roles locally consistent with its usage. Ambiguity is
//! *kept* here: mutually exclusive candidates from independent rule
//! firings are resolved later by the interpretation search. Only an
//! atomically contradictory derivation (one pattern pinning one term into
//! two structural roles at once) is a hard error.
//!
//! The derivation accepts a partial fixed assignment so the search can
//! re-run it after tentatively resolving a term: a fixed term "carries"
//! exactly its fixed role, which propagates through the conditional rules
//! and can exclude roles other branches relied on.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::trace;

use quarry_model::{Bgp, Term};

use crate::config::FacadeConfig;
use crate::roles::{Candidate, Justification, Role, Rule};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("pattern {pattern} forces {term} into both {first} and {second}")]
    ContradictoryRoles {
        term: String,
        first: Role,
        second: Role,
        pattern: usize,
    },
    #[error("role {role} for {term} is excluded by derivation")]
    RoleExcluded { term: String, role: Role },
}

/// Candidate role sets for every identity-carrying term of a BGP.
///
/// Built once per (BGP, configuration, fixed assignment) triple; read-only
/// afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BgpConstraints {
    by_term: BTreeMap<Term, BTreeMap<Role, Justification>>,
}

impl BgpConstraints {
    /// Derive candidate sets with nothing resolved yet.
    pub fn derive(bgp: &Bgp, config: &FacadeConfig) -> Result<Self, ConstraintError> {
        Self::derive_with(bgp, config, &BTreeMap::new())
    }

    /// Derive candidate sets treating `fixed` terms as resolved.
    ///
    /// Errors when one pattern atomically contradicts itself about a term,
    /// or when a fixed role is no longer among the roles derivable for its
    /// term under the other fixations.
    pub fn derive_with(
        bgp: &Bgp,
        config: &FacadeConfig,
        fixed: &BTreeMap<Term, Role>,
    ) -> Result<Self, ConstraintError> {
        let mut deriver = Deriver {
            bgp,
            config,
            fixed,
            by_term: BTreeMap::new(),
        };
        deriver.run()?;

        let by_term = deriver.by_term;
        for (term, role) in fixed {
            let allowed = by_term
                .get(term)
                .is_some_and(|roles| roles.contains_key(role));
            if !allowed {
                return Err(ConstraintError::RoleExcluded {
                    term: term.to_string(),
                    role: *role,
                });
            }
        }

        Ok(Self { by_term })
    }

    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.by_term.keys()
    }

    /// Candidate roles for `term`, in the fixed role ordering.
    pub fn roles(&self, term: &Term) -> Vec<Role> {
        self.by_term
            .get(term)
            .map(|roles| roles.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn candidates(&self, term: &Term) -> Vec<Candidate> {
        self.by_term
            .get(term)
            .map(|roles| {
                roles
                    .iter()
                    .map(|(role, justification)| Candidate {
                        role: *role,
                        justification: *justification,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn allows(&self, term: &Term, role: Role) -> bool {
        self.by_term
            .get(term)
            .is_some_and(|roles| roles.contains_key(&role))
    }

    pub fn justification(&self, term: &Term, role: Role) -> Option<Justification> {
        self.by_term.get(term)?.get(&role).copied()
    }

    /// Is every candidate set of `self` contained in the corresponding set
    /// of `other`? Used by the fixed-point soundness checks.
    pub fn is_subset_of(&self, other: &BgpConstraints) -> bool {
        self.by_term.iter().all(|(term, roles)| {
            roles
                .keys()
                .all(|role| other.allows(term, *role))
        })
    }
}

struct Deriver<'a> {
    bgp: &'a Bgp,
    config: &'a FacadeConfig,
    fixed: &'a BTreeMap<Term, Role>,
    by_term: BTreeMap<Term, BTreeMap<Role, Justification>>,
}

impl Deriver<'_> {
    fn run(&mut self) -> Result<(), ConstraintError> {
        // Candidate sets only grow, and the space is bounded by
        // |terms| x |roles|, so this loop terminates.
        loop {
            let mut changed = false;
            for (idx, pattern) in self.bgp.patterns().iter().enumerate() {
                changed |= self.apply_predicate_rules(idx, pattern)?;
                changed |= self.apply_object_rules(idx, pattern)?;
                changed |= self.apply_subject_rules(idx, pattern)?;
            }
            changed |= self.apply_row_bridge_rule()?;
            if !changed {
                return Ok(());
            }
        }
    }

    /// Does `term` carry `role`? Fixed terms carry exactly their fixed
    /// role; unresolved terms carry everything in their current candidate
    /// set. Wildcards carry nothing.
    fn carries(&self, term: &Term, role: Role) -> bool {
        if matches!(term, Term::Any) {
            return false;
        }
        if let Some(fixed_role) = self.fixed.get(term) {
            return *fixed_role == role;
        }
        self.by_term
            .get(term)
            .is_some_and(|roles| roles.contains_key(&role))
    }

    /// Membership-capable: a term that can denote an ordinal membership
    /// predicate, i.e. concretely `rdf:_N` / the alias, or an unbound term
    /// (unbound pattern positions match membership predicates).
    fn membership_capable(&self, term: &Term) -> bool {
        term.is_unbound() || self.config.is_membership_predicate(term)
    }

    /// Plain predicate: a concrete IRI that is neither the type predicate
    /// nor a membership predicate.
    fn plain_predicate(&self, term: &Term) -> bool {
        term.as_iri().is_some()
            && !self.config.is_type_predicate(term)
            && !self.config.is_membership_predicate(term)
    }

    /// Slot-capable: anything that can denote a slot edge out of a
    /// container (membership, named property, or unbound).
    fn slot_capable(&self, term: &Term) -> bool {
        self.membership_capable(term) || self.plain_predicate(term)
    }

    fn apply_predicate_rules(
        &mut self,
        idx: usize,
        pattern: &quarry_model::TriplePattern,
    ) -> Result<bool, ConstraintError> {
        let predicate = pattern.predicate.clone();
        let mut changed = false;

        if self.config.is_type_predicate(&predicate) {
            // Certain: the concrete type predicate is the type property,
            // nothing else; the positional default is suppressed.
            return self.add(&predicate, Role::TypeProperty, Rule::TypePredicate, idx);
        }

        if self.membership_capable(&predicate) && self.carries(&pattern.subject, Role::Table) {
            changed |= self.add(&predicate, Role::RowSlot, Rule::RowSlotPredicate, idx)?;
        }
        if self.slot_capable(&predicate) && self.carries(&pattern.subject, Role::Row) {
            changed |= self.add(&predicate, Role::ColumnSlot, Rule::ColumnSlotPredicate, idx)?;
        }
        changed |= self.add(&predicate, Role::Predicate, Rule::Default, idx)?;
        Ok(changed)
    }

    fn apply_object_rules(
        &mut self,
        idx: usize,
        pattern: &quarry_model::TriplePattern,
    ) -> Result<bool, ConstraintError> {
        let object = pattern.object.clone();

        if self.config.is_root_marker(&object) {
            // Certain: the concrete root marker, default suppressed.
            return self.add(&object, Role::Root, Rule::RootObject, idx);
        }

        let mut changed = false;
        if self.carries(&pattern.subject, Role::Row)
            && self.carries(&pattern.predicate, Role::ColumnSlot)
        {
            changed |= self.add(&object, Role::Value, Rule::CellValue, idx)?;
        }
        changed |= self.add(&object, Role::Object, Rule::Default, idx)?;
        Ok(changed)
    }

    fn apply_subject_rules(
        &mut self,
        idx: usize,
        pattern: &quarry_model::TriplePattern,
    ) -> Result<bool, ConstraintError> {
        let subject = pattern.subject.clone();
        let mut changed = false;

        if self.carries(&pattern.predicate, Role::TypeProperty)
            && self.carries(&pattern.object, Role::Root)
        {
            changed |= self.add(&subject, Role::Table, Rule::TableSubject, idx)?;
        }
        changed |= self.add(&subject, Role::Subject, Rule::Default, idx)?;
        Ok(changed)
    }

    /// A term that is the object of a row-slot edge *and* the subject of
    /// further slot edges is a row container.
    fn apply_row_bridge_rule(&mut self) -> Result<bool, ConstraintError> {
        let mut changed = false;
        for (idx, pattern) in self.bgp.patterns().iter().enumerate() {
            if !self.carries(&pattern.predicate, Role::RowSlot) {
                continue;
            }
            let candidate_row = pattern.object.clone();
            if matches!(candidate_row, Term::Any) {
                continue;
            }
            let has_outgoing_slot = self.bgp.patterns().iter().any(|other| {
                other.subject == candidate_row && self.slot_capable(&other.predicate)
            });
            if has_outgoing_slot {
                changed |= self.add(&candidate_row, Role::Row, Rule::RowBridge, idx)?;
            }
        }
        Ok(changed)
    }

    /// Record a candidate, keeping the first justification per role.
    ///
    /// Two structural roles for the same term from the same pattern are the
    /// atomic contradiction *only* when one of them is pinned by a certain
    /// rule: the term then concretely *is* the type predicate / root marker
    /// and cannot also be a container or slot of that very edge. Two
    /// conditional roles from one edge (a nested container's slot read as
    /// row-slot or column-slot) are genuine ambiguity and both stay.
    fn add(
        &mut self,
        term: &Term,
        role: Role,
        rule: Rule,
        pattern: usize,
    ) -> Result<bool, ConstraintError> {
        if matches!(term, Term::Any) {
            return Ok(false);
        }

        let roles = self.by_term.entry(term.clone()).or_default();
        if roles.contains_key(&role) {
            return Ok(false);
        }

        if !role.is_default() {
            for (other, justification) in roles.iter() {
                if justification.pattern == pattern
                    && !other.is_default()
                    && (rule.is_certain() || justification.rule.is_certain())
                {
                    return Err(ConstraintError::ContradictoryRoles {
                        term: term.to_string(),
                        first: *other,
                        second: role,
                        pattern,
                    });
                }
            }
        }

        trace!(term = %term, %role, ?rule, pattern, "candidate derived");
        roles.insert(role, Justification::new(rule, pattern));
        Ok(true)
    }
}
