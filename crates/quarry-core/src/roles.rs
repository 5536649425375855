//! The closed role taxonomy and rule justifications.
//!
//! Every identity-carrying term of a BGP ends up with exactly one [`Role`]
//! in a final interpretation. Candidate roles are justified: each carries
//! the rule instance (rule id + pattern index) that produced it, so
//! conflicts can be explained instead of just rejected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic role of a pattern term.
///
/// The first three are the generic triple-store positions; the rest are the
/// tabular roles that enable pushdown. The derive order is the fixed role
/// ordering used for deterministic tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Subject,
    Predicate,
    Object,
    /// The type-assertion predicate (`rdf:type`).
    TypeProperty,
    /// The configured root marker object.
    Root,
    /// A container typed as a facade root: names a table for pushdown.
    Table,
    /// An intermediate container reached from a table by an ordinal slot.
    Row,
    /// A table→row ordinal membership edge.
    RowSlot,
    /// A row→value slot edge: names a column for pushdown.
    ColumnSlot,
    /// A cell value under a row: names a bound value/filter for pushdown.
    Value,
}

impl Role {
    /// All roles, in the fixed ordering.
    pub const ALL: [Role; 10] = [
        Role::Subject,
        Role::Predicate,
        Role::Object,
        Role::TypeProperty,
        Role::Root,
        Role::Table,
        Role::Row,
        Role::RowSlot,
        Role::ColumnSlot,
        Role::Value,
    ];

    /// Tabular roles are the ones a pushdown backend can translate.
    pub fn is_tabular(self) -> bool {
        matches!(
            self,
            Role::Table | Role::Row | Role::RowSlot | Role::ColumnSlot | Role::Value
        )
    }

    /// Positional defaults are the fallback for uncovered occurrences.
    pub fn is_default(self) -> bool {
        matches!(self, Role::Subject | Role::Predicate | Role::Object)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Subject => "subject",
            Role::Predicate => "predicate",
            Role::Object => "object",
            Role::TypeProperty => "type-property",
            Role::Root => "root",
            Role::Table => "table",
            Role::Row => "row",
            Role::RowSlot => "row-slot",
            Role::ColumnSlot => "column-slot",
            Role::Value => "value",
        };
        write!(f, "{name}")
    }
}

/// Which derivation rule fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Concrete predicate equal to `rdf:type`.
    TypePredicate,
    /// Concrete object equal to the configured root marker.
    RootObject,
    /// Subject of a `(x, type-property, root)` edge.
    TableSubject,
    /// Membership-capable predicate under a table subject.
    RowSlotPredicate,
    /// Slot-capable predicate under a row subject.
    ColumnSlotPredicate,
    /// Object of a row-slot edge that has outgoing slot edges of its own.
    RowBridge,
    /// Object of a column-slot edge under a row subject.
    CellValue,
    /// Positional fallback.
    Default,
}

impl Rule {
    /// Certain rules are decided by concrete equality alone (no premise
    /// about any other term's role).
    pub fn is_certain(self) -> bool {
        matches!(self, Rule::TypePredicate | Rule::RootObject)
    }
}

/// The rule instance that justified a candidate: rule id plus the index of
/// the pattern it fired on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Justification {
    pub rule: Rule,
    pub pattern: usize,
}

impl Justification {
    pub fn new(rule: Rule, pattern: usize) -> Self {
        Self { rule, pattern }
    }
}

impl fmt::Display for Justification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at pattern {}", self.rule, self.pattern)
    }
}

/// A justified role hypothesis for one term. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub role: Role,
    pub justification: Justification,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabular_roles_are_exactly_the_pushdown_set() {
        let tabular: Vec<Role> = Role::ALL.into_iter().filter(|r| r.is_tabular()).collect();
        assert_eq!(
            tabular,
            vec![Role::Table, Role::Row, Role::RowSlot, Role::ColumnSlot, Role::Value]
        );
    }

    #[test]
    fn role_ordering_is_stable() {
        // Tie-breaks depend on this ordering; lock it down.
        assert!(Role::Subject < Role::Predicate);
        assert!(Role::Object < Role::TypeProperty);
        assert!(Role::Table < Role::Row);
        assert!(Role::ColumnSlot < Role::Value);
    }
}
