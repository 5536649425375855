//! Quarry planning core.
//!
//! A query engine that wants to treat a semi-structured source (a table, a
//! document, a spreadsheet) as a graph has two expensive defaults: convert
//! everything up front, or answer nothing. This crate implements the two
//! pieces that avoid both:
//!
//! - **Triple admission** ([`filter::TripleFilter`]): while a producer
//!   streams a source into facade statements, each candidate statement is
//!   tested in O(|BGP|) against the active query pattern, so irrelevant
//!   parts of large sources are never materialized.
//! - **Role inference** ([`constraints`] + [`interpret`]): constraint
//!   propagation and backtracking search assign each query-pattern term a
//!   semantic role (table / row / column slot / value, or the generic
//!   triple-store positions), so pushdown-capable backends can translate
//!   the pattern into native queries instead of converting at all.
//!
//! Both write into / gate the shared [`builder::FacadeBuilder`] sink, the
//! deduplicating quad store every producer targets.
//!
//! ## Module Organization
//!
//! - `config`: namespace/root configuration shared by planner and builder
//! - `roles`: the closed role taxonomy and rule justifications
//! - `constraints`: per-term candidate-role derivation (fixed point)
//! - `interpret`: backtracking search over candidate sets
//! - `filter`: the admission predicate
//! - `builder`: the facade statement sink

pub mod builder;
pub mod config;
pub mod constraints;
pub mod filter;
pub mod interpret;
pub mod roles;

pub use builder::{FacadeBuilder, SlotKey, Statement};
pub use config::{ContainerIdPolicy, FacadeConfig};
pub use constraints::{BgpConstraints, ConstraintError};
pub use filter::TripleFilter;
pub use interpret::{
    best_interpretation, best_tabular_interpretation, interpretations, BgpInterpretation,
};
pub use roles::{Candidate, Justification, Role, Rule};
