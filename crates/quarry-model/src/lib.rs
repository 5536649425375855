//! Quarry term and pattern model.
//!
//! This crate is the *pure data* layer shared by the planner and every
//! producer boundary:
//!
//! - [`Term`]: the RDF-like term union (variables, wildcards, IRIs, blank
//!   nodes, literals).
//! - [`TriplePattern`] / [`Bgp`]: quad-capable triple patterns and the
//!   basic graph pattern they form.
//! - [`vocab`]: the handful of RDF vocabulary constants the facade model
//!   is built on (`rdf:type`, container membership).
//!
//! No I/O, no format knowledge, no query semantics live here.

pub mod pattern;
pub mod term;
pub mod vocab;

pub use pattern::{Bgp, TriplePattern};
pub use term::{Literal, Term};
