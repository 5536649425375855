//! The facade graph builder: the deduplicating sink every producer writes
//! into.
//!
//! A source becomes a graph of containers and slots: the root container is
//! typed with the configured root marker, child containers hang off named
//! or ordinal slots, and leaf values sit in slots on their container. The
//! builder owns statement identity (container nodes are minted here, blank
//! or stable per configuration) and statement deduplication; an optional
//! admission filter gates every write.
//!
//! The sink is a set, not a multiset: every operation reports whether it
//! actually added a statement, so producers can stream idempotently.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::trace;

use quarry_model::{vocab, Literal, Term};

use crate::config::{ContainerIdPolicy, FacadeConfig};
use crate::filter::TripleFilter;

/// Path of the root container within a source.
const ROOT_CONTAINER: &str = "/";

/// A named or ordinal relation from a container to a child.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SlotKey {
    /// Named relation, IRI-encoded into the configured namespace.
    Named(String),
    /// Ordinal membership, 1-based (`rdf:_N`).
    Index(u32),
}

impl SlotKey {
    pub fn named(name: impl Into<String>) -> Self {
        SlotKey::Named(name.into())
    }
}

impl From<u32> for SlotKey {
    fn from(n: u32) -> Self {
        SlotKey::Index(n)
    }
}

/// A ground statement in a source's graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Statement {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<Term>,
}

/// Deduplicating statement sink for in-flight triplifications.
///
/// Owned exclusively by one triplification at a time; nothing here is
/// synchronized.
#[derive(Debug)]
pub struct FacadeBuilder {
    config: FacadeConfig,
    filter: Option<TripleFilter>,
    statements: BTreeSet<Statement>,
    containers: BTreeMap<(String, String), Term>,
    next_blank: u64,
}

impl FacadeBuilder {
    pub fn new(config: FacadeConfig) -> Self {
        Self {
            config,
            filter: None,
            statements: BTreeSet::new(),
            containers: BTreeMap::new(),
            next_blank: 0,
        }
    }

    /// Gate every write through an admission filter.
    pub fn with_filter(config: FacadeConfig, filter: TripleFilter) -> Self {
        Self {
            filter: Some(filter),
            ..Self::new(config)
        }
    }

    pub fn config(&self) -> &FacadeConfig {
        &self.config
    }

    /// Type the source's root container with the root marker.
    pub fn add_root(&mut self, source: &str) -> bool {
        let root = self.container_node(source, ROOT_CONTAINER);
        let marker = self.config.root_marker_term();
        self.insert(source, root, Term::iri(vocab::RDF_TYPE_IRI), marker)
    }

    /// Assert a type on a container.
    pub fn add_type(&mut self, source: &str, container: &str, type_iri: &str) -> bool {
        let node = self.container_node(source, container);
        self.insert(
            source,
            node,
            Term::iri(vocab::RDF_TYPE_IRI),
            Term::iri(type_iri),
        )
    }

    /// Link a child container into a slot of its parent.
    pub fn add_container(
        &mut self,
        source: &str,
        parent: &str,
        slot: SlotKey,
        child: &str,
    ) -> bool {
        let subject = self.container_node(source, parent);
        let object = self.container_node(source, child);
        let predicate = self.slot_predicate(&slot);
        self.insert(source, subject, predicate, object)
    }

    /// Put a leaf value into a slot of a container.
    pub fn add_value(
        &mut self,
        source: &str,
        container: &str,
        slot: SlotKey,
        value: Literal,
    ) -> bool {
        let subject = self.container_node(source, container);
        let predicate = self.slot_predicate(&slot);
        self.insert(source, subject, predicate, Term::Literal(value))
    }

    /// Statements in deterministic order.
    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn into_statements(self) -> Vec<Statement> {
        self.statements.into_iter().collect()
    }

    /// The node for a container id, minted on first use and stable for the
    /// rest of the triplification.
    fn container_node(&mut self, source: &str, container: &str) -> Term {
        let key = (source.to_string(), container.to_string());
        if let Some(node) = self.containers.get(&key) {
            return node.clone();
        }
        let node = match self.config.container_ids {
            ContainerIdPolicy::BlankNodes => {
                let id = format!("c{}", self.next_blank);
                self.next_blank += 1;
                Term::bnode(id)
            }
            ContainerIdPolicy::Stable => {
                Term::iri(format!("{source}#{}", encode_path(container)))
            }
        };
        self.containers.insert(key, node.clone());
        node
    }

    fn slot_predicate(&self, slot: &SlotKey) -> Term {
        match slot {
            SlotKey::Named(name) => {
                Term::iri(format!("{}{}", self.config.namespace, encode_component(name)))
            }
            SlotKey::Index(n) => {
                debug_assert!(*n >= 1, "ordinal slots are 1-based");
                Term::iri(vocab::member_iri(*n))
            }
        }
    }

    fn insert(&mut self, source: &str, subject: Term, predicate: Term, object: Term) -> bool {
        if let Some(filter) = &self.filter {
            if !filter.admit(&subject, &predicate, &object) {
                trace!(%subject, %predicate, %object, "statement rejected");
                return false;
            }
        }
        let statement = Statement {
            subject,
            predicate,
            object,
            graph: Some(Term::iri(source)),
        };
        self.statements.insert(statement)
    }
}

/// IRI-encode a slot name for use inside the namespace.
fn encode_component(s: &str) -> String {
    encode(s, false)
}

/// IRI-encode a container path, keeping `/` separators readable.
fn encode_path(s: &str) -> String {
    encode(s, true)
}

fn encode(s: &str, keep_slash: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.' => out.push(b as char),
            b'/' if keep_slash => out.push('/'),
            _ => {
                out.push('%');
                out.push_str(&format!("{b:02X}"));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_model::{Bgp, TriplePattern};

    const SRC: &str = "file://demo.csv";

    #[test]
    fn duplicate_writes_store_one_statement() {
        let mut builder = FacadeBuilder::new(FacadeConfig::default());
        assert!(builder.add_value(SRC, "/1", SlotKey::named("name"), Literal::string("a")));
        assert!(!builder.add_value(SRC, "/1", SlotKey::named("name"), Literal::string("a")));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn container_identity_is_stable_within_a_source() {
        let mut builder = FacadeBuilder::new(FacadeConfig::default());
        builder.add_container(SRC, ROOT_CONTAINER, SlotKey::Index(1), "/1");
        builder.add_value(SRC, "/1", SlotKey::named("name"), Literal::string("a"));

        let row_nodes: BTreeSet<&Term> = builder
            .statements()
            .filter_map(|st| {
                (st.predicate == Term::iri(vocab::member_iri(1))).then_some(&st.object)
            })
            .chain(builder.statements().filter_map(|st| {
                st.object
                    .eq(&Term::Literal(Literal::string("a")))
                    .then_some(&st.subject)
            }))
            .collect();
        assert_eq!(row_nodes.len(), 1, "both operations resolved the same node");
    }

    #[test]
    fn stable_ids_derive_from_source_and_path() {
        let config = FacadeConfig {
            container_ids: ContainerIdPolicy::Stable,
            ..FacadeConfig::default()
        };
        let mut builder = FacadeBuilder::new(config);
        builder.add_root(SRC);
        let root = builder
            .statements()
            .next()
            .expect("root statement")
            .subject
            .clone();
        assert_eq!(root, Term::iri(format!("{SRC}#/")));
    }

    #[test]
    fn filtered_builder_drops_rejected_statements() {
        let config = FacadeConfig::default();
        let bgp = Bgp::new(vec![TriplePattern::new(
            Term::Any,
            Term::iri(format!("{}name", config.namespace)),
            Term::Any,
        )]);
        let mut builder = FacadeBuilder::with_filter(config, TripleFilter::new(bgp));

        assert!(builder.add_value(SRC, "/1", SlotKey::named("name"), Literal::string("a")));
        assert!(!builder.add_value(SRC, "/1", SlotKey::named("age"), Literal::integer(7)));
        assert!(!builder.add_root(SRC), "root statement matches no pattern");
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn named_slots_are_iri_encoded() {
        let mut builder = FacadeBuilder::new(FacadeConfig::default());
        builder.add_value(SRC, "/1", SlotKey::named("first name"), Literal::string("a"));
        let predicate = builder
            .statements()
            .next()
            .expect("statement")
            .predicate
            .clone();
        assert_eq!(
            predicate.as_iri(),
            Some(format!("{}first%20name", FacadeConfig::default().namespace).as_str())
        );
    }

    #[test]
    fn statements_carry_the_source_graph() {
        let mut builder = FacadeBuilder::new(FacadeConfig::default());
        builder.add_root(SRC);
        assert!(builder
            .statements()
            .all(|st| st.graph == Some(Term::iri(SRC))));
    }
}
