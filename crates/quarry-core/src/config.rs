//! Namespace/root configuration.
//!
//! One `FacadeConfig` is fixed per (query, source) binding and shared by the
//! constraint deriver, the interpretation search and the graph builder, so
//! the roles the planner infers and the statements the builder emits agree
//! on vocabulary.

use serde::{Deserialize, Serialize};

use quarry_model::vocab;
use quarry_model::Term;

pub const DEFAULT_NS: &str = "http://quarry-graph.dev/ns/";

/// How the builder mints container node identities (§ container identity):
/// opaque blank nodes, or IRIs derived deterministically from the source
/// locator and the container path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerIdPolicy {
    #[default]
    BlankNodes,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacadeConfig {
    /// Namespace for default container/property naming (named slot keys are
    /// IRI-encoded under this prefix).
    pub namespace: String,
    /// IRI marking facade roots: `(root, rdf:type, <root_marker>)`.
    pub root_marker: String,
    /// Optional alias predicate accepted wherever the ordinal membership
    /// convention (`rdf:_N`) is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_alias: Option<String>,
    #[serde(default)]
    pub container_ids: ContainerIdPolicy,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NS.to_string(),
            root_marker: format!("{DEFAULT_NS}root"),
            membership_alias: None,
            container_ids: ContainerIdPolicy::default(),
        }
    }
}

impl FacadeConfig {
    /// Is `term` the type-assertion predicate?
    pub fn is_type_predicate(&self, term: &Term) -> bool {
        term.as_iri() == Some(vocab::RDF_TYPE_IRI)
    }

    /// Is `term` the configured root marker?
    pub fn is_root_marker(&self, term: &Term) -> bool {
        term.as_iri() == Some(self.root_marker.as_str())
    }

    /// Is `term` an ordinal membership predicate (`rdf:_N` or the alias)?
    pub fn is_membership_predicate(&self, term: &Term) -> bool {
        let Some(iri) = term.as_iri() else {
            return false;
        };
        if vocab::parse_member_iri(iri).is_some() {
            return true;
        }
        self.membership_alias.as_deref() == Some(iri)
    }

    pub fn root_marker_term(&self) -> Term {
        Term::iri(self.root_marker.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_recognizes_ordinals_and_alias() {
        let mut config = FacadeConfig::default();
        assert!(config.is_membership_predicate(&Term::iri(vocab::member_iri(3))));
        assert!(!config.is_membership_predicate(&Term::iri("http://example.org/slot")));

        config.membership_alias = Some("http://example.org/slot".to_string());
        assert!(config.is_membership_predicate(&Term::iri("http://example.org/slot")));
    }

    #[test]
    fn root_marker_is_config_driven() {
        let config = FacadeConfig {
            root_marker: "http://example.org/table".to_string(),
            ..FacadeConfig::default()
        };
        assert!(config.is_root_marker(&Term::iri("http://example.org/table")));
        assert!(!config.is_root_marker(&Term::iri(format!("{DEFAULT_NS}root"))));
    }
}
