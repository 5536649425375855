//! RDF-like terms.
//!
//! The union deliberately stays small: variables and wildcards both match
//! anything during pattern matching, but only a [`Term::Variable`] carries an
//! identity that role inference can book-keep against. Wildcards are
//! anonymous "don't care" positions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::vocab;

/// A literal value: lexical form plus optional datatype IRI and language tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    pub lexical: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Literal {
    /// Plain string literal (no datatype, no language).
    pub fn string(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn lang(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }

    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    pub fn integer(value: i64) -> Self {
        Self::typed(value.to_string(), vocab::XSD_INTEGER)
    }

    pub fn boolean(value: bool) -> Self {
        Self::typed(value.to_string(), vocab::XSD_BOOLEAN)
    }

    pub fn double(value: f64) -> Self {
        Self::typed(value.to_string(), vocab::XSD_DOUBLE)
    }
}

/// An RDF-like term as it appears in patterns and statements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Term {
    /// Named binding position; identity matters for role bookkeeping.
    Variable { name: String },
    /// Anonymous wildcard; matches anything, carries no identity.
    Any,
    Iri { iri: String },
    BlankNode { id: String },
    Literal(Literal),
}

impl Term {
    pub fn var(name: impl Into<String>) -> Self {
        Term::Variable { name: name.into() }
    }

    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri { iri: iri.into() }
    }

    pub fn bnode(id: impl Into<String>) -> Self {
        Term::BlankNode { id: id.into() }
    }

    pub fn literal(lexical: impl Into<String>) -> Self {
        Term::Literal(Literal::string(lexical))
    }

    /// IRI, blank node or literal: something a ground statement may contain.
    pub fn is_concrete(&self) -> bool {
        matches!(
            self,
            Term::Iri { .. } | Term::BlankNode { .. } | Term::Literal(_)
        )
    }

    /// Variable or wildcard: matches any concrete term.
    pub fn is_unbound(&self) -> bool {
        matches!(self, Term::Variable { .. } | Term::Any)
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri { iri } => Some(iri),
            _ => None,
        }
    }

    /// Does this *pattern position* accept `candidate`?
    ///
    /// Unbound positions accept everything; concrete positions require
    /// structural equality. `candidate` is expected to be concrete (ground
    /// statements never contain variables); an unbound candidate is only
    /// accepted by an unbound position.
    pub fn matches(&self, candidate: &Term) -> bool {
        if self.is_unbound() {
            return true;
        }
        self == candidate
    }
}

impl From<Literal> for Term {
    fn from(lit: Literal) -> Self {
        Term::Literal(lit)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable { name } => write!(f, "?{name}"),
            Term::Any => write!(f, "ANY"),
            Term::Iri { iri } => write!(f, "<{iri}>"),
            Term::BlankNode { id } => write!(f, "_:{id}"),
            Term::Literal(lit) => {
                write!(f, "\"{}\"", lit.lexical)?;
                if let Some(lang) = &lit.language {
                    write!(f, "@{lang}")?;
                }
                if let Some(dt) = &lit.datatype {
                    write!(f, "^^<{dt}>")?;
                }
                Ok(())
            }
        }
    }
}
