//! RDF vocabulary constants used by the facade model.

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

pub const RDF_TYPE_IRI: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Prefix of the container-membership properties `rdf:_1`, `rdf:_2`, …
pub const RDF_MEMBER_PREFIX: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#_";

pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
pub const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

/// The ordinal membership property for 1-based position `n`.
pub fn member_iri(n: u32) -> String {
    format!("{RDF_MEMBER_PREFIX}{n}")
}

/// Parse an ordinal membership IRI back into its 1-based position.
///
/// Returns `None` for anything that is not `rdf:_N` with `N >= 1`.
pub fn parse_member_iri(iri: &str) -> Option<u32> {
    let rest = iri.strip_prefix(RDF_MEMBER_PREFIX)?;
    let n: u32 = rest.parse().ok()?;
    (n >= 1).then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_iri_round_trips() {
        assert_eq!(parse_member_iri(&member_iri(1)), Some(1));
        assert_eq!(parse_member_iri(&member_iri(42)), Some(42));
    }

    #[test]
    fn parse_member_rejects_non_members() {
        assert_eq!(parse_member_iri(RDF_TYPE_IRI), None);
        assert_eq!(parse_member_iri(&format!("{RDF_MEMBER_PREFIX}0")), None);
        assert_eq!(parse_member_iri(&format!("{RDF_MEMBER_PREFIX}x")), None);
        assert_eq!(parse_member_iri(&format!("{RDF_MEMBER_PREFIX}")), None);
    }
}
