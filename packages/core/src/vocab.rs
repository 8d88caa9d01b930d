//! The fixed RDF/SKOS vocabulary the collector understands.
//!
//! Anything outside this table is ignored during collection. The list is
//! closed: the transform does no inference beyond the inverse
//! pairs handled by [`normalize`](crate::normalize).

pub const SKOS_NS: &str = "http://www.w3.org/2004/02/skos/core#";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

pub const SKOS_CONCEPT: &str = "http://www.w3.org/2004/02/skos/core#Concept";
pub const SKOS_CONCEPT_SCHEME: &str = "http://www.w3.org/2004/02/skos/core#ConceptScheme";
pub const SKOS_COLLECTION: &str = "http://www.w3.org/2004/02/skos/core#Collection";
pub const SKOS_ORDERED_COLLECTION: &str = "http://www.w3.org/2004/02/skos/core#OrderedCollection";

pub const SKOS_PREF_LABEL: &str = "http://www.w3.org/2004/02/skos/core#prefLabel";
pub const SKOS_ALT_LABEL: &str = "http://www.w3.org/2004/02/skos/core#altLabel";
pub const SKOS_HIDDEN_LABEL: &str = "http://www.w3.org/2004/02/skos/core#hiddenLabel";
pub const SKOS_DEFINITION: &str = "http://www.w3.org/2004/02/skos/core#definition";
pub const SKOS_NOTATION: &str = "http://www.w3.org/2004/02/skos/core#notation";
pub const SKOS_BROADER: &str = "http://www.w3.org/2004/02/skos/core#broader";
pub const SKOS_NARROWER: &str = "http://www.w3.org/2004/02/skos/core#narrower";
pub const SKOS_IN_SCHEME: &str = "http://www.w3.org/2004/02/skos/core#inScheme";
pub const SKOS_HAS_TOP_CONCEPT: &str = "http://www.w3.org/2004/02/skos/core#hasTopConcept";
pub const SKOS_TOP_CONCEPT_OF: &str = "http://www.w3.org/2004/02/skos/core#topConceptOf";
pub const SKOS_MEMBER: &str = "http://www.w3.org/2004/02/skos/core#member";

/// A predicate the collector acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    Type,
    PrefLabel,
    AltLabel,
    HiddenLabel,
    Definition,
    Notation,
    Broader,
    Narrower,
    InScheme,
    HasTopConcept,
    TopConceptOf,
    Member,
}

impl Predicate {
    /// Look up a predicate IRI. Returns `None` for anything outside the
    /// recognised set.
    pub fn from_iri(iri: &str) -> Option<Self> {
        if iri == RDF_TYPE {
            return Some(Predicate::Type);
        }
        let local = iri.strip_prefix(SKOS_NS)?;
        match local {
            "prefLabel" => Some(Predicate::PrefLabel),
            "altLabel" => Some(Predicate::AltLabel),
            "hiddenLabel" => Some(Predicate::HiddenLabel),
            "definition" => Some(Predicate::Definition),
            "notation" => Some(Predicate::Notation),
            "broader" => Some(Predicate::Broader),
            "narrower" => Some(Predicate::Narrower),
            "inScheme" => Some(Predicate::InScheme),
            "hasTopConcept" => Some(Predicate::HasTopConcept),
            "topConceptOf" => Some(Predicate::TopConceptOf),
            "member" => Some(Predicate::Member),
            _ => None,
        }
    }

    /// Whether the object of this predicate is a resource rather than a literal.
    pub fn links_resources(self) -> bool {
        matches!(
            self,
            Predicate::Type
                | Predicate::Broader
                | Predicate::Narrower
                | Predicate::InScheme
                | Predicate::HasTopConcept
                | Predicate::TopConceptOf
                | Predicate::Member
        )
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_skos_predicates() {
        assert_eq!(Predicate::from_iri(SKOS_BROADER), Some(Predicate::Broader));
        assert_eq!(Predicate::from_iri(SKOS_PREF_LABEL), Some(Predicate::PrefLabel));
        assert_eq!(Predicate::from_iri(RDF_TYPE), Some(Predicate::Type));
    }

    #[test]
    fn ignores_everything_else() {
        assert_eq!(Predicate::from_iri("http://www.w3.org/2004/02/skos/core#related"), None);
        assert_eq!(Predicate::from_iri("http://purl.org/dc/terms/title"), None);
        assert_eq!(Predicate::from_iri(SKOS_NS), None);
    }

    #[test]
    fn labels_are_literal_valued() {
        assert!(!Predicate::PrefLabel.links_resources());
        assert!(!Predicate::Notation.links_resources());
        assert!(Predicate::Narrower.links_resources());
    }
}
