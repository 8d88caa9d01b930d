//! Core data types for the concept-forest transform.
//!
//! This module defines the input side of the transform: the [`Term`]s and
//! [`Statement`]s delivered by an RDF parser, and the per-subject
//! [`Resource`] records the collector accumulates from them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::vocab;

/// A literal value with an optional language tag.
///
/// Ordering is by `value` first, so the first element of a
/// `BTreeSet<LangString>` matching a language is the smallest text in that
/// language.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LangString {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl LangString {
    pub fn new(value: impl Into<String>, language: Option<&str>) -> Self {
        Self {
            value: value.into(),
            language: language.map(str::to_string),
        }
    }
}

/// The object position of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    /// A named resource.
    Iri(String),
    /// A blank node, identified by its parser-local label (without `_:`).
    BlankNode(String),
    /// A literal, possibly language-tagged.
    Literal(LangString),
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    pub fn literal(value: impl Into<String>, language: Option<&str>) -> Self {
        Term::Literal(LangString::new(value, language))
    }

    /// The key under which a resource-valued term is stored in the resource
    /// table. Blank nodes are keyed as `_:<label>`. Literals have no key.
    pub fn resource_key(&self) -> Option<String> {
        match self {
            Term::Iri(iri) => Some(iri.clone()),
            Term::BlankNode(label) => Some(format!("_:{label}")),
            Term::Literal(_) => None,
        }
    }
}

/// One subject-predicate-object statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Subject IRI, or `_:<label>` for a blank node.
    pub subject: String,
    pub predicate: String,
    pub object: Term,
}

impl Statement {
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
        }
    }
}

/// What kind of SKOS resource a subject is, as declared by `rdf:type`.
///
/// When several types are declared the highest-precedence one wins, in
/// declaration order of the variants below (Concept first). Statement order
/// therefore never affects the resulting kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Concept,
    ConceptScheme,
    OrderedCollection,
    Collection,
    #[default]
    Other,
}

impl ResourceKind {
    /// Map a type IRI to a kind. Unknown types map to [`ResourceKind::Other`].
    pub fn from_type_iri(iri: &str) -> Self {
        match iri {
            vocab::SKOS_CONCEPT => ResourceKind::Concept,
            vocab::SKOS_CONCEPT_SCHEME => ResourceKind::ConceptScheme,
            vocab::SKOS_ORDERED_COLLECTION => ResourceKind::OrderedCollection,
            vocab::SKOS_COLLECTION => ResourceKind::Collection,
            _ => ResourceKind::Other,
        }
    }

    /// Combine two declared kinds, keeping the one with higher precedence.
    pub fn merge(self, other: ResourceKind) -> ResourceKind {
        self.min(other)
    }

    pub fn is_collection(self) -> bool {
        matches!(self, ResourceKind::Collection | ResourceKind::OrderedCollection)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Concept => write!(f, "concept"),
            ResourceKind::ConceptScheme => write!(f, "concept_scheme"),
            ResourceKind::OrderedCollection => write!(f, "ordered_collection"),
            ResourceKind::Collection => write!(f, "collection"),
            ResourceKind::Other => write!(f, "other"),
        }
    }
}

/// Everything the collector knows about one subject.
///
/// `broader`/`narrower` (and `has_top_concept`/`top_concept_of`) are only
/// guaranteed to be mutual inverses after
/// [`normalize_relations`](crate::normalize::normalize_relations) has run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resource {
    pub iri: String,
    pub kind: ResourceKind,
    pub pref_labels: BTreeSet<LangString>,
    pub alt_labels: BTreeSet<LangString>,
    pub hidden_labels: BTreeSet<LangString>,
    pub definitions: BTreeSet<LangString>,
    pub notations: BTreeSet<String>,
    pub broader: BTreeSet<String>,
    pub narrower: BTreeSet<String>,
    pub in_scheme: BTreeSet<String>,
    pub has_top_concept: BTreeSet<String>,
    pub top_concept_of: BTreeSet<String>,
    pub members: BTreeSet<String>,
}

impl Resource {
    pub fn new(iri: impl Into<String>) -> Self {
        Self {
            iri: iri.into(),
            ..Self::default()
        }
    }

    /// The notation used for display and sorting: the smallest one when
    /// several were asserted.
    pub fn notation(&self) -> Option<&str> {
        self.notations.first().map(String::as_str)
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_precedence_is_order_independent() {
        let a = ResourceKind::Other.merge(ResourceKind::Concept);
        let b = ResourceKind::Concept.merge(ResourceKind::Other);
        assert_eq!(a, ResourceKind::Concept);
        assert_eq!(a, b);
        assert_eq!(
            ResourceKind::Collection.merge(ResourceKind::OrderedCollection),
            ResourceKind::OrderedCollection
        );
    }

    #[test]
    fn unknown_type_is_other() {
        assert_eq!(
            ResourceKind::from_type_iri("http://www.w3.org/2002/07/owl#Class"),
            ResourceKind::Other
        );
        assert_eq!(ResourceKind::from_type_iri(vocab::SKOS_CONCEPT), ResourceKind::Concept);
    }

    #[test]
    fn blank_nodes_are_keyed_with_prefix() {
        assert_eq!(Term::BlankNode("b0".into()).resource_key().as_deref(), Some("_:b0"));
        assert_eq!(Term::literal("x", Some("en")).resource_key(), None);
    }

    #[test]
    fn smallest_notation_wins() {
        let mut r = Resource::new("http://example.org/a");
        r.notations.insert("B".into());
        r.notations.insert("A".into());
        assert_eq!(r.notation(), Some("A"));
    }
}
