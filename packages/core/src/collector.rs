//! Statement collection: folds a stream of parser callbacks into one
//! [`Resource`] record per subject.

use std::collections::BTreeMap;

use crate::graph::ConceptGraph;
use crate::types::{LangString, Resource, ResourceKind, Statement, Term};
use crate::vocab::Predicate;

/// A parse error reported by the external RDF parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// The source (usually a file name) being parsed when the error occurred.
    pub source: Option<String>,
    pub message: String,
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {}", source, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Accumulates statements from one or more parse passes.
///
/// Statements may arrive in any order and any number; multi-valued
/// properties keep every distinct value. Call [`begin_source`](Self::begin_source)
/// before each file so parse errors can be attributed.
#[derive(Debug, Default)]
pub struct StatementCollector {
    resources: BTreeMap<String, Resource>,
    parse_errors: Vec<ParseFailure>,
    current_source: Option<String>,
    observed: usize,
    ignored: usize,
}

/// What collection produced: the raw resource table plus any parse errors.
#[derive(Debug)]
pub struct Collected {
    pub graph: ConceptGraph,
    pub parse_errors: Vec<ParseFailure>,
}

impl StatementCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of a new input source.
    pub fn begin_source(&mut self, name: impl Into<String>) {
        let name = name.into();
        tracing::debug!("collecting statements from {name}");
        self.current_source = Some(name);
    }

    /// Record an error the parser hit in the current source.
    pub fn record_parse_error(&mut self, message: impl Into<String>) {
        let failure = ParseFailure {
            source: self.current_source.clone(),
            message: message.into(),
        };
        tracing::warn!("parse error: {failure}");
        self.parse_errors.push(failure);
    }

    pub fn parse_errors(&self) -> &[ParseFailure] {
        &self.parse_errors
    }

    /// Number of statements seen so far, recognised or not.
    pub fn observed(&self) -> usize {
        self.observed
    }

    pub fn observe_statement(&mut self, statement: &Statement) {
        self.observe(&statement.subject, &statement.predicate, &statement.object);
    }

    /// Fold one statement into the resource table.
    ///
    /// Statements with an unrecognised predicate, or whose object has the
    /// wrong shape for the predicate (a literal where a resource is expected
    /// or vice versa), are ignored.
    pub fn observe(&mut self, subject: &str, predicate: &str, object: &Term) {
        self.observed += 1;

        let Some(predicate) = Predicate::from_iri(predicate) else {
            self.ignored += 1;
            return;
        };

        if predicate.links_resources() {
            let Some(target) = object.resource_key() else {
                self.ignored += 1;
                return;
            };
            self.link(subject, predicate, target);
        } else {
            let Term::Literal(literal) = object else {
                self.ignored += 1;
                return;
            };
            self.annotate(subject, predicate, literal.clone());
        }
    }

    fn link(&mut self, subject: &str, predicate: Predicate, target: String) {
        if predicate == Predicate::Type {
            let kind = ResourceKind::from_type_iri(&target);
            let resource = self.resource_mut(subject);
            resource.kind = resource.kind.merge(kind);
            return;
        }

        // The object exists as an edge endpoint even if nothing else is said about it.
        self.resource_mut(&target);

        let resource = self.resource_mut(subject);
        let set = match predicate {
            Predicate::Broader => &mut resource.broader,
            Predicate::Narrower => &mut resource.narrower,
            Predicate::InScheme => &mut resource.in_scheme,
            Predicate::HasTopConcept => &mut resource.has_top_concept,
            Predicate::TopConceptOf => &mut resource.top_concept_of,
            Predicate::Member => &mut resource.members,
            _ => return,
        };
        set.insert(target);
    }

    fn annotate(&mut self, subject: &str, predicate: Predicate, literal: LangString) {
        let resource = self.resource_mut(subject);
        match predicate {
            Predicate::PrefLabel => {
                resource.pref_labels.insert(literal);
            }
            Predicate::AltLabel => {
                resource.alt_labels.insert(literal);
            }
            Predicate::HiddenLabel => {
                resource.hidden_labels.insert(literal);
            }
            Predicate::Definition => {
                resource.definitions.insert(literal);
            }
            Predicate::Notation => {
                resource.notations.insert(literal.value);
            }
            _ => {}
        }
    }

    fn resource_mut(&mut self, iri: &str) -> &mut Resource {
        self.resources
            .entry(iri.to_string())
            .or_insert_with(|| Resource::new(iri))
    }

    /// Finish ingestion and hand over the resource table.
    pub fn finish(self) -> Collected {
        tracing::debug!(
            "collected {} resources from {} statements ({} ignored, {} parse errors)",
            self.resources.len(),
            self.observed,
            self.ignored,
            self.parse_errors.len()
        );
        Collected {
            graph: ConceptGraph::from_resources(self.resources.into_values()),
            parse_errors: self.parse_errors,
        }
    }
}

impl Extend<Statement> for StatementCollector {
    fn extend<T: IntoIterator<Item = Statement>>(&mut self, iter: T) {
        for statement in iter {
            self.observe_statement(&statement);
        }
    }
}

// --- tests -------------------------------------------------------------------
