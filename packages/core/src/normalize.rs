//! Relation normalisation: makes every inverse pair of relations symmetric.
//!
//! After [`normalize_relations`] returns, for every pair of resources
//! `a`, `b`:
//!
//! - `b ∈ a.narrower` ⇔ `a ∈ b.broader`
//! - `b ∈ a.has_top_concept` ⇔ `a ∈ b.top_concept_of`
//!
//! Relations asserted in both directions are left untouched.

use crate::graph::ConceptGraph;
use crate::types::Resource;

/// How many inverse entries normalisation had to add.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub broader_added: usize,
    pub narrower_added: usize,
    pub top_concept_links_added: usize,
}

impl NormalizeStats {
    pub fn total(&self) -> usize {
        self.broader_added + self.narrower_added + self.top_concept_links_added
    }
}

/// Complete every inverse pair in `graph`. Must run after ingestion has
/// finished, since either direction may arrive last.
pub fn normalize_relations(graph: &mut ConceptGraph) -> NormalizeStats {
    let mut stats = NormalizeStats::default();

    let mut pending: Vec<(String, String, Inverse)> = Vec::new();
    for r in graph.resources() {
        for target in &r.narrower {
            pending.push((target.clone(), r.iri.clone(), Inverse::Broader));
        }
        for target in &r.broader {
            pending.push((target.clone(), r.iri.clone(), Inverse::Narrower));
        }
        for target in &r.has_top_concept {
            pending.push((target.clone(), r.iri.clone(), Inverse::TopConceptOf));
        }
        for target in &r.top_concept_of {
            pending.push((target.clone(), r.iri.clone(), Inverse::HasTopConcept));
        }
    }

    for (holder, value, inverse) in pending {
        let resource = graph.get_or_insert(&holder);
        if inverse.set(resource).insert(value) {
            match inverse {
                Inverse::Broader => stats.broader_added += 1,
                Inverse::Narrower => stats.narrower_added += 1,
                Inverse::TopConceptOf | Inverse::HasTopConcept => {
                    stats.top_concept_links_added += 1
                }
            }
        }
    }

    tracing::debug!(
        "normalised relations: {} broader, {} narrower, {} top-concept entries added",
        stats.broader_added,
        stats.narrower_added,
        stats.top_concept_links_added
    );
    stats
}

#[derive(Clone, Copy)]
enum Inverse {
    Broader,
    Narrower,
    TopConceptOf,
    HasTopConcept,
}

impl Inverse {
    fn set(self, resource: &mut Resource) -> &mut std::collections::BTreeSet<String> {
        match self {
            Inverse::Broader => &mut resource.broader,
            Inverse::Narrower => &mut resource.narrower,
            Inverse::TopConceptOf => &mut resource.top_concept_of,
            Inverse::HasTopConcept => &mut resource.has_top_concept,
        }
    }
}

// --- tests -------------------------------------------------------------------
