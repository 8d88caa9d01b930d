use std::collections::{BTreeMap, BTreeSet};

use crate::config::BrowseConfiguration;
use crate::language::LanguagePreference;
use crate::types::{Resource, ResourceKind};

/// The resource table built by the collector, keyed by IRI.
///
/// The graph is a lookup structure, not an analysis: it answers "what is
/// known about this IRI" and "what does it point to". Building a forest goes
/// through [`Hierarchy`], which restricts the graph to the resources of
/// interest.
///
/// Resources with the same `iri` replace the earlier entry.
#[derive(Debug, Default, Clone)]
pub struct ConceptGraph {
    resources: BTreeMap<String, Resource>,
}

impl ConceptGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from an iterator of resources.
    pub fn from_resources(iter: impl IntoIterator<Item = Resource>) -> Self {
        let mut g = Self::new();
        for r in iter {
            g.add(r);
        }
        g
    }

    pub fn add(&mut self, resource: Resource) {
        self.resources.insert(resource.iri.clone(), resource);
    }

    pub fn get(&self, iri: &str) -> Option<&Resource> {
        self.resources.get(iri)
    }

    /// Fetch a resource for modification, creating an empty record if absent.
    pub fn get_or_insert(&mut self, iri: &str) -> &mut Resource {
        self.resources
            .entry(iri.to_string())
            .or_insert_with(|| Resource::new(iri))
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Iterate over all resources in IRI order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// All resources of a given kind.
    pub fn by_kind(&self, kind: ResourceKind) -> Vec<&Resource> {
        self.resources.values().filter(|r| r.kind == kind).collect()
    }
}

/// One resource of interest, with its display attributes resolved and its
/// parent/child edges restricted to other resources of interest.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyNode {
    pub iri: String,
    pub kind: ResourceKind,
    pub label: Option<String>,
    pub definition: Option<String>,
    pub notation: Option<String>,
    pub children: BTreeSet<String>,
    pub parents: BTreeSet<String>,
}

/// The parent/child view of a normalised [`ConceptGraph`] that the forest
/// builder walks.
///
/// A node's children are:
/// - its `narrower` resources;
/// - for a concept scheme, its top concepts: explicit `hasTopConcept`
///   targets plus concepts `inScheme` the scheme with no broader concept of
///   interest;
/// - for a collection, its `member`s.
///
/// Only resources whose kind the configuration includes become nodes, and
/// only edges between two such nodes are kept.
#[derive(Debug, Default)]
pub struct Hierarchy {
    nodes: BTreeMap<String, HierarchyNode>,
}

impl Hierarchy {
    pub fn build(
        graph: &ConceptGraph,
        config: &BrowseConfiguration,
        language: &LanguagePreference,
    ) -> Self {
        let of_interest = |iri: &String| {
            graph
                .get(iri)
                .is_some_and(|r| config.includes_kind(r.kind))
        };

        let mut nodes: BTreeMap<String, HierarchyNode> = graph
            .resources()
            .filter(|r| config.includes_kind(r.kind))
            .map(|r| {
                let mut children: BTreeSet<String> =
                    r.narrower.iter().filter(|&i| of_interest(i)).cloned().collect();
                if r.kind == ResourceKind::ConceptScheme {
                    children.extend(r.has_top_concept.iter().filter(|&i| of_interest(i)).cloned());
                }
                if r.kind.is_collection() {
                    children.extend(r.members.iter().filter(|&i| of_interest(i)).cloned());
                }
                let node = HierarchyNode {
                    iri: r.iri.clone(),
                    kind: r.kind,
                    label: language.select(&r.pref_labels).map(str::to_string),
                    definition: language.select(&r.definitions).map(str::to_string),
                    notation: r.notation().map(str::to_string),
                    children,
                    parents: BTreeSet::new(),
                };
                (r.iri.clone(), node)
            })
            .collect();

        if config.include_concept_schemes {
            for concept in graph.by_kind(ResourceKind::Concept) {
                if concept.broader.iter().any(of_interest) {
                    continue;
                }
                for scheme in &concept.in_scheme {
                    if let Some(node) = nodes.get_mut(scheme) {
                        if node.kind == ResourceKind::ConceptScheme {
                            node.children.insert(concept.iri.clone());
                        }
                    }
                }
            }
        }

        let edges: Vec<(String, String)> = nodes
            .values()
            .flat_map(|n| n.children.iter().map(move |c| (n.iri.clone(), c.clone())))
            .collect();
        for (parent, child) in edges {
            if let Some(node) = nodes.get_mut(&child) {
                node.parents.insert(parent);
            }
        }

        tracing::debug!("hierarchy has {} nodes of interest", nodes.len());
        Self { nodes }
    }

    pub fn get(&self, iri: &str) -> Option<&HierarchyNode> {
        self.nodes.get(iri)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node IRIs in IRI order.
    pub fn iris(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &HierarchyNode> {
        self.nodes.values()
    }

    /// Nodes with no parent of interest.
    pub fn roots(&self) -> Vec<&str> {
        self.nodes
            .values()
            .filter(|n| n.parents.is_empty())
            .map(|n| n.iri.as_str())
            .collect()
    }

    /// The children of `iri`, unordered. Unknown IRIs have no children.
    pub fn children(&self, iri: &str) -> Vec<&str> {
        self.nodes
            .get(iri)
            .map(|n| n.children.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

// --- tests -------------------------------------------------------------------
