//! Spanning-forest construction over a [`Hierarchy`].
//!
//! The builder runs a depth-first traversal from every root, using an
//! explicit stack. The first time a node is reached it becomes a full node
//! with children; every later arrival becomes a reference node that carries
//! the same display attributes but can never hold children. Reaching a node
//! that is still on the active path means a true cycle, as opposed to mere
//! polyhierarchy.

use std::collections::{BTreeSet, HashSet};

use crate::graph::Hierarchy;
use crate::order::OrderCalculator;
use crate::types::ResourceKind;

/// The kind of resource a forest node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Concept,
    ConceptScheme,
    UnorderedCollection,
    OrderedCollection,
}

impl NodeType {
    /// `None` for kinds that never appear in a forest.
    pub fn for_kind(kind: ResourceKind) -> Option<Self> {
        match kind {
            ResourceKind::Concept => Some(NodeType::Concept),
            ResourceKind::ConceptScheme => Some(NodeType::ConceptScheme),
            ResourceKind::Collection => Some(NodeType::UnorderedCollection),
            ResourceKind::OrderedCollection => Some(NodeType::OrderedCollection),
            ResourceKind::Other => None,
        }
    }

    /// Wire name of a full node of this type.
    pub fn name(self) -> &'static str {
        match self {
            NodeType::Concept => "concept",
            NodeType::ConceptScheme => "concept_scheme",
            NodeType::UnorderedCollection => "unordered_collection",
            NodeType::OrderedCollection => "ordered_collection",
        }
    }

    /// Wire name of a reference node of this type.
    pub fn reference_name(self) -> &'static str {
        match self {
            NodeType::Concept => "concept_ref",
            NodeType::ConceptScheme => "concept_scheme_ref",
            NodeType::UnorderedCollection => "unordered_collection_ref",
            NodeType::OrderedCollection => "ordered_collection_ref",
        }
    }
}

/// Display attributes shared by full and reference nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSummary {
    pub node_type: NodeType,
    pub iri: String,
    pub label: Option<String>,
    pub definition: Option<String>,
    pub notation: Option<String>,
    pub notation_sort_order: Option<usize>,
    pub label_sort_order: Option<usize>,
}

/// A node that owns its subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct FullNode {
    pub summary: NodeSummary,
    pub children: Vec<ForestNode>,
}

impl Drop for FullNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let ForestNode::Full(mut full) = node {
                pending.append(&mut full.children);
            }
        }
    }
}

/// One node of the output forest.
///
/// For any IRI there is exactly one [`ForestNode::Full`] in a forest; every
/// other occurrence is a [`ForestNode::Reference`].
#[derive(Debug, Clone, PartialEq)]
pub enum ForestNode {
    Full(FullNode),
    Reference(NodeSummary),
}

impl ForestNode {
    pub fn summary(&self) -> &NodeSummary {
        match self {
            ForestNode::Full(full) => &full.summary,
            ForestNode::Reference(summary) => summary,
        }
    }

    pub(crate) fn summary_mut(&mut self) -> &mut NodeSummary {
        match self {
            ForestNode::Full(full) => &mut full.summary,
            ForestNode::Reference(summary) => summary,
        }
    }

    pub fn iri(&self) -> &str {
        &self.summary().iri
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, ForestNode::Reference(_))
    }

    /// Children of a full node; always empty for a reference.
    pub fn children(&self) -> &[ForestNode] {
        match self {
            ForestNode::Full(full) => &full.children,
            ForestNode::Reference(_) => &[],
        }
    }
}

/// The result of one forest build.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Forest {
    pub roots: Vec<ForestNode>,
    /// Some node was reachable from itself, or some nodes were unreachable
    /// from every root.
    pub cycle_detected: bool,
    /// No reference node was emitted.
    pub only_tree_edges: bool,
}

impl Forest {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Traversal bookkeeping for one build; never shared between builds.
struct TraversalState<'h> {
    unvisited: BTreeSet<&'h str>,
    active: HashSet<&'h str>,
    cycle_detected: bool,
    only_tree_edges: bool,
}

impl<'h> TraversalState<'h> {
    fn new(nodes: impl Iterator<Item = &'h str>) -> Self {
        Self {
            unvisited: nodes.collect(),
            active: HashSet::new(),
            cycle_detected: false,
            only_tree_edges: true,
        }
    }

    fn enter(&mut self, iri: &'h str) {
        self.unvisited.remove(iri);
        self.active.insert(iri);
    }

    fn leave(&mut self, iri: &str) {
        self.active.remove(iri);
    }
}

struct Slot<'h> {
    iri: &'h str,
    reference: bool,
    children: Vec<usize>,
}

struct Frame<'h> {
    iri: &'h str,
    slot: usize,
    children: Vec<&'h str>,
    next: usize,
}

/// Builds the spanning forest of a [`Hierarchy`], visiting siblings in the
/// order given by an [`OrderCalculator`].
pub struct ForestBuilder<'h, 'o> {
    hierarchy: &'h Hierarchy,
    order: &'o OrderCalculator<'h>,
}

impl<'h, 'o> ForestBuilder<'h, 'o> {
    pub fn new(hierarchy: &'h Hierarchy, order: &'o OrderCalculator<'h>) -> Self {
        Self { hierarchy, order }
    }

    /// Run the traversal. Always completes, even when a cycle is found; the
    /// caller decides whether a cyclic forest is usable.
    ///
    /// Sort ranks are not assigned here; see
    /// [`OrderCalculator::assign_ranks`].
    pub fn build(&self) -> Forest {
        let mut state = TraversalState::new(self.hierarchy.iris());
        let mut slots: Vec<Slot<'h>> = Vec::new();
        let mut root_slots: Vec<usize> = Vec::new();

        let mut roots = self.hierarchy.roots();
        self.order.sort(&mut roots);
        tracing::debug!("{} root(s) among {} nodes", roots.len(), self.hierarchy.len());

        for root in roots {
            if state.unvisited.contains(root) {
                root_slots.push(self.visit(root, &mut state, &mut slots));
            }
        }

        if !state.unvisited.is_empty() {
            // Whatever is left has a parent but no path from any root.
            state.cycle_detected = true;
            tracing::warn!(
                "{} node(s) unreachable from any root; promoting them to roots",
                state.unvisited.len()
            );
            let mut leftovers: Vec<&'h str> = state.unvisited.iter().copied().collect();
            self.order.sort(&mut leftovers);
            for iri in leftovers {
                if state.unvisited.contains(iri) {
                    root_slots.push(self.visit(iri, &mut state, &mut slots));
                }
            }
        }

        if state.cycle_detected {
            tracing::warn!("cycle detected in the broader/narrower hierarchy");
        }

        Forest {
            roots: self.materialize(slots, &root_slots),
            cycle_detected: state.cycle_detected,
            only_tree_edges: state.only_tree_edges,
        }
    }

    fn visit(
        &self,
        root: &'h str,
        state: &mut TraversalState<'h>,
        slots: &mut Vec<Slot<'h>>,
    ) -> usize {
        let root_slot = push_slot(slots, root, false);
        state.enter(root);
        let mut stack = vec![Frame {
            iri: root,
            slot: root_slot,
            children: self.sorted_children(root),
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(&child) = frame.children.get(frame.next) else {
                state.leave(frame.iri);
                stack.pop();
                continue;
            };
            frame.next += 1;
            let parent_slot = frame.slot;

            if state.unvisited.contains(child) {
                let slot = push_slot(slots, child, false);
                slots[parent_slot].children.push(slot);
                state.enter(child);
                stack.push(Frame {
                    iri: child,
                    slot,
                    children: self.sorted_children(child),
                    next: 0,
                });
            } else {
                state.only_tree_edges = false;
                if state.active.contains(child) {
                    tracing::debug!("back edge to {child}");
                    state.cycle_detected = true;
                }
                let slot = push_slot(slots, child, true);
                slots[parent_slot].children.push(slot);
            }
        }

        root_slot
    }

    fn sorted_children(&self, iri: &str) -> Vec<&'h str> {
        let mut children = self.hierarchy.children(iri);
        self.order.sort(&mut children);
        children
    }

    // Children always occupy higher slots than their parent, so building
    // from the last slot backwards sees every child before its parent.
    fn materialize(&self, slots: Vec<Slot<'h>>, root_slots: &[usize]) -> Vec<ForestNode> {
        let mut built: Vec<Option<ForestNode>> = Vec::with_capacity(slots.len());
        built.resize_with(slots.len(), || None);

        for (idx, slot) in slots.iter().enumerate().rev() {
            let Some(summary) = self.summary(slot.iri) else {
                continue;
            };
            let node = if slot.reference {
                ForestNode::Reference(summary)
            } else {
                let children = slot.children.iter().filter_map(|&c| built[c].take()).collect();
                ForestNode::Full(FullNode { summary, children })
            };
            built[idx] = Some(node);
        }

        root_slots.iter().filter_map(|&i| built[i].take()).collect()
    }

    fn summary(&self, iri: &str) -> Option<NodeSummary> {
        let node = self.hierarchy.get(iri)?;
        Some(NodeSummary {
            node_type: NodeType::for_kind(node.kind)?,
            iri: node.iri.clone(),
            label: node.label.clone(),
            definition: node.definition.clone(),
            notation: node.notation.clone(),
            notation_sort_order: None,
            label_sort_order: None,
        })
    }
}

fn push_slot<'h>(slots: &mut Vec<Slot<'h>>, iri: &'h str, reference: bool) -> usize {
    slots.push(Slot {
        iri,
        reference,
        children: Vec::new(),
    });
    slots.len() - 1
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BrowseConfiguration;
    use crate::graph::ConceptGraph;
    use crate::language::LanguagePreference;
    use crate::normalize::normalize_relations;
    use crate::types::{LangString, Resource};

    /// Concepts labelled with their own IRI, linked by `narrower` only.
    fn graph(nodes: &[&str], narrower: &[(&str, &str)]) -> ConceptGraph {
        let mut g = ConceptGraph::new();
        for iri in nodes {
            let r = g.get_or_insert(iri);
            r.kind = ResourceKind::Concept;
            r.pref_labels.insert(LangString::new(*iri, Some("en")));
        }
        for (parent, child) in narrower {
            g.get_or_insert(parent).narrower.insert(child.to_string());
        }
        normalize_relations(&mut g);
        g
    }

    /// Every node in pre-order, paired with its parent's IRI.
    fn walk(forest: &Forest) -> Vec<(Option<&str>, &ForestNode)> {
        let mut out = Vec::new();
        let mut stack: Vec<(Option<&str>, &ForestNode)> =
            forest.roots.iter().rev().map(|n| (None, n)).collect();
        while let Some((parent, node)) = stack.pop() {
            out.push((parent, node));
            for child in node.children().iter().rev() {
                stack.push((Some(node.iri()), child));
            }
        }
        out
    }

    fn find_full<'f>(forest: &'f Forest, iri: &str) -> Option<&'f ForestNode> {
        walk(forest)
            .into_iter()
            .map(|(_, n)| n)
            .find(|n| !n.is_reference() && n.iri() == iri)
    }

    fn reference_count(forest: &Forest, iri: &str) -> usize {
        walk(forest)
            .into_iter()
            .filter(|(_, n)| n.is_reference() && n.iri() == iri)
            .count()
    }

    fn build(g: &ConceptGraph) -> Forest {
        let config = BrowseConfiguration::default();
        let h = Hierarchy::build(g, &config, &LanguagePreference::for_primary("en"));
        let order = OrderCalculator::new(&h, &config);
        let mut forest = ForestBuilder::new(&h, &order).build();
        order.assign_ranks(&mut forest.roots);
        forest
    }

    #[test]
    fn simple_chain() {
        let forest = build(&graph(&["A", "B", "C"], &[("A", "B"), ("B", "C")]));
        assert!(!forest.cycle_detected);
        assert!(forest.only_tree_edges);
        assert_eq!(forest.roots.len(), 1);
        let a = &forest.roots[0];
        assert_eq!(a.iri(), "A");
        let b = &a.children()[0];
        assert_eq!(b.iri(), "B");
        assert_eq!(b.children()[0].iri(), "C");
        assert!(walk(&forest).iter().all(|(_, n)| !n.is_reference()));
    }

    #[test]
    fn polyhierarchy_yields_one_full_node_and_a_reference() {
        let forest = build(&graph(&["A", "B", "D"], &[("A", "B"), ("D", "B")]));
        assert!(!forest.cycle_detected);
        assert!(!forest.only_tree_edges);
        assert_eq!(forest.roots.len(), 2);
        assert!(find_full(&forest, "B").is_some());
        assert_eq!(reference_count(&forest, "B"), 1);
        // A sorts first, so it gets the full node
        assert!(!forest.roots[0].children()[0].is_reference());
        assert!(forest.roots[1].children()[0].is_reference());
    }

    #[test]
    fn two_node_cycle() {
        let forest = build(&graph(&["A", "B"], &[("A", "B"), ("B", "A")]));
        assert!(forest.cycle_detected);
        // A is promoted (smallest label), B under it, back edge to A as a reference
        assert_eq!(forest.roots.len(), 1);
        assert_eq!(find_full(&forest, "A").map(|n| n.iri()), Some("A"));
        assert_eq!(reference_count(&forest, "A"), 1);
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let forest = build(&graph(&["A", "R"], &[("R", "A"), ("A", "A")]));
        assert!(forest.cycle_detected);
        assert_eq!(forest.roots.len(), 1);
        assert_eq!(reference_count(&forest, "A"), 1);
    }

    #[test]
    fn cycle_below_a_root() {
        // R → A → B → A: R is a genuine root, the cycle is caught on the active path
        let forest = build(&graph(
            &["R", "A", "B"],
            &[("R", "A"), ("A", "B"), ("B", "A")],
        ));
        assert!(forest.cycle_detected);
        assert_eq!(forest.roots.len(), 1);
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let forest = build(&graph(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")],
        ));
        assert!(!forest.cycle_detected);
        assert!(!forest.only_tree_edges);
        assert_eq!(reference_count(&forest, "D"), 1);
        assert!(find_full(&forest, "D").is_some());
    }

    #[test]
    fn every_iri_has_exactly_one_full_node() {
        let forest = build(&graph(
            &["A", "B", "C", "D", "E"],
            &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D"), ("D", "E"), ("C", "E")],
        ));
        for iri in ["A", "B", "C", "D", "E"] {
            let full = walk(&forest)
                .into_iter()
                .filter(|(_, n)| !n.is_reference() && n.iri() == iri)
                .count();
            assert_eq!(full, 1, "{iri}");
        }
    }

    #[test]
    fn references_never_have_children() {
        let forest = build(&graph(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("D", "B"), ("B", "C")],
        ));
        for (_, node) in walk(&forest) {
            if node.is_reference() {
                assert!(node.children().is_empty());
            }
        }
    }

    #[test]
    fn ranks_assigned_per_sibling_group() {
        let forest = build(&graph(
            &["R", "z", "y", "x"],
            &[("R", "z"), ("R", "y"), ("R", "x")],
        ));
        let children = forest.roots[0].children();
        let order: Vec<_> = children.iter().map(|n| n.iri()).collect();
        assert_eq!(order, vec!["x", "y", "z"]);
        let ranks: Vec<_> = children.iter().map(|n| n.summary().label_sort_order).collect();
        assert_eq!(ranks, vec![Some(0), Some(1), Some(2)]);
        assert_eq!(forest.roots[0].summary().label_sort_order, Some(0));
        assert_eq!(children[0].summary().notation_sort_order, None);
    }

    #[test]
    fn deep_chain_does_not_recurse() {
        let names: Vec<String> = (0..20_000).map(|i| format!("n{i:05}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let edges: Vec<(&str, &str)> = refs.windows(2).map(|w| (w[0], w[1])).collect();
        let forest = build(&graph(&refs, &edges));
        assert!(!forest.cycle_detected);
        assert_eq!(walk(&forest).len(), 20_000);
        assert_eq!(forest.roots.len(), 1);
        drop(forest);
    }

    #[test]
    fn empty_hierarchy() {
        let forest = build(&ConceptGraph::new());
        assert!(forest.is_empty());
        assert!(!forest.cycle_detected);
        assert!(forest.only_tree_edges);
    }

    #[test]
    fn node_type_names() {
        assert_eq!(NodeType::Concept.name(), "concept");
        assert_eq!(NodeType::Concept.reference_name(), "concept_ref");
        assert_eq!(NodeType::for_kind(ResourceKind::Other), None);
    }
}
