//! Sibling ordering: label order and notation order.
//!
//! Both orders are total. Ties are broken by raw IRI bytes so the order of
//! input statements never shows through.
//!
//! Notation order is only available when the configuration allows it and
//! every notation in the hierarchy parses in the declared format. A single
//! unparseable notation disables it for the whole result and is reported as
//! a [`Diagnostic`].

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{BrowseConfiguration, NotationFormat};
use crate::forest::ForestNode;
use crate::graph::Hierarchy;
use crate::outcome::Diagnostic;

/// A notation parsed according to its declared format.
#[derive(Debug, Clone, PartialEq)]
pub enum NotationKey {
    Alpha(String),
    /// Each segment holds its digits with leading zeros stripped, so longer
    /// means larger and equal lengths compare lexicographically.
    Dotted(Vec<String>),
    Float(f64),
}

impl NotationKey {
    /// Parse `notation` in `format`. Returns `None` when it does not conform.
    pub fn parse(notation: &str, format: NotationFormat) -> Option<Self> {
        match format {
            NotationFormat::Alpha => Some(NotationKey::Alpha(notation.to_string())),
            NotationFormat::Dotted => {
                let notation = notation.trim();
                if !DOTTED_RE.is_match(notation) {
                    return None;
                }
                let segments = notation
                    .split('.')
                    .map(|s| {
                        let stripped = s.trim_start_matches('0');
                        if stripped.is_empty() { "0" } else { stripped }.to_string()
                    })
                    .collect();
                Some(NotationKey::Dotted(segments))
            }
            NotationFormat::Float => {
                let value: f64 = notation.trim().parse().ok()?;
                // "inf", "infinity" and "NaN" parse but are not notations
                if !value.is_finite() {
                    return None;
                }
                Some(NotationKey::Float(value))
            }
        }
    }

    fn compare(&self, other: &NotationKey) -> Ordering {
        match (self, other) {
            (NotationKey::Alpha(a), NotationKey::Alpha(b)) => a.as_bytes().cmp(b.as_bytes()),
            (NotationKey::Dotted(a), NotationKey::Dotted(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    let ord = x.len().cmp(&y.len()).then_with(|| x.cmp(y));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (NotationKey::Float(a), NotationKey::Float(b)) => a.total_cmp(b),
            // Keys in one calculator always share a format.
            _ => Ordering::Equal,
        }
    }
}

/// `^\d+(\.\d+)*$`
static DOTTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)*$").expect("invalid dotted notation regex"));

#[derive(Debug)]
enum NotationOrdering {
    /// Not requested by the configuration.
    Off,
    /// Requested, but at least one notation failed to parse.
    Invalid,
    Active(HashMap<String, NotationKey>),
}

/// Per-node sort keys, computed once for a [`Hierarchy`].
#[derive(Debug)]
pub struct OrderCalculator<'h> {
    hierarchy: &'h Hierarchy,
    folded_labels: HashMap<&'h str, String>,
    notation: NotationOrdering,
    prefer_notation: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'h> OrderCalculator<'h> {
    pub fn new(hierarchy: &'h Hierarchy, config: &BrowseConfiguration) -> Self {
        let folded_labels = hierarchy
            .nodes()
            .filter_map(|n| n.label.as_deref().map(|l| (n.iri.as_str(), l.to_lowercase())))
            .collect();

        let mut diagnostics = Vec::new();
        let notation = match (config.may_sort_by_notation, config.notation_format) {
            (true, Some(format)) => {
                let mut keys = HashMap::new();
                for node in hierarchy.nodes() {
                    let Some(notation) = node.notation.as_deref() else {
                        continue;
                    };
                    match NotationKey::parse(notation, format) {
                        Some(key) => {
                            keys.insert(node.iri.clone(), key);
                        }
                        None => diagnostics.push(Diagnostic::UnparseableNotation {
                            iri: node.iri.clone(),
                            notation: notation.to_string(),
                            format,
                        }),
                    }
                }
                if diagnostics.is_empty() {
                    NotationOrdering::Active(keys)
                } else {
                    tracing::warn!(
                        "{} notation(s) do not match {format}; notation ordering disabled",
                        diagnostics.len()
                    );
                    NotationOrdering::Invalid
                }
            }
            _ => NotationOrdering::Off,
        };

        let prefer_notation =
            config.default_sort_by_notation && matches!(notation, NotationOrdering::Active(_));

        Self {
            hierarchy,
            folded_labels,
            notation,
            prefer_notation,
            diagnostics,
        }
    }

    /// Whether sibling groups get a notation rank.
    pub fn notation_active(&self) -> bool {
        matches!(self.notation, NotationOrdering::Active(_))
    }

    /// Whether notation order was requested but had to be abandoned.
    pub fn notation_invalidated(&self) -> bool {
        matches!(self.notation, NotationOrdering::Invalid)
    }

    /// Whether children are materialised in notation order rather than label order.
    pub fn sorts_by_notation(&self) -> bool {
        self.prefer_notation
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Label order: labelled nodes first, by case-folded label (raw label
    /// breaks case-only ties); unlabelled nodes after, by IRI.
    pub fn compare_by_label(&self, a: &str, b: &str) -> Ordering {
        let label = |iri: &str| {
            self.hierarchy
                .get(iri)
                .and_then(|n| n.label.as_deref())
                .zip(self.folded_labels.get(iri))
        };
        match (label(a), label(b)) {
            (Some((raw_a, folded_a)), Some((raw_b, folded_b))) => folded_a
                .cmp(folded_b)
                .then_with(|| raw_a.cmp(raw_b))
                .then_with(|| a.as_bytes().cmp(b.as_bytes())),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.as_bytes().cmp(b.as_bytes()),
        }
    }

    /// Notation order: nodes with a notation first, by parsed notation;
    /// ties and notation-less nodes fall back to label order. Equivalent to
    /// label order when notation ordering is not active.
    pub fn compare_by_notation(&self, a: &str, b: &str) -> Ordering {
        let NotationOrdering::Active(keys) = &self.notation else {
            return self.compare_by_label(a, b);
        };
        match (keys.get(a), keys.get(b)) {
            (Some(x), Some(y)) => x.compare(y).then_with(|| self.compare_by_label(a, b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.compare_by_label(a, b),
        }
    }

    /// The order children are visited and materialised in.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        if self.prefer_notation {
            self.compare_by_notation(a, b)
        } else {
            self.compare_by_label(a, b)
        }
    }

    pub fn sort(&self, iris: &mut [&str]) {
        iris.sort_by(|a, b| self.compare(a, b));
    }

    /// Give every sibling group its 0-based `labelSortOrder` (and
    /// `notationSortOrder` when notation ordering is active), then put each
    /// group in the materialised order.
    pub fn assign_ranks(&self, roots: &mut Vec<ForestNode>) {
        let mut groups: Vec<&mut Vec<ForestNode>> = vec![roots];
        while let Some(group) = groups.pop() {
            self.rank_group(group);
            for node in group {
                if let ForestNode::Full(full) = node {
                    groups.push(&mut full.children);
                }
            }
        }
    }

    fn rank_group(&self, group: &mut Vec<ForestNode>) {
        let label_ranks = self.ranks(group, |a, b| self.compare_by_label(a, b));
        let notation_ranks = self
            .notation_active()
            .then(|| self.ranks(group, |a, b| self.compare_by_notation(a, b)));

        for (idx, node) in group.iter_mut().enumerate() {
            let summary = node.summary_mut();
            summary.label_sort_order = Some(label_ranks[idx]);
            summary.notation_sort_order = notation_ranks.as_ref().map(|r| r[idx]);
        }

        if self.prefer_notation {
            group.sort_by_key(|n| n.summary().notation_sort_order);
        } else {
            group.sort_by_key(|n| n.summary().label_sort_order);
        }
    }

    fn ranks(&self, group: &[ForestNode], cmp: impl Fn(&str, &str) -> Ordering) -> Vec<usize> {
        let mut by_rank: Vec<usize> = (0..group.len()).collect();
        by_rank.sort_by(|&a, &b| cmp(group[a].iri(), group[b].iri()));
        let mut ranks = vec![0; group.len()];
        for (rank, idx) in by_rank.into_iter().enumerate() {
            ranks[idx] = rank;
        }
        ranks
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ConceptGraph;
    use crate::language::LanguagePreference;
    use crate::types::{LangString, Resource, ResourceKind};

    fn hierarchy(
        nodes: &[(&str, Option<&str>, Option<&str>)],
        config: &BrowseConfiguration,
    ) -> Hierarchy {
        let g = ConceptGraph::from_resources(nodes.iter().map(|(iri, label, notation)| {
            let mut r = Resource::new(*iri);
            r.kind = ResourceKind::Concept;
            if let Some(l) = label {
                r.pref_labels.insert(LangString::new(*l, Some("en")));
            }
            if let Some(n) = notation {
                r.notations.insert(n.to_string());
            }
            r
        }));
        Hierarchy::build(&g, config, &LanguagePreference::for_primary("en"))
    }

    fn sorted<'a>(calc: &OrderCalculator, iris: &[&'a str]) -> Vec<&'a str> {
        let mut v = iris.to_vec();
        calc.sort(&mut v);
        v
    }

    fn notation_config(format: NotationFormat) -> BrowseConfiguration {
        BrowseConfiguration {
            may_sort_by_notation: true,
            default_sort_by_notation: true,
            notation_format: Some(format),
            ..Default::default()
        }
    }

    #[test]
    fn labels_before_unlabelled() {
        let config = BrowseConfiguration::default();
        let h = hierarchy(
            &[
                ("http://ex/d", None, None),
                ("http://ex/a", Some("Label 2"), None),
                ("http://ex/c", None, None),
                ("http://ex/b", Some("Label 1"), None),
            ],
            &config,
        );
        let calc = OrderCalculator::new(&h, &config);
        assert_eq!(
            sorted(&calc, &["http://ex/d", "http://ex/a", "http://ex/c", "http://ex/b"]),
            vec!["http://ex/b", "http://ex/a", "http://ex/c", "http://ex/d"]
        );
    }

    #[test]
    fn label_comparison_ignores_case() {
        let config = BrowseConfiguration::default();
        let h = hierarchy(
            &[("x", Some("banana"), None), ("y", Some("Apple"), None), ("z", Some("cherry"), None)],
            &config,
        );
        let calc = OrderCalculator::new(&h, &config);
        assert_eq!(sorted(&calc, &["x", "y", "z"]), vec!["y", "x", "z"]);
    }

    #[test]
    fn dotted_notation_is_numeric() {
        let key = |s| NotationKey::parse(s, NotationFormat::Dotted).unwrap();
        assert_eq!(key("1.9").compare(&key("1.10")), Ordering::Less);
        assert_eq!(key("1").compare(&key("1.1")), Ordering::Less);
        assert_eq!(key("1.1.1").compare(&key("2")), Ordering::Less);
        assert_eq!(key("01.2").compare(&key("1.2")), Ordering::Equal);
        assert_eq!(key("100").compare(&key("99")), Ordering::Greater);
    }

    #[test]
    fn dotted_rejects_malformed() {
        assert!(NotationKey::parse("1..2", NotationFormat::Dotted).is_none());
        assert!(NotationKey::parse("1.a", NotationFormat::Dotted).is_none());
        assert!(NotationKey::parse("", NotationFormat::Dotted).is_none());
        assert!(NotationKey::parse("1.", NotationFormat::Dotted).is_none());
    }

    #[test]
    fn float_notation() {
        let key = |s| NotationKey::parse(s, NotationFormat::Float).unwrap();
        assert_eq!(key("2.5").compare(&key("10")), Ordering::Less);
        assert_eq!(key("-1").compare(&key("0")), Ordering::Less);
        assert!(NotationKey::parse("NaN", NotationFormat::Float).is_none());
        assert!(NotationKey::parse("one", NotationFormat::Float).is_none());
    }

    #[test]
    fn float_notation_must_be_finite() {
        for s in ["inf", "-inf", "+infinity", "Infinity", "1e400"] {
            assert!(NotationKey::parse(s, NotationFormat::Float).is_none(), "{s}");
        }
        let key = |s| NotationKey::parse(s, NotationFormat::Float).unwrap();
        assert_eq!(key("1e3").compare(&key("999")), Ordering::Greater);
        assert_eq!(key("+1e3").compare(&key("1000")), Ordering::Equal);
    }

    #[test]
    fn infinite_float_disables_notation_ordering() {
        let config = notation_config(NotationFormat::Float);
        let h = hierarchy(
            &[("a", Some("A"), Some("inf")), ("b", Some("B"), Some("1"))],
            &config,
        );
        let calc = OrderCalculator::new(&h, &config);
        assert!(calc.notation_invalidated());
        assert_eq!(calc.diagnostics().len(), 1);
    }

    #[test]
    fn alpha_notation_is_bytewise() {
        let key = |s| NotationKey::parse(s, NotationFormat::Alpha).unwrap();
        assert_eq!(key("B").compare(&key("a")), Ordering::Less);
        assert_eq!(key("10").compare(&key("9")), Ordering::Less);
    }

    #[test]
    fn dotted_sibling_order() {
        let config = notation_config(NotationFormat::Dotted);
        let h = hierarchy(
            &[
                ("a", Some("A"), Some("2")),
                ("b", Some("B"), Some("1")),
                ("c", Some("C"), Some("1.1")),
                ("d", Some("D"), Some("1.1.1")),
                ("e", Some("E"), None),
            ],
            &config,
        );
        let calc = OrderCalculator::new(&h, &config);
        assert!(calc.notation_active());
        assert!(calc.sorts_by_notation());
        assert_eq!(sorted(&calc, &["a", "b", "c", "d", "e"]), vec!["b", "c", "d", "a", "e"]);
    }

    #[test]
    fn one_bad_float_disables_notation_ordering() {
        let config = notation_config(NotationFormat::Float);
        let h = hierarchy(
            &[
                ("a", Some("A"), Some("2.0")),
                ("b", Some("B"), Some("1.5")),
                ("c", Some("C"), Some("x")),
            ],
            &config,
        );
        let calc = OrderCalculator::new(&h, &config);
        assert!(!calc.notation_active());
        assert!(calc.notation_invalidated());
        assert!(!calc.sorts_by_notation());
        assert_eq!(calc.diagnostics().len(), 1);
        // falls back to label order
        assert_eq!(sorted(&calc, &["c", "b", "a"]), vec!["a", "b", "c"]);
    }

    #[test]
    fn notation_off_without_flag() {
        let config = BrowseConfiguration {
            notation_format: Some(NotationFormat::Alpha),
            ..Default::default()
        };
        let h = hierarchy(&[("a", None, Some("Q"))], &config);
        let calc = OrderCalculator::new(&h, &config);
        assert!(!calc.notation_active());
        assert!(!calc.notation_invalidated());
    }
}
