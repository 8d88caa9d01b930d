//! The versioned JSON tree document.
//!
//! ```json
//! {
//!   "format": "3",
//!   "language": "en",
//!   "maySortByNotation": true,
//!   "notationFormat": "notationDotted",
//!   "defaultSortByNotation": false,
//!   "defaultDisplayNotation": true,
//!   "mayResolveResources": false,
//!   "forest": [
//!     { "type": "concept", "iri": "http://example.org/a", "label": "A",
//!       "notation": "1", "notationSortOrder": 0, "labelSortOrder": 0,
//!       "children": [ { "type": "concept_ref", "iri": "http://example.org/b", ... } ] }
//!   ]
//! }
//! ```
//!
//! Assembly is pure marshalling of an already ordered [`Forest`]. Building,
//! dropping, and writing a document never recurse, so hierarchy depth is
//! bounded by memory rather than by the stack. Reading a document back goes
//! through `serde_json` and is subject to its nesting limit.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::config::{BrowseConfiguration, NotationFormat};
use crate::forest::{Forest, ForestNode};
use crate::outcome::TransformError;

/// Schema version of [`TreeDocument`].
pub const FORMAT_VERSION: &str = "3";

/// One node of the serialised forest. `children` is present only on full nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentNode {
    #[serde(rename = "type")]
    pub node_type: String,
    pub iri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notation_sort_order: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_sort_order: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DocumentNode>>,
}

impl DocumentNode {
    pub fn is_reference(&self) -> bool {
        self.children.is_none()
    }

    /// The node's own attributes; a full node starts with no children.
    fn detached(node: &ForestNode) -> Self {
        let summary = node.summary();
        let (node_type, children) = match node {
            ForestNode::Full(_) => (summary.node_type.name(), Some(Vec::new())),
            ForestNode::Reference(_) => (summary.node_type.reference_name(), None),
        };
        Self {
            node_type: node_type.to_string(),
            iri: summary.iri.clone(),
            label: summary.label.clone(),
            definition: summary.definition.clone(),
            notation: summary.notation.clone(),
            notation_sort_order: summary.notation_sort_order,
            label_sort_order: summary.label_sort_order,
            children,
        }
    }

    fn fields(&self) -> NodeFields<'_> {
        NodeFields {
            node_type: &self.node_type,
            iri: &self.iri,
            label: self.label.as_deref(),
            definition: self.definition.as_deref(),
            notation: self.notation.as_deref(),
            notation_sort_order: self.notation_sort_order,
            label_sort_order: self.label_sort_order,
        }
    }
}

impl Drop for DocumentNode {
    fn drop(&mut self) {
        let mut pending = self.children.take().unwrap_or_default();
        while let Some(mut node) = pending.pop() {
            if let Some(children) = node.children.take() {
                pending.extend(children);
            }
        }
    }
}

/// The complete output document for one vocabulary version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeDocument {
    pub format: String,
    pub language: String,
    pub may_sort_by_notation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notation_format: Option<NotationFormat>,
    pub default_sort_by_notation: bool,
    pub default_display_notation: bool,
    pub may_resolve_resources: bool,
    pub forest: Vec<DocumentNode>,
}

impl TreeDocument {
    /// Package an ordered forest with its browse metadata.
    ///
    /// `notation_sortable` is false when notation ordering was requested but
    /// abandoned; the document then advertises no notation sorting at all.
    pub fn assemble(
        config: &BrowseConfiguration,
        language: &str,
        forest: &Forest,
        notation_sortable: bool,
    ) -> Self {
        let may_sort = config.may_sort_by_notation && notation_sortable;
        Self {
            format: FORMAT_VERSION.to_string(),
            language: language.to_string(),
            may_sort_by_notation: may_sort,
            notation_format: config.notation_format,
            default_sort_by_notation: config.default_sort_by_notation && may_sort,
            default_display_notation: config.default_display_notation,
            may_resolve_resources: config.may_resolve_resources,
            forest: document_forest(&forest.roots),
        }
    }

    /// Total number of nodes, full and reference.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&DocumentNode> = self.forest.iter().collect();
        while let Some(node) = stack.pop() {
            count += 1;
            if let Some(children) = &node.children {
                stack.extend(children);
            }
        }
        count
    }

    pub fn to_json(&self) -> Result<String, TransformError> {
        let mut buf = Vec::new();
        self.emit(&mut buf, false)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn to_json_pretty(&self) -> Result<String, TransformError> {
        let mut buf = Vec::new();
        self.emit(&mut buf, true)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Serialise to `writer` and flush.
    pub fn write_to(&self, mut writer: impl Write) -> Result<(), TransformError> {
        self.emit(&mut writer, false)?;
        writer.flush()?;
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, TransformError> {
        Ok(serde_json::from_str(json)?)
    }

    // Header and node attributes go through serde_json; the nesting of
    // `forest` and `children` is written from an explicit stack. The output
    // matches `serde_json::to_string` / `to_string_pretty` of the derived impl.
    fn emit(&self, out: &mut impl Write, pretty: bool) -> Result<(), TransformError> {
        let header = encode(&self.header(), pretty, 0)?;
        out.write_all(open_object(&header).as_bytes())?;
        write_array_key(out, "forest", pretty, 2)?;

        if self.forest.is_empty() {
            out.write_all(b"]")?;
            newline(out, pretty, 0)?;
            out.write_all(b"}")?;
            return Ok(());
        }

        let mut stack: Vec<Step<'_>> = vec![Step::Close(0)];
        stack.extend(self.forest.iter().enumerate().rev().map(|(i, n)| Step::Node(n, 1, i == 0)));

        while let Some(step) = stack.pop() {
            match step {
                Step::Node(node, depth, first) => {
                    let indent = 4 * depth;
                    if !first {
                        out.write_all(b",")?;
                    }
                    newline(out, pretty, indent)?;
                    let fields = encode(&node.fields(), pretty, indent)?;
                    match &node.children {
                        None => out.write_all(fields.as_bytes())?,
                        Some(children) => {
                            out.write_all(open_object(&fields).as_bytes())?;
                            write_array_key(out, "children", pretty, indent + 2)?;
                            if children.is_empty() {
                                out.write_all(b"]")?;
                                newline(out, pretty, indent)?;
                                out.write_all(b"}")?;
                            } else {
                                stack.push(Step::Close(depth));
                                stack.extend(
                                    children
                                        .iter()
                                        .enumerate()
                                        .rev()
                                        .map(|(i, c)| Step::Node(c, depth + 1, i == 0)),
                                );
                            }
                        }
                    }
                }
                Step::Close(depth) => {
                    // `depth` is the object whose array is closing; 0 is the document
                    newline(out, pretty, if depth == 0 { 2 } else { 4 * depth + 2 })?;
                    out.write_all(b"]")?;
                    newline(out, pretty, if depth == 0 { 0 } else { 4 * depth })?;
                    out.write_all(b"}")?;
                }
            }
        }
        Ok(())
    }

    fn header(&self) -> DocumentHeader<'_> {
        DocumentHeader {
            format: &self.format,
            language: &self.language,
            may_sort_by_notation: self.may_sort_by_notation,
            notation_format: self.notation_format,
            default_sort_by_notation: self.default_sort_by_notation,
            default_display_notation: self.default_display_notation,
            may_resolve_resources: self.may_resolve_resources,
        }
    }
}

/// Convert a forest bottom-up: nodes are listed in pre-order, then built in
/// reverse so every child is complete before its parent takes it.
fn document_forest(roots: &[ForestNode]) -> Vec<DocumentNode> {
    let mut order: Vec<(&ForestNode, Option<usize>)> = Vec::new();
    let mut stack: Vec<(&ForestNode, Option<usize>)> =
        roots.iter().rev().map(|n| (n, None)).collect();
    while let Some((node, parent)) = stack.pop() {
        let idx = order.len();
        order.push((node, parent));
        stack.extend(node.children().iter().rev().map(|c| (c, Some(idx))));
    }

    let mut built: Vec<Option<DocumentNode>> =
        order.iter().map(|(node, _)| Some(DocumentNode::detached(node))).collect();
    let mut forest = Vec::with_capacity(roots.len());

    // Siblings arrive last-first, so each list is reversed once complete.
    for idx in (0..order.len()).rev() {
        let Some(mut node) = built[idx].take() else {
            continue;
        };
        if let Some(children) = node.children.as_mut() {
            children.reverse();
        }
        match order[idx].1 {
            Some(parent) => {
                if let Some(Some(parent)) = built.get_mut(parent) {
                    parent.children.get_or_insert_with(Vec::new).push(node);
                }
            }
            None => forest.push(node),
        }
    }
    forest.reverse();
    forest
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentHeader<'a> {
    format: &'a str,
    language: &'a str,
    may_sort_by_notation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    notation_format: Option<NotationFormat>,
    default_sort_by_notation: bool,
    default_display_notation: bool,
    may_resolve_resources: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeFields<'a> {
    #[serde(rename = "type")]
    node_type: &'a str,
    iri: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    definition: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notation: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notation_sort_order: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    label_sort_order: Option<usize>,
}

enum Step<'a> {
    /// A node at `depth` (roots are 1); the flag marks the first sibling.
    Node(&'a DocumentNode, usize, bool),
    /// End of the array opened by an object at `depth` (0 is the document).
    Close(usize),
}

// --- helpers -----------------------------------------------------------------

/// A flat object, indented so its fields sit under an object opened at `indent`.
/// JSON strings never hold raw newlines, so re-indenting by line is safe.
fn encode<T: Serialize>(value: &T, pretty: bool, indent: usize) -> Result<String, TransformError> {
    if pretty {
        let s = serde_json::to_string_pretty(value)?;
        Ok(s.replace('\n', &format!("\n{}", " ".repeat(indent))))
    } else {
        Ok(serde_json::to_string(value)?)
    }
}

/// Drop the closing brace (and any whitespace before it) of an encoded object.
fn open_object(encoded: &str) -> &str {
    encoded.strip_suffix('}').unwrap_or(encoded).trim_end()
}

fn write_array_key(
    out: &mut impl Write,
    key: &str,
    pretty: bool,
    indent: usize,
) -> std::io::Result<()> {
    if pretty {
        write!(out, ",\n{}\"{}\": [", " ".repeat(indent), key)
    } else {
        write!(out, ",\"{}\":[", key)
    }
}

fn newline(out: &mut impl Write, pretty: bool, indent: usize) -> std::io::Result<()> {
    if pretty {
        write!(out, "\n{}", " ".repeat(indent))?;
    }
    Ok(())
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::{FullNode, NodeSummary, NodeType};

    fn summary(iri: &str, label: Option<&str>) -> NodeSummary {
        NodeSummary {
            node_type: NodeType::Concept,
            iri: iri.into(),
            label: label.map(str::to_string),
            definition: None,
            notation: None,
            notation_sort_order: None,
            label_sort_order: Some(0),
        }
    }

    fn full(iri: &str, label: Option<&str>, children: Vec<ForestNode>) -> ForestNode {
        ForestNode::Full(FullNode {
            summary: summary(iri, label),
            children,
        })
    }

    fn sample_forest() -> Forest {
        Forest {
            roots: vec![full(
                "http://ex/a",
                Some("A"),
                vec![ForestNode::Reference(summary("http://ex/b", None))],
            )],
            cycle_detected: false,
            only_tree_edges: false,
        }
    }

    fn wider_forest() -> Forest {
        Forest {
            roots: vec![
                full(
                    "http://ex/a",
                    Some("A \"quoted\"\nline"),
                    vec![
                        full("http://ex/a1", None, vec![]),
                        full(
                            "http://ex/a2",
                            Some("A2"),
                            vec![ForestNode::Reference(summary("http://ex/a1", None))],
                        ),
                    ],
                ),
                full("http://ex/b", Some("B"), vec![]),
            ],
            cycle_detected: false,
            only_tree_edges: false,
        }
    }

    #[test]
    fn wire_format() {
        let config = BrowseConfiguration {
            may_sort_by_notation: true,
            notation_format: Some(NotationFormat::Dotted),
            default_display_notation: true,
            ..Default::default()
        };
        let doc = TreeDocument::assemble(&config, "en", &sample_forest(), true);
        let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();

        assert_eq!(json["format"], "3");
        assert_eq!(json["language"], "en");
        assert_eq!(json["maySortByNotation"], true);
        assert_eq!(json["notationFormat"], "notationDotted");
        assert_eq!(json["defaultSortByNotation"], false);
        assert_eq!(json["defaultDisplayNotation"], true);
        assert_eq!(json["mayResolveResources"], false);

        let root = &json["forest"][0];
        assert_eq!(root["type"], "concept");
        assert_eq!(root["labelSortOrder"], 0);
        assert!(root.get("notationSortOrder").is_none());
        assert!(root.get("definition").is_none());

        let reference = &root["children"][0];
        assert_eq!(reference["type"], "concept_ref");
        assert!(reference.get("children").is_none());
        assert!(reference.get("label").is_none());
    }

    #[test]
    fn assembly_keeps_sibling_order() {
        let config = BrowseConfiguration::default();
        let doc = TreeDocument::assemble(&config, "en", &wider_forest(), true);
        let roots: Vec<_> = doc.forest.iter().map(|n| n.iri.as_str()).collect();
        assert_eq!(roots, vec!["http://ex/a", "http://ex/b"]);
        let under_a = doc.forest[0].children.as_ref().unwrap();
        let iris: Vec<_> = under_a.iter().map(|n| n.iri.as_str()).collect();
        assert_eq!(iris, vec!["http://ex/a1", "http://ex/a2"]);
        assert!(under_a[1].children.as_ref().unwrap()[0].is_reference());
        assert_eq!(doc.forest[1].children, Some(vec![]));
        assert_eq!(doc.node_count(), 5);
    }

    #[test]
    fn streamed_json_matches_serde() {
        for forest in [sample_forest(), wider_forest(), Forest::default()] {
            let config = BrowseConfiguration {
                may_sort_by_notation: true,
                notation_format: Some(NotationFormat::Alpha),
                ..Default::default()
            };
            let doc = TreeDocument::assemble(&config, "de", &forest, true);
            assert_eq!(doc.to_json().unwrap(), serde_json::to_string(&doc).unwrap());
            assert_eq!(doc.to_json_pretty().unwrap(), serde_json::to_string_pretty(&doc).unwrap());
        }
    }

    #[test]
    fn notation_format_absent_when_unset() {
        let config = BrowseConfiguration::default();
        let doc = TreeDocument::assemble(&config, "en", &sample_forest(), true);
        let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert!(json.get("notationFormat").is_none());
    }

    #[test]
    fn abandoned_notation_sort_is_not_advertised() {
        let config = BrowseConfiguration {
            may_sort_by_notation: true,
            default_sort_by_notation: true,
            notation_format: Some(NotationFormat::Float),
            ..Default::default()
        };
        let doc = TreeDocument::assemble(&config, "en", &sample_forest(), false);
        assert!(!doc.may_sort_by_notation);
        assert!(!doc.default_sort_by_notation);
        assert_eq!(doc.notation_format, Some(NotationFormat::Float));
    }

    #[test]
    fn reload_from_json() {
        let config = BrowseConfiguration::default();
        let doc = TreeDocument::assemble(&config, "fr", &sample_forest(), true);
        let mut buf = Vec::new();
        doc.write_to(&mut buf).unwrap();
        let reloaded = TreeDocument::from_json(std::str::from_utf8(&buf).unwrap()).unwrap();
        assert_eq!(reloaded, doc);
        assert_eq!(reloaded.node_count(), 2);
        assert!(reloaded.forest[0].children.as_ref().unwrap()[0].is_reference());
    }

    #[test]
    fn deep_document_builds_writes_and_drops() {
        let depth = 50_000;
        let mut node = full(&format!("http://ex/n{depth}"), None, vec![]);
        for i in (0..depth).rev() {
            node = full(&format!("http://ex/n{i}"), None, vec![node]);
        }
        let forest = Forest {
            roots: vec![node],
            cycle_detected: false,
            only_tree_edges: true,
        };
        let doc = TreeDocument::assemble(&BrowseConfiguration::default(), "en", &forest, true);
        assert_eq!(doc.node_count(), depth + 1);

        let json = doc.to_json().unwrap();
        assert_eq!(json.matches("\"type\":\"concept\"").count(), depth + 1);
        assert!(json.ends_with(&"]}".repeat(depth + 2)));
    }
}
