//! Human-readable text rendering of [`TreeDocument`]s.
//!
//! The output is stable plain text suitable for terminals and logs. It is
//! not a canonical format; only the JSON document is normative.

use crate::document::{DocumentNode, TreeDocument};

/// Render a document as an indented tree.
///
/// ```text
/// Concept forest  5 nodes  language: en
/// ─────────────────────────────────────
/// Animals
///   Birds
///     Penguins  <http://example.org/penguins>
///   Mammals
///     Bats
///   ↪ Penguins
/// ```
///
/// Full nodes show their label (or IRI when unlabelled); with
/// `defaultDisplayNotation` the notation is shown in front. Reference nodes
/// are marked with `↪` and never expanded. Siblings appear in stored order.
pub fn render_document(doc: &TreeDocument) -> String {
    let total = doc.node_count();
    let header = format!(
        "Concept forest  {} node{}  language: {}",
        total,
        if total == 1 { "" } else { "s" },
        doc.language
    );
    let rule = "─".repeat(header.chars().count());
    let mut out = format!("{}\n{}\n", header, rule);

    if doc.forest.is_empty() {
        out.push_str("(empty)\n");
        return out;
    }

    let mut stack: Vec<(usize, &DocumentNode)> = doc.forest.iter().rev().map(|n| (0, n)).collect();
    while let Some((depth, node)) = stack.pop() {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&node_line(node, doc.default_display_notation));
        out.push('\n');
        if let Some(children) = &node.children {
            stack.extend(children.iter().rev().map(|c| (depth + 1, c)));
        }
    }

    out
}

// --- helpers -----------------------------------------------------------------

fn node_line(node: &DocumentNode, show_notation: bool) -> String {
    let mut line = String::new();
    if node.is_reference() {
        line.push_str("↪ ");
    }
    if show_notation {
        if let Some(notation) = &node.notation {
            line.push_str(notation);
            line.push_str("  ");
        }
    }
    match &node.label {
        Some(label) => line.push_str(&truncate(label, 72)),
        None => line.push_str(&format!("<{}>", node.iri)),
    }
    let kind = node.node_type.trim_end_matches("_ref");
    if kind != "concept" {
        line.push_str(&format!("  [{}]", kind));
    }
    line
}

fn truncate(s: &str, max: usize) -> String {
    let s = s.trim();
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max - 1).collect();
        format!("{}…", cut)
    }
}

// --- tests -------------------------------------------------------------------
