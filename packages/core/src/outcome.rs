//! What a transform run reports back to its caller.
//!
//! Three tiers, matching how the caller has to react:
//!
//! - [`Diagnostic`]: recoverable; the tree is still produced.
//! - [`NoTree`]: the run finished but no tree may be stored; any previously
//!   stored tree for the version must be discarded.
//! - [`TransformError`]: infrastructure failure (serialising or writing the
//!   document).

use thiserror::Error;

use crate::collector::ParseFailure;
use crate::config::NotationFormat;
use crate::document::TreeDocument;

/// Hard failures outside the transform's own logic.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("failed to serialise tree document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write tree document: {0}")]
    Write(#[from] std::io::Error),
}

/// A recoverable problem found while building the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A notation did not parse in the declared format, so notation ordering
    /// was dropped for the whole document.
    UnparseableNotation {
        iri: String,
        notation: String,
        format: NotationFormat,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::UnparseableNotation { iri, notation, format } => write!(
                f,
                "notation {notation:?} of {iri} is not valid for {format}; \
                 sorting by notation is disabled"
            ),
        }
    }
}

/// Why no tree was produced.
#[derive(Debug, Clone, PartialEq)]
pub enum NoTreeReason {
    /// The parser reported errors in one or more sources.
    ParseErrors(Vec<ParseFailure>),
    /// The broader/narrower hierarchy contains a cycle.
    Cycle,
}

impl std::fmt::Display for NoTreeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoTreeReason::Cycle => write!(f, "there is a cycle"),
            NoTreeReason::ParseErrors(errors) => {
                write!(f, "there were {} error(s) parsing the vocabulary", errors.len())?;
                for e in errors {
                    write!(f, "; {e}")?;
                }
                Ok(())
            }
        }
    }
}

/// A run that produced no tree.
#[derive(Debug, Clone, PartialEq)]
pub struct NoTree {
    pub reason: NoTreeReason,
    /// A message suitable for showing to someone browsing the vocabulary.
    pub alert: Option<String>,
}

impl NoTree {
    pub(crate) fn cycle() -> Self {
        Self {
            reason: NoTreeReason::Cycle,
            alert: Some(
                "The vocabulary's concept hierarchy contains a cycle, \
                 so it cannot be shown as a tree."
                    .to_string(),
            ),
        }
    }

    pub(crate) fn parse_errors(errors: Vec<ParseFailure>) -> Self {
        Self {
            reason: NoTreeReason::ParseErrors(errors),
            alert: None,
        }
    }
}

/// A successfully built tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeResult {
    pub document: TreeDocument,
    /// True iff no reference node was needed, i.e. there is no polyhierarchy.
    pub only_tree_edges: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl TreeResult {
    /// Whether the tree was produced with some features dropped.
    pub fn is_partial(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// The outcome of one transform run.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeOutcome {
    Tree(TreeResult),
    /// Nothing of interest was found. Valid, not an error; the caller should
    /// clear any stored tree for the version.
    Empty,
    NoTree(NoTree),
}

impl TreeOutcome {
    pub fn tree(&self) -> Option<&TreeResult> {
        match self {
            TreeOutcome::Tree(result) => Some(result),
            _ => None,
        }
    }

    pub fn into_tree(self) -> Option<TreeResult> {
        match self {
            TreeOutcome::Tree(result) => Some(result),
            _ => None,
        }
    }

    /// Whether previously stored output for the version must be removed
    /// rather than replaced.
    pub fn clears_stored_output(&self) -> bool {
        !matches!(self, TreeOutcome::Tree(_))
    }
}

// --- tests -------------------------------------------------------------------
