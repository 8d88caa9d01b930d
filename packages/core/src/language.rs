//! Language fallback for labels and definitions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::LangString;

/// One step of a [`LanguagePreference`] chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageChoice {
    /// Values tagged with this language. Compared case-insensitively.
    Tag(String),
    /// Values with no language tag.
    Untagged,
}

impl LanguageChoice {
    fn matches(&self, language: Option<&str>) -> bool {
        match (self, language) {
            (LanguageChoice::Tag(tag), Some(lang)) => tag.eq_ignore_ascii_case(lang),
            (LanguageChoice::Untagged, None) => true,
            _ => false,
        }
    }
}

/// An ordered chain of language choices used to pick the one value to
/// display out of a multilingual set.
///
/// The first choice that matches any value wins; within that choice the
/// smallest value is taken so the result does not depend on input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePreference {
    chain: Vec<LanguageChoice>,
}

impl LanguagePreference {
    /// A chain exactly as given. Duplicate entries are harmless but dropped.
    pub fn new(chain: impl IntoIterator<Item = LanguageChoice>) -> Self {
        let mut deduped: Vec<LanguageChoice> = Vec::new();
        for choice in chain {
            let seen = deduped.iter().any(|c| match (c, &choice) {
                (LanguageChoice::Tag(a), LanguageChoice::Tag(b)) => a.eq_ignore_ascii_case(b),
                (a, b) => a == b,
            });
            if !seen {
                deduped.push(choice);
            }
        }
        Self { chain: deduped }
    }

    /// The default chain: the primary language, then untagged values, then English.
    pub fn for_primary(primary: &str) -> Self {
        Self::new([
            LanguageChoice::Tag(primary.to_string()),
            LanguageChoice::Untagged,
            LanguageChoice::Tag("en".to_string()),
        ])
    }

    pub fn chain(&self) -> &[LanguageChoice] {
        &self.chain
    }

    /// Pick the preferred value, or `None` if no chain entry matches.
    pub fn select<'a>(&self, values: &'a BTreeSet<LangString>) -> Option<&'a str> {
        self.chain.iter().find_map(|choice| {
            values
                .iter()
                .find(|v| choice.matches(v.language.as_deref()))
                .map(|v| v.value.as_str())
        })
    }
}

// --- tests -------------------------------------------------------------------
