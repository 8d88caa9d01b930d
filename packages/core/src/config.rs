//! Browse configuration: the per-version display flags that control which
//! resources appear in the forest and how siblings are ordered.
//!
//! Flags arrive as a list of names (e.g. `["maySortByNotation",
//! "notationDotted"]`) and are parsed once into an immutable
//! [`BrowseConfiguration`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ResourceKind;

/// Errors returned when a flag list does not describe a usable configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown browse flag {0:?}")]
    UnknownFlag(String),

    #[error("more than one notation format declared: {0} and {1}")]
    ConflictingNotationFormats(NotationFormat, NotationFormat),

    #[error("defaultSortByNotation requires maySortByNotation")]
    DefaultSortWithoutMaySort,

    #[error(
        "maySortByNotation requires a notation format \
         (notationAlpha, notationDotted or notationFloat)"
    )]
    MissingNotationFormat,

    #[error("primary language must not be empty")]
    EmptyLanguage,
}

/// How notation values are compared.
///
/// Serialises as the flag name (`"notationAlpha"`, `"notationDotted"`,
/// `"notationFloat"`), which is also how the output document spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotationFormat {
    /// Plain lexicographic comparison.
    #[serde(rename = "notationAlpha")]
    Alpha,
    /// Dot-separated non-negative integers, compared segment by segment.
    #[serde(rename = "notationDotted")]
    Dotted,
    /// Parsed as a floating-point number.
    #[serde(rename = "notationFloat")]
    Float,
}

impl std::fmt::Display for NotationFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotationFormat::Alpha => write!(f, "notationAlpha"),
            NotationFormat::Dotted => write!(f, "notationDotted"),
            NotationFormat::Float => write!(f, "notationFloat"),
        }
    }
}

/// A single named browse flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseFlag {
    MaySortByNotation,
    DefaultSortByNotation,
    Notation(NotationFormat),
    DefaultDisplayNotation,
    IncludeConceptSchemes,
    IncludeCollections,
    MayResolveResources,
}

/// Parses a flag from its exact name.
impl std::str::FromStr for BrowseFlag {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "maySortByNotation" => Ok(BrowseFlag::MaySortByNotation),
            "defaultSortByNotation" => Ok(BrowseFlag::DefaultSortByNotation),
            "notationAlpha" => Ok(BrowseFlag::Notation(NotationFormat::Alpha)),
            "notationDotted" => Ok(BrowseFlag::Notation(NotationFormat::Dotted)),
            "notationFloat" => Ok(BrowseFlag::Notation(NotationFormat::Float)),
            "defaultDisplayNotation" => Ok(BrowseFlag::DefaultDisplayNotation),
            "includeConceptSchemes" => Ok(BrowseFlag::IncludeConceptSchemes),
            "includeCollections" => Ok(BrowseFlag::IncludeCollections),
            "mayResolveResources" => Ok(BrowseFlag::MayResolveResources),
            _ => Err(ConfigError::UnknownFlag(s.to_string())),
        }
    }
}

/// Parsed, read-only view of a version's browse flags.
///
/// Construct with [`BrowseConfiguration::from_flags`] or deserialise from a
/// JSON object using the camelCase field names, then call
/// [`validate`](Self::validate).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrowseConfiguration {
    pub may_sort_by_notation: bool,
    pub default_sort_by_notation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notation_format: Option<NotationFormat>,
    pub default_display_notation: bool,
    pub include_concept_schemes: bool,
    pub include_collections: bool,
    pub may_resolve_resources: bool,
}

impl BrowseConfiguration {
    /// Parse a flag list. Unknown flag names are logged and skipped.
    pub fn from_flags<I, S>(flags: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::parse(flags, false)
    }

    /// Parse a flag list, rejecting unknown flag names.
    pub fn from_flags_strict<I, S>(flags: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::parse(flags, true)
    }

    fn parse<I, S>(flags: I, strict: bool) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();
        for raw in flags {
            let name = raw.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            let flag = match name.parse::<BrowseFlag>() {
                Ok(flag) => flag,
                Err(e) if strict => return Err(e),
                Err(_) => {
                    tracing::warn!("ignoring unknown browse flag {name:?}");
                    continue;
                }
            };
            config.apply(flag)?;
        }
        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, flag: BrowseFlag) -> Result<(), ConfigError> {
        match flag {
            BrowseFlag::MaySortByNotation => self.may_sort_by_notation = true,
            BrowseFlag::DefaultSortByNotation => self.default_sort_by_notation = true,
            BrowseFlag::Notation(format) => match self.notation_format {
                Some(existing) if existing != format => {
                    return Err(ConfigError::ConflictingNotationFormats(existing, format));
                }
                _ => self.notation_format = Some(format),
            },
            BrowseFlag::DefaultDisplayNotation => self.default_display_notation = true,
            BrowseFlag::IncludeConceptSchemes => self.include_concept_schemes = true,
            BrowseFlag::IncludeCollections => self.include_collections = true,
            BrowseFlag::MayResolveResources => self.may_resolve_resources = true,
        }
        Ok(())
    }

    /// Check the cross-flag constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_sort_by_notation && !self.may_sort_by_notation {
            return Err(ConfigError::DefaultSortWithoutMaySort);
        }
        if self.may_sort_by_notation && self.notation_format.is_none() {
            return Err(ConfigError::MissingNotationFormat);
        }
        Ok(())
    }

    /// Whether resources of `kind` take part in the forest.
    pub fn includes_kind(&self, kind: ResourceKind) -> bool {
        match kind {
            ResourceKind::Concept => true,
            ResourceKind::ConceptScheme => self.include_concept_schemes,
            ResourceKind::Collection | ResourceKind::OrderedCollection => self.include_collections,
            ResourceKind::Other => false,
        }
    }
}

// --- tests -------------------------------------------------------------------
