//! Builds a browsable concept forest from a SKOS vocabulary.
//!
//! This crate turns an unordered stream of subject–predicate–object
//! statements into a deterministic, versioned tree document: one full node
//! per concept, reference nodes wherever a concept has more than one broader
//! concept, and per-sibling sort ranks by label and (optionally) notation.
//! RDF parsing and storage of the result are left to the caller; the
//! `skosforest` CLI is one such caller.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`vocab`] | The SKOS and RDF IRIs the transform understands |
//! | [`types`] | Statements, terms, and the per-subject [`Resource`] record |
//! | [`collector`] | [`StatementCollector`]: folds statements into resources |
//! | [`normalize`] | Makes broader/narrower and the other inverse pairs symmetric |
//! | [`graph`] | [`ConceptGraph`] and its [`Hierarchy`] view of nodes of interest |
//! | [`language`] | [`LanguagePreference`]: label and definition fallback chain |
//! | [`config`] | [`BrowseConfiguration`] parsed from browse flags |
//! | [`order`] | [`OrderCalculator`]: label and notation sibling order |
//! | [`forest`] | [`ForestBuilder`]: iterative depth-first spanning forest |
//! | [`document`] | The JSON [`TreeDocument`] (format "3") |
//! | [`outcome`] | [`TreeOutcome`], [`Diagnostic`], and [`TransformError`] |
//! | [`transform`] | [`ConceptTreeTransform`]: runs every phase in order |
//! | [`render`] | Plain-text rendering of a document |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use skosforest::{BrowseConfiguration, ConceptTreeTransform, StatementCollector, TreeOutcome};
//!
//! let config = BrowseConfiguration::from_flags(["maySortByNotation", "notationDotted"])?;
//! let transform = ConceptTreeTransform::new(config, "en")?;
//!
//! let mut collector = StatementCollector::new();
//! collector.begin_source("vocab.ttl");
//! // feed parser callbacks into collector.observe(...)
//!
//! match transform.run(collector) {
//!     TreeOutcome::Tree(result) => println!("{}", result.document.to_json_pretty()?),
//!     TreeOutcome::Empty => println!("nothing to show"),
//!     TreeOutcome::NoTree(no_tree) => eprintln!("no tree: {}", no_tree.reason),
//! }
//! ```

pub mod collector;
pub mod config;
pub mod document;
pub mod forest;
pub mod graph;
pub mod language;
pub mod normalize;
pub mod order;
pub mod outcome;
pub mod render;
pub mod transform;
pub mod types;
pub mod vocab;

pub use collector::{Collected, ParseFailure, StatementCollector};
pub use config::{BrowseConfiguration, BrowseFlag, ConfigError, NotationFormat};
pub use document::{DocumentNode, TreeDocument, FORMAT_VERSION};
pub use forest::{Forest, ForestBuilder, ForestNode, FullNode, NodeSummary, NodeType};
pub use graph::{ConceptGraph, Hierarchy, HierarchyNode};
pub use language::{LanguageChoice, LanguagePreference};
pub use normalize::{normalize_relations, NormalizeStats};
pub use order::{NotationKey, OrderCalculator};
pub use outcome::{Diagnostic, NoTree, NoTreeReason, TransformError, TreeOutcome, TreeResult};
pub use render::render_document;
pub use transform::ConceptTreeTransform;
pub use types::{LangString, Resource, ResourceKind, Statement, Term};
