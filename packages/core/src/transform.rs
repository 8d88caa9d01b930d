//! The end-to-end transform: collected statements in, [`TreeOutcome`] out.
//!
//! Phases run strictly in sequence over in-memory data:
//!
//! 1. collection has finished (the caller drove the [`StatementCollector`]);
//! 2. relation normalisation;
//! 3. hierarchy view and sort keys;
//! 4. spanning-forest construction;
//! 5. rank assignment and document assembly.
//!
//! A transform holds no mutable state, so one value may serve any number of
//! runs, concurrently or not.

use crate::collector::StatementCollector;
use crate::config::{BrowseConfiguration, ConfigError};
use crate::document::TreeDocument;
use crate::forest::ForestBuilder;
use crate::graph::Hierarchy;
use crate::language::LanguagePreference;
use crate::normalize::normalize_relations;
use crate::order::OrderCalculator;
use crate::outcome::{NoTree, TreeOutcome, TreeResult};
use crate::types::Statement;

/// Builds concept trees for one vocabulary's browse settings.
#[derive(Debug, Clone)]
pub struct ConceptTreeTransform {
    config: BrowseConfiguration,
    primary_language: String,
    language: LanguagePreference,
}

impl ConceptTreeTransform {
    /// A transform using the default label chain for `primary_language`.
    pub fn new(config: BrowseConfiguration, primary_language: &str) -> Result<Self, ConfigError> {
        config.validate()?;
        let primary_language = primary_language.trim();
        if primary_language.is_empty() {
            return Err(ConfigError::EmptyLanguage);
        }
        Ok(Self {
            language: LanguagePreference::for_primary(primary_language),
            primary_language: primary_language.to_string(),
            config,
        })
    }

    /// Replace the label fallback chain. The document still reports the
    /// primary language given to [`new`](Self::new).
    pub fn with_language_preference(mut self, language: LanguagePreference) -> Self {
        self.language = language;
        self
    }

    /// Run over everything `collector` has gathered.
    pub fn run(&self, collector: StatementCollector) -> TreeOutcome {
        let collected = collector.finish();
        if !collected.parse_errors.is_empty() {
            tracing::warn!(
                "{} parse error(s); no tree produced",
                collected.parse_errors.len()
            );
            return TreeOutcome::NoTree(NoTree::parse_errors(collected.parse_errors));
        }

        let mut graph = collected.graph;
        let stats = normalize_relations(&mut graph);
        tracing::info!(
            "collected {} resource(s), {} inverse relation(s) added",
            graph.len(),
            stats.total()
        );

        let hierarchy = Hierarchy::build(&graph, &self.config, &self.language);
        let mut order = OrderCalculator::new(&hierarchy, &self.config);
        let mut forest = ForestBuilder::new(&hierarchy, &order).build();

        if forest.cycle_detected {
            return TreeOutcome::NoTree(NoTree::cycle());
        }
        if forest.is_empty() {
            tracing::info!("no concepts of interest; empty result");
            return TreeOutcome::Empty;
        }

        order.assign_ranks(&mut forest.roots);
        let document = TreeDocument::assemble(
            &self.config,
            &self.primary_language,
            &forest,
            !order.notation_invalidated(),
        );
        let diagnostics = order.take_diagnostics();

        tracing::info!(
            "built forest: {} root(s), {} node(s), polyhierarchy: {}",
            document.forest.len(),
            document.node_count(),
            !forest.only_tree_edges
        );

        TreeOutcome::Tree(TreeResult {
            document,
            only_tree_edges: forest.only_tree_edges,
            diagnostics,
        })
    }

    /// Collect `statements` from a single source and run.
    pub fn run_statements(&self, statements: impl IntoIterator<Item = Statement>) -> TreeOutcome {
        let mut collector = StatementCollector::new();
        collector.extend(statements);
        self.run(collector)
    }
}

// --- tests -------------------------------------------------------------------
