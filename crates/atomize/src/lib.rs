/*! Unified interface for the Atomize pipeline.
 *
 * Single import for everything: parsing C into the analysis model, building the equivalence
 * graph, propagating an upgrade from a seed declaration, and rewriting the source text.
 */

pub use atomize_core as core;
pub use atomize_frontend as frontend;
pub use atomize_rewrite as rewrite;

pub use atomize_core::{
    analysis::{propagate, select_seed, EquivalenceBuilder, UpgradeSet},
    ast::TranslationUnit,
    graph::{describe, DeclAtLevel, EquivalenceGraph},
    report::UpgradeReport,
    AnalysisError,
};

pub use atomize_frontend::{parse_translation_unit, FrontendError};

pub use atomize_rewrite::{rewrite_source, PatchSet, QualifierRewriter, RewriteError};
