/*! Core model and analysis for the Atomize qualifier-upgrade tool.
 *
 * Deciding where `_Atomic` must spread once one declaration carries it is a dataflow question:
 * assignments, initializations, argument passing and returns tie declarations together at
 * specific pointer depths. This crate owns that model - the translation-unit arenas, the
 * equivalence graph, and the propagation engine that turns one seed declaration into the full
 * set of required upgrades.
 */

pub mod analysis;
pub mod ast;
pub mod graph;
pub mod report;
pub mod span;

pub use analysis::equivalence::EquivalenceBuilder;
pub use analysis::propagate::{propagate, TraceStep, UpgradeSet};
pub use analysis::seed::select_seed;
pub use ast::{
    CompareOp, DeclId, DeclKind, Declaration, Expr, ExprId, ExprKind, FunctionDef, Item,
    LayoutKind, Record, RecordId, Stmt, TranslationUnit, TypeLayout, UnaryOp,
};
pub use graph::{describe, DeclAtLevel, EquivalenceGraph};
pub use report::{UpgradeEntry, UpgradeReport};
pub use span::Span;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("unsupported initializer list: the type of `{name}` is neither a record nor an array")]
    UnsupportedInitializer { name: String },
    #[error("no declaration named `{0}` in the translation unit")]
    SeedNotFound(String),
    #[error("the translation unit declares nothing that could seed an upgrade")]
    EmptyTranslationUnit,
    #[error(
        "conflicting upgrade levels for `{name}`: already assigned {existing}, newly computed {computed}"
    )]
    InconsistentUpgrade {
        name: String,
        existing: u32,
        computed: u32,
    },
    #[error("negative indirection level {level} computed for `{name}` during propagation")]
    NegativeLevel { name: String, level: i64 },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests;
