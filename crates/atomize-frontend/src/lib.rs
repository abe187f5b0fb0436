/*! C frontend for Atomize.
 *
 * Tree-sitter gives you a C syntax tree, but that's just syntax. This crate walks the tree,
 * resolves names through a scope stack, and lowers declarations, statements and expressions into
 * the arena model the analysis consumes - including the layer-by-layer type layouts the rewriter
 * later descends to place a qualifier.
 */

pub mod c_to_ast;

pub use c_to_ast::{parse_translation_unit, FrontendError};
