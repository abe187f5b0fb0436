/*! Lower a C translation unit into the analysis model.
 *
 * The pipeline is parse, reject anything with syntax errors, then a single lowering walk that
 * builds every arena at once. No preprocessing happens: the file is analyzed exactly as written,
 * which is also why every declaration the frontend produces belongs to the primary file.
 */

mod context;
mod errors;
mod expressions;
mod lowering;
mod type_resolver;


pub use errors::FrontendError;

use atomize_core::ast::TranslationUnit;
use lowering::Lowering;
use tree_sitter::Node;

pub fn parse_translation_unit(source: &str) -> Result<TranslationUnit, FrontendError> {
    let mut parser = tree_sitter::Parser::new();
    let language = tree_sitter_c::LANGUAGE.into();
    parser
        .set_language(&language)
        .map_err(|e| FrontendError::Language(e.to_string()))?;

    let tree = parser.parse(source, None).ok_or(FrontendError::ParseFailed)?;
    let root = tree.root_node();
    if root.has_error() {
        let node = first_error_node(root).unwrap_or(root);
        let position = node.start_position();
        return Err(FrontendError::SyntaxError {
            line: position.row + 1,
            column: position.column + 1,
        });
    }

    let mut lowering = Lowering::new(source);
    lowering.lower_translation_unit(root)?;
    Ok(lowering.finish())
}

fn first_error_node(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    for child in children {
        if let Some(found) = first_error_node(child) {
            return Some(found);
        }
    }
    Some(node)
}
