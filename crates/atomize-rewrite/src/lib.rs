/*! Turn an upgrade set back into source text.
 *
 * The analysis says which declarations need the qualifier and how deep; this crate finds the
 * byte offset inside each declaration's written type where the token belongs and applies all
 * insertions in one deterministic pass. Nothing is written anywhere until every placement has
 * succeeded.
 */

pub mod declarator;
pub mod patch;

pub use declarator::{QualifierRewriter, RewriteError, DEFAULT_QUALIFIER};
pub use patch::PatchSet;

use atomize_core::analysis::propagate::UpgradeSet;
use atomize_core::ast::TranslationUnit;

/// Rewrite `source` so every declaration in `upgrades` carries the default qualifier at its
/// required indirection level.
pub fn rewrite_source(
    unit: &TranslationUnit,
    upgrades: &UpgradeSet,
    source: &str,
) -> Result<String, RewriteError> {
    let rewriter = QualifierRewriter::new();
    let mut patches = PatchSet::new();
    for (decl, level) in upgrades.iter() {
        rewriter.rewrite(unit.decl(decl), level, &mut patches)?;
    }
    Ok(patches.apply(source))
}
