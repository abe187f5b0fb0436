use crate::ast::{DeclId, TranslationUnit};
use crate::{AnalysisError, Result};
use rand::Rng;

/// Pick the declaration the upgrade starts from.
///
/// A name wins when given; otherwise the draw is uniform over every declaration in the unit,
/// using the caller's generator so the same seed value always picks the same declaration. The
/// frontend never expands includes, so every declaration it produced sits in the primary file.
pub fn select_seed<R: Rng>(
    unit: &TranslationUnit,
    name: Option<&str>,
    rng: &mut R,
) -> Result<DeclId> {
    match name {
        Some(name) => unit
            .find_decl(name)
            .ok_or_else(|| AnalysisError::SeedNotFound(name.to_string())),
        None => {
            if unit.decl_count() == 0 {
                return Err(AnalysisError::EmptyTranslationUnit);
            }
            let index = rng.gen_range(0..unit.decl_count());
            Ok(DeclId(index as u32))
        }
    }
}
