use super::var;
use crate::analysis::seed::select_seed;
use crate::ast::TranslationUnit;
use crate::AnalysisError;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn a_named_seed_resolves_to_the_first_match() {
    let mut unit = TranslationUnit::new();
    let first = unit.add_decl(var("x"));
    unit.add_decl(var("y"));
    let shadow = unit.add_decl(var("x"));

    let mut rng = StdRng::seed_from_u64(0);
    let picked = select_seed(&unit, Some("x"), &mut rng).unwrap();
    assert_eq!(picked, first);
    assert_ne!(picked, shadow);
}

#[test]
fn an_unknown_name_is_a_configuration_error() {
    let mut unit = TranslationUnit::new();
    unit.add_decl(var("x"));

    let mut rng = StdRng::seed_from_u64(0);
    let err = select_seed(&unit, Some("missing"), &mut rng).unwrap_err();
    assert!(matches!(err, AnalysisError::SeedNotFound(ref name) if name == "missing"));
}

#[test]
fn an_empty_unit_cannot_be_seeded() {
    let unit = TranslationUnit::new();
    let mut rng = StdRng::seed_from_u64(0);
    let err = select_seed(&unit, None, &mut rng).unwrap_err();
    assert!(matches!(err, AnalysisError::EmptyTranslationUnit));
}

#[test]
fn the_same_seed_value_always_draws_the_same_declaration() {
    let mut unit = TranslationUnit::new();
    for i in 0..100 {
        unit.add_decl(var(&format!("d{i}")));
    }

    let mut first = StdRng::seed_from_u64(42);
    let mut second = StdRng::seed_from_u64(42);
    assert_eq!(
        select_seed(&unit, None, &mut first).unwrap(),
        select_seed(&unit, None, &mut second).unwrap()
    );
}
