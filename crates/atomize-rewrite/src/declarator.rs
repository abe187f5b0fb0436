use crate::patch::PatchSet;
use atomize_core::ast::{Declaration, LayoutKind, TypeLayout};
use thiserror::Error;

pub const DEFAULT_QUALIFIER: &str = "_Atomic";

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error(
        "cannot place the qualifier on `{name}`: unhandled type layout with {level} indirection level(s) remaining"
    )]
    UnhandledLayout { name: String, level: u32 },
}

pub type Result<T> = std::result::Result<T, RewriteError>;

/// Finds the insertion point for a qualifier inside a declaration's written type.
///
/// The descent runs outside-in over the type layers. Function layers are transparent - the
/// qualifier always targets a value type, so a function's required level applies to its return
/// layout. At level zero the token lands just past the current layer's final token; otherwise
/// each pointer or array layer consumes one level on the way in.
pub struct QualifierRewriter {
    qualifier: String,
}

impl QualifierRewriter {
    pub fn new() -> Self {
        Self::with_qualifier(DEFAULT_QUALIFIER)
    }

    pub fn with_qualifier(qualifier: impl Into<String>) -> Self {
        Self {
            qualifier: qualifier.into(),
        }
    }

    pub fn rewrite(&self, decl: &Declaration, level: u32, patches: &mut PatchSet) -> Result<()> {
        self.descend(decl, &decl.ty, level, patches)
    }

    fn descend(
        &self,
        decl: &Declaration,
        layout: &TypeLayout,
        level: u32,
        patches: &mut PatchSet,
    ) -> Result<()> {
        if let LayoutKind::Function(return_layout) = &layout.kind {
            return self.descend(decl, return_layout, level, patches);
        }
        if level == 0 {
            patches.insert_after(layout.end, format!(" {}", self.qualifier));
            return Ok(());
        }
        match &layout.kind {
            LayoutKind::Pointer(inner) | LayoutKind::Array(inner) => {
                self.descend(decl, inner, level - 1, patches)
            }
            _ => Err(RewriteError::UnhandledLayout {
                name: decl.name.clone(),
                level,
            }),
        }
    }
}

impl Default for QualifierRewriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atomize_core::ast::{DeclKind, Declaration, TypeLayout};
    use atomize_core::span::Span;
    use pretty_assertions::assert_eq;

    fn decl(name: &str, ty: TypeLayout) -> Declaration {
        Declaration {
            name: name.to_string(),
            kind: DeclKind::Var,
            ty,
            span: Span::empty_at(0),
        }
    }

    #[test]
    fn level_zero_lands_after_the_outermost_layer() {
        // int x;
        let x = decl("x", TypeLayout::scalar(3));
        let mut patches = PatchSet::new();
        QualifierRewriter::new().rewrite(&x, 0, &mut patches).unwrap();
        assert_eq!(patches.apply("int x;"), "int _Atomic x;");
    }

    #[test]
    fn a_pointer_level_zero_qualifies_the_pointer_itself() {
        // int *p; - the qualifier goes after the `*`.
        let p = decl("p", TypeLayout::pointer(TypeLayout::scalar(3), 5));
        let mut patches = PatchSet::new();
        QualifierRewriter::new().rewrite(&p, 0, &mut patches).unwrap();
        assert_eq!(patches.apply("int *p;"), "int * _Atomic p;");
    }

    #[test]
    fn a_pointer_level_one_qualifies_the_pointee() {
        let p = decl("p", TypeLayout::pointer(TypeLayout::scalar(3), 5));
        let mut patches = PatchSet::new();
        QualifierRewriter::new().rewrite(&p, 1, &mut patches).unwrap();
        assert_eq!(patches.apply("int *p;"), "int _Atomic *p;");
    }

    #[test]
    fn function_layers_are_transparent() {
        // int *f(void); upgrading f at level 0 qualifies the returned pointer.
        let f = decl(
            "f",
            TypeLayout::function(TypeLayout::pointer(TypeLayout::scalar(3), 5), 13),
        );
        let mut patches = PatchSet::new();
        QualifierRewriter::new().rewrite(&f, 0, &mut patches).unwrap();
        assert_eq!(patches.apply("int *f(void);"), "int * _Atomic f(void);");
    }

    #[test]
    fn array_levels_descend_into_the_element() {
        // int a[3]; level 1 targets the element type.
        let a = decl("a", TypeLayout::array(TypeLayout::scalar(3), 8));
        let mut patches = PatchSet::new();
        QualifierRewriter::new().rewrite(&a, 1, &mut patches).unwrap();
        assert_eq!(patches.apply("int a[3];"), "int _Atomic a[3];");
    }

    #[test]
    fn running_out_of_layers_is_an_error() {
        let x = decl("x", TypeLayout::scalar(3));
        let mut patches = PatchSet::new();
        let err = QualifierRewriter::new()
            .rewrite(&x, 2, &mut patches)
            .unwrap_err();
        assert!(matches!(
            err,
            RewriteError::UnhandledLayout { ref name, level: 2 } if name == "x"
        ));
    }

    #[test]
    fn the_qualifier_token_is_configurable() {
        let x = decl("x", TypeLayout::scalar(3));
        let mut patches = PatchSet::new();
        QualifierRewriter::with_qualifier("volatile")
            .rewrite(&x, 0, &mut patches)
            .unwrap();
        assert_eq!(patches.apply("int x;"), "int volatile x;");
    }
}
