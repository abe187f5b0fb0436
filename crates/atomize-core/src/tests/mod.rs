/*! Test coverage for the core model and analysis.
 *
 * The frontend is deliberately absent here: units are built by hand through the arena API, which
 * keeps these tests focused on the graph and propagation semantics rather than on C syntax.
 */

mod seed_tests;

use crate::ast::{DeclKind, Declaration, Expr, ExprKind, TranslationUnit, TypeLayout};
use crate::span::Span;

pub(crate) fn var(name: &str) -> Declaration {
    Declaration {
        name: name.to_string(),
        kind: DeclKind::Var,
        ty: TypeLayout::scalar(0),
        span: Span::empty_at(0),
    }
}

pub(crate) fn typed_var(name: &str, ty: TypeLayout) -> Declaration {
    Declaration {
        name: name.to_string(),
        kind: DeclKind::Var,
        ty,
        span: Span::empty_at(0),
    }
}

pub(crate) fn func(name: &str) -> Declaration {
    Declaration {
        name: name.to_string(),
        kind: DeclKind::Function,
        ty: TypeLayout::function(TypeLayout::scalar(0), 0),
        span: Span::empty_at(0),
    }
}

pub(crate) fn expr(unit: &mut TranslationUnit, kind: ExprKind) -> crate::ast::ExprId {
    unit.add_expr(Expr {
        kind,
        span: Span::empty_at(0),
    })
}
