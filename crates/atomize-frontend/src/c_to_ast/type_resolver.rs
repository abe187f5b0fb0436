use atomize_core::ast::{ExprId, ExprKind, LayoutKind, RecordId, TranslationUnit, TypeLayout, UnaryOp};

/// Just enough expression typing to bind field accesses.
///
/// Follows declarations' written types through the expression forms that preserve or shift
/// them. Anything it cannot follow resolves to nothing, and the field access that needed it
/// becomes a hard frontend error.
pub(crate) struct TypeResolver;

impl TypeResolver {
    pub(crate) fn record_of(unit: &TranslationUnit, expr: ExprId) -> Option<RecordId> {
        let mut layout = Self::layout_of(unit, expr)?;
        // `a->b`, `(*p).b` and `a[i].b` all arrive with pointer or array layers still on;
        // field lookup only needs the record identity underneath.
        loop {
            if let LayoutKind::Record(record) = &layout.kind {
                return Some(*record);
            }
            match layout.inner() {
                Some(inner) => layout = inner,
                None => return None,
            }
        }
    }

    fn layout_of(unit: &TranslationUnit, expr: ExprId) -> Option<&TypeLayout> {
        match &unit.expr(expr).kind {
            ExprKind::DeclRef(decl) => Some(&unit.decl(*decl).ty),
            ExprKind::Field { field, .. } => Some(&unit.decl(*field).ty),
            ExprKind::Subscript { base, .. } => Self::layout_of(unit, *base)?.inner(),
            ExprKind::Unary {
                op: UnaryOp::Deref,
                operand,
            } => Self::layout_of(unit, *operand)?.inner(),
            ExprKind::Unary {
                op: UnaryOp::AddrOf,
                operand,
            } => Self::layout_of(unit, *operand),
            ExprKind::Paren(inner) => Self::layout_of(unit, *inner),
            ExprKind::Assign { lhs, .. } => Self::layout_of(unit, *lhs),
            ExprKind::Conditional { then_branch, .. } => Self::layout_of(unit, *then_branch),
            ExprKind::Call {
                callee: Some(callee),
                ..
            } => unit.decl(*callee).ty.return_layout(),
            _ => None,
        }
    }
}
