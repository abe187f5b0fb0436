use super::errors::FrontendError;
use super::lowering::{field, Lowering};
use super::type_resolver::TypeResolver;
use atomize_core::ast::{CompareOp, DeclKind, Expr, ExprId, ExprKind, UnaryOp};
use atomize_core::span::Span;
use tree_sitter::Node;

type Result<T> = std::result::Result<T, FrontendError>;

impl<'a> Lowering<'a> {
    pub(crate) fn lower_expr(&mut self, node: Node) -> Result<ExprId> {
        let span = Span::new(node.start_byte() as u32, node.end_byte() as u32);
        let kind = match node.kind() {
            "identifier" => {
                let name = self.ctx.get_node_text(node);
                match self.ctx.lookup(name) {
                    Some(decl) => ExprKind::DeclRef(decl),
                    None if self.ctx.constant_names.contains(name) => ExprKind::Literal,
                    None => return Err(FrontendError::UnresolvedSymbol(name.to_string())),
                }
            }
            "number_literal" | "string_literal" | "char_literal" | "concatenated_string"
            | "true" | "false" | "null" => ExprKind::Literal,
            "field_expression" => {
                let base_node = field(node, "argument")?;
                let base = self.lower_expr(base_node)?;
                let field_node = field(node, "field")?;
                let field_name = self.ctx.get_node_text(field_node);
                let record = TypeResolver::record_of(&self.unit, base).ok_or_else(|| {
                    FrontendError::NotARecord(self.ctx.get_node_text(base_node).to_string())
                })?;
                let field_decl = self
                    .unit
                    .record(record)
                    .fields
                    .iter()
                    .copied()
                    .find(|&f| self.unit.decl(f).name == field_name)
                    .ok_or_else(|| FrontendError::UnknownField {
                        field: field_name.to_string(),
                    })?;
                ExprKind::Field {
                    base,
                    field: field_decl,
                }
            }
            "subscript_expression" => {
                let base = self.lower_expr(field(node, "argument")?)?;
                let index = self.lower_expr(field(node, "index")?)?;
                ExprKind::Subscript { base, index }
            }
            "pointer_expression" => {
                let operand = self.lower_expr(field(node, "argument")?)?;
                let op = match self.ctx.get_node_text(field(node, "operator")?) {
                    "&" => UnaryOp::AddrOf,
                    "*" => UnaryOp::Deref,
                    other => {
                        return Err(self.unsupported(node, format!("pointer operator `{other}`")))
                    }
                };
                ExprKind::Unary { op, operand }
            }
            "binary_expression" => {
                let lhs = self.lower_expr(field(node, "left")?)?;
                let rhs = self.lower_expr(field(node, "right")?)?;
                match self.ctx.get_node_text(field(node, "operator")?) {
                    "==" => ExprKind::Compare {
                        op: CompareOp::Eq,
                        lhs,
                        rhs,
                    },
                    "<" => ExprKind::Compare {
                        op: CompareOp::Lt,
                        lhs,
                        rhs,
                    },
                    "<=" => ExprKind::Compare {
                        op: CompareOp::Le,
                        lhs,
                        rhs,
                    },
                    ">" => ExprKind::Compare {
                        op: CompareOp::Gt,
                        lhs,
                        rhs,
                    },
                    ">=" => ExprKind::Compare {
                        op: CompareOp::Ge,
                        lhs,
                        rhs,
                    },
                    _ => ExprKind::Opaque(vec![lhs, rhs]),
                }
            }
            "assignment_expression" => {
                let lhs = self.lower_expr(field(node, "left")?)?;
                let rhs = self.lower_expr(field(node, "right")?)?;
                match self.ctx.get_node_text(field(node, "operator")?) {
                    "=" => ExprKind::Assign { lhs, rhs },
                    // Compound assignments compute a fresh value; no equivalence.
                    _ => ExprKind::Opaque(vec![lhs, rhs]),
                }
            }
            "conditional_expression" => {
                let cond = self.lower_expr(field(node, "condition")?)?;
                let then_branch = self.lower_expr(field(node, "consequence")?)?;
                let else_branch = self.lower_expr(field(node, "alternative")?)?;
                ExprKind::Conditional {
                    cond,
                    then_branch,
                    else_branch,
                }
            }
            "call_expression" => self.lower_call(node)?,
            "parenthesized_expression" => {
                let inner = node
                    .named_child(0)
                    .ok_or_else(|| self.missing("expression", node))?;
                ExprKind::Paren(self.lower_expr(inner)?)
            }
            "initializer_list" => {
                let mut elements = Vec::new();
                let children: Vec<Node> = node.named_children(&mut node.walk()).collect();
                for child in children {
                    match child.kind() {
                        "initializer_pair" => {
                            elements.push(self.lower_expr(field(child, "value")?)?)
                        }
                        "comment" => {}
                        _ => elements.push(self.lower_expr(child)?),
                    }
                }
                ExprKind::InitList(elements)
            }
            "unary_expression" | "update_expression" => {
                ExprKind::Opaque(vec![self.lower_expr(field(node, "argument")?)?])
            }
            "cast_expression" => ExprKind::Opaque(vec![self.lower_expr(field(node, "value")?)?]),
            "comma_expression" => {
                let left = self.lower_expr(field(node, "left")?)?;
                let right = self.lower_expr(field(node, "right")?)?;
                ExprKind::Opaque(vec![left, right])
            }
            "sizeof_expression" => match node.child_by_field_name("value") {
                Some(value) => ExprKind::Opaque(vec![self.lower_expr(value)?]),
                None => ExprKind::Literal,
            },
            "compound_literal_expression" => {
                let mut children = Vec::new();
                let candidates: Vec<Node> = node.named_children(&mut node.walk()).collect();
                for child in candidates {
                    if child.kind() == "initializer_list" {
                        children.push(self.lower_expr(child)?);
                    }
                }
                ExprKind::Opaque(children)
            }
            other => {
                tracing::debug!(kind = other, "expression form not modeled, treating as opaque");
                ExprKind::Opaque(vec![])
            }
        };
        Ok(self.unit.add_expr(Expr { kind, span }))
    }

    fn lower_call(&mut self, node: Node) -> Result<ExprKind> {
        let function = field(node, "function")?;
        let arguments = field(node, "arguments")?;

        let (callee, callee_expr) = if function.kind() == "identifier" {
            let name = self.ctx.get_node_text(function);
            match self.ctx.lookup(name) {
                Some(decl) if self.unit.decl(decl).kind == DeclKind::Function => {
                    (Some(decl), None)
                }
                // Calling through a pointer variable: the callee is a value, not a symbol.
                Some(decl) => {
                    let span = Span::new(function.start_byte() as u32, function.end_byte() as u32);
                    let expr = self.unit.add_expr(Expr {
                        kind: ExprKind::DeclRef(decl),
                        span,
                    });
                    (None, Some(expr))
                }
                None => {
                    // Implicitly declared callee: nothing is known about its parameters.
                    tracing::debug!(name, "call to undeclared function");
                    (None, None)
                }
            }
        } else {
            (None, Some(self.lower_expr(function)?))
        };

        let mut args = Vec::new();
        let children: Vec<Node> = arguments.named_children(&mut arguments.walk()).collect();
        for arg in children {
            if arg.kind() == "comment" {
                continue;
            }
            args.push(self.lower_expr(arg)?);
        }
        Ok(ExprKind::Call {
            callee,
            callee_expr,
            args,
        })
    }
}
