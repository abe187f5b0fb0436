use super::context::{LoweringContext, NamedType};
use super::errors::FrontendError;
use atomize_core::ast::{
    DeclId, DeclKind, Declaration, ExprId, FunctionDef, Item, Record, RecordId, Stmt,
    TranslationUnit, TypeLayout,
};
use atomize_core::span::Span;
use tree_sitter::Node;

type Result<T> = std::result::Result<T, FrontendError>;

pub(crate) fn field<'t>(node: Node<'t>, name: &'static str) -> Result<Node<'t>> {
    node.child_by_field_name(name)
        .ok_or_else(|| FrontendError::MissingField {
            field: name,
            node_kind: node.kind().to_string(),
        })
}

/// A declarator, fully unwound: the declared name, the written type with one layer per
/// pointer/array/function nesting, and the innermost parameter list when one exists.
pub(crate) struct DeclaratorInfo<'t> {
    pub name: String,
    pub span: Span,
    pub ty: TypeLayout,
    pub params: Option<Node<'t>>,
}

pub(crate) struct Lowering<'a> {
    pub(crate) ctx: LoweringContext<'a>,
    pub(crate) unit: TranslationUnit,
}

impl<'a> Lowering<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            ctx: LoweringContext::new(source),
            unit: TranslationUnit::new(),
        }
    }

    pub fn finish(self) -> TranslationUnit {
        self.unit
    }

    pub fn lower_translation_unit(&mut self, root: Node) -> Result<()> {
        let children: Vec<Node> = root.named_children(&mut root.walk()).collect();
        for child in children {
            self.lower_top_level(child)?;
        }
        Ok(())
    }

    fn lower_top_level(&mut self, node: Node) -> Result<()> {
        match node.kind() {
            "function_definition" => self.lower_function(node),
            "declaration" => {
                let lowered = self.lower_declaration(node)?;
                for (decl, init) in lowered {
                    self.unit.items.push(Item::Global { decl, init });
                }
                Ok(())
            }
            "type_definition" => self.lower_typedef(node),
            "struct_specifier" | "union_specifier" => {
                self.lower_record_specifier(node)?;
                Ok(())
            }
            "enum_specifier" => {
                self.lower_enum_specifier(node);
                Ok(())
            }
            // Conditional preprocessor groups still contain top-level items.
            "preproc_ifdef" | "preproc_if" | "preproc_else" | "linkage_specification" => {
                let children: Vec<Node> = node.named_children(&mut node.walk()).collect();
                for child in children {
                    self.lower_top_level(child)?;
                }
                Ok(())
            }
            // Object-like macros are not expanded, but their names must still read as
            // constant values wherever they appear.
            "preproc_def" => {
                if let Some(name) = node.child_by_field_name("name") {
                    let name = self.ctx.get_node_text(name).to_string();
                    self.ctx.constant_names.insert(name);
                }
                Ok(())
            }
            "preproc_include" | "preproc_function_def" | "preproc_call" | "comment" => Ok(()),
            other => {
                tracing::debug!(kind = other, "skipping unsupported top-level item");
                Ok(())
            }
        }
    }

    /// The base layer of a declaration's type: the specifier before any declarator shaping.
    pub(crate) fn lower_type_specifier(&mut self, node: Node) -> Result<TypeLayout> {
        let end = node.end_byte() as u32;
        match node.kind() {
            "primitive_type" | "sized_type_specifier" => Ok(TypeLayout::scalar(end)),
            "struct_specifier" | "union_specifier" => {
                let record = self.lower_record_specifier(node)?;
                Ok(TypeLayout::record(record, end))
            }
            "enum_specifier" => {
                self.lower_enum_specifier(node);
                Ok(TypeLayout::scalar(end))
            }
            "type_identifier" => {
                let name = self.ctx.get_node_text(node);
                match self.ctx.typedefs.get(name) {
                    Some(NamedType::Record(record)) => Ok(TypeLayout::record(*record, end)),
                    _ => Ok(TypeLayout::scalar(end)),
                }
            }
            other => Err(self.unsupported(node, format!("type specifier `{other}`"))),
        }
    }

    /// Register (or look up) the record a struct/union specifier names. A specifier with a
    /// body defines the record's fields; without one it references or forward-declares it.
    fn lower_record_specifier(&mut self, node: Node) -> Result<RecordId> {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.ctx.get_node_text(n).to_string());
        let Some(body) = node.child_by_field_name("body") else {
            let Some(name) = name else {
                return Err(self.unsupported(node, "anonymous record reference"));
            };
            if let Some(&record) = self.ctx.record_names.get(&name) {
                return Ok(record);
            }
            let record = self.unit.add_record(Record {
                name: Some(name.clone()),
                fields: vec![],
            });
            self.ctx.record_names.insert(name, record);
            return Ok(record);
        };

        // The tag must be visible inside its own body: struct S { struct S *next; }.
        let known = name
            .as_ref()
            .and_then(|n| self.ctx.record_names.get(n))
            .copied();
        let record = match known {
            Some(existing) => existing,
            None => {
                let record = self.unit.add_record(Record {
                    name: name.clone(),
                    fields: vec![],
                });
                if let Some(name) = name {
                    self.ctx.record_names.insert(name, record);
                }
                record
            }
        };

        let mut fields = Vec::new();
        let members: Vec<Node> = body.named_children(&mut body.walk()).collect();
        for member in members {
            if member.kind() != "field_declaration" {
                continue;
            }
            let base = self.lower_type_specifier(field(member, "type")?)?;
            let declarators: Vec<Node> = member
                .children_by_field_name("declarator", &mut member.walk())
                .collect();
            for declarator in declarators {
                let info = self.lower_declarator(declarator, base.clone())?;
                let decl = self.unit.add_decl(Declaration {
                    name: info.name,
                    kind: DeclKind::Field,
                    ty: info.ty,
                    span: info.span,
                });
                fields.push(decl);
            }
        }
        self.unit.record_mut(record).fields = fields;
        Ok(record)
    }

    fn lower_enum_specifier(&mut self, node: Node) {
        if let Some(body) = node.child_by_field_name("body") {
            let enumerators: Vec<Node> = body.named_children(&mut body.walk()).collect();
            for enumerator in enumerators {
                if enumerator.kind() != "enumerator" {
                    continue;
                }
                if let Some(name) = enumerator.child_by_field_name("name") {
                    let name = self.ctx.get_node_text(name).to_string();
                    self.ctx.constant_names.insert(name);
                }
            }
        }
    }

    fn lower_typedef(&mut self, node: Node) -> Result<()> {
        let base = self.lower_type_specifier(field(node, "type")?)?;
        let declarators: Vec<Node> = node
            .children_by_field_name("declarator", &mut node.walk())
            .collect();
        for declarator in declarators {
            let info = self.lower_declarator(declarator, base.clone())?;
            let named = match info.ty.as_record() {
                Some(record) => NamedType::Record(record),
                None => NamedType::Opaque,
            };
            self.ctx.typedefs.insert(info.name, named);
        }
        Ok(())
    }

    /// Unwind a declarator into a `TypeLayout`.
    ///
    /// C declarators mirror the type inside-out, so each syntactic wrapper contributes the
    /// next layer around the base accumulated so far: the outermost declarator node is the
    /// derivation applied closest to the base type. The pointer layer's insertion offset is
    /// its `*` token; the array layer's is its closing bracket.
    pub(crate) fn lower_declarator<'t>(
        &mut self,
        node: Node<'t>,
        base: TypeLayout,
    ) -> Result<DeclaratorInfo<'t>> {
        match node.kind() {
            "identifier" | "field_identifier" | "type_identifier" => Ok(DeclaratorInfo {
                name: self.ctx.get_node_text(node).to_string(),
                span: Span::new(node.start_byte() as u32, node.end_byte() as u32),
                ty: base,
                params: None,
            }),
            "pointer_declarator" | "abstract_pointer_declarator" => {
                let end = star_end(node).unwrap_or(node.start_byte() + 1) as u32;
                let layer = TypeLayout::pointer(base, end);
                match node.child_by_field_name("declarator") {
                    Some(inner) => self.lower_declarator(inner, layer),
                    None => Ok(unnamed(layer, end)),
                }
            }
            "array_declarator" | "abstract_array_declarator" => {
                let end = node.end_byte() as u32;
                let layer = TypeLayout::array(base, end);
                match node.child_by_field_name("declarator") {
                    Some(inner) => self.lower_declarator(inner, layer),
                    None => Ok(unnamed(layer, end)),
                }
            }
            "function_declarator" | "abstract_function_declarator" => {
                let end = node.end_byte() as u32;
                let layer = TypeLayout::function(base, end);
                let params = node.child_by_field_name("parameters");
                match node.child_by_field_name("declarator") {
                    Some(inner) => {
                        let mut info = self.lower_declarator(inner, layer)?;
                        // The parameter list closest to the declared name is the one that
                        // belongs to the declaration itself.
                        if info.params.is_none() {
                            info.params = params;
                        }
                        Ok(info)
                    }
                    None => {
                        let mut info = unnamed(layer, end);
                        info.params = params;
                        Ok(info)
                    }
                }
            }
            "parenthesized_declarator" => {
                let inner = node
                    .named_child(0)
                    .ok_or_else(|| self.missing("declarator", node))?;
                self.lower_declarator(inner, base)
            }
            "init_declarator" => self.lower_declarator(field(node, "declarator")?, base),
            other => Err(self.unsupported(node, format!("declarator `{other}`"))),
        }
    }

    /// One `declaration` node, which may carry several declarators. Returns the declared
    /// variables with their initializers; prototypes are registered but yield nothing.
    pub(crate) fn lower_declaration(&mut self, node: Node) -> Result<Vec<(DeclId, Option<ExprId>)>> {
        let base = self.lower_type_specifier(field(node, "type")?)?;
        let mut lowered = Vec::new();
        let declarators: Vec<Node> = node
            .children_by_field_name("declarator", &mut node.walk())
            .collect();
        for child in declarators {
            let (decl_node, value_node) = if child.kind() == "init_declarator" {
                (field(child, "declarator")?, child.child_by_field_name("value"))
            } else {
                (child, None)
            };
            let info = self.lower_declarator(decl_node, base.clone())?;
            if info.ty.is_function() {
                let decl = self.unit.add_decl(Declaration {
                    name: info.name.clone(),
                    kind: DeclKind::Function,
                    ty: info.ty,
                    span: info.span,
                });
                self.ctx.bind(info.name, decl);
                // Prototype parameters live in a scope of their own.
                self.ctx.push_scope();
                let params = match info.params {
                    Some(params) => self.lower_parameter_list(params)?,
                    None => vec![],
                };
                self.ctx.pop_scope();
                self.unit.set_function_params(decl, params);
                continue;
            }
            let decl = self.unit.add_decl(Declaration {
                name: info.name.clone(),
                kind: DeclKind::Var,
                ty: info.ty,
                span: info.span,
            });
            // Bound before its initializer is lowered; C makes a name visible to itself.
            self.ctx.bind(info.name, decl);
            let init = match value_node {
                Some(value) => Some(self.lower_expr(value)?),
                None => None,
            };
            lowered.push((decl, init));
        }
        Ok(lowered)
    }

    fn lower_parameter_list(&mut self, node: Node) -> Result<Vec<DeclId>> {
        let mut params = Vec::new();
        let children: Vec<Node> = node.named_children(&mut node.walk()).collect();
        for param in children {
            if param.kind() != "parameter_declaration" {
                continue;
            }
            let type_node = field(param, "type")?;
            let declarator = param.child_by_field_name("declarator");
            if declarator.is_none() && self.ctx.get_node_text(type_node) == "void" {
                continue;
            }
            let base = self.lower_type_specifier(type_node)?;
            let info = match declarator {
                Some(declarator) => self.lower_declarator(declarator, base)?,
                None => {
                    let end = base.end;
                    unnamed(base, end)
                }
            };
            let decl = self.unit.add_decl(Declaration {
                name: info.name.clone(),
                kind: DeclKind::Param,
                ty: info.ty,
                span: info.span,
            });
            self.ctx.bind(info.name, decl);
            params.push(decl);
        }
        Ok(params)
    }

    fn lower_function(&mut self, node: Node) -> Result<()> {
        let base = self.lower_type_specifier(field(node, "type")?)?;
        let declarator = field(node, "declarator")?;
        let info = self.lower_declarator(declarator, base)?;
        if !info.ty.is_function() {
            return Err(self.unsupported(node, "function definition without a function declarator"));
        }
        let decl = self.unit.add_decl(Declaration {
            name: info.name.clone(),
            kind: DeclKind::Function,
            ty: info.ty,
            span: info.span,
        });
        // Bound in the enclosing scope first so the body can recurse.
        self.ctx.bind(info.name, decl);
        self.ctx.push_scope();
        let params = match info.params {
            Some(params) => self.lower_parameter_list(params)?,
            None => vec![],
        };
        self.unit.set_function_params(decl, params.clone());
        let body = self.lower_compound(field(node, "body")?)?;
        self.ctx.pop_scope();
        self.unit
            .items
            .push(Item::Function(FunctionDef { decl, params, body }));
        Ok(())
    }

    fn lower_compound(&mut self, node: Node) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::new();
        let children: Vec<Node> = node.named_children(&mut node.walk()).collect();
        for child in children {
            stmts.extend(self.lower_stmt(child)?);
        }
        Ok(stmts)
    }

    fn lower_stmt(&mut self, node: Node) -> Result<Vec<Stmt>> {
        match node.kind() {
            "compound_statement" => {
                self.ctx.push_scope();
                let body = self.lower_compound(node)?;
                self.ctx.pop_scope();
                Ok(vec![Stmt::Block(body)])
            }
            "declaration" => Ok(self
                .lower_declaration(node)?
                .into_iter()
                .map(|(decl, init)| Stmt::Local { decl, init })
                .collect()),
            "expression_statement" => match node.named_child(0) {
                Some(expr) if expr.kind() != "comment" => {
                    Ok(vec![Stmt::Expr(self.lower_expr(expr)?)])
                }
                _ => Ok(vec![]),
            },
            "return_statement" => {
                let value = match node.named_child(0) {
                    Some(value) if value.kind() != "comment" => Some(self.lower_expr(value)?),
                    _ => None,
                };
                Ok(vec![Stmt::Return(value)])
            }
            "if_statement" => {
                let cond = self.lower_expr(field(node, "condition")?)?;
                let then_branch = self.lower_stmt(field(node, "consequence")?)?;
                let else_branch = match node.child_by_field_name("alternative") {
                    Some(alternative) => {
                        let stmt = if alternative.kind() == "else_clause" {
                            alternative.named_child(0)
                        } else {
                            Some(alternative)
                        };
                        match stmt {
                            Some(stmt) => self.lower_stmt(stmt)?,
                            None => vec![],
                        }
                    }
                    None => vec![],
                };
                Ok(vec![Stmt::If {
                    cond,
                    then_branch,
                    else_branch,
                }])
            }
            "while_statement" => {
                let cond = self.lower_expr(field(node, "condition")?)?;
                let body = self.lower_stmt(field(node, "body")?)?;
                Ok(vec![Stmt::While { cond, body }])
            }
            "do_statement" => {
                let body = self.lower_stmt(field(node, "body")?)?;
                let cond = self.lower_expr(field(node, "condition")?)?;
                Ok(vec![Stmt::DoWhile { body, cond }])
            }
            "for_statement" => {
                self.ctx.push_scope();
                let init = match node.child_by_field_name("initializer") {
                    Some(init) if init.kind() == "declaration" => self
                        .lower_declaration(init)?
                        .into_iter()
                        .map(|(decl, value)| Stmt::Local { decl, init: value })
                        .collect(),
                    Some(init) => vec![Stmt::Expr(self.lower_expr(init)?)],
                    None => vec![],
                };
                let cond = match node.child_by_field_name("condition") {
                    Some(cond) => Some(self.lower_expr(cond)?),
                    None => None,
                };
                let step = match node.child_by_field_name("update") {
                    Some(step) => Some(self.lower_expr(step)?),
                    None => None,
                };
                let body = self.lower_stmt(field(node, "body")?)?;
                self.ctx.pop_scope();
                Ok(vec![Stmt::For {
                    init,
                    cond,
                    step,
                    body,
                }])
            }
            "switch_statement" => {
                let cond = self.lower_expr(field(node, "condition")?)?;
                let body = self.lower_stmt(field(node, "body")?)?;
                Ok(vec![Stmt::Switch { cond, body }])
            }
            "case_statement" => {
                // The guard is a constant expression; only the nested statements matter.
                let value_id = node.child_by_field_name("value").map(|v| v.id());
                let mut stmts = Vec::new();
                let children: Vec<Node> = node.named_children(&mut node.walk()).collect();
                for child in children {
                    if Some(child.id()) == value_id {
                        continue;
                    }
                    stmts.extend(self.lower_stmt(child)?);
                }
                Ok(stmts)
            }
            "labeled_statement" => {
                let mut stmts = Vec::new();
                let children: Vec<Node> = node.named_children(&mut node.walk()).collect();
                for child in children {
                    if child.kind() == "statement_identifier" {
                        continue;
                    }
                    stmts.extend(self.lower_stmt(child)?);
                }
                Ok(stmts)
            }
            "break_statement" | "continue_statement" | "goto_statement" | "comment" => Ok(vec![]),
            other => {
                tracing::debug!(kind = other, "skipping unsupported statement");
                Ok(vec![])
            }
        }
    }

    pub(crate) fn unsupported(&self, node: Node, what: impl Into<String>) -> FrontendError {
        let position = node.start_position();
        FrontendError::Unsupported {
            what: what.into(),
            line: position.row + 1,
            column: position.column + 1,
        }
    }

    pub(crate) fn missing(&self, field: &'static str, node: Node) -> FrontendError {
        FrontendError::MissingField {
            field,
            node_kind: node.kind().to_string(),
        }
    }
}

fn unnamed<'t>(ty: TypeLayout, at: u32) -> DeclaratorInfo<'t> {
    DeclaratorInfo {
        name: String::new(),
        span: Span::empty_at(at),
        ty,
        params: None,
    }
}

fn star_end(node: Node) -> Option<usize> {
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .find(|child| child.kind() == "*")
        .map(|child| child.end_byte())
}
