use crate::ast::{
    DeclId, ExprId, ExprKind, Item, LayoutKind, Stmt, TranslationUnit, UnaryOp,
};
use crate::graph::{DeclAtLevel, EquivalenceGraph};
use crate::{AnalysisError, Result};
use std::collections::BTreeSet;

/// Computes, for every expression, the set of declaration/level pairs it may denote, and turns
/// every observed value movement into a symmetric edge in the equivalence graph.
///
/// The walk is a post-order traversal: an expression's alias set is derived from its children's
/// sets, written once into a side table, and never revisited.
pub struct EquivalenceBuilder<'u> {
    unit: &'u TranslationUnit,
    graph: EquivalenceGraph,
    alias_sets: Vec<BTreeSet<DeclAtLevel>>,
}

impl<'u> EquivalenceBuilder<'u> {
    pub fn build(unit: &'u TranslationUnit) -> Result<EquivalenceGraph> {
        let mut builder = EquivalenceBuilder {
            unit,
            graph: EquivalenceGraph::new(),
            alias_sets: vec![BTreeSet::new(); unit.expr_count()],
        };
        // Every observed declaration gets a row up front, so the graph is total over the
        // translation unit even where no edge is ever recorded.
        for id in unit.decl_ids() {
            builder.graph.register(id);
        }
        for item in &unit.items {
            match item {
                Item::Global { decl, init } => {
                    if let Some(init) = init {
                        builder.visit_expr(*init)?;
                        builder.assign(DeclAtLevel::new(*decl, 0), *init)?;
                    }
                }
                Item::Function(def) => builder.visit_stmts(&def.body, def.decl)?,
            }
        }
        Ok(builder.graph)
    }

    fn visit_stmts(&mut self, stmts: &[Stmt], enclosing: DeclId) -> Result<()> {
        for stmt in stmts {
            self.visit_stmt(stmt, enclosing)?;
        }
        Ok(())
    }

    fn visit_stmt(&mut self, stmt: &Stmt, enclosing: DeclId) -> Result<()> {
        match stmt {
            Stmt::Expr(expr) => self.visit_expr(*expr),
            Stmt::Local { decl, init } => {
                if let Some(init) = init {
                    self.visit_expr(*init)?;
                    self.assign(DeclAtLevel::new(*decl, 0), *init)?;
                }
                Ok(())
            }
            // A returned value flows into the enclosing function's return slot.
            Stmt::Return(value) => {
                if let Some(value) = value {
                    self.visit_expr(*value)?;
                    self.assign(DeclAtLevel::new(enclosing, 0), *value)?;
                }
                Ok(())
            }
            Stmt::Block(body) => self.visit_stmts(body, enclosing),
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.visit_expr(*cond)?;
                self.visit_stmts(then_branch, enclosing)?;
                self.visit_stmts(else_branch, enclosing)
            }
            Stmt::While { cond, body } | Stmt::DoWhile { body, cond } => {
                self.visit_expr(*cond)?;
                self.visit_stmts(body, enclosing)
            }
            Stmt::For {
                init,
                cond,
                step,
                body,
            } => {
                self.visit_stmts(init, enclosing)?;
                if let Some(cond) = cond {
                    self.visit_expr(*cond)?;
                }
                if let Some(step) = step {
                    self.visit_expr(*step)?;
                }
                self.visit_stmts(body, enclosing)
            }
            Stmt::Switch { cond, body } => {
                self.visit_expr(*cond)?;
                self.visit_stmts(body, enclosing)
            }
        }
    }

    fn visit_expr(&mut self, id: ExprId) -> Result<()> {
        let unit = self.unit;
        let set = match &unit.expr(id).kind {
            ExprKind::DeclRef(decl) => BTreeSet::from([DeclAtLevel::new(*decl, 0)]),
            // Field identity, not the containing object, is what the analysis tracks.
            ExprKind::Field { base, field } => {
                self.visit_expr(*base)?;
                BTreeSet::from([DeclAtLevel::new(*field, 0)])
            }
            ExprKind::Subscript { base, index } => {
                self.visit_expr(*base)?;
                self.visit_expr(*index)?;
                self.shifted(*base, 1)
            }
            ExprKind::Unary { op, operand } => {
                self.visit_expr(*operand)?;
                match op {
                    UnaryOp::Deref => self.shifted(*operand, 1),
                    UnaryOp::AddrOf => self.shifted(*operand, -1),
                }
            }
            ExprKind::Compare { lhs, rhs, .. } => {
                self.visit_expr(*lhs)?;
                self.visit_expr(*rhs)?;
                self.make_equivalent(*lhs, *rhs);
                BTreeSet::new()
            }
            ExprKind::Assign { lhs, rhs } => {
                self.visit_expr(*lhs)?;
                self.visit_expr(*rhs)?;
                self.make_equivalent(*lhs, *rhs);
                self.alias_sets[lhs.index()].clone()
            }
            ExprKind::Conditional {
                cond,
                then_branch,
                else_branch,
            } => {
                self.visit_expr(*cond)?;
                self.visit_expr(*then_branch)?;
                self.visit_expr(*else_branch)?;
                let mut set = self.alias_sets[then_branch.index()].clone();
                set.extend(self.alias_sets[else_branch.index()].iter().copied());
                set
            }
            ExprKind::Call {
                callee,
                callee_expr,
                args,
            } => {
                if let Some(callee_expr) = callee_expr {
                    self.visit_expr(*callee_expr)?;
                }
                for arg in args {
                    self.visit_expr(*arg)?;
                }
                match callee {
                    Some(callee) => {
                        let params = unit.function_params(*callee);
                        for (param, arg) in params.iter().zip(args.iter()) {
                            self.assign(DeclAtLevel::new(*param, 0), *arg)?;
                        }
                        BTreeSet::from([DeclAtLevel::new(*callee, 0)])
                    }
                    None => BTreeSet::new(),
                }
            }
            ExprKind::Paren(inner) => {
                self.visit_expr(*inner)?;
                self.alias_sets[inner.index()].clone()
            }
            ExprKind::InitList(elements) => {
                for element in elements {
                    self.visit_expr(*element)?;
                }
                BTreeSet::new()
            }
            ExprKind::Literal => BTreeSet::new(),
            ExprKind::Opaque(children) => {
                for child in children {
                    self.visit_expr(*child)?;
                }
                BTreeSet::new()
            }
        };
        self.alias_sets[id.index()] = set;
        Ok(())
    }

    /// The operand's alias set with every level shifted by `delta`.
    fn shifted(&self, expr: ExprId, delta: i32) -> BTreeSet<DeclAtLevel> {
        self.alias_sets[expr.index()]
            .iter()
            .map(|endpoint| DeclAtLevel::new(endpoint.decl, endpoint.level + delta))
            .collect()
    }

    /// A value flowed from `value` into the storage named by `target`.
    ///
    /// Initializer lists recurse structurally by the target declaration's written type: record
    /// elements flow into the matching field, array elements into the declaration itself one
    /// level deeper. Any other list target is an input the tool cannot safely interpret.
    fn assign(&mut self, target: DeclAtLevel, value: ExprId) -> Result<()> {
        let unit = self.unit;
        if let ExprKind::InitList(elements) = &unit.expr(value).kind {
            let decl = unit.decl(target.decl);
            match &decl.ty.kind {
                LayoutKind::Record(record) => {
                    let fields = &unit.record(*record).fields;
                    for (field, element) in fields.iter().zip(elements.iter()) {
                        self.assign(DeclAtLevel::new(*field, 0), *element)?;
                    }
                }
                LayoutKind::Array(_) => {
                    for element in elements {
                        self.assign(DeclAtLevel::new(target.decl, target.level + 1), *element)?;
                    }
                }
                _ => {
                    return Err(AnalysisError::UnsupportedInitializer {
                        name: decl.name.clone(),
                    })
                }
            }
        } else {
            let aliases = self.alias_sets[value.index()].clone();
            for other in aliases {
                self.graph.insert_equivalence(target, other);
            }
        }
        Ok(())
    }

    /// Symmetric cross-product equivalence between everything two expressions may denote.
    fn make_equivalent(&mut self, lhs: ExprId, rhs: ExprId) {
        let left = self.alias_sets[lhs.index()].clone();
        let right = self.alias_sets[rhs.index()].clone();
        for a in &left {
            for b in &right {
                self.graph.insert_equivalence(*a, *b);
            }
        }
    }
}
