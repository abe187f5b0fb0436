/*! The analysis-facing model of one C translation unit.
 *
 * The frontend lowers syntax into these arenas; everything downstream works with plain index
 * handles, so no lifetime ties the analysis to the parse tree that produced it. Declarations keep
 * the written shape of their type, layer by layer, because the rewriter needs a byte offset for
 * every nesting depth a qualifier could land on.
 */

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeclId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExprId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u32);

impl DeclId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ExprId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl RecordId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclKind {
    Var,
    Param,
    Field,
    Function,
}

/// One layer of a declaration's written type.
///
/// `end` is the byte offset just past the layer's final token: past the type specifier for a
/// scalar or record base, past the `*` for a pointer layer, past the `]` for an array layer.
/// That offset is exactly where the qualifier token goes when an upgrade lands on this layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeLayout {
    pub kind: LayoutKind,
    pub end: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutKind {
    Scalar,
    Record(RecordId),
    Pointer(Box<TypeLayout>),
    Array(Box<TypeLayout>),
    Function(Box<TypeLayout>),
}

impl TypeLayout {
    pub fn scalar(end: u32) -> Self {
        Self {
            kind: LayoutKind::Scalar,
            end,
        }
    }

    pub fn record(record: RecordId, end: u32) -> Self {
        Self {
            kind: LayoutKind::Record(record),
            end,
        }
    }

    pub fn pointer(pointee: TypeLayout, end: u32) -> Self {
        Self {
            kind: LayoutKind::Pointer(Box::new(pointee)),
            end,
        }
    }

    pub fn array(element: TypeLayout, end: u32) -> Self {
        Self {
            kind: LayoutKind::Array(Box::new(element)),
            end,
        }
    }

    pub fn function(return_layout: TypeLayout, end: u32) -> Self {
        Self {
            kind: LayoutKind::Function(Box::new(return_layout)),
            end,
        }
    }

    pub fn as_record(&self) -> Option<RecordId> {
        match self.kind {
            LayoutKind::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, LayoutKind::Array(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, LayoutKind::Function(_))
    }

    /// The layer one dereference in, if this layer can be dereferenced.
    pub fn inner(&self) -> Option<&TypeLayout> {
        match &self.kind {
            LayoutKind::Pointer(inner) | LayoutKind::Array(inner) => Some(inner),
            _ => None,
        }
    }

    /// The return layout of a function layer.
    pub fn return_layout(&self) -> Option<&TypeLayout> {
        match &self.kind {
            LayoutKind::Function(ret) => Some(ret),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclKind,
    pub ty: TypeLayout,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    AddrOf,
    Deref,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    DeclRef(DeclId),
    Field {
        base: ExprId,
        field: DeclId,
    },
    Subscript {
        base: ExprId,
        index: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Compare {
        op: CompareOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Assign {
        lhs: ExprId,
        rhs: ExprId,
    },
    Conditional {
        cond: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    },
    Call {
        /// Statically known callee, when the call names a function directly.
        callee: Option<DeclId>,
        /// The callee expression for indirect calls (through a pointer or a computed value).
        callee_expr: Option<ExprId>,
        args: Vec<ExprId>,
    },
    Paren(ExprId),
    InitList(Vec<ExprId>),
    Literal,
    /// Any expression form the analysis does not model. Children are still walked so that
    /// calls and assignments nested inside it are observed, but the node itself denotes nothing.
    Opaque(Vec<ExprId>),
}

#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum Stmt {
    Expr(ExprId),
    Local {
        decl: DeclId,
        init: Option<ExprId>,
    },
    Return(Option<ExprId>),
    Block(Vec<Stmt>),
    If {
        cond: ExprId,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
    },
    While {
        cond: ExprId,
        body: Vec<Stmt>,
    },
    DoWhile {
        body: Vec<Stmt>,
        cond: ExprId,
    },
    For {
        init: Vec<Stmt>,
        cond: Option<ExprId>,
        step: Option<ExprId>,
        body: Vec<Stmt>,
    },
    Switch {
        cond: ExprId,
        body: Vec<Stmt>,
    },
}

#[derive(Clone, Debug)]
pub struct FunctionDef {
    pub decl: DeclId,
    pub params: Vec<DeclId>,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug)]
pub struct Record {
    pub name: Option<String>,
    pub fields: Vec<DeclId>,
}

/// A top-level item, kept in source order so the equivalence pass observes
/// data flow in the order the original file states it.
#[derive(Clone, Debug)]
pub enum Item {
    Global { decl: DeclId, init: Option<ExprId> },
    Function(FunctionDef),
}

#[derive(Clone, Debug, Default)]
pub struct TranslationUnit {
    decls: Vec<Declaration>,
    exprs: Vec<Expr>,
    records: Vec<Record>,
    fn_params: HashMap<DeclId, Vec<DeclId>>,
    pub items: Vec<Item>,
}

impl TranslationUnit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_decl(&mut self, decl: Declaration) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    pub fn add_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(self.exprs.len() as u32);
        self.exprs.push(expr);
        id
    }

    pub fn add_record(&mut self, record: Record) -> RecordId {
        let id = RecordId(self.records.len() as u32);
        self.records.push(record);
        id
    }

    pub fn decl(&self, id: DeclId) -> &Declaration {
        &self.decls[id.index()]
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn record(&self, id: RecordId) -> &Record {
        &self.records[id.index()]
    }

    pub fn record_mut(&mut self, id: RecordId) -> &mut Record {
        &mut self.records[id.index()]
    }

    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn decl_ids(&self) -> impl Iterator<Item = DeclId> + '_ {
        (0..self.decls.len() as u32).map(DeclId)
    }

    /// First declaration with the given name, in traversal order.
    pub fn find_decl(&self, name: &str) -> Option<DeclId> {
        self.decls
            .iter()
            .position(|d| d.name == name)
            .map(|i| DeclId(i as u32))
    }

    pub fn set_function_params(&mut self, function: DeclId, params: Vec<DeclId>) {
        self.fn_params.insert(function, params);
    }

    /// Parameter declarations of a function, empty when none are known.
    pub fn function_params(&self, function: DeclId) -> &[DeclId] {
        self.fn_params
            .get(&function)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
