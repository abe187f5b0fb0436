use atomize_core::ast::{DeclId, RecordId};
use std::collections::{HashMap, HashSet};
use tree_sitter::Node;

/// What a typedef name stands for, as far as the analysis cares.
///
/// Anything that is not a plain record alias is opaque: the analysis still counts indirections
/// through it syntactically, and the rewriter refuses to descend into it, which is the same
/// stance the tool takes on any type shape it cannot see through.
#[derive(Copy, Clone, Debug)]
pub enum NamedType {
    Record(RecordId),
    Opaque,
}

#[derive(Debug)]
pub struct Scope {
    symbols: HashMap<String, DeclId>,
    parent: Option<Box<Scope>>,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            symbols: HashMap::new(),
            parent: None,
        }
    }

    pub fn with_parent(parent: Scope) -> Self {
        Self {
            symbols: HashMap::new(),
            parent: Some(Box::new(parent)),
        }
    }

    pub fn insert(&mut self, name: String, decl: DeclId) {
        self.symbols.insert(name, decl);
    }

    pub fn lookup(&self, name: &str) -> Option<DeclId> {
        self.symbols
            .get(name)
            .copied()
            .or_else(|| self.parent.as_ref().and_then(|p| p.lookup(name)))
    }
}

pub struct LoweringContext<'a> {
    pub source: &'a str,
    scope_stack: Vec<Scope>,
    pub record_names: HashMap<String, RecordId>,
    pub typedefs: HashMap<String, NamedType>,
    /// Names known to denote constant values: enumerators and object-like macros.
    pub constant_names: HashSet<String>,
}

impl<'a> LoweringContext<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            scope_stack: vec![Scope::new()],
            record_names: HashMap::new(),
            typedefs: HashMap::new(),
            constant_names: HashSet::new(),
        }
    }

    pub fn get_node_text(&self, node: Node) -> &'a str {
        &self.source[node.byte_range()]
    }

    pub fn push_scope(&mut self) {
        let parent = self.scope_stack.pop().unwrap_or_else(Scope::new);
        self.scope_stack.push(Scope::with_parent(parent));
    }

    pub fn pop_scope(&mut self) {
        if let Some(current) = self.scope_stack.pop() {
            match current.parent {
                Some(parent) => self.scope_stack.push(*parent),
                None => self.scope_stack.push(Scope::new()),
            }
        }
    }

    pub fn bind(&mut self, name: String, decl: DeclId) {
        if name.is_empty() {
            return;
        }
        if let Some(scope) = self.scope_stack.last_mut() {
            scope.insert(name, decl);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<DeclId> {
        self.scope_stack.last()?.lookup(name)
    }
}
