/*! The equivalence relation the whole tool is built around.
 *
 * Two declarations are equivalent at a pair of indirection levels when the builder has seen a
 * value visibly move between them at those depths. Edges are symmetric by construction and kept
 * in deterministic order - rows in registration order, edge sets sorted - so every diagnostic
 * dump and every propagation run is reproducible.
 */

use crate::ast::{DeclId, TranslationUnit};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A declaration observed at a specific pointer-indirection depth.
///
/// Level 0 is the declaration's own storage. Positive levels are reached by dereferencing;
/// a level goes negative transiently when an address is taken.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeclAtLevel {
    pub decl: DeclId,
    pub level: i32,
}

impl DeclAtLevel {
    pub fn new(decl: DeclId, level: i32) -> Self {
        Self { decl, level }
    }
}

#[derive(Clone, Debug, Default)]
pub struct EquivalenceGraph {
    rows: IndexMap<DeclId, IndexMap<i32, BTreeSet<DeclAtLevel>>>,
}

impl EquivalenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give a declaration its (initially empty) row. Every declaration the traversal observes
    /// must be registered exactly once, before any edge that touches it.
    pub fn register(&mut self, decl: DeclId) {
        let previous = self.rows.insert(decl, IndexMap::new());
        assert!(
            previous.is_none(),
            "declaration {decl:?} registered twice in the equivalence graph"
        );
    }

    /// Record that `a` and `b` co-vary. Inserted in both directions; set semantics make
    /// repeated insertion a no-op.
    pub fn insert_equivalence(&mut self, a: DeclAtLevel, b: DeclAtLevel) {
        self.insert_one_way(a, b);
        self.insert_one_way(b, a);
    }

    fn insert_one_way(&mut self, from: DeclAtLevel, to: DeclAtLevel) {
        let row = self
            .rows
            .get_mut(&from.decl)
            .expect("equivalence edge references an unregistered declaration");
        row.entry(from.level).or_default().insert(to);
    }

    pub fn contains(&self, decl: DeclId) -> bool {
        self.rows.contains_key(&decl)
    }

    pub fn row(&self, decl: DeclId) -> Option<&IndexMap<i32, BTreeSet<DeclAtLevel>>> {
        self.rows.get(&decl)
    }

    pub fn decl_count(&self) -> usize {
        self.rows.len()
    }

    /// Total number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.rows
            .values()
            .flat_map(|row| row.values())
            .map(BTreeSet::len)
            .sum()
    }

    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (DeclId, &IndexMap<i32, BTreeSet<DeclAtLevel>>)> + '_ {
        self.rows.iter().map(|(decl, row)| (*decl, row))
    }
}

/// Render a graph endpoint the way the diagnostic trace spells it: one `&` per level of
/// address-taking, one `*` per level of dereference, then the declaration's name.
pub fn describe(unit: &TranslationUnit, endpoint: DeclAtLevel) -> String {
    let prefix = if endpoint.level < 0 {
        "&".repeat(endpoint.level.unsigned_abs() as usize)
    } else {
        "*".repeat(endpoint.level as usize)
    };
    format!("{}{}", prefix, unit.decl(endpoint.decl).name)
}
