use crate::ast::{DeclId, TranslationUnit};
use crate::graph::EquivalenceGraph;
use crate::{AnalysisError, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::VecDeque;

/// One worklist item taken during propagation, recorded for the diagnostic trace.
#[derive(Clone, Debug, Serialize)]
pub struct TraceStep {
    pub decl: DeclId,
    pub name: String,
    pub level: u32,
}

/// The minimal consistent set of declarations that must receive the qualifier, each at exactly
/// one indirection level, plus the order in which propagation reached them.
#[derive(Clone, Debug, Default, Serialize)]
pub struct UpgradeSet {
    pub levels: IndexMap<DeclId, u32>,
    pub trace: Vec<TraceStep>,
}

impl UpgradeSet {
    pub fn level_of(&self, decl: DeclId) -> Option<u32> {
        self.levels.get(&decl).copied()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeclId, u32)> + '_ {
        self.levels.iter().map(|(decl, level)| (*decl, *level))
    }
}

/// Breadth-first closure over the equivalence graph starting from `(seed, 0)`.
///
/// For the worklist item `(D, L)` and a row entry at level `E`, the reconciled level `L - E`
/// must be strictly positive for the entry to transmit the upgrade: a requirement only pushes
/// through an indirection it sits strictly inside of. An eligible edge to `(D2, L2)` then
/// requires `D2` at level `L + (L2 - E)`. Each declaration is enqueued at most once, which both
/// bounds the traversal and makes a second, different level assignment a hard error.
pub fn propagate(
    unit: &TranslationUnit,
    graph: &EquivalenceGraph,
    seed: DeclId,
) -> Result<UpgradeSet> {
    let mut levels: IndexMap<DeclId, u32> = IndexMap::new();
    let mut trace = Vec::new();
    let mut worklist: VecDeque<(DeclId, u32)> = VecDeque::new();

    levels.insert(seed, 0);
    worklist.push_back((seed, 0));

    while let Some((decl, level)) = worklist.pop_front() {
        trace.push(TraceStep {
            decl,
            name: unit.decl(decl).name.clone(),
            level,
        });
        let row = graph
            .row(decl)
            .expect("propagation reached a declaration with no equivalence row");
        for (&entry_level, edges) in row {
            let reconciled = i64::from(level) - i64::from(entry_level);
            if reconciled <= 0 {
                continue;
            }
            for edge in edges {
                let required = i64::from(level) + (i64::from(edge.level) - i64::from(entry_level));
                if required < 0 {
                    return Err(AnalysisError::NegativeLevel {
                        name: unit.decl(edge.decl).name.clone(),
                        level: required,
                    });
                }
                let required = required as u32;
                match levels.get(&edge.decl) {
                    Some(&existing) if existing != required => {
                        return Err(AnalysisError::InconsistentUpgrade {
                            name: unit.decl(edge.decl).name.clone(),
                            existing,
                            computed: required,
                        });
                    }
                    Some(_) => {}
                    None => {
                        levels.insert(edge.decl, required);
                        worklist.push_back((edge.decl, required));
                    }
                }
            }
        }
    }

    Ok(UpgradeSet { levels, trace })
}
