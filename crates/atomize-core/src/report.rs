use crate::analysis::propagate::UpgradeSet;
use crate::ast::{DeclId, TranslationUnit};
use crate::graph::EquivalenceGraph;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct UpgradeEntry {
    pub name: String,
    pub level: u32,
}

/// Machine-readable summary of one run, for the `--report` output.
#[derive(Clone, Debug, Serialize)]
pub struct UpgradeReport {
    pub input: String,
    pub seed_value: u64,
    pub seed_declaration: String,
    pub declarations: usize,
    pub equivalence_edges: usize,
    pub upgrades: Vec<UpgradeEntry>,
}

impl UpgradeReport {
    pub fn new(
        input: impl Into<String>,
        seed_value: u64,
        seed: DeclId,
        unit: &TranslationUnit,
        graph: &EquivalenceGraph,
        upgrades: &UpgradeSet,
    ) -> Self {
        Self {
            input: input.into(),
            seed_value,
            seed_declaration: unit.decl(seed).name.clone(),
            declarations: unit.decl_count(),
            equivalence_edges: graph.edge_count(),
            upgrades: upgrades
                .iter()
                .map(|(decl, level)| UpgradeEntry {
                    name: unit.decl(decl).name.clone(),
                    level,
                })
                .collect(),
        }
    }
}
