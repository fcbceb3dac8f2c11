pub mod loader;
pub mod types;

pub use self::types::{ComponentInfo, Contribution, GizmoType, PerkInfo, PerkToComp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Read-only game data: which components roll which perks, and how perks rank.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub perk_to_comp: PerkToComp,
    pub comp_info: HashMap<String, ComponentInfo>,
    pub perk_info: HashMap<String, PerkInfo>,
}

/// A perk obtainable on a given shell, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerkSummary {
    pub name: String,
    pub max_rank: usize,
    pub two_slot: bool,
    pub component_count: usize,
}

impl Catalog {
    pub fn perk(&self, name: &str) -> Option<&PerkInfo> {
        self.perk_info.get(name)
    }

    pub fn component(&self, name: &str) -> Option<&ComponentInfo> {
        self.comp_info.get(name)
    }

    /// Components able to roll `perk` on the given gizmo type.
    pub fn components_for(&self, gizmo_type: GizmoType, perk: &str) -> &[String] {
        self.perk_to_comp
            .for_type(gizmo_type)
            .get(perk)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether some usable component can roll `perk` on this shell.
    pub fn is_obtainable(&self, gizmo_type: GizmoType, perk: &str, ancient: bool) -> bool {
        self.components_for(gizmo_type, perk).iter().any(|c| {
            self.component(c)
                .map(|info| ancient || !info.ancient)
                .unwrap_or(false)
        })
    }

    /// Perks obtainable on a gizmo type and shell, sorted by name.
    pub fn perk_summaries(&self, gizmo_type: GizmoType, ancient: bool) -> Vec<PerkSummary> {
        self.perk_to_comp
            .for_type(gizmo_type)
            .iter()
            .filter_map(|(name, comps)| {
                let info = self.perk(name)?;
                let max_rank = info.max_rank(ancient);
                if max_rank == 0 || !self.is_obtainable(gizmo_type, name, ancient) {
                    return None;
                }
                let component_count = comps
                    .iter()
                    .filter(|c| {
                        self.component(c)
                            .map(|i| ancient || !i.ancient)
                            .unwrap_or(false)
                    })
                    .count();
                Some(PerkSummary {
                    name: name.clone(),
                    max_rank,
                    two_slot: info.two_slot,
                    component_count,
                })
            })
            .collect()
    }
}
