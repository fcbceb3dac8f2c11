use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GizmoType {
    Armour,
    Weapon,
    Tool,
}

/// One component's raw contribution to a perk: `base + uniform(0, roll - 1)` per unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub perk: String,
    pub base: u32,
    pub roll: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentInfo {
    #[serde(default)]
    pub armour: Vec<Contribution>,
    #[serde(default)]
    pub weapon: Vec<Contribution>,
    #[serde(default)]
    pub tool: Vec<Contribution>,
    #[serde(default)]
    pub ancient: bool,
}

impl ComponentInfo {
    pub fn contributions(&self, gizmo_type: GizmoType) -> &[Contribution] {
        match gizmo_type {
            GizmoType::Armour => &self.armour,
            GizmoType::Weapon => &self.weapon,
            GizmoType::Tool => &self.tool,
        }
    }

    pub fn contribution(&self, gizmo_type: GizmoType, perk: &str) -> Option<&Contribution> {
        self.contributions(gizmo_type).iter().find(|c| c.perk == perk)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerkInfo {
    #[serde(default)]
    pub two_slot: bool,
    /// Value needed for rank `i + 1`.
    pub thresholds: Vec<u32>,
    /// Budget cost of rank `i + 1`.
    pub costs: Vec<u32>,
    #[serde(default)]
    pub ranks: Vec<u32>,
    /// 1 when rank `i + 1` only exists on ancient gizmos.
    #[serde(default)]
    pub ancient_only: Vec<u8>,
}

impl PerkInfo {
    pub fn rank_count(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_ancient_only(&self, rank: usize) -> bool {
        rank >= 1 && self.ancient_only.get(rank - 1).copied().unwrap_or(0) != 0
    }

    /// Highest rank reachable on the given shell.
    pub fn max_rank(&self, ancient: bool) -> usize {
        if ancient {
            return self.rank_count();
        }
        self.ancient_only
            .iter()
            .position(|&flag| flag != 0)
            .unwrap_or(self.rank_count())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerkToComp {
    #[serde(default)]
    pub armour: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub weapon: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub tool: BTreeMap<String, Vec<String>>,
}

impl PerkToComp {
    pub fn for_type(&self, gizmo_type: GizmoType) -> &BTreeMap<String, Vec<String>> {
        match gizmo_type {
            GizmoType::Armour => &self.armour,
            GizmoType::Weapon => &self.weapon,
            GizmoType::Tool => &self.tool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_gizmo_type_names() {
        assert_eq!(GizmoType::from_str("armour").unwrap(), GizmoType::Armour);
        assert_eq!(GizmoType::Weapon.to_string(), "weapon");
        assert!(GizmoType::from_str("shield").is_err());
    }

    #[test]
    fn test_max_rank_clamps_ancient_only() {
        let info = PerkInfo {
            thresholds: vec![10, 20, 30, 40],
            costs: vec![5, 10, 15, 20],
            ancient_only: vec![0, 0, 1, 1],
            ..Default::default()
        };
        assert_eq!(info.max_rank(false), 2);
        assert_eq!(info.max_rank(true), 4);
        assert!(info.is_ancient_only(3));
        assert!(!info.is_ancient_only(2));
    }
}
