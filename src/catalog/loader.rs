use super::{Catalog, GizmoType};
use crate::error::{GfResult, GizmoError};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use strum::IntoEnumIterator;
use tracing::{debug, info};

impl Catalog {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> GfResult<Self> {
        let path = path.as_ref();
        info!("📂 Loading game data from {}", path.display());
        let file = File::open(path).map_err(|e| {
            GizmoError::Catalog(format!("Could not open '{}': {}", path.display(), e))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> GfResult<Self> {
        let catalog: Catalog = serde_json::from_reader(reader)?;
        catalog.validate()?;
        debug!(
            "   -> {} components, {} perks",
            catalog.comp_info.len(),
            catalog.perk_info.len()
        );
        Ok(catalog)
    }

    pub fn from_json_str(content: &str) -> GfResult<Self> {
        Self::from_reader(content.as_bytes())
    }

    /// Checks cross references and the rank-table invariants the search relies on.
    pub fn validate(&self) -> GfResult<()> {
        for gizmo_type in GizmoType::iter() {
            for (perk, comps) in self.perk_to_comp.for_type(gizmo_type) {
                if !self.perk_info.contains_key(perk) {
                    return Err(GizmoError::Catalog(format!(
                        "perkToComp.{} lists unknown perk '{}'",
                        gizmo_type, perk
                    )));
                }
                for comp in comps {
                    let info = self.comp_info.get(comp).ok_or_else(|| {
                        GizmoError::Catalog(format!(
                            "perkToComp.{}['{}'] lists unknown component '{}'",
                            gizmo_type, perk, comp
                        ))
                    })?;
                    if info.contribution(gizmo_type, perk).is_none() {
                        return Err(GizmoError::Catalog(format!(
                            "component '{}' has no {} contribution to '{}'",
                            comp, gizmo_type, perk
                        )));
                    }
                }
            }
        }

        for (comp, info) in &self.comp_info {
            for gizmo_type in GizmoType::iter() {
                for contrib in info.contributions(gizmo_type) {
                    if !self.perk_info.contains_key(&contrib.perk) {
                        return Err(GizmoError::Catalog(format!(
                            "component '{}' contributes to unknown perk '{}'",
                            comp, contrib.perk
                        )));
                    }
                    if contrib.roll == 0 {
                        return Err(GizmoError::Catalog(format!(
                            "component '{}' has a zero roll for '{}'",
                            comp, contrib.perk
                        )));
                    }
                }
            }
        }

        for (perk, info) in &self.perk_info {
            let n = info.thresholds.len();
            if info.costs.len() != n {
                return Err(GizmoError::Catalog(format!(
                    "perk '{}' has {} thresholds but {} costs",
                    perk,
                    n,
                    info.costs.len()
                )));
            }
            if !info.ancient_only.is_empty() && info.ancient_only.len() != n {
                return Err(GizmoError::Catalog(format!(
                    "perk '{}' has {} thresholds but {} ancient flags",
                    perk,
                    n,
                    info.ancient_only.len()
                )));
            }
            if info.thresholds.first() == Some(&0) || info.thresholds.windows(2).any(|w| w[0] >= w[1]) {
                return Err(GizmoError::Catalog(format!(
                    "perk '{}' thresholds must strictly increase",
                    perk
                )));
            }
            if info.costs.iter().any(|&c| c == 0) || info.costs.windows(2).any(|w| w[0] > w[1]) {
                return Err(GizmoError::Catalog(format!(
                    "perk '{}' costs must be positive and non-decreasing",
                    perk
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "perkToComp": { "weapon": { "Precise": ["Blade parts"] } },
        "compInfo": {
            "Blade parts": { "weapon": [{ "perk": "Precise", "base": 5, "roll": 10 }], "ancient": false }
        },
        "perkInfo": {
            "Precise": { "twoSlot": false, "thresholds": [10, 20], "costs": [15, 30], "ranks": [1, 2], "ancientOnly": [0, 0] }
        }
    }"#;

    #[test]
    fn test_parse_minimal() {
        let cat = Catalog::from_json_str(MINIMAL).unwrap();
        assert_eq!(cat.components_for(GizmoType::Weapon, "Precise").len(), 1);
        assert!(cat.components_for(GizmoType::Armour, "Precise").is_empty());
    }

    #[test]
    fn test_rejects_decreasing_costs() {
        let bad = MINIMAL.replace("[15, 30]", "[30, 15]");
        let err = Catalog::from_json_str(&bad).unwrap_err();
        assert!(matches!(err, GizmoError::Catalog(_)));
    }

    #[test]
    fn test_rejects_unknown_component() {
        let bad = MINIMAL.replace(r#"["Blade parts"]"#, r#"["Spikes"]"#);
        assert!(Catalog::from_json_str(&bad).is_err());
    }
}
