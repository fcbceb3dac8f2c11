#![allow(dead_code)]

use gizmoforge::catalog::{Catalog, GizmoType};
use gizmoforge::config::SearchConfig;
use gizmoforge::distribution::GizmoVariant;
use gizmoforge::search::{PerkTarget, SearchPlan, SecondaryTarget};
use serde_json::{json, Map, Value};
use std::path::PathBuf;

pub fn data_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/calc_data.json")
}

pub fn fixture_catalog() -> Catalog {
    Catalog::load_from_file(data_path()).expect("fixture data should load")
}

/// Small limits so end-to-end searches finish quickly.
pub fn quick_config() -> SearchConfig {
    SearchConfig {
        top_configuration_count: 5,
        quantity_limit: 200,
        arrangement_limit_per_quantity: 20,
        threads: 2,
        ..Default::default()
    }
}

pub fn plan(
    catalog: &Catalog,
    ancient: bool,
    primary: (&str, usize),
    secondary: SecondaryTarget,
    config: SearchConfig,
) -> SearchPlan {
    SearchPlan::new(
        catalog,
        GizmoType::Weapon,
        GizmoVariant::from_ancient(ancient),
        PerkTarget::new(primary.0, primary.1),
        secondary,
        config,
    )
    .expect("plan should validate")
}

/// Builds a weapon-only catalog in the game-data JSON shape.
#[derive(Default)]
pub struct CatalogBuilder {
    perk_to_comp: Map<String, Value>,
    comp_info: Map<String, Value>,
    perk_info: Map<String, Value>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn perk(mut self, name: &str, thresholds: &[u32], costs: &[u32], two_slot: bool) -> Self {
        let ranks: Vec<usize> = (1..=thresholds.len()).collect();
        self.perk_info.insert(
            name.to_string(),
            json!({
                "twoSlot": two_slot,
                "thresholds": thresholds,
                "costs": costs,
                "ranks": ranks,
                "ancientOnly": vec![0; thresholds.len()],
            }),
        );
        self
    }

    /// `contributions` are `(perk, base, roll)`.
    pub fn component(mut self, name: &str, ancient: bool, contributions: &[(&str, u32, u32)]) -> Self {
        let weapon: Vec<Value> = contributions
            .iter()
            .map(|(perk, base, roll)| json!({ "perk": perk, "base": base, "roll": roll }))
            .collect();
        self.comp_info.insert(
            name.to_string(),
            json!({ "weapon": weapon, "ancient": ancient }),
        );
        for (perk, _, _) in contributions {
            let entry = self
                .perk_to_comp
                .entry(perk.to_string())
                .or_insert_with(|| json!([]));
            if let Value::Array(list) = entry {
                list.push(json!(name));
            }
        }
        self
    }

    pub fn to_json(&self) -> String {
        json!({
            "perkToComp": { "weapon": self.perk_to_comp },
            "compInfo": self.comp_info,
            "perkInfo": self.perk_info,
        })
        .to_string()
    }

    pub fn build(self) -> Catalog {
        Catalog::from_json_str(&self.to_json()).expect("built catalog should validate")
    }
}
