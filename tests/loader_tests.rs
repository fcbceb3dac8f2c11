mod common;

use common::CatalogBuilder;
use gizmoforge::catalog::{Catalog, GizmoType};
use gizmoforge::error::GizmoError;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_fixture_loads() {
    let catalog = common::fixture_catalog();
    assert!(catalog.perk("Looting").is_some());
    assert!(catalog.component("Third-age components").unwrap().ancient);
    assert_eq!(catalog.components_for(GizmoType::Weapon, "Looting").len(), 3);
}

#[test]
fn test_loads_from_temp_file() {
    let json = CatalogBuilder::new()
        .perk("Solo", &[10, 20], &[5, 10], false)
        .component("Rock", false, &[("Solo", 4, 6)])
        .to_json();
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", json).unwrap();

    let catalog = Catalog::load_from_file(file.path()).unwrap();
    assert_eq!(catalog.perk("Solo").unwrap().rank_count(), 2);
    assert_eq!(catalog.components_for(GizmoType::Weapon, "Solo"), ["Rock".to_string()]);
}

#[test]
fn test_missing_file_is_a_catalog_error() {
    let err = Catalog::load_from_file("data/does_not_exist.json").unwrap_err();
    assert!(matches!(err, GizmoError::Catalog(_)));
}

#[test]
fn test_malformed_json_is_reported() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{{ \"perkToComp\": ").unwrap();
    let err = Catalog::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, GizmoError::Json(_)));
}

#[test]
fn test_rejects_zero_first_threshold() {
    let json = CatalogBuilder::new()
        .perk("Solo", &[0, 20], &[5, 10], false)
        .component("Rock", false, &[("Solo", 4, 6)])
        .to_json();
    assert!(matches!(
        Catalog::from_json_str(&json),
        Err(GizmoError::Catalog(_))
    ));
}

#[test]
fn test_rejects_zero_roll() {
    let json = CatalogBuilder::new()
        .perk("Solo", &[10], &[5], false)
        .component("Rock", false, &[("Solo", 4, 0)])
        .to_json();
    assert!(Catalog::from_json_str(&json).is_err());
}

#[test]
fn test_perk_summaries_respect_shell() {
    let catalog = common::fixture_catalog();
    let regular = catalog.perk_summaries(GizmoType::Weapon, false);
    let ancient = catalog.perk_summaries(GizmoType::Weapon, true);

    let precise = |list: &[gizmoforge::catalog::PerkSummary]| {
        list.iter().find(|p| p.name == "Precise").map(|p| p.max_rank)
    };
    assert_eq!(precise(&regular), Some(5));
    assert_eq!(precise(&ancient), Some(6));

    let looting = regular.iter().find(|p| p.name == "Looting").unwrap();
    assert_eq!(looting.component_count, 2);
    assert!(regular.iter().any(|p| p.name == "Lucky" && p.two_slot));
}
