mod common;

use common::CatalogBuilder;
use gizmoforge::catalog::{Catalog, GizmoType};
use gizmoforge::config::SearchConfig;
use gizmoforge::distribution::{BudgetTable, CdfCache, GizmoVariant};
use gizmoforge::error::GizmoError;
use gizmoforge::search::{
    rank_tables, Arrangement, ArrangementEvaluator, LevelOptimizer, PerkTarget, RankTables,
    SecondaryTarget,
};
use rstest::rstest;

/// One component that always rolls rank 1 of both perks.
fn fixed_catalog(solo_two_slot: bool) -> Catalog {
    CatalogBuilder::new()
        .perk("Solo", &[10], &[20], solo_two_slot)
        .perk("Helper", &[10], &[10], false)
        .component("Rock", false, &[("Solo", 10, 1), ("Helper", 10, 1)])
        .build()
}

fn tables(catalog: &Catalog) -> RankTables {
    let cache = CdfCache::new();
    rank_tables(
        catalog,
        &cache,
        GizmoType::Weapon,
        GizmoVariant::Regular,
        &["Rock".to_string()],
        &[1],
    )
    .unwrap()
}

fn arrangement() -> Arrangement {
    Arrangement {
        materials: vec!["Rock".to_string()],
        perk_order: vec!["Solo".to_string(), "Helper".to_string()],
    }
}

/// (gizmo chance, raw success, no effect) at a fixed level.
fn chance_at(
    catalog: &Catalog,
    secondary: SecondaryTarget,
    config: SearchConfig,
    level: usize,
) -> (f64, f64, f64) {
    let plan = common::plan(catalog, false, ("Solo", 1), secondary, config);
    let budget = BudgetTable::new();
    let optimizer = LevelOptimizer::new(&budget, plan.variant);
    let evaluator = ArrangementEvaluator::new(&plan, optimizer);
    let mass = evaluator.selection_mass(&tables(catalog), &arrangement()).unwrap();
    let e = optimizer.evaluate_level(level, &mass.success, &mass.no_effect);
    (e.gizmo_chance, e.raw_success, e.no_effect)
}

#[test]
fn test_deterministic_ranks() {
    let catalog = fixed_catalog(false);
    let tables = tables(&catalog);
    let solo = &tables["Solo"];
    assert_eq!(solo.max_rank, 1);
    assert_eq!(solo.costs, vec![0, 20]);
    assert_eq!(solo.probs, vec![0.0, 1.0]);
}

#[rstest]
#[case(0)]
#[case(40)]
#[case(100)]
fn test_second_perk_modes_partition_success(#[case] level: usize) {
    let catalog = fixed_catalog(false);
    let config = SearchConfig::default();

    // Budget (20, 30]: Solo alone. Above 30: Solo and Helper together.
    let (alone, alone_raw, ne) = chance_at(&catalog, SecondaryTarget::None, config.clone(), level);
    let (any, any_raw, _) = chance_at(&catalog, SecondaryTarget::Any, config.clone(), level);
    let (pair, pair_raw, _) = chance_at(
        &catalog,
        SecondaryTarget::Perk(PerkTarget::new("Helper", 1)),
        config.clone(),
        level,
    );

    assert!((any_raw - (alone_raw + pair_raw)).abs() < 1e-12);
    assert!((any - (alone + pair)).abs() < 1e-9);
    assert!(alone_raw + pair_raw + ne <= 1.0 + 1e-9);
}

#[test]
fn test_any_rejects_undesired_partner() {
    let catalog = fixed_catalog(false);
    let mut config = SearchConfig::default();
    config.undesired_perks = "Helper".to_string();

    let (alone, _, _) = chance_at(&catalog, SecondaryTarget::None, config.clone(), 60);
    let (any, _, _) = chance_at(&catalog, SecondaryTarget::Any, config, 60);
    assert_eq!(alone, any);
}

#[test]
fn test_two_slot_perk_stands_alone() {
    let catalog = fixed_catalog(true);
    let config = SearchConfig::default();

    // Solo takes both slots, so Helper never joins it; at level 60 the budget always exceeds 20.
    let (alone, raw, ne) = chance_at(&catalog, SecondaryTarget::None, config, 60);
    assert!((raw + ne - 1.0).abs() < 1e-9);
    assert!((alone - 1.0).abs() < 1e-9);
}

#[test]
fn test_missing_target_is_an_invariant_error() {
    let catalog = fixed_catalog(false);
    let plan = common::plan(
        &catalog,
        false,
        ("Solo", 1),
        SecondaryTarget::None,
        SearchConfig::default(),
    );
    let budget = BudgetTable::new();
    let evaluator = ArrangementEvaluator::new(&plan, LevelOptimizer::new(&budget, plan.variant));

    let only_helper = Arrangement {
        materials: vec!["Rock".to_string()],
        perk_order: vec!["Helper".to_string()],
    };
    let err = evaluator.selection_mass(&tables(&catalog), &only_helper).unwrap_err();
    assert!(matches!(err, GizmoError::Invariant { .. }));
}

#[test]
fn test_fixture_chances_are_probabilities() {
    let catalog = common::fixture_catalog();
    let plan = common::plan(
        &catalog,
        false,
        ("Looting", 1),
        SecondaryTarget::Any,
        SearchConfig::default(),
    );
    let budget = BudgetTable::new();
    let cache = CdfCache::new();
    let optimizer = LevelOptimizer::new(&budget, plan.variant);
    let evaluator = ArrangementEvaluator::new(&plan, optimizer);

    let components = vec!["Clockwork".to_string(), "Crafted parts".to_string()];
    let quantities = [2, 3];
    let tables = rank_tables(
        &catalog,
        &cache,
        GizmoType::Weapon,
        GizmoVariant::Regular,
        &components,
        &quantities,
    )
    .unwrap();
    let generator = gizmoforge::search::ArrangementGenerator::new(
        &catalog,
        GizmoType::Weapon,
        &components,
        &quantities,
        720,
    )
    .unwrap();

    for arrangement in generator {
        let mass = evaluator.selection_mass(&tables, &arrangement).unwrap();
        for level in (1..=137).step_by(17) {
            let e = optimizer.evaluate_level(level, &mass.success, &mass.no_effect);
            assert!(e.raw_success >= 0.0);
            assert!(e.raw_success + e.no_effect <= 1.0 + 1e-9);
            assert!((0.0..=1.0 + 1e-9).contains(&e.gizmo_chance));
        }
        let result = evaluator.evaluate(&tables, &arrangement).unwrap();
        assert!(result.gizmo_chance() > 0.0);
    }
}
