use gizmoforge::consts::{MAX_INV_BUDGET, MAX_INV_LEVEL};
use gizmoforge::distribution::{BudgetTable, CdfCache, DiceSumCdf, GizmoVariant};
use proptest::prelude::*;
use rstest::rstest;

// --- DICE SUMS ---

#[rstest]
#[case(&[20, 16, 16], 11)]
#[case(&[2, 3, 4, 5], 0)]
#[case(&[40], 20)]
#[case(&[1, 1, 8], 3)]
fn test_cache_matches_direct_build(#[case] dice: &[u32], #[case] base: u32) {
    let cache = CdfCache::new();
    let cached = cache.get(dice, base);
    let direct = DiceSumCdf::build(dice, base);
    assert_eq!(cached.support(), direct.support());

    let (lo, hi) = direct.support();
    assert_eq!(direct.evaluate(lo, hi), 1.0);
    for v in lo..=hi {
        assert!((cached.evaluate(v, v) - direct.evaluate(v, v)).abs() < 1e-12);
    }
}

#[test]
fn test_single_die_is_uniform() {
    let cdf = DiceSumCdf::build(&[8], 4);
    assert_eq!(cdf.support(), (4, 11));
    for v in 4..=11 {
        assert!((cdf.evaluate(v, v) - 0.125).abs() < 1e-12);
    }
    assert_eq!(cdf.evaluate(12, 40), 0.0);
}

#[test]
fn test_clip_min_folds_low_values() {
    let cdf = DiceSumCdf::build(&[10], 0).with_clip_min(5);
    assert_eq!(cdf.evaluate(0, 4), 0.0);
    assert!((cdf.evaluate(5, 5) - 0.6).abs() < 1e-12);
    assert!((cdf.evaluate(0, 9) - 1.0).abs() < 1e-12);
    assert!((cdf.evaluate(6, 9) - 0.4).abs() < 1e-12);
}

#[test]
fn test_cache_keys_ignore_order_and_unit_dice() {
    let cache = CdfCache::new();
    cache.get(&[5, 3], 0);
    cache.get(&[3, 5, 1], 7);
    assert_eq!(cache.len(), 1);
    cache.get(&[5, 5], 0);
    assert_eq!(cache.len(), 2);
}

proptest! {
    #[test]
    fn prop_split_sums_to_one(
        dice in proptest::collection::vec(1u32..30, 0..6),
        base in 0u32..50,
        split in 0.0f64..1.0,
    ) {
        let cdf = DiceSumCdf::build(&dice, base);
        let (lo, hi) = cdf.support();
        let s = lo + ((hi - lo) as f64 * split) as u32;
        let left = cdf.evaluate(lo, s);
        let right = if s < hi { cdf.evaluate(s + 1, hi) } else { 0.0 };
        prop_assert!((left + right - 1.0).abs() < 1e-9);
    }

    #[test]
    fn prop_cdf_is_monotone(
        dice in proptest::collection::vec(2u32..20, 1..5),
        base in 0u32..20,
    ) {
        let cdf = DiceSumCdf::build(&dice, base);
        let (_, hi) = cdf.support();
        let mut prev = 0.0;
        for end in 0..=hi + 2 {
            let p = cdf.evaluate(0, end);
            prop_assert!(p + 1e-12 >= prev);
            prop_assert!(p <= 1.0 + 1e-9);
            prev = p;
        }
    }
}

// --- INVENTION BUDGET ---

#[rstest]
#[case(GizmoVariant::Regular, 1)]
#[case(GizmoVariant::Regular, 75)]
#[case(GizmoVariant::Ancient, 90)]
#[case(GizmoVariant::Ancient, MAX_INV_LEVEL)]
fn test_full_budget_range_is_certain(#[case] variant: GizmoVariant, #[case] level: usize) {
    let table = BudgetTable::new();
    let p = table.between(variant, level, 0, MAX_INV_BUDGET as u32);
    assert!((p - 1.0).abs() < 1e-9);
}

#[test]
fn test_level_zero_means() {
    let table = BudgetTable::new();
    // Five (six) draws, each uniform on 0..=19.
    assert!((table.mean(GizmoVariant::Regular, 0) - 47.5).abs() < 1e-6);
    assert!((table.mean(GizmoVariant::Ancient, 0) - 57.0).abs() < 1e-6);
}

#[test]
fn test_budget_grows_with_level_and_shell() {
    let table = BudgetTable::new();
    let reg_60 = table.mean(GizmoVariant::Regular, 60);
    let reg_120 = table.mean(GizmoVariant::Regular, 120);
    let anc_120 = table.mean(GizmoVariant::Ancient, 120);
    assert!(reg_60 < reg_120);
    assert!(reg_120 < anc_120);
}

#[test]
fn test_between_matches_at_most() {
    let table = BudgetTable::new();
    let v = GizmoVariant::Regular;
    let direct = table.between(v, 80, 100, 150);
    let via_cdf = table.at_most(v, 80, 150) - table.at_most(v, 80, 99);
    assert!((direct - via_cdf).abs() < 1e-12);
    assert_eq!(table.between(v, 80, 150, 100), 0.0);
}

#[test]
fn test_levels_beyond_table_are_clamped() {
    let table = BudgetTable::new();
    let v = GizmoVariant::Ancient;
    assert_eq!(
        table.at_most(v, MAX_INV_LEVEL + 40, 200),
        table.at_most(v, MAX_INV_LEVEL, 200)
    );
}
