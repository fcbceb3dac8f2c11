use super::evaluator::BudgetRange;
use crate::consts::MAX_INV_LEVEL;
use crate::distribution::{BudgetTable, GizmoVariant};

const INV_PHI: f64 = 0.618_033_988_749_894_9; // (sqrt(5) - 1) / 2
const INV_PHI2: f64 = 0.381_966_011_250_105_1; // (3 - sqrt(5)) / 2

/// Success figures of one arrangement at one invention level.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LevelEvaluation {
    pub level: usize,
    pub raw_success: f64,
    pub no_effect: f64,
    pub gizmo_chance: f64,
}

/// `raw / (1 - no_effect)`, or 0 when nothing can ever be selected.
pub fn gizmo_chance(raw_success: f64, no_effect: f64) -> f64 {
    if no_effect >= 1.0 {
        0.0
    } else {
        raw_success / (1.0 - no_effect)
    }
}

/// Golden-section search for the level maximizing `f(level).gizmo_chance`
/// over `[lo, hi]`, to within `tol` levels.
///
/// Assumes a unimodal objective. Short ranges are scanned linearly.
pub fn golden_section_max<F>(lo: usize, hi: usize, tol: usize, mut f: F) -> LevelEvaluation
where
    F: FnMut(usize) -> LevelEvaluation,
{
    let (mut a, mut b) = (lo.min(hi), lo.max(hi));
    let mut h = b - a;
    if h <= tol.max(2) {
        return (a..=b)
            .map(&mut f)
            .fold(None, |best: Option<LevelEvaluation>, e| match best {
                Some(kept) if kept.gizmo_chance >= e.gizmo_chance => Some(kept),
                _ => Some(e),
            })
            .unwrap_or_default();
    }

    let steps = ((tol as f64 / h as f64).ln() / INV_PHI.ln()).ceil() as usize;
    let mut c = (a as f64 + INV_PHI2 * h as f64).round() as usize;
    let mut d = (a as f64 + INV_PHI * h as f64).round() as usize;
    let mut yc = f(c);
    let mut yd = f(d);

    for _ in 1..steps {
        if yc.gizmo_chance > yd.gizmo_chance {
            b = d;
            d = c;
            yd = yc;
            h = b - a;
            c = (a as f64 + INV_PHI2 * h as f64).round() as usize;
            yc = f(c);
        } else {
            a = c;
            c = d;
            yc = yd;
            h = b - a;
            d = (a as f64 + INV_PHI * h as f64).round() as usize;
            yd = f(d);
        }
    }

    if yc.gizmo_chance > yd.gizmo_chance {
        yc
    } else {
        yd
    }
}

/// Finds the best invention level for a set of budget ranges.
#[derive(Debug, Clone, Copy)]
pub struct LevelOptimizer<'t> {
    table: &'t BudgetTable,
    variant: GizmoVariant,
    level_limit: usize,
}

impl<'t> LevelOptimizer<'t> {
    pub fn new(table: &'t BudgetTable, variant: GizmoVariant) -> Self {
        Self {
            table,
            variant,
            level_limit: MAX_INV_LEVEL,
        }
    }

    fn mass(&self, level: usize, ranges: &[BudgetRange]) -> f64 {
        ranges
            .iter()
            .map(|r| {
                r.weight
                    * self
                        .table
                        .between(self.variant, level, r.min_budget, r.max_budget)
            })
            .sum()
    }

    pub fn evaluate_level(
        &self,
        level: usize,
        success: &[BudgetRange],
        no_effect: &[BudgetRange],
    ) -> LevelEvaluation {
        let raw_success = self.mass(level, success);
        let no_effect = self.mass(level, no_effect);
        LevelEvaluation {
            level,
            raw_success,
            no_effect,
            gizmo_chance: gizmo_chance(raw_success, no_effect),
        }
    }

    pub fn optimize(&self, success: &[BudgetRange], no_effect: &[BudgetRange]) -> LevelEvaluation {
        golden_section_max(0, self.level_limit, 1, |level| {
            self.evaluate_level(level, success, no_effect)
        })
    }

    /// Exhaustive scan, for checking the golden-section result.
    pub fn scan(&self, success: &[BudgetRange], no_effect: &[BudgetRange]) -> LevelEvaluation {
        golden_section_max(0, self.level_limit, usize::MAX, |level| {
            self.evaluate_level(level, success, no_effect)
        })
    }
}
