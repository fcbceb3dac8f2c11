use super::plan::SearchPlan;
use crate::catalog::{Catalog, Contribution};
use crate::consts::{ANCIENT_PENALTY, UNBOUNDED};
use crate::distribution::GizmoVariant;
use crate::error::{GfResult, GizmoError};

/// Base and die size a component really contributes once the ancient penalty applies.
///
/// Regular components inside an ancient gizmo keep 80% of both, floored.
/// The die never shrinks below 1 (a fixed contribution).
pub fn effective_contribution(
    contribution: &Contribution,
    component_ancient: bool,
    variant: GizmoVariant,
) -> (u32, u32) {
    if variant.is_ancient() && !component_ancient {
        let base = (contribution.base as f64 * ANCIENT_PENALTY).floor() as u32;
        let roll = (contribution.roll as f64 * ANCIENT_PENALTY).floor() as u32;
        (base, roll.max(1))
    } else {
        (contribution.base, contribution.roll.max(1))
    }
}

/// Acceptance window for one target perk's summed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetWindow {
    pub min: u32,
    pub max: u32,
}

/// Per-unit contribution bounds: `min[c][t]` and `max[c][t]` for component `c`
/// toward target `t`.
#[derive(Debug, Clone, Default)]
pub struct QuantityProblem {
    pub components: Vec<String>,
    pub min: Vec<Vec<u32>>,
    pub max: Vec<Vec<u32>>,
    pub targets: Vec<TargetWindow>,
    pub material_limit: u32,
}

impl QuantityProblem {
    /// Collects every usable component able to roll a target perk, sorted by name,
    /// with its contribution bounds and the target rank windows.
    pub fn for_plan(catalog: &Catalog, plan: &SearchPlan) -> GfResult<Self> {
        let targets = plan.targets();

        let mut components: Vec<String> = Vec::new();
        for target in &targets {
            for comp in catalog.components_for(plan.gizmo_type, &target.name) {
                if !components.contains(comp) {
                    components.push(comp.clone());
                }
            }
        }
        components.retain(|comp| {
            let ancient = catalog.component(comp).map(|c| c.ancient).unwrap_or(true);
            (plan.variant.is_ancient() || !ancient) && !plan.excluded_materials.contains(comp)
        });
        components.sort();

        let mut min = Vec::with_capacity(components.len());
        let mut max = Vec::with_capacity(components.len());
        for comp in &components {
            let info = catalog.component(comp).ok_or_else(|| {
                GizmoError::invariant("quantity bounds", format!("unknown component '{}'", comp))
            })?;
            let mut comp_min = Vec::with_capacity(targets.len());
            let mut comp_max = Vec::with_capacity(targets.len());
            for target in &targets {
                match info.contribution(plan.gizmo_type, &target.name) {
                    Some(contribution) => {
                        let (base, roll) =
                            effective_contribution(contribution, info.ancient, plan.variant);
                        comp_min.push(base);
                        comp_max.push(base + roll - 1);
                    }
                    None => {
                        comp_min.push(0);
                        comp_max.push(0);
                    }
                }
            }
            min.push(comp_min);
            max.push(comp_max);
        }

        let mut windows = Vec::with_capacity(targets.len());
        for target in &targets {
            let info = catalog.perk(&target.name).ok_or_else(|| {
                GizmoError::invariant("quantity bounds", format!("unknown perk '{}'", target.name))
            })?;
            let min = info.thresholds[target.rank - 1];
            let max = if target.rank == info.rank_count() {
                UNBOUNDED
            } else {
                info.thresholds[target.rank] - 1
            };
            windows.push(TargetWindow { min, max });
        }

        Ok(Self {
            components,
            min,
            max,
            targets: windows,
            material_limit: plan.variant.material_limit(),
        })
    }

    /// Whether `quantities` lands every target inside its window under some roll.
    pub fn is_feasible(&self, quantities: &[u32]) -> bool {
        if quantities.iter().sum::<u32>() > self.material_limit {
            return false;
        }
        self.targets.iter().enumerate().all(|(t, window)| {
            let (lo, hi) = quantities
                .iter()
                .enumerate()
                .fold((0u32, 0u32), |(lo, hi), (c, &q)| {
                    (lo + q * self.min[c][t], hi + q * self.max[c][t])
                });
            lo <= window.max && hi >= window.min
        })
    }

    pub fn enumerate(&self) -> QuantityEnumerator<'_> {
        QuantityEnumerator::new(self)
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    idx: usize,
    remain: u32,
    quantity: u32,
}

/// Depth-first enumeration of feasible quantity vectors.
///
/// Single pass: once exhausted it stays exhausted. A branch is cut as soon as
/// its running minimum overshoots some target's maximum, since adding more
/// material can only raise it.
pub struct QuantityEnumerator<'a> {
    problem: &'a QuantityProblem,
    counts: Vec<u32>,
    mins: Vec<u32>,
    maxs: Vec<u32>,
    stack: Vec<Frame>,
    pending: Option<(usize, u32)>,
}

impl<'a> QuantityEnumerator<'a> {
    fn new(problem: &'a QuantityProblem) -> Self {
        let targets = problem.targets.len();
        Self {
            problem,
            counts: vec![0; problem.components.len()],
            mins: vec![0; targets],
            maxs: vec![0; targets],
            stack: Vec::with_capacity(problem.components.len()),
            pending: Some((0, problem.material_limit)),
        }
    }

    fn overshoots(&self) -> bool {
        self.mins
            .iter()
            .zip(&self.problem.targets)
            .any(|(&lo, window)| lo > window.max)
    }

    fn reaches_targets(&self) -> bool {
        self.maxs
            .iter()
            .zip(&self.problem.targets)
            .all(|(&hi, window)| hi >= window.min)
    }

    fn add_units(&mut self, idx: usize, units: u32) {
        for t in 0..self.problem.targets.len() {
            self.mins[t] += self.problem.min[idx][t] * units;
            self.maxs[t] += self.problem.max[idx][t] * units;
        }
    }

    fn remove_units(&mut self, idx: usize, units: u32) {
        for t in 0..self.problem.targets.len() {
            self.mins[t] -= self.problem.min[idx][t] * units;
            self.maxs[t] -= self.problem.max[idx][t] * units;
        }
    }
}

impl Iterator for QuantityEnumerator<'_> {
    type Item = Vec<u32>;

    fn next(&mut self) -> Option<Vec<u32>> {
        let n = self.problem.components.len();
        loop {
            if let Some((idx, remain)) = self.pending.take() {
                if self.overshoots() {
                    continue;
                }
                if remain == 0 || idx == n {
                    if self.reaches_targets() {
                        return Some(self.counts.clone());
                    }
                    continue;
                }
                self.counts[idx] = 0;
                self.stack.push(Frame {
                    idx,
                    remain,
                    quantity: 0,
                });
                self.pending = Some((idx + 1, remain));
                continue;
            }

            let frame = self.stack.last_mut()?;
            let Frame { idx, remain, .. } = *frame;
            frame.quantity += 1;
            let quantity = frame.quantity;
            self.add_units(idx, 1);

            if quantity <= remain {
                self.counts[idx] = quantity;
                self.pending = Some((idx + 1, remain - quantity));
            } else {
                self.remove_units(idx, remain + 1);
                self.counts[idx] = 0;
                self.stack.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(
        min: Vec<Vec<u32>>,
        max: Vec<Vec<u32>>,
        targets: Vec<TargetWindow>,
        limit: u32,
    ) -> QuantityProblem {
        QuantityProblem {
            components: (0..min.len()).map(|i| format!("c{}", i)).collect(),
            min,
            max,
            targets,
            material_limit: limit,
        }
    }

    #[test]
    fn test_single_component_window() {
        // Each unit rolls 10..=29; the target wants a value in [50, 9999].
        let p = problem(
            vec![vec![10]],
            vec![vec![29]],
            vec![TargetWindow { min: 50, max: UNBOUNDED }],
            5,
        );
        let found: Vec<Vec<u32>> = p.enumerate().collect();
        assert_eq!(found, vec![vec![2], vec![3], vec![4], vec![5]]);
    }

    #[test]
    fn test_overshoot_prunes() {
        // Rank window [10, 19]: two units already guarantee 20.
        let p = problem(
            vec![vec![10]],
            vec![vec![14]],
            vec![TargetWindow { min: 10, max: 19 }],
            5,
        );
        let found: Vec<Vec<u32>> = p.enumerate().collect();
        assert_eq!(found, vec![vec![1]]);
    }

    #[test]
    fn test_exhausted_stays_exhausted() {
        let p = problem(
            vec![vec![1]],
            vec![vec![1]],
            vec![TargetWindow { min: 100, max: 200 }],
            3,
        );
        let mut it = p.enumerate();
        assert_eq!(it.next(), None);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn test_penalty_floors() {
        let c = Contribution {
            perk: "Precise".to_string(),
            base: 11,
            roll: 7,
        };
        assert_eq!(effective_contribution(&c, false, GizmoVariant::Ancient), (8, 5));
        assert_eq!(effective_contribution(&c, true, GizmoVariant::Ancient), (11, 7));
        assert_eq!(effective_contribution(&c, false, GizmoVariant::Regular), (11, 7));
    }
}
