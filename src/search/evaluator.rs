use super::arrangements::Arrangement;
use super::level::{LevelEvaluation, LevelOptimizer};
use super::plan::{SearchPlan, SecondaryTarget};
use super::ranks::{PerkRank, RankTables};
use super::sort::jag_sort_by_key;
use crate::consts::{MAX_INV_BUDGET, RANK_PROBABILITY_FLOOR, UNBOUNDED};
use crate::error::{GfResult, GizmoError};

/// Probability weight spread over the closed budget interval `[min_budget, max_budget]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetRange {
    pub weight: f64,
    pub min_budget: u32,
    pub max_budget: u32,
}

/// Budget ranges collected from one arrangement, per outcome bucket.
#[derive(Debug, Clone, Default)]
pub struct SelectionMass {
    pub success: Vec<BudgetRange>,
    pub no_effect: Vec<BudgetRange>,
    pub potential: Vec<BudgetRange>,
}

/// Which perks of the cost-sorted list a budget interval selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerkCombo {
    Nothing,
    Single(usize),
    /// Indices of the more expensive perk first.
    Pair(usize, usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboBudget {
    pub min_budget: u32,
    pub max_budget: u32,
    pub combo: PerkCombo,
}

/// Splits the budget axis by which perks get selected, given costs sorted ascending.
///
/// A perk is selected when the budget exceeds its cost; with enough budget the
/// two most expensive affordable perks are kept.
pub fn combo_budgets(sorted_costs: &[u32]) -> Vec<ComboBudget> {
    let (least_idx, least_cost) = sorted_costs
        .iter()
        .enumerate()
        .find(|&(_, &cost)| cost > 0)
        .map(|(i, &cost)| (i, cost))
        .unwrap_or((0, UNBOUNDED));

    let mut out = vec![ComboBudget {
        min_budget: 0,
        max_budget: least_cost,
        combo: PerkCombo::Nothing,
    }];

    let mut prev_a = UNBOUNDED;
    for idx_a in (0..sorted_costs.len()).rev() {
        let cost_a = sorted_costs[idx_a];
        if cost_a == 0 || cost_a == prev_a {
            continue;
        }
        let single_max = if idx_a == least_idx {
            prev_a
        } else {
            prev_a.min(cost_a + least_cost)
        };
        out.push(ComboBudget {
            min_budget: cost_a + 1,
            max_budget: single_max,
            combo: PerkCombo::Single(idx_a),
        });

        let mut prev_b = UNBOUNDED;
        for idx_b in (0..idx_a).rev() {
            let cost_b = sorted_costs[idx_b];
            if cost_b == 0 || cost_b == prev_b || cost_a + cost_b + 1 > prev_a {
                continue;
            }
            out.push(ComboBudget {
                min_budget: cost_a + cost_b + 1,
                max_budget: prev_a.min(cost_a + prev_b),
                combo: PerkCombo::Pair(idx_a, idx_b),
            });
            prev_b = cost_b;
        }
        prev_a = cost_a;
    }
    out
}

/// Outcome of one arrangement at its best invention level.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrangementResult {
    pub materials: Vec<String>,
    pub best: LevelEvaluation,
    pub potential_gizmo_chance: f64,
}

impl ArrangementResult {
    pub fn gizmo_chance(&self) -> f64 {
        self.best.gizmo_chance
    }
}

/// Scores arrangements against one search plan.
///
/// Holds no mutable state; every call builds its own `PerkRank` working set.
pub struct ArrangementEvaluator<'a> {
    plan: &'a SearchPlan,
    optimizer: LevelOptimizer<'a>,
}

impl<'a> ArrangementEvaluator<'a> {
    pub fn new(plan: &'a SearchPlan, optimizer: LevelOptimizer<'a>) -> Self {
        Self { plan, optimizer }
    }

    pub fn evaluate(
        &self,
        tables: &RankTables,
        arrangement: &Arrangement,
    ) -> GfResult<ArrangementResult> {
        let mass = self.selection_mass(tables, arrangement)?;
        let best = self.optimizer.optimize(&mass.success, &mass.no_effect);
        let potential = self.optimizer.optimize(&mass.potential, &mass.no_effect);
        if self.plan.config.sanity_checks && best.gizmo_chance.is_nan() {
            return Err(GizmoError::invariant(
                describe(arrangement),
                "gizmo chance is NaN",
            ));
        }
        Ok(ArrangementResult {
            materials: arrangement.materials.clone(),
            best,
            potential_gizmo_chance: potential.gizmo_chance,
        })
    }

    /// Enumerates every likely rank assignment of the arrangement's perks and
    /// buckets its probability by the budget interval that decides the outcome.
    pub fn selection_mass(
        &self,
        tables: &RankTables,
        arrangement: &Arrangement,
    ) -> GfResult<SelectionMass> {
        let plan = self.plan;
        let mut working: Vec<PerkRank> = arrangement
            .perk_order
            .iter()
            .filter_map(|perk| tables.get(perk))
            .map(PerkRank::new)
            .collect();

        let position = |name: &str| working.iter().position(|p| p.name() == name);
        let primary = position(&plan.primary.name).ok_or_else(|| {
            GizmoError::invariant(
                describe(arrangement),
                format!("'{}' missing from perk order", plan.primary.name),
            )
        })?;
        let secondary = match plan.secondary.perk() {
            Some(target) => Some(position(&target.name).ok_or_else(|| {
                GizmoError::invariant(
                    describe(arrangement),
                    format!("'{}' missing from perk order", target.name),
                )
            })?),
            None => None,
        };

        let possible: Vec<Vec<usize>> = working
            .iter()
            .map(|p| p.possible_ranks(RANK_PROBABILITY_FLOOR))
            .collect();

        let mut mass = SelectionMass::default();
        let mut odometer = RankOdometer::new(&possible);
        while let Some(ranks) = odometer.next_ranks() {
            for (perk, &rank) in working.iter_mut().zip(ranks) {
                perk.set_rank(rank)?;
            }
            let weight: f64 = working.iter().map(|p| p.prob).product();

            let target1 = working[primary];
            let target2 = secondary.map(|i| working[i]);
            let off_target = target1.rank != plan.primary.rank
                || matches!(
                    (target2, plan.secondary.perk()),
                    (Some(t), Some(want)) if t.rank != want.rank
                );

            if off_target {
                let cheapest = working
                    .iter()
                    .map(|p| p.cost)
                    .filter(|&c| c > 0)
                    .min()
                    .unwrap_or(UNBOUNDED);
                let range = BudgetRange {
                    weight,
                    min_budget: 0,
                    max_budget: cheapest.min(MAX_INV_BUDGET as u32),
                };
                self.check_range(arrangement, &range)?;
                mass.no_effect.push(range);
                continue;
            }

            let mut sorted = working.clone();
            jag_sort_by_key(&mut sorted, |p| p.cost as i64);
            let costs: Vec<u32> = sorted.iter().map(|p| p.cost).collect();

            for entry in combo_budgets(&costs) {
                if entry.min_budget as usize > MAX_INV_BUDGET {
                    continue;
                }
                let range = BudgetRange {
                    weight,
                    min_budget: entry.min_budget,
                    max_budget: entry.max_budget.min(MAX_INV_BUDGET as u32),
                };
                self.check_range(arrangement, &range)?;

                let combo: Vec<PerkRank> = match entry.combo {
                    PerkCombo::Nothing => Vec::new(),
                    PerkCombo::Single(a) => vec![sorted[a]],
                    PerkCombo::Pair(a, b) => vec![sorted[a], sorted[b]],
                };
                self.classify(&combo, &target1, target2.as_ref(), range, &mut mass);
            }
        }
        Ok(mass)
    }

    fn check_range(&self, arrangement: &Arrangement, range: &BudgetRange) -> GfResult<()> {
        if !self.plan.config.sanity_checks {
            return Ok(());
        }
        if range.weight.is_nan() {
            return Err(GizmoError::invariant(
                describe(arrangement),
                "rank probability is NaN",
            ));
        }
        if range.min_budget > range.max_budget {
            return Err(GizmoError::invariant(
                describe(arrangement),
                format!(
                    "negative budget range [{}, {}]",
                    range.min_budget, range.max_budget
                ),
            ));
        }
        Ok(())
    }

    /// Adds `range` to the buckets the selected `combo` counts toward.
    fn classify(
        &self,
        combo: &[PerkRank],
        target1: &PerkRank,
        target2: Option<&PerkRank>,
        range: BudgetRange,
        mass: &mut SelectionMass,
    ) {
        let plan = self.plan;
        let is_primary = |p: &PerkRank| p.name() == plan.primary.name && p.rank == plan.primary.rank;

        match combo {
            [] => {
                mass.no_effect.push(range);
                return;
            }
            [a] => {
                if !matches!(plan.secondary, SecondaryTarget::Perk(_)) && is_primary(a) {
                    mass.success.push(range);
                }
            }
            [a, b] if a.two_slot() || b.two_slot() => {
                // A two-slot perk crowds out its partner; the first pick stands alone.
                if !matches!(plan.secondary, SecondaryTarget::Perk(_)) && is_primary(a) {
                    mass.success.push(range);
                }
            }
            [a, b] => match &plan.secondary {
                SecondaryTarget::Any => {
                    if is_primary(a) {
                        if !plan.undesired.contains(b.name()) {
                            mass.success.push(range);
                        }
                    } else if is_primary(b) && !plan.undesired.contains(a.name()) {
                        mass.success.push(range);
                    }
                }
                SecondaryTarget::Perk(second) => {
                    let is_second = |p: &PerkRank| p.name() == second.name && p.rank == second.rank;
                    if (is_primary(a) && is_second(b)) || (is_primary(b) && is_second(a)) {
                        mass.success.push(range);
                    }
                }
                SecondaryTarget::None => {}
            },
            _ => {}
        }

        let first_cost = combo[0].cost;
        let target_cost = target1.cost;
        match (target2, combo) {
            (None, _) if target1.two_slot() => {
                if first_cost == target_cost {
                    mass.potential.push(range);
                }
            }
            (None, _) => {
                let second_matches = combo.get(1).map(|b| b.cost == target_cost).unwrap_or(false);
                if first_cost == target_cost || second_matches {
                    mass.potential.push(range);
                }
            }
            (Some(t2), [a, b]) => {
                let (c1, c2) = (a.cost, b.cost);
                if (c1 == target_cost && c2 == t2.cost) || (c2 == target_cost && c1 == t2.cost) {
                    mass.potential.push(range);
                }
            }
            (Some(_), _) => {}
        }
    }
}

/// Walks the Cartesian product of per-perk rank choices, last perk fastest.
struct RankOdometer<'p> {
    choices: &'p [Vec<usize>],
    digits: Vec<usize>,
    current: Vec<usize>,
    started: bool,
    done: bool,
}

impl<'p> RankOdometer<'p> {
    fn new(choices: &'p [Vec<usize>]) -> Self {
        let done = choices.iter().any(Vec::is_empty);
        Self {
            choices,
            digits: vec![0; choices.len()],
            current: choices.iter().map(|c| c.first().copied().unwrap_or(0)).collect(),
            started: false,
            done,
        }
    }

    fn next_ranks(&mut self) -> Option<&[usize]> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(&self.current);
        }
        for i in (0..self.choices.len()).rev() {
            self.digits[i] += 1;
            if self.digits[i] < self.choices[i].len() {
                self.current[i] = self.choices[i][self.digits[i]];
                return Some(&self.current);
            }
            self.digits[i] = 0;
            self.current[i] = self.choices[i][0];
        }
        self.done = true;
        None
    }
}

fn describe(arrangement: &Arrangement) -> String {
    format!("arrangement [{}]", arrangement.materials.join(", "))
}
