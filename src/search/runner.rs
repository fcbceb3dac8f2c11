use super::arrangements::ArrangementGenerator;
use super::evaluator::{ArrangementEvaluator, ArrangementResult};
use super::level::{LevelEvaluation, LevelOptimizer};
use super::plan::SearchPlan;
use super::quantities::QuantityProblem;
use super::ranks::{rank_tables, RankTables};
use crate::catalog::Catalog;
use crate::consts::{FIRST_PASS_WEIGHT, PROGRESS_CADENCE, RESULT_TIE_EPSILON};
use crate::distribution::{BudgetTable, CdfCache};
use crate::error::{GfResult, GizmoError};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Mutex;
use std::time::Instant;
use strum_macros::Display;
use tracing::{debug, info};

/// A trait for receiving progress updates during a search.
/// Boolean return value indicates if the search should continue (true) or abort (false).
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, percent: u8) -> bool;
}

impl<F> ProgressCallback for F
where
    F: Fn(u8) -> bool + Send + Sync,
{
    fn on_progress(&self, percent: u8) -> bool {
        self(percent)
    }
}

/// Discards progress updates.
pub struct Silent;

impl ProgressCallback for Silent {
    fn on_progress(&self, _percent: u8) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SearchPhase {
    Init,
    EnumerateQuantities,
    EvaluateFirstArrangements,
    Prune,
    ExpandTopCandidates,
    RankAndTruncate,
    Done,
}

/// One recommended material combination.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    /// Components with a non-zero quantity, in sorted component order.
    pub quantities: Vec<(String, u32)>,
    /// Placement order of the best arrangement found.
    pub materials: Vec<String>,
    pub evaluation: LevelEvaluation,
}

impl RankedCandidate {
    pub fn total_quantity(&self) -> u32 {
        self.quantities.iter().map(|(_, q)| q).sum()
    }
}

struct Candidate {
    quantities: Vec<u32>,
    tables: RankTables,
    arrangements: ArrangementGenerator,
    best: ArrangementResult,
}

/// Emits percentages that never go backwards, and remembers an abort request.
struct ProgressReporter<'c, CB: ProgressCallback> {
    callback: &'c CB,
    cancel: Option<&'c AtomicBool>,
    last: Mutex<u8>,
    aborted: AtomicBool,
}

impl<'c, CB: ProgressCallback> ProgressReporter<'c, CB> {
    fn new(callback: &'c CB, cancel: Option<&'c AtomicBool>) -> Self {
        Self {
            callback,
            cancel,
            last: Mutex::new(0),
            aborted: AtomicBool::new(false),
        }
    }

    fn report(&self, percent: f64) {
        let percent = percent.clamp(0.0, 100.0).round() as u8;
        let Ok(mut last) = self.last.lock() else {
            return;
        };
        if percent < *last {
            return;
        }
        *last = percent;
        if !self.callback.on_progress(percent) {
            self.aborted.store(true, AtomicOrdering::SeqCst);
        }
    }

    fn check(&self) -> GfResult<()> {
        let cancelled = self
            .cancel
            .is_some_and(|flag| flag.load(AtomicOrdering::SeqCst));
        if cancelled || self.aborted.load(AtomicOrdering::SeqCst) {
            Err(GizmoError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Drives one search from quantity enumeration to the final ranking.
pub struct SearchRunner<'a> {
    catalog: &'a Catalog,
    budget: &'a BudgetTable,
    cache: &'a CdfCache,
    plan: &'a SearchPlan,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> SearchRunner<'a> {
    pub fn new(
        catalog: &'a Catalog,
        budget: &'a BudgetTable,
        cache: &'a CdfCache,
        plan: &'a SearchPlan,
    ) -> Self {
        Self {
            catalog,
            budget,
            cache,
            plan,
            cancel: None,
        }
    }

    /// Stops the search at the next candidate once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Runs the search. An impossible target yields `Ok(vec![])`.
    pub fn run<CB: ProgressCallback>(&self, callback: &CB) -> GfResult<Vec<RankedCandidate>> {
        match self.plan.config.threads {
            0 => self.run_phases(callback),
            threads => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| GizmoError::Config(format!("thread pool: {}", e)))?;
                pool.install(|| self.run_phases(callback))
            }
        }
    }

    fn run_phases<CB: ProgressCallback>(&self, callback: &CB) -> GfResult<Vec<RankedCandidate>> {
        let reporter = ProgressReporter::new(callback, self.cancel);
        let start = Instant::now();
        let mut phase = SearchPhase::Init;
        let mut problem = QuantityProblem::default();
        let mut vectors: Vec<Vec<u32>> = Vec::new();
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut results: Vec<RankedCandidate> = Vec::new();

        loop {
            debug!("Search phase: {} ({:.2?})", phase, start.elapsed());
            phase = match phase {
                SearchPhase::Init => {
                    problem = QuantityProblem::for_plan(self.catalog, self.plan)?;
                    SearchPhase::EnumerateQuantities
                }
                SearchPhase::EnumerateQuantities => {
                    vectors = self.enumerate_quantities(&problem);
                    if vectors.is_empty() {
                        info!("🚫 No material combination can reach {}", self.plan.primary);
                        SearchPhase::Done
                    } else {
                        SearchPhase::EvaluateFirstArrangements
                    }
                }
                SearchPhase::EvaluateFirstArrangements => {
                    let pending = std::mem::take(&mut vectors);
                    candidates = self.evaluate_first_arrangements(&problem, pending, &reporter)?;
                    SearchPhase::Prune
                }
                SearchPhase::Prune => {
                    candidates = prune(
                        std::mem::take(&mut candidates),
                        self.plan.config.top_configuration_count,
                    );
                    SearchPhase::ExpandTopCandidates
                }
                SearchPhase::ExpandTopCandidates => {
                    self.expand(&mut candidates, &reporter)?;
                    SearchPhase::RankAndTruncate
                }
                SearchPhase::RankAndTruncate => {
                    results = self.rank_and_truncate(&problem, std::mem::take(&mut candidates));
                    SearchPhase::Done
                }
                SearchPhase::Done => break,
            };
        }

        info!(
            "🏁 Search finished: {} results in {:.2?}",
            results.len(),
            start.elapsed()
        );
        Ok(results)
    }

    fn enumerate_quantities(&self, problem: &QuantityProblem) -> Vec<Vec<u32>> {
        let limit = self.plan.config.quantity_limit;
        let mut enumerator = problem.enumerate();
        let vectors: Vec<Vec<u32>> = enumerator.by_ref().take(limit).collect();
        if vectors.len() == limit && enumerator.next().is_some() {
            info!("✂️  Quantity limit reached: keeping the first {} combinations", limit);
        }
        info!(
            "🧮 {} quantity combinations over {} components",
            vectors.len(),
            problem.components.len()
        );
        vectors
    }

    fn evaluator(&self) -> ArrangementEvaluator<'_> {
        ArrangementEvaluator::new(self.plan, LevelOptimizer::new(self.budget, self.plan.variant))
    }

    fn evaluate_first_arrangements<CB: ProgressCallback>(
        &self,
        problem: &QuantityProblem,
        vectors: Vec<Vec<u32>>,
        reporter: &ProgressReporter<'_, CB>,
    ) -> GfResult<Vec<Candidate>> {
        let total = vectors.len();
        let checked = AtomicUsize::new(0);
        let evaluator = self.evaluator();

        vectors
            .into_par_iter()
            .map(|quantities| {
                reporter.check()?;
                let tables = rank_tables(
                    self.catalog,
                    self.cache,
                    self.plan.gizmo_type,
                    self.plan.variant,
                    &problem.components,
                    &quantities,
                )?;
                let mut arrangements = ArrangementGenerator::new(
                    self.catalog,
                    self.plan.gizmo_type,
                    &problem.components,
                    &quantities,
                    self.plan.variant.arrangement_limit(),
                )?;
                let first = arrangements.next().ok_or_else(|| {
                    GizmoError::invariant(
                        format!("quantities {:?}", quantities),
                        "no arrangement exists",
                    )
                })?;
                let best = evaluator.evaluate(&tables, &first)?;

                let done = checked.fetch_add(1, AtomicOrdering::SeqCst) + 1;
                if done % PROGRESS_CADENCE == 0 {
                    reporter.report(FIRST_PASS_WEIGHT * done as f64 / total as f64);
                }
                Ok(Candidate {
                    quantities,
                    tables,
                    arrangements,
                    best,
                })
            })
            .collect()
    }

    fn expand<CB: ProgressCallback>(
        &self,
        candidates: &mut [Candidate],
        reporter: &ProgressReporter<'_, CB>,
    ) -> GfResult<()> {
        let limit = self.plan.config.arrangement_limit_per_quantity;
        let total = candidates.len();
        let expanded = AtomicUsize::new(0);
        let capped = AtomicUsize::new(0);
        let evaluator = self.evaluator();

        candidates.par_iter_mut().try_for_each(|candidate| {
            reporter.check()?;
            let mut tried = 0;
            while tried < limit {
                let Some(arrangement) = candidate.arrangements.next() else {
                    break;
                };
                let result = evaluator.evaluate(&candidate.tables, &arrangement)?;
                if result.gizmo_chance() > candidate.best.gizmo_chance() {
                    candidate.best = result;
                }
                tried += 1;
            }
            if tried == limit {
                capped.fetch_add(1, AtomicOrdering::Relaxed);
            }

            let done = expanded.fetch_add(1, AtomicOrdering::SeqCst) + 1;
            if done % PROGRESS_CADENCE == 0 {
                let share = 100.0 - FIRST_PASS_WEIGHT;
                reporter.report(FIRST_PASS_WEIGHT + share * done as f64 / total as f64);
            }
            Ok::<(), GizmoError>(())
        })?;

        let capped = capped.into_inner();
        if capped > 0 {
            debug!("Arrangement expansion limit reached for {} candidates", capped);
        }
        reporter.check()
    }

    fn rank_and_truncate(
        &self,
        problem: &QuantityProblem,
        mut candidates: Vec<Candidate>,
    ) -> Vec<RankedCandidate> {
        let before = candidates.len();
        candidates.retain(|c| c.chance() > 0.0);
        if candidates.len() < before {
            debug!(
                "Dropped {} candidates that never roll the target",
                before - candidates.len()
            );
        }
        rank_candidates(&mut candidates);
        candidates.truncate(self.plan.config.top_configuration_count);

        candidates
            .into_iter()
            .map(|c| RankedCandidate {
                quantities: problem
                    .components
                    .iter()
                    .zip(&c.quantities)
                    .filter(|&(_, &q)| q > 0)
                    .map(|(name, &q)| (name.clone(), q))
                    .collect(),
                materials: c.best.materials,
                evaluation: c.best.best,
            })
            .collect()
    }
}

/// What pruning and ranking need to know about a candidate.
trait Scored {
    fn chance(&self) -> f64;
    fn potential(&self) -> f64;
    fn total_quantity(&self) -> u32;
}

impl Scored for Candidate {
    fn chance(&self) -> f64 {
        self.best.gizmo_chance()
    }

    fn potential(&self) -> f64 {
        self.best.potential_gizmo_chance
    }

    fn total_quantity(&self) -> u32 {
        self.quantities.iter().sum()
    }
}

/// Keeps the top `keep` candidates plus any whose potential beats the cutoff.
fn prune<T: Scored>(mut candidates: Vec<T>, keep: usize) -> Vec<T> {
    if keep == 0 || candidates.len() <= keep {
        return candidates;
    }
    candidates.sort_by(|a, b| b.chance().total_cmp(&a.chance()));
    let cutoff = candidates[keep - 1].chance();

    let before = candidates.len();
    let rest = candidates.split_off(keep);
    candidates.extend(rest.into_iter().filter(|c| c.potential() > cutoff));
    info!(
        "🔪 Pruned {} of {} candidates (cutoff {:.4})",
        before - candidates.len(),
        before,
        cutoff
    );
    candidates
}

/// Chances are compared in steps of the tie epsilon, so two candidates in the
/// same step can only differ by less than it.
fn tie_bucket(chance: f64) -> i64 {
    let steps = (1.0 / RESULT_TIE_EPSILON).round();
    (chance * steps).floor() as i64
}

/// Descending gizmo chance; chances in the same tie bucket are ordered by
/// ascending material count.
fn rank_candidates<T: Scored>(candidates: &mut [T]) {
    candidates.sort_by(|a, b| {
        tie_bucket(b.chance())
            .cmp(&tie_bucket(a.chance()))
            .then_with(|| a.total_quantity().cmp(&b.total_quantity()))
            .then_with(|| b.chance().total_cmp(&a.chance()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Scores {
        chance: f64,
        potential: f64,
        quantity: u32,
    }

    impl Scored for Scores {
        fn chance(&self) -> f64 {
            self.chance
        }

        fn potential(&self) -> f64 {
            self.potential
        }

        fn total_quantity(&self) -> u32 {
            self.quantity
        }
    }

    fn scores(chance: f64, potential: f64, quantity: u32) -> Scores {
        Scores {
            chance,
            potential,
            quantity,
        }
    }

    #[test]
    fn test_prune_keeps_top_and_promising() {
        let mut candidates: Vec<Scores> = (0..40)
            .map(|i| {
                let chance = 0.9 - i as f64 * 0.01;
                scores(chance, chance, 3)
            })
            .collect();
        // Cutoff is the 30th best chance: 0.9 - 29 * 0.01 = 0.61.
        candidates.push(scores(0.05, 0.8, 4));
        candidates.push(scores(0.04, 0.06, 4));

        let kept = prune(candidates, 30);

        assert_eq!(kept.len(), 31);
        for i in 0..30 {
            let chance = 0.9 - i as f64 * 0.01;
            assert!(kept.iter().any(|c| (c.chance - chance).abs() < 1e-12));
        }
        assert!(kept.contains(&scores(0.05, 0.8, 4)));
        assert!(!kept.contains(&scores(0.04, 0.06, 4)));
        assert!(kept.iter().all(|c| c.chance >= 0.61 - 1e-12 || c.potential > 0.61));
    }

    #[test]
    fn test_prune_leaves_small_sets_alone() {
        let candidates = vec![scores(0.1, 0.1, 1), scores(0.2, 0.2, 1)];
        assert_eq!(prune(candidates.clone(), 30), candidates);
    }

    #[test]
    fn test_ranking_does_not_chain_near_ties() {
        let mut candidates: Vec<Scores> = (0..5)
            .map(|i| scores(0.5 - i as f64 * 9e-6, 0.0, 5 - i as u32))
            .collect();

        rank_candidates(&mut candidates);

        assert_eq!(candidates[0].chance, 0.5);
        for pair in candidates.windows(2) {
            assert!(pair[1].chance <= pair[0].chance + RESULT_TIE_EPSILON);
        }
    }

    #[test]
    fn test_ranking_prefers_fewer_materials_on_ties() {
        let mut candidates = vec![
            scores(0.300_001, 0.0, 6),
            scores(0.300_004, 0.0, 2),
            scores(0.2, 0.0, 1),
        ];

        rank_candidates(&mut candidates);

        let quantities: Vec<u32> = candidates.iter().map(|c| c.quantity).collect();
        assert_eq!(quantities, vec![2, 6, 1]);
    }
}
