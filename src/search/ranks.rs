use super::quantities::effective_contribution;
use crate::catalog::{Catalog, GizmoType};
use crate::consts::UNBOUNDED;
use crate::distribution::{CdfCache, GizmoVariant};
use crate::error::{GfResult, GizmoError};
use std::collections::HashMap;

/// Rank distribution of one perk for a fixed quantity vector.
///
/// `probs[r]` and `costs[r]` cover ranks `0..=max_rank`; `costs[0]` is 0.
#[derive(Debug, Clone, PartialEq)]
pub struct PerkRankTable {
    pub name: String,
    pub max_rank: usize,
    pub costs: Vec<u32>,
    pub probs: Vec<f64>,
    pub two_slot: bool,
}

pub type RankTables = HashMap<String, PerkRankTable>;

/// Builds the rank distribution of every perk the quantity vector touches.
///
/// Perks with no reachable rank on this shell are left out.
pub fn rank_tables(
    catalog: &Catalog,
    cache: &CdfCache,
    gizmo_type: GizmoType,
    variant: GizmoVariant,
    components: &[String],
    quantities: &[u32],
) -> GfResult<RankTables> {
    // perk -> (summed base, dice)
    let mut dice: HashMap<&str, (u32, Vec<u32>)> = HashMap::new();

    for (comp, &qty) in components.iter().zip(quantities) {
        if qty == 0 {
            continue;
        }
        let info = catalog.component(comp).ok_or_else(|| {
            GizmoError::invariant("rank tables", format!("unknown component '{}'", comp))
        })?;
        if info.ancient && !variant.is_ancient() {
            return Err(GizmoError::invariant(
                "rank tables",
                format!("ancient component '{}' in a regular gizmo", comp),
            ));
        }
        for contribution in info.contributions(gizmo_type) {
            let (base, roll) = effective_contribution(contribution, info.ancient, variant);
            let entry = dice.entry(contribution.perk.as_str()).or_default();
            entry.0 += base * qty;
            entry.1.extend(std::iter::repeat(roll).take(qty as usize));
        }
    }

    let mut tables = RankTables::with_capacity(dice.len());
    for (perk, (base, rolls)) in dice {
        let info = catalog.perk(perk).ok_or_else(|| {
            GizmoError::invariant("rank tables", format!("unknown perk '{}'", perk))
        })?;
        let max_rank = info.max_rank(variant.is_ancient());
        if max_rank == 0 {
            continue;
        }
        let thresholds = &info.thresholds[..max_rank];
        let cdf = cache.get(&rolls, base);
        if cdf.support().1 < thresholds[0] {
            continue;
        }

        let mut probs = vec![0.0; max_rank + 1];
        probs[0] = cdf.evaluate(0, thresholds[0] - 1);
        for rank in 1..max_rank {
            probs[rank] = cdf.evaluate(thresholds[rank - 1], thresholds[rank] - 1);
        }
        probs[max_rank] = cdf.evaluate(thresholds[max_rank - 1], UNBOUNDED);

        let mut costs = Vec::with_capacity(max_rank + 1);
        costs.push(0);
        costs.extend_from_slice(&info.costs[..max_rank]);

        tables.insert(
            perk.to_string(),
            PerkRankTable {
                name: perk.to_string(),
                max_rank,
                costs,
                probs,
                two_slot: info.two_slot,
            },
        );
    }
    Ok(tables)
}

/// Trial rank of one perk inside a single evaluation pass.
#[derive(Debug, Clone, Copy)]
pub struct PerkRank<'t> {
    pub table: &'t PerkRankTable,
    pub rank: usize,
    pub cost: u32,
    pub prob: f64,
}

impl<'t> PerkRank<'t> {
    pub fn new(table: &'t PerkRankTable) -> Self {
        Self {
            table,
            rank: 0,
            cost: 0,
            prob: table.probs[0],
        }
    }

    pub fn name(&self) -> &str {
        &self.table.name
    }

    pub fn two_slot(&self) -> bool {
        self.table.two_slot
    }

    pub fn set_rank(&mut self, rank: usize) -> GfResult<()> {
        let (cost, prob) = match (self.table.costs.get(rank), self.table.probs.get(rank)) {
            (Some(&cost), Some(&prob)) => (cost, prob),
            _ => {
                return Err(GizmoError::invariant(
                    format!("perk '{}'", self.table.name),
                    format!("rank {} beyond maximum {}", rank, self.table.max_rank),
                ))
            }
        };
        if (cost == 0) != (rank == 0) {
            return Err(GizmoError::invariant(
                format!("perk '{}'", self.table.name),
                format!("rank {} has cost {}", rank, cost),
            ));
        }
        self.rank = rank;
        self.cost = cost;
        self.prob = prob;
        Ok(())
    }

    /// Ranks worth enumerating: those with probability above `floor`.
    pub fn possible_ranks(&self, floor: f64) -> Vec<usize> {
        self.table
            .probs
            .iter()
            .enumerate()
            .filter(|&(_, &p)| p > floor)
            .map(|(r, _)| r)
            .collect()
    }
}
