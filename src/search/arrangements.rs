use crate::catalog::{Catalog, GizmoType};
use crate::error::{GfResult, GizmoError};
use std::collections::HashSet;

/// One placement order and the perk priority it induces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrangement {
    /// Component per placement position, duplicates included.
    pub materials: Vec<String>,
    /// Perks in first-occurrence order across `materials`.
    pub perk_order: Vec<String>,
}

/// Permutations of `0..n` by Ehrlich's swap method: each step is a single
/// swap with the first element.
#[derive(Debug, Clone)]
pub struct Permutations {
    current: Vec<usize>,
    flips: Vec<usize>,
    counters: Vec<usize>,
    started: bool,
    done: bool,
}

impl Permutations {
    pub fn new(n: usize) -> Self {
        Self {
            current: (0..n).collect(),
            flips: (0..n).collect(),
            counters: vec![0; n + 1],
            started: false,
            done: false,
        }
    }
}

impl Iterator for Permutations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.current.clone());
        }

        let n = self.current.len();
        let mut k = 1;
        while self.counters[k - 1] == k {
            self.counters[k - 1] = 0;
            k += 1;
        }
        if k >= n {
            self.done = true;
            return None;
        }
        self.counters[k - 1] += 1;
        self.current.swap(0, self.flips[k]);

        let (mut j, mut k) = (1, k - 1);
        while j < k {
            self.flips.swap(j, k);
            j += 1;
            k -= 1;
        }
        Some(self.current.clone())
    }
}

/// Distinct-perk-order arrangements for one quantity vector.
///
/// Only the first unit of each component is permuted: later duplicates can
/// never be the first source of a perk, so they trail as a fixed tail. The
/// sequence is single pass and stops after `limit` arrangements.
pub struct ArrangementGenerator {
    firsts: Vec<String>,
    first_perks: Vec<Vec<String>>,
    tail: Vec<String>,
    permutations: Permutations,
    seen: HashSet<String>,
    emitted: usize,
    limit: usize,
}

impl ArrangementGenerator {
    pub fn new(
        catalog: &Catalog,
        gizmo_type: GizmoType,
        components: &[String],
        quantities: &[u32],
        limit: usize,
    ) -> GfResult<Self> {
        let mut firsts = Vec::new();
        let mut first_perks = Vec::new();
        let mut tail = Vec::new();

        for (comp, &qty) in components.iter().zip(quantities) {
            if qty == 0 {
                continue;
            }
            let info = catalog.component(comp).ok_or_else(|| {
                GizmoError::invariant("arrangements", format!("unknown component '{}'", comp))
            })?;
            firsts.push(comp.clone());
            first_perks.push(
                info.contributions(gizmo_type)
                    .iter()
                    .map(|c| c.perk.clone())
                    .collect(),
            );
            tail.extend(std::iter::repeat(comp.clone()).take(qty as usize - 1));
        }

        let permutations = Permutations::new(firsts.len());
        Ok(Self {
            firsts,
            first_perks,
            tail,
            permutations,
            seen: HashSet::new(),
            emitted: 0,
            limit,
        })
    }

    fn perk_order(&self, perm: &[usize]) -> Vec<String> {
        let mut order: Vec<String> = Vec::new();
        for &i in perm {
            for perk in &self.first_perks[i] {
                if !order.contains(perk) {
                    order.push(perk.clone());
                }
            }
        }
        order
    }
}

impl Iterator for ArrangementGenerator {
    type Item = Arrangement;

    fn next(&mut self) -> Option<Arrangement> {
        while self.emitted < self.limit {
            let perm = self.permutations.next()?;
            let perk_order = self.perk_order(&perm);
            if !self.seen.insert(perk_order.join(" ")) {
                continue;
            }
            self.emitted += 1;

            let mut materials: Vec<String> = perm.iter().map(|&i| self.firsts[i].clone()).collect();
            materials.extend(self.tail.iter().cloned());
            return Some(Arrangement {
                materials,
                perk_order,
            });
        }
        None
    }
}
